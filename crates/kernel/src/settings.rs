use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "BOOKSHELF_ENV";
const CONFIG_DIR_ENV: &str = "BOOKSHELF_CONFIG_DIR";
const ENV_PREFIX: &str = "BOOKSHELF";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub pagination: PaginationSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub auth: AuthSettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay and
    /// `BOOKSHELF__*` variables.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .map(|cwd| cwd.join("config"))
                .with_context(|| "unable to resolve current directory")?,
        };

        Self::load_from(&config_dir, &environment)
    }

    /// Load configuration from an explicit directory and environment name.
    pub fn load_from(config_dir: &std::path::Path, environment: &str) -> anyhow::Result<Self> {
        let parsed_environment: Environment = environment.parse()?;

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let cfg = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = parsed_environment;

        Ok(settings)
    }

    /// Copy of the settings safe to print: credential tokens are masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for token in &mut copy.auth.tokens {
            token.token = "***".to_string();
        }
        copy
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

/// Defaults applied to list endpoints when `page` / `limit` are omitted.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaginationSettings {
    #[serde(default = "PaginationSettings::default_page")]
    pub default_page: u32,
    #[serde(default = "PaginationSettings::default_limit")]
    pub default_limit: u32,
    #[serde(default = "PaginationSettings::default_limit")]
    pub author_default_limit: u32,
    #[serde(default = "PaginationSettings::default_max_limit")]
    pub max_limit: u32,
}

impl PaginationSettings {
    fn default_page() -> u32 {
        1
    }

    fn default_limit() -> u32 {
        3
    }

    fn default_max_limit() -> u32 {
        100
    }
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_page: Self::default_page(),
            default_limit: Self::default_limit(),
            author_default_limit: Self::default_limit(),
            max_limit: Self::default_max_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheSettings {
    #[serde(default = "CacheSettings::default_enabled")]
    pub enabled: bool,
    /// Tag attached to every cached listing; one write invalidates all of them.
    #[serde(default = "CacheSettings::default_tag")]
    pub tag: String,
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

impl CacheSettings {
    fn default_enabled() -> bool {
        true
    }

    fn default_tag() -> String {
        "booksCache".to_string()
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            tag: Self::default_tag(),
            ttl_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiSettings {
    /// Serialization version used when the request does not negotiate one.
    #[serde(default = "ApiSettings::default_version")]
    pub default_version: String,
}

impl ApiSettings {
    fn default_version() -> String {
        "1.0".to_string()
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            default_version: Self::default_version(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default = "TelemetrySettings::default_filter")]
    pub filter: String,
}

impl TelemetrySettings {
    fn default_filter() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            filter: Self::default_filter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    #[serde(default = "AuthSettings::default_admin_role")]
    pub admin_role: String,
    #[serde(default)]
    pub tokens: Vec<TokenSettings>,
}

impl AuthSettings {
    fn default_admin_role() -> String {
        "ROLE_ADMIN".to_string()
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            admin_role: Self::default_admin_role(),
            tokens: Vec::new(),
        }
    }
}

/// Static bearer credential mapped to a principal.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenSettings {
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_environment_is_local() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
    }

    #[test]
    fn default_list_limits_match_book_and_author_lists() {
        let settings = Settings::default();
        assert_eq!(settings.pagination.default_page, 1);
        assert_eq!(settings.pagination.default_limit, 3);
        assert_eq!(settings.pagination.author_default_limit, 3);
        assert_eq!(settings.cache.tag, "booksCache");
        assert_eq!(settings.api.default_version, "1.0");
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let err = "qa".parse::<Environment>().unwrap_err();
        assert!(err.to_string().contains("unsupported environment 'qa'"));
    }

    #[test]
    fn load_from_missing_dir_uses_defaults() {
        let dir = std::env::temp_dir().join("bookshelf-settings-missing");
        let settings = Settings::load_from(&dir, "staging").unwrap();
        assert_eq!(settings.environment, Environment::Staging);
        assert_eq!(settings.server.port, 8080);
    }

    #[test]
    fn load_from_reads_base_and_overlay() {
        let dir = std::env::temp_dir().join(format!("bookshelf-settings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("base.toml"),
            r#"
[server]
port = 9090

[[auth.tokens]]
token = "secret"
username = "admin"
roles = ["ROLE_ADMIN"]
"#,
        )
        .unwrap();
        std::fs::write(dir.join("production.toml"), "[pagination]\ndefault_limit = 10\n").unwrap();

        let settings = Settings::load_from(&dir, "production").unwrap();
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.pagination.default_limit, 10);
        assert_eq!(settings.auth.tokens.len(), 1);
        assert_eq!(settings.redacted().auth.tokens[0].token, "***");

        std::fs::remove_dir_all(&dir).ok();
    }
}
