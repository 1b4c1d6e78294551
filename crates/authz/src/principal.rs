use std::collections::HashMap;

use bookshelf_http::error::AppError;
use bookshelf_kernel::settings::AuthSettings;
use thiserror::Error;

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub roles: Vec<String>,
}

impl Principal {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer credentials")]
    MissingCredentials,

    #[error("invalid bearer token")]
    InvalidToken,

    #[error("role '{role}' required")]
    MissingRole { role: String },
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials | AuthError::InvalidToken => {
                AppError::unauthorized(err.to_string())
            }
            AuthError::MissingRole { .. } => {
                AppError::forbidden("administrator privileges are required for this resource")
            }
        }
    }
}

/// Static token table resolved from configuration.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    principals: HashMap<String, Principal>,
}

impl TokenRegistry {
    pub fn from_settings(settings: &AuthSettings) -> Self {
        let principals = settings
            .tokens
            .iter()
            .map(|entry| {
                (
                    entry.token.clone(),
                    Principal {
                        username: entry.username.clone(),
                        roles: entry.roles.clone(),
                    },
                )
            })
            .collect();
        Self { principals }
    }

    pub fn with_token(mut self, token: impl Into<String>, principal: Principal) -> Self {
        self.principals.insert(token.into(), principal);
        self
    }

    pub fn len(&self) -> usize {
        self.principals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }

    /// Resolve the value of an `Authorization` header.
    pub fn authenticate(&self, header: Option<&str>) -> Result<Principal, AuthError> {
        let raw = header.ok_or(AuthError::MissingCredentials)?;
        let token = raw
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingCredentials)?;

        self.principals
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
