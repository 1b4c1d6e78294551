use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use axum::extract::FromRef;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bookshelf_authz::{Audience, RoleGuard, TokenRegistry};
use bookshelf_cache::{list_key, TagCache};
use bookshelf_http::error::AppError;
use bookshelf_kernel::settings::{PaginationSettings, Settings};
use bookshelf_view::Version;

use crate::catalog::{AuthorRepository, BookRepository, InMemoryCatalog, Violation};

/// Dependencies shared by the author and book handlers.
#[derive(Clone)]
pub struct CatalogState {
    pub authors: Arc<dyn AuthorRepository>,
    pub books: Arc<dyn BookRepository>,
    pub cache: Arc<TagCache<String>>,
    pub guard: RoleGuard,
    pub pagination: PaginationSettings,
    pub default_version: Version,
    cache_tag: Arc<str>,
}

impl CatalogState {
    /// Wire the process-wide catalog, listing cache and admin guard.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let catalog = Arc::new(InMemoryCatalog::new());
        let cache = TagCache::with_options(
            settings.cache.enabled,
            settings.cache.ttl_secs.map(Duration::from_secs),
        );
        Self::new(settings, catalog.clone(), catalog, Arc::new(cache))
    }

    pub fn new(
        settings: &Settings,
        authors: Arc<dyn AuthorRepository>,
        books: Arc<dyn BookRepository>,
        cache: Arc<TagCache<String>>,
    ) -> anyhow::Result<Self> {
        let default_version: Version = settings
            .api
            .default_version
            .parse()
            .with_context(|| "invalid api.default_version")?;

        let tokens = TokenRegistry::from_settings(&settings.auth);
        if tokens.is_empty() {
            tracing::warn!("no API tokens configured; write endpoints will reject every caller");
        }

        Ok(Self {
            authors,
            books,
            cache,
            guard: RoleGuard::new(Arc::new(tokens), settings.auth.admin_role.as_str()),
            pagination: settings.pagination.clone(),
            default_version,
            cache_tag: Arc::from(settings.cache.tag.as_str()),
        })
    }

    pub fn cache_tag(&self) -> &str {
        &self.cache_tag
    }

    /// Serve a listing page from the cache, rendering it with `render` on a
    /// miss. Pages are keyed per audience because admin renders carry write
    /// links. Every listing shares one tag.
    pub async fn cached_listing<F, Fut>(
        &self,
        resource: &str,
        page: u32,
        limit: u32,
        audience: Audience,
        render: F,
    ) -> Result<String, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, AppError>>,
    {
        let key = list_key(resource, page, limit, audience.as_str());
        self.cache
            .get_or_insert_with(&key, &self.cache_tag, render)
            .await
    }

    /// Drop every cached listing, for authors and books alike.
    pub fn invalidate_listings(&self) {
        let removed = self.cache.invalidate_tag(&self.cache_tag);
        tracing::info!(tag = %self.cache_tag, removed, "listing cache invalidated");
    }
}

impl FromRef<CatalogState> for RoleGuard {
    fn from_ref(state: &CatalogState) -> Self {
        state.guard.clone()
    }
}

/// 200/201 response carrying pre-rendered JSON.
pub fn json_response(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        body,
    )
        .into_response()
}

/// 201 response with a `Location` header pointing at the new resource.
pub fn created_response(location: String, body: String) -> Result<Response, AppError> {
    let location = HeaderValue::try_from(location)
        .map_err(|err| AppError::Internal(anyhow::anyhow!("invalid location header: {err}")))?;
    let mut response = json_response(StatusCode::CREATED, body);
    response.headers_mut().insert(header::LOCATION, location);
    Ok(response)
}

/// Fail with 400 and one detail per violated constraint.
pub fn ensure_valid(violations: Vec<Violation>) -> Result<(), AppError> {
    if violations.is_empty() {
        return Ok(());
    }

    let details = violations
        .iter()
        .map(|violation| serde_json::json!({ "field": violation.field, "message": violation.message }))
        .collect();
    Err(AppError::validation(details, "validation failed"))
}
