use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{FromRef, FromRequestParts, State};
use axum::http::{header, request::Parts, HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use bookshelf_http::error::AppError;

use crate::principal::{AuthError, Principal, TokenRegistry};

/// State for [`require_role`]: who may pass and which role they need.
#[derive(Clone)]
pub struct RoleGuard {
    tokens: Arc<TokenRegistry>,
    role: Arc<str>,
}

impl RoleGuard {
    pub fn new(tokens: Arc<TokenRegistry>, role: impl Into<Arc<str>>) -> Self {
        Self {
            tokens,
            role: role.into(),
        }
    }

    fn check(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        let header = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let principal = self.tokens.authenticate(header)?;
        if !principal.has_role(&self.role) {
            tracing::debug!(
                username = %principal.username,
                roles = ?principal.roles,
                required = %self.role,
                "access denied: missing role"
            );
            return Err(AuthError::MissingRole {
                role: self.role.to_string(),
            });
        }
        Ok(principal)
    }
}

/// Reject the request before the handler runs unless the caller holds the
/// guard's role. The resolved [`Principal`] is stored in the request
/// extensions.
pub async fn require_role(
    State(guard): State<RoleGuard>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match guard.check(request.headers()) {
        Ok(principal) => {
            tracing::debug!(username = %principal.username, "access granted");
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(err) => AppError::from(err).into_response(),
    }
}

/// Whether the caller would pass the [`RoleGuard`]. Public routes use it to
/// tailor their output; extracting it never rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Public,
    Admin,
}

impl Audience {
    pub fn is_admin(self) -> bool {
        matches!(self, Audience::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Audience::Public => "public",
            Audience::Admin => "admin",
        }
    }
}

impl<S> FromRequestParts<S> for Audience
where
    RoleGuard: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let guard = RoleGuard::from_ref(state);
        let admin = match parts.extensions.get::<Principal>() {
            Some(principal) => principal.has_role(&guard.role),
            None => guard.check(&parts.headers).is_ok(),
        };
        Ok(if admin {
            Audience::Admin
        } else {
            Audience::Public
        })
    }
}
