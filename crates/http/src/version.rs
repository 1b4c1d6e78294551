//! Serialization version negotiation from the `Accept` header.
//!
//! Callers opt into newer wire fields with a media-type parameter:
//! `Accept: application/json; version=2.0`.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use bookshelf_view::Version;

use crate::error::AppError;

/// Version requested by the caller, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptVersion(pub Option<Version>);

impl AcceptVersion {
    /// Requested version, or `fallback` when the caller did not ask for one.
    pub fn or(self, fallback: Version) -> Version {
        self.0.unwrap_or(fallback)
    }
}

/// Find the first `version=` media-type parameter in the `Accept` header.
pub fn requested_version(headers: &HeaderMap) -> Result<Option<Version>, AppError> {
    let Some(accept) = headers.get(header::ACCEPT) else {
        return Ok(None);
    };
    let accept = accept
        .to_str()
        .map_err(|_| AppError::bad_request("Accept header is not valid ASCII"))?;

    let raw = accept
        .split(',')
        .flat_map(|media_range| media_range.split(';').skip(1))
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("version"))
        .map(|(_, value)| value.trim().trim_matches('"'));

    match raw {
        Some(raw) => raw
            .parse::<Version>()
            .map(Some)
            .map_err(|err| AppError::bad_request(err.to_string())),
        None => Ok(None),
    }
}

impl<S> FromRequestParts<S> for AcceptVersion
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let version = requested_version(&parts.headers)?;
        tracing::trace!(version = ?version, "negotiated serialization version");
        Ok(AcceptVersion(version))
    }
}
