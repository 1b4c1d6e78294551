use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use bookshelf_db::PageRequest;
use bookshelf_http::error::AppError;
use bookshelf_kernel::settings::PaginationSettings;
use serde::Deserialize;

/// `?page=&limit=` of a listing endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListQuery {
    /// Fill in defaults and clamp `limit` to the configured maximum.
    pub fn resolve(
        self,
        default_limit: u32,
        settings: &PaginationSettings,
    ) -> Result<PageRequest, AppError> {
        let page = self.page.unwrap_or(settings.default_page);
        let limit = self.limit.unwrap_or(default_limit).min(settings.max_limit);
        PageRequest::new(page, limit).map_err(|err| AppError::bad_request(err.to_string()))
    }
}

/// Numeric `{id}` path segment. Anything that is not an integer names no
/// resource and is reported as 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceId(pub i64);

impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state).await?;
        raw.parse()
            .map(ResourceId)
            .map_err(|_| AppError::not_found(format!("no resource with id '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<u32>, limit: Option<u32>) -> ListQuery {
        ListQuery { page, limit }
    }

    #[test]
    fn defaults_apply_when_absent() {
        let settings = PaginationSettings::default();
        let request = query(None, None).resolve(3, &settings).unwrap();
        assert_eq!((request.page(), request.size()), (1, 3));

        let request = query(Some(2), None).resolve(5, &settings).unwrap();
        assert_eq!((request.page(), request.size()), (2, 5));
    }

    #[test]
    fn limit_is_clamped_to_maximum() {
        let settings = PaginationSettings::default();
        let request = query(None, Some(10_000)).resolve(3, &settings).unwrap();
        assert_eq!(request.size(), settings.max_limit);
    }

    #[test]
    fn zero_page_or_limit_is_rejected() {
        let settings = PaginationSettings::default();
        assert!(matches!(
            query(Some(0), None).resolve(3, &settings),
            Err(AppError::BadRequest { .. })
        ));
        assert!(matches!(
            query(None, Some(0)).resolve(3, &settings),
            Err(AppError::BadRequest { .. })
        ));
    }
}
