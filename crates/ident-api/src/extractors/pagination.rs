//! Pagination extractor
//!
//! Extracts offset-based `page`/`size` query parameters.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

use crate::response::ApiError;

/// Default page size
const DEFAULT_SIZE: i64 = 25;
/// Maximum page size
const MAX_SIZE: i64 = 100;

/// Raw pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub size: Option<i64>,
}

/// Validated pagination parameters
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    /// 1-based page number
    pub page: i64,
    /// Page size, clamped to 1-100
    pub size: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_SIZE,
        }
    }
}

impl From<PageParams> for Pagination {
    fn from(params: PageParams) -> Self {
        Self {
            page: params.page.unwrap_or(1).max(1),
            size: params.size.unwrap_or(DEFAULT_SIZE).clamp(1, MAX_SIZE),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PageParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.to_string()))?;

        Ok(Pagination::from(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pagination() {
        let pagination = Pagination::default();
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.size, DEFAULT_SIZE);
    }

    #[test]
    fn test_clamping() {
        let pagination = Pagination::from(PageParams {
            page: Some(0),
            size: Some(1000),
        });
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.size, MAX_SIZE);

        let pagination = Pagination::from(PageParams {
            page: Some(-3),
            size: Some(0),
        });
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.size, 1);
    }

    #[test]
    fn test_explicit_values_pass_through() {
        let pagination = Pagination::from(PageParams {
            page: Some(4),
            size: Some(50),
        });
        assert_eq!(pagination.page, 4);
        assert_eq!(pagination.size, 50);
    }
}
