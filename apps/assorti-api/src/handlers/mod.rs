//! # HTTP Handlers
//!
//! One module per resource. Handlers unpack path, query and body, call the
//! matching service and wrap the result in [`ApiResponse`](crate::response::ApiResponse).
//! Extractor rejections become `ApiError` so malformed input still gets the
//! JSON error envelope.

pub mod categories;
pub mod health;
pub mod orders;
pub mod products;
pub mod qrcodes;
pub mod sales;

use assorti_core::PageRequest;
use axum::extract::rejection::QueryRejection;
use axum::extract::Query;

use crate::error::ApiResult;

/// `?page=&limit=`, missing values left to the service defaults.
pub(crate) fn page_request(query: Result<Query<PageRequest>, QueryRejection>) -> ApiResult<PageRequest> {
    let Query(request) = query?;
    Ok(request)
}
