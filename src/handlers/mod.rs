//! HTTP handlers per resource.

pub mod account;
pub mod customer;
pub mod order;
pub mod product;

use crate::error::AppError;

/// Path ids are integers; anything else cannot address a row and is reported as not found.
fn parse_id(raw: &str, resource: &'static str) -> Result<i64, AppError> {
    raw.trim().parse().map_err(|_| AppError::NotFound(resource))
}
