//! Product handlers.

use super::parse_id;
use crate::error::AppError;
use crate::response;
use crate::service::schemas;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

const RESOURCE: &str = "Product";

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.store.list_products().await?))
}

pub async fn create(State(state): State<AppState>, Json(body): Json<Value>) -> Result<impl IntoResponse, AppError> {
    let input = schemas::product(&body)?;
    let product = state.store.insert_product(&input).await?;
    tracing::info!(product_id = product.id, "product created");
    Ok(response::created("Product has been added successfully"))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, RESOURCE)?;
    state.store.get_product(id).await?.ok_or(AppError::NotFound(RESOURCE))?;
    let input = schemas::product(&body)?;
    state
        .store
        .update_product(id, &input)
        .await?
        .ok_or(AppError::NotFound(RESOURCE))?;
    Ok(response::ok("Product details updated successfully"))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, RESOURCE)?;
    state.store.get_product(id).await?.ok_or(AppError::NotFound(RESOURCE))?;
    if !state.store.delete_product(id).await? {
        return Err(AppError::NotFound(RESOURCE));
    }
    tracing::info!(product_id = id, "product removed");
    Ok(response::ok("Product removed successfully"))
}

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

pub async fn by_name(
    State(state): State<AppState>,
    Query(q): Query<NameQuery>,
) -> Result<impl IntoResponse, AppError> {
    let name = q.name.ok_or(AppError::NotFound(RESOURCE))?;
    let product = state
        .store
        .find_product_by_name(&name)
        .await?
        .ok_or(AppError::NotFound(RESOURCE))?;
    Ok(Json(product))
}
