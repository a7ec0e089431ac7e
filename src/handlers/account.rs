//! Customer account handlers.

use super::parse_id;
use crate::error::AppError;
use crate::response;
use crate::service::schemas;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::Value;

const RESOURCE: &str = "Customer Account";

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.store.list_accounts().await?))
}

pub async fn create(State(state): State<AppState>, Json(body): Json<Value>) -> Result<impl IntoResponse, AppError> {
    let input = schemas::customer_account(&body)?;
    state
        .store
        .get_customer(input.customer_id)
        .await?
        .ok_or(AppError::NotFound("Customer"))?;
    let account = state.store.insert_account(&input).await?;
    tracing::info!(account_id = account.id, customer_id = input.customer_id, "customer account created");
    Ok(response::created("New Customer Account has created successfully"))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, RESOURCE)?;
    state.store.get_account(id).await?.ok_or(AppError::NotFound(RESOURCE))?;
    let input = schemas::customer_account(&body)?;
    state
        .store
        .get_customer(input.customer_id)
        .await?
        .ok_or(AppError::NotFound("Customer"))?;
    state
        .store
        .update_account(id, &input)
        .await?
        .ok_or(AppError::NotFound(RESOURCE))?;
    Ok(response::ok("Customer Account details has been updated successfully"))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, RESOURCE)?;
    state.store.get_account(id).await?.ok_or(AppError::NotFound(RESOURCE))?;
    if !state.store.delete_account(id).await? {
        return Err(AppError::NotFound(RESOURCE));
    }
    tracing::info!(account_id = id, "customer account removed");
    Ok(response::ok("Customer Account has been removed successfully"))
}
