//! Customer handlers: list, create, update, delete, lookup by email.

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

const RESOURCE: &str = "Customer";

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let customers = state.store.list_customers().await?;
    Ok(Json(customers))
}

pub async fn create(State(state): State<AppState>, Json(body): Json<Value>) -> Result<impl IntoResponse, AppError> {
    let input = schemas::customer(&body)?;
    let customer = state.store.insert_customer(&input).await?;
    tracing::info!(customer_id = customer.id, "customer created");
    Ok(response::created("New Customer Added Successfully!"))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, RESOURCE)?;
    state.store.get_customer(id).await?.ok_or(AppError::NotFound(RESOURCE))?;
    let input = schemas::customer(&body)?;
    state
        .store
        .update_customer(id, &input)
        .await?
        .ok_or(AppError::NotFound(RESOURCE))?;
    Ok(response::ok("Customer details updated successfully"))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, RESOURCE)?;
    state.store.get_customer(id).await?.ok_or(AppError::NotFound(RESOURCE))?;
    if !state.store.delete_customer(id).await? {
        return Err(AppError::NotFound(RESOURCE));
    }
    tracing::info!(customer_id = id, "customer removed");
    Ok(response::ok("Customer removed successfully"))
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

pub async fn by_email(
    State(state): State<AppState>,
    Query(q): Query<EmailQuery>,
) -> Result<impl IntoResponse, AppError> {
    let email = q.email.ok_or(AppError::NotFound(RESOURCE))?;
    let customer = state
        .store
        .find_customer_by_email(&email)
        .await?
        .ok_or(AppError::NotFound(RESOURCE))?;
    Ok(Json(customer))
}
