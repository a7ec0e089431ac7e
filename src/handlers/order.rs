//! Order handlers. Detail and status views join the order with its customer (and products)
//! here, at response time.

use super::parse_id;
use crate::error::AppError;
use crate::models::{CustomerSummary, Order, OrderDetail, ProductLine};
use crate::response;
use crate::service::schemas;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::Value;

const RESOURCE: &str = "Order";

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.store.list_orders().await?))
}

/// Resolves every product before anything is written; one missing id rejects the whole order.
pub async fn create(State(state): State<AppState>, Json(body): Json<Value>) -> Result<impl IntoResponse, AppError> {
    let input = schemas::order(&body)?;
    state
        .store
        .get_customer(input.customer_id)
        .await?
        .ok_or(AppError::NotFound("Customer"))?;
    let product_ids = input.distinct_products();
    for product_id in &product_ids {
        if state.store.get_product(*product_id).await?.is_none() {
            tracing::debug!(product_id, "order references unknown product");
            return Err(AppError::NotFound("Product"));
        }
    }
    let order = state.store.insert_order(&input, &product_ids).await?;
    tracing::info!(order_id = order.id, products = product_ids.len(), "order created");
    Ok(response::created("New Order Added Successfully!"))
}

pub async fn read(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let order = fetch(&state, &id).await?;
    let products = state
        .store
        .order_products(order.id)
        .await?
        .into_iter()
        .map(ProductLine::from)
        .collect();
    Ok(Json(detail(&state, order, Some(products)).await?))
}

pub async fn status(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let order = fetch(&state, &id).await?;
    Ok(Json(detail(&state, order, None).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let order = fetch(&state, &id).await?;
    if !state.store.delete_order(order.id).await? {
        return Err(AppError::NotFound(RESOURCE));
    }
    tracing::info!(order_id = order.id, "order removed");
    Ok(response::ok("Order removed successfully"))
}

async fn fetch(state: &AppState, raw_id: &str) -> Result<Order, AppError> {
    let id = parse_id(raw_id, RESOURCE)?;
    state.store.get_order(id).await?.ok_or(AppError::NotFound(RESOURCE))
}

async fn detail(state: &AppState, order: Order, products: Option<Vec<ProductLine>>) -> Result<OrderDetail, AppError> {
    let customer = match order.customer_id {
        Some(customer_id) => state.store.get_customer(customer_id).await?.map(CustomerSummary::from),
        None => None,
    };
    Ok(OrderDetail {
        order_id: order.id,
        order_date: order.order_date,
        delivery_date: order.delivery_date,
        customer,
        products,
    })
}
