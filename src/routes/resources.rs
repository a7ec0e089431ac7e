//! Resource CRUD routes. Paths match the public API exactly, including the singular
//! `/product/:id` (update) and `/customer/:id` (account delete) forms.

use crate::handlers::{account, customer, order, product};
use crate::state::AppState;
use axum::{
    routing::{delete, get, put},
    Router,
};

pub fn resource_routes(state: AppState) -> Router {
    Router::new()
        .route("/customers", get(customer::list).post(customer::create))
        .route("/customers/by-email", get(customer::by_email))
        .route("/customers/:id", put(customer::update).delete(customer::delete))
        .route("/orders", get(order::list).post(order::create))
        .route("/orders/status/:id", get(order::status))
        .route("/orders/:id", get(order::read).delete(order::delete))
        .route("/products", get(product::list).post(product::create))
        .route("/products/by-name", get(product::by_name))
        .route("/products/:id", delete(product::delete))
        .route("/product/:id", put(product::update))
        .route("/customer_account", get(account::list).post(account::create))
        .route("/customer_account/:id", put(account::update))
        .route("/customer/:id", delete(account::delete))
        .with_state(state)
}
