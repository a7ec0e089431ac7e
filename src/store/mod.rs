//! Persistence: repository-style data access per entity behind the `Store` trait.
//!
//! Handlers receive a `Store` through `AppState`, so the PostgreSQL implementation can be
//! swapped for the in-process one in tests. Relationships are never loaded implicitly;
//! each join is an explicit method.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, ensure_tables, PgStore};

use crate::error::AppError;
use crate::models::{
    Customer, CustomerAccount, NewCustomer, NewCustomerAccount, NewOrder, NewProduct, Order, OrderListing,
    Product,
};
use async_trait::async_trait;

/// Conflict raised by every store when an account username is already in use.
pub(crate) fn username_taken() -> AppError {
    AppError::Conflict("Username already exists".into())
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap round trip used by the readiness check.
    async fn ping(&self) -> Result<(), AppError>;

    async fn list_customers(&self) -> Result<Vec<Customer>, AppError>;
    async fn get_customer(&self, id: i64) -> Result<Option<Customer>, AppError>;
    /// First customer (lowest id) whose email equals `email` exactly.
    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>, AppError>;
    async fn insert_customer(&self, input: &NewCustomer) -> Result<Customer, AppError>;
    async fn update_customer(&self, id: i64, input: &NewCustomer) -> Result<Option<Customer>, AppError>;
    /// Orders and the account of the customer keep existing with `customer_id` cleared.
    async fn delete_customer(&self, id: i64) -> Result<bool, AppError>;

    async fn list_products(&self) -> Result<Vec<Product>, AppError>;
    async fn get_product(&self, id: i64) -> Result<Option<Product>, AppError>;
    async fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, AppError>;
    async fn insert_product(&self, input: &NewProduct) -> Result<Product, AppError>;
    async fn update_product(&self, id: i64, input: &NewProduct) -> Result<Option<Product>, AppError>;
    /// Also drops the product from every order it was associated with.
    async fn delete_product(&self, id: i64) -> Result<bool, AppError>;

    async fn list_orders(&self) -> Result<Vec<OrderListing>, AppError>;
    async fn get_order(&self, id: i64) -> Result<Option<Order>, AppError>;
    /// Products associated with the order, ordered by product id.
    async fn order_products(&self, order_id: i64) -> Result<Vec<Product>, AppError>;
    /// Inserts the order and one join row per product id atomically. Ids must be distinct
    /// and already resolved by the caller.
    async fn insert_order(&self, input: &NewOrder, product_ids: &[i64]) -> Result<Order, AppError>;
    async fn delete_order(&self, id: i64) -> Result<bool, AppError>;

    async fn list_accounts(&self) -> Result<Vec<CustomerAccount>, AppError>;
    async fn get_account(&self, id: i64) -> Result<Option<CustomerAccount>, AppError>;
    /// Fails with a conflict when the username is taken.
    async fn insert_account(&self, input: &NewCustomerAccount) -> Result<CustomerAccount, AppError>;
    async fn update_account(
        &self,
        id: i64,
        input: &NewCustomerAccount,
    ) -> Result<Option<CustomerAccount>, AppError>;
    async fn delete_account(&self, id: i64) -> Result<bool, AppError>;
}
