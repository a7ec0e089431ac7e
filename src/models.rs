//! Row types, validated inputs and the projections returned by the API.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub order_date: NaiveDateTime,
    pub delivery_date: Option<NaiveDateTime>,
    /// Cleared when the owning customer is deleted.
    pub customer_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    #[serde(default)]
    pub order_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub delivery_date: Option<NaiveDateTime>,
    pub customer_id: i64,
    pub products: Vec<i64>,
}

impl NewOrder {
    /// Product ids in first-seen order with repeats removed; an order holds a product at most once.
    pub fn distinct_products(&self) -> Vec<i64> {
        let mut seen = std::collections::HashSet::new();
        self.products.iter().copied().filter(|id| seen.insert(*id)).collect()
    }
}

/// Order row together with the ids of its associated products (`GET /orders`).
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct OrderListing {
    pub id: i64,
    pub customer_id: Option<i64>,
    pub order_date: NaiveDateTime,
    pub delivery_date: Option<NaiveDateTime>,
    pub products: Vec<i64>,
}

// Passwords are kept and returned exactly as submitted. Known security gap, see DESIGN.md.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CustomerAccount {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub customer_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomerAccount {
    pub username: String,
    pub password: String,
    pub customer_id: i64,
}

#[derive(Debug, Serialize)]
pub struct CustomerSummary {
    pub customer_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<Customer> for CustomerSummary {
    fn from(c: Customer) -> Self {
        CustomerSummary {
            customer_id: c.id,
            name: c.name,
            email: c.email,
            phone: c.phone,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductLine {
    pub product_id: i64,
    pub name: String,
    pub price: f64,
}

impl From<Product> for ProductLine {
    fn from(p: Product) -> Self {
        ProductLine {
            product_id: p.id,
            name: p.name,
            price: p.price,
        }
    }
}

/// Nested order view. `products` is omitted for the status view.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub order_id: i64,
    pub order_date: NaiveDateTime,
    pub delivery_date: Option<NaiveDateTime>,
    pub customer: Option<CustomerSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<ProductLine>>,
}
