//! In-process store with the same relational behaviour as the PostgreSQL tables.
//! Used as the test double for handler and router tests.

use super::{username_taken, Store};
use crate::error::AppError;
use crate::models::{
    Customer, CustomerAccount, NewCustomer, NewCustomerAccount, NewOrder, NewProduct, Order, OrderListing,
    Product,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

/// One sequence per table, like a BIGSERIAL column each.
#[derive(Default)]
struct IdSequences {
    customers: i64,
    products: i64,
    orders: i64,
    accounts: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[derive(Default)]
struct Tables {
    ids: IdSequences,
    customers: BTreeMap<i64, Customer>,
    products: BTreeMap<i64, Product>,
    orders: BTreeMap<i64, Order>,
    /// (order_id, product_id)
    order_product: BTreeSet<(i64, i64)>,
    accounts: BTreeMap<i64, CustomerAccount>,
}

impl Tables {
    fn username_in_use(&self, username: &str, except: Option<i64>) -> bool {
        self.accounts
            .values()
            .any(|a| a.username == username && Some(a.id) != except)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::Store("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        self.lock().map(|_| ())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        Ok(self.lock()?.customers.values().cloned().collect())
    }

    async fn get_customer(&self, id: i64) -> Result<Option<Customer>, AppError> {
        Ok(self.lock()?.customers.get(&id).cloned())
    }

    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>, AppError> {
        Ok(self
            .lock()?
            .customers
            .values()
            .find(|c| c.email.as_deref() == Some(email))
            .cloned())
    }

    async fn insert_customer(&self, input: &NewCustomer) -> Result<Customer, AppError> {
        let mut t = self.lock()?;
        let customer = Customer {
            id: next(&mut t.ids.customers),
            name: input.name.clone(),
            email: Some(input.email.clone()),
            phone: Some(input.phone.clone()),
        };
        t.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn update_customer(&self, id: i64, input: &NewCustomer) -> Result<Option<Customer>, AppError> {
        let mut t = self.lock()?;
        Ok(t.customers.get_mut(&id).map(|c| {
            c.name = input.name.clone();
            c.email = Some(input.email.clone());
            c.phone = Some(input.phone.clone());
            c.clone()
        }))
    }

    async fn delete_customer(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.lock()?;
        if t.customers.remove(&id).is_none() {
            return Ok(false);
        }
        for order in t.orders.values_mut().filter(|o| o.customer_id == Some(id)) {
            order.customer_id = None;
        }
        for account in t.accounts.values_mut().filter(|a| a.customer_id == Some(id)) {
            account.customer_id = None;
        }
        Ok(true)
    }

    async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.lock()?.products.values().cloned().collect())
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>, AppError> {
        Ok(self.lock()?.products.get(&id).cloned())
    }

    async fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, AppError> {
        Ok(self.lock()?.products.values().find(|p| p.name == name).cloned())
    }

    async fn insert_product(&self, input: &NewProduct) -> Result<Product, AppError> {
        let mut t = self.lock()?;
        let product = Product {
            id: next(&mut t.ids.products),
            name: input.name.clone(),
            price: input.price,
            quantity: input.quantity,
        };
        t.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: i64, input: &NewProduct) -> Result<Option<Product>, AppError> {
        let mut t = self.lock()?;
        Ok(t.products.get_mut(&id).map(|p| {
            p.name = input.name.clone();
            p.price = input.price;
            p.quantity = input.quantity;
            p.clone()
        }))
    }

    async fn delete_product(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.lock()?;
        if t.products.remove(&id).is_none() {
            return Ok(false);
        }
        t.order_product.retain(|&(_, product_id)| product_id != id);
        Ok(true)
    }

    async fn list_orders(&self) -> Result<Vec<OrderListing>, AppError> {
        let t = self.lock()?;
        Ok(t.orders
            .values()
            .map(|o| OrderListing {
                id: o.id,
                customer_id: o.customer_id,
                order_date: o.order_date,
                delivery_date: o.delivery_date,
                products: t
                    .order_product
                    .iter()
                    .filter(|(order_id, _)| *order_id == o.id)
                    .map(|&(_, product_id)| product_id)
                    .collect(),
            })
            .collect())
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>, AppError> {
        Ok(self.lock()?.orders.get(&id).cloned())
    }

    async fn order_products(&self, order_id: i64) -> Result<Vec<Product>, AppError> {
        let t = self.lock()?;
        Ok(t.order_product
            .iter()
            .filter(|(o, _)| *o == order_id)
            .filter_map(|(_, p)| t.products.get(p).cloned())
            .collect())
    }

    async fn insert_order(&self, input: &NewOrder, product_ids: &[i64]) -> Result<Order, AppError> {
        let mut t = self.lock()?;
        if !t.customers.contains_key(&input.customer_id) {
            return Err(AppError::Store(format!(
                "foreign key violation: customer {} does not exist",
                input.customer_id
            )));
        }
        if let Some(missing) = product_ids.iter().find(|id| !t.products.contains_key(*id)) {
            return Err(AppError::Store(format!(
                "foreign key violation: product {} does not exist",
                missing
            )));
        }
        let order = Order {
            id: next(&mut t.ids.orders),
            order_date: input
                .order_date
                .unwrap_or_else(|| chrono::Utc::now().naive_utc()),
            delivery_date: input.delivery_date,
            customer_id: Some(input.customer_id),
        };
        t.orders.insert(order.id, order.clone());
        for &product_id in product_ids {
            t.order_product.insert((order.id, product_id));
        }
        Ok(order)
    }

    async fn delete_order(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.lock()?;
        if t.orders.remove(&id).is_none() {
            return Ok(false);
        }
        t.order_product.retain(|&(order_id, _)| order_id != id);
        Ok(true)
    }

    async fn list_accounts(&self) -> Result<Vec<CustomerAccount>, AppError> {
        Ok(self.lock()?.accounts.values().cloned().collect())
    }

    async fn get_account(&self, id: i64) -> Result<Option<CustomerAccount>, AppError> {
        Ok(self.lock()?.accounts.get(&id).cloned())
    }

    async fn insert_account(&self, input: &NewCustomerAccount) -> Result<CustomerAccount, AppError> {
        let mut t = self.lock()?;
        if t.username_in_use(&input.username, None) {
            return Err(username_taken());
        }
        let account = CustomerAccount {
            id: next(&mut t.ids.accounts),
            username: input.username.clone(),
            password: input.password.clone(),
            customer_id: Some(input.customer_id),
        };
        t.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update_account(
        &self,
        id: i64,
        input: &NewCustomerAccount,
    ) -> Result<Option<CustomerAccount>, AppError> {
        let mut t = self.lock()?;
        if !t.accounts.contains_key(&id) {
            return Ok(None);
        }
        if t.username_in_use(&input.username, Some(id)) {
            return Err(username_taken());
        }
        Ok(t.accounts.get_mut(&id).map(|a| {
            a.username = input.username.clone();
            a.password = input.password.clone();
            a.customer_id = Some(input.customer_id);
            a.clone()
        }))
    }

    async fn delete_account(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.lock()?.accounts.remove(&id).is_some())
    }
}
