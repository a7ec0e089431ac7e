//! PostgreSQL store: table DDL and one query per repository operation.

use super::{username_taken, Store};
use crate::error::AppError;
use crate::models::{
    Customer, CustomerAccount, NewCustomer, NewCustomerAccount, NewOrder, NewProduct, Order, OrderListing,
    Product,
};
use async_trait::async_trait;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

/// Table DDL in dependency order. `IF NOT EXISTS` only; there is no migration step.
const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS "Customers" (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        email VARCHAR(320),
        phone VARCHAR(15)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "Orders" (
        id BIGSERIAL PRIMARY KEY,
        order_date TIMESTAMP NOT NULL DEFAULT (NOW() AT TIME ZONE 'UTC'),
        delivery_date TIMESTAMP,
        customer_id BIGINT REFERENCES "Customers" (id) ON DELETE SET NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "Products" (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        price DOUBLE PRECISION NOT NULL,
        quantity BIGINT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "Order_Product" (
        order_id BIGINT NOT NULL REFERENCES "Orders" (id) ON DELETE CASCADE,
        product_id BIGINT NOT NULL REFERENCES "Products" (id) ON DELETE CASCADE,
        PRIMARY KEY (order_id, product_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "Customer_Accounts" (
        id BIGSERIAL PRIMARY KEY,
        username VARCHAR(255) NOT NULL UNIQUE,
        password VARCHAR(255) NOT NULL,
        customer_id BIGINT REFERENCES "Customers" (id) ON DELETE SET NULL
    )
    "#,
];

/// Create every table that does not exist yet.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), AppError> {
    for ddl in TABLES {
        sqlx::query(ddl).execute(pool).await?;
    }
    tracing::info!(tables = TABLES.len(), "schema ready");
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::Store("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

const CUSTOMER_COLUMNS: &str = "id, name, email, phone";
const PRODUCT_COLUMNS: &str = "id, name, price, quantity";
const ORDER_COLUMNS: &str = "id, order_date, delivery_date, customer_id";
const ACCOUNT_COLUMNS: &str = "id, username, password, customer_id";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        let sql = format!(r#"SELECT {} FROM "Customers" ORDER BY id"#, CUSTOMER_COLUMNS);
        Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_customer(&self, id: i64) -> Result<Option<Customer>, AppError> {
        let sql = format!(r#"SELECT {} FROM "Customers" WHERE id = $1"#, CUSTOMER_COLUMNS);
        Ok(sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>, AppError> {
        let sql = format!(
            r#"SELECT {} FROM "Customers" WHERE email = $1 ORDER BY id LIMIT 1"#,
            CUSTOMER_COLUMNS
        );
        Ok(sqlx::query_as(&sql).bind(email).fetch_optional(&self.pool).await?)
    }

    async fn insert_customer(&self, input: &NewCustomer) -> Result<Customer, AppError> {
        let sql = format!(
            r#"INSERT INTO "Customers" (name, email, phone) VALUES ($1, $2, $3) RETURNING {}"#,
            CUSTOMER_COLUMNS
        );
        tracing::debug!(sql = %sql, "query");
        Ok(sqlx::query_as(&sql)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_customer(&self, id: i64, input: &NewCustomer) -> Result<Option<Customer>, AppError> {
        let sql = format!(
            r#"UPDATE "Customers" SET name = $2, email = $3, phone = $4 WHERE id = $1 RETURNING {}"#,
            CUSTOMER_COLUMNS
        );
        tracing::debug!(sql = %sql, id, "query");
        Ok(sqlx::query_as(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_customer(&self, id: i64) -> Result<bool, AppError> {
        delete_by_id(&self.pool, "Customers", id).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        let sql = format!(r#"SELECT {} FROM "Products" ORDER BY id"#, PRODUCT_COLUMNS);
        Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>, AppError> {
        let sql = format!(r#"SELECT {} FROM "Products" WHERE id = $1"#, PRODUCT_COLUMNS);
        Ok(sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, AppError> {
        let sql = format!(
            r#"SELECT {} FROM "Products" WHERE name = $1 ORDER BY id LIMIT 1"#,
            PRODUCT_COLUMNS
        );
        Ok(sqlx::query_as(&sql).bind(name).fetch_optional(&self.pool).await?)
    }

    async fn insert_product(&self, input: &NewProduct) -> Result<Product, AppError> {
        let sql = format!(
            r#"INSERT INTO "Products" (name, price, quantity) VALUES ($1, $2, $3) RETURNING {}"#,
            PRODUCT_COLUMNS
        );
        tracing::debug!(sql = %sql, "query");
        Ok(sqlx::query_as(&sql)
            .bind(&input.name)
            .bind(input.price)
            .bind(input.quantity)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_product(&self, id: i64, input: &NewProduct) -> Result<Option<Product>, AppError> {
        let sql = format!(
            r#"UPDATE "Products" SET name = $2, price = $3, quantity = $4 WHERE id = $1 RETURNING {}"#,
            PRODUCT_COLUMNS
        );
        tracing::debug!(sql = %sql, id, "query");
        Ok(sqlx::query_as(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(input.price)
            .bind(input.quantity)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_product(&self, id: i64) -> Result<bool, AppError> {
        delete_by_id(&self.pool, "Products", id).await
    }

    async fn list_orders(&self) -> Result<Vec<OrderListing>, AppError> {
        let sql = r#"
            SELECT o.id, o.customer_id, o.order_date, o.delivery_date,
                   COALESCE(ARRAY_AGG(op.product_id ORDER BY op.product_id)
                            FILTER (WHERE op.product_id IS NOT NULL), '{}') AS products
            FROM "Orders" o
            LEFT JOIN "Order_Product" op ON op.order_id = o.id
            GROUP BY o.id
            ORDER BY o.id
        "#;
        Ok(sqlx::query_as(sql).fetch_all(&self.pool).await?)
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>, AppError> {
        let sql = format!(r#"SELECT {} FROM "Orders" WHERE id = $1"#, ORDER_COLUMNS);
        Ok(sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn order_products(&self, order_id: i64) -> Result<Vec<Product>, AppError> {
        let sql = r#"
            SELECT p.id, p.name, p.price, p.quantity
            FROM "Products" p
            JOIN "Order_Product" op ON op.product_id = p.id
            WHERE op.order_id = $1
            ORDER BY p.id
        "#;
        Ok(sqlx::query_as(sql).bind(order_id).fetch_all(&self.pool).await?)
    }

    async fn insert_order(&self, input: &NewOrder, product_ids: &[i64]) -> Result<Order, AppError> {
        let sql = format!(
            r#"INSERT INTO "Orders" (order_date, delivery_date, customer_id)
               VALUES (COALESCE($1, NOW() AT TIME ZONE 'UTC'), $2, $3) RETURNING {}"#,
            ORDER_COLUMNS
        );
        let mut tx = self.pool.begin().await?;
        tracing::debug!(sql = %sql, products = ?product_ids, "query (tx)");
        let order: Order = sqlx::query_as(&sql)
            .bind(input.order_date)
            .bind(input.delivery_date)
            .bind(input.customer_id)
            .fetch_one(&mut *tx)
            .await?;
        for product_id in product_ids {
            sqlx::query(r#"INSERT INTO "Order_Product" (order_id, product_id) VALUES ($1, $2)"#)
                .bind(order.id)
                .bind(*product_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(order)
    }

    async fn delete_order(&self, id: i64) -> Result<bool, AppError> {
        delete_by_id(&self.pool, "Orders", id).await
    }

    async fn list_accounts(&self) -> Result<Vec<CustomerAccount>, AppError> {
        let sql = format!(r#"SELECT {} FROM "Customer_Accounts" ORDER BY id"#, ACCOUNT_COLUMNS);
        Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_account(&self, id: i64) -> Result<Option<CustomerAccount>, AppError> {
        let sql = format!(r#"SELECT {} FROM "Customer_Accounts" WHERE id = $1"#, ACCOUNT_COLUMNS);
        Ok(sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert_account(&self, input: &NewCustomerAccount) -> Result<CustomerAccount, AppError> {
        let sql = format!(
            r#"INSERT INTO "Customer_Accounts" (username, password, customer_id) VALUES ($1, $2, $3) RETURNING {}"#,
            ACCOUNT_COLUMNS
        );
        tracing::debug!(sql = %sql, "query");
        Ok(sqlx::query_as(&sql)
            .bind(&input.username)
            .bind(&input.password)
            .bind(input.customer_id)
            .fetch_one(&self.pool)
            .await
            .map_err(username_conflict)?)
    }

    async fn update_account(
        &self,
        id: i64,
        input: &NewCustomerAccount,
    ) -> Result<Option<CustomerAccount>, AppError> {
        let sql = format!(
            r#"UPDATE "Customer_Accounts" SET username = $2, password = $3, customer_id = $4 WHERE id = $1 RETURNING {}"#,
            ACCOUNT_COLUMNS
        );
        tracing::debug!(sql = %sql, id, "query");
        Ok(sqlx::query_as(&sql)
            .bind(id)
            .bind(&input.username)
            .bind(&input.password)
            .bind(input.customer_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(username_conflict)?)
    }

    async fn delete_account(&self, id: i64) -> Result<bool, AppError> {
        delete_by_id(&self.pool, "Customer_Accounts", id).await
    }
}

/// The only unique column besides primary keys is `Customer_Accounts.username`.
fn username_conflict(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => username_taken(),
        other => AppError::Db(other),
    }
}

/// `table` is one of the fixed table names above, never request input.
async fn delete_by_id(pool: &PgPool, table: &str, id: i64) -> Result<bool, AppError> {
    let sql = format!("DELETE FROM {} WHERE id = $1", quote_ident(table));
    tracing::debug!(sql = %sql, id, "query");
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_url_targets_postgres_database() {
        let (admin, db) = parse_db_name_from_url("postgres://u:p@localhost:5432/e_commerce_db?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(db, "e_commerce_db");
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("Order_Product"), "\"Order_Product\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
