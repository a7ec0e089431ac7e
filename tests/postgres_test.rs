//! Router flows against `PgStore` on a live database. Each test creates its own database
//! on the server named by `DATABASE_URL` and returns early when it is unset.

mod common;

use axum::http::StatusCode;
use common::{create_customer, create_product, delete, get, pg_app, post, put};
use serde_json::json;

#[tokio::test]
async fn products_round_trip_through_postgres() {
    let Some(app) = pg_app().await else { return };
    let (status, _) = post(&app, "/products", json!({"name": "Widget", "price": "9.99", "quantity": 10})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, product) = get(&app, "/products/by-name?name=Widget").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["price"], 9.99);
    assert_eq!(product["quantity"], 10);
    let id = product["id"].as_i64().expect("product id");

    let (status, _) = put(&app, &format!("/product/{}", id), json!({"name": "Widget", "price": 12.5, "quantity": 3})).await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = get(&app, "/products").await;
    assert_eq!(list, json!([{"id": id, "name": "Widget", "price": 12.5, "quantity": 3}]));
}

#[tokio::test]
async fn order_listing_aggregates_product_ids() {
    let Some(app) = pg_app().await else { return };
    let customer = create_customer(&app, "Ada", "ada@example.com").await;
    let nut = create_product(&app, "Nut", 0.1).await;
    let bolt = create_product(&app, "Bolt", 0.25).await;

    let (status, _) = post(&app, "/orders", json!({"customer_id": customer, "products": [bolt, nut, bolt]})).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = post(&app, "/orders", json!({"customer_id": customer, "products": []})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, orders) = get(&app, "/orders").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().map(Vec::len), Some(2));
    assert_eq!(orders[0]["products"], json!([nut, bolt]));
    assert_eq!(orders[1]["products"], json!([]));
    assert_eq!(orders[1]["customer_id"], customer);
}

#[tokio::test]
async fn order_dates_are_stored_or_defaulted() {
    let Some(app) = pg_app().await else { return };
    let customer = create_customer(&app, "Linus", "linus@example.com").await;
    let bolt = create_product(&app, "Bolt", 0.25).await;
    post(
        &app,
        "/orders",
        json!({
            "customer_id": customer,
            "products": [bolt],
            "order_date": "2024-05-30T08:00:00+02:00",
            "delivery_date": "2024-06-01T10:00:00"
        }),
    )
    .await;
    post(&app, "/orders", json!({"customer_id": customer, "products": [bolt]})).await;
    let (_, orders) = get(&app, "/orders").await;

    let (status, detail) = get(&app, &format!("/orders/{}", orders[0]["id"])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["order_date"], "2024-05-30T06:00:00");
    assert_eq!(detail["delivery_date"], "2024-06-01T10:00:00");
    assert_eq!(detail["customer"]["email"], "linus@example.com");
    assert_eq!(detail["products"], json!([{"product_id": bolt, "name": "Bolt", "price": 0.25}]));

    let (status, status_view) = get(&app, &format!("/orders/status/{}", orders[1]["id"])).await;
    assert_eq!(status, StatusCode::OK);
    assert!(status_view["order_date"].is_string());
    assert!(status_view["delivery_date"].is_null());
    assert!(status_view.get("products").is_none());
}

#[tokio::test]
async fn missing_product_leaves_no_order() {
    let Some(app) = pg_app().await else { return };
    let customer = create_customer(&app, "Ken", "ken@example.com").await;
    let bolt = create_product(&app, "Bolt", 0.25).await;

    let (status, body) = post(&app, "/orders", json!({"customer_id": customer, "products": [bolt, bolt + 1000]})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Product Not Found"}));
    let (_, orders) = get(&app, "/orders").await;
    assert_eq!(orders, json!([]));
}

#[tokio::test]
async fn deleting_product_cascades_out_of_orders() {
    let Some(app) = pg_app().await else { return };
    let customer = create_customer(&app, "Bjarne", "bjarne@example.com").await;
    let bolt = create_product(&app, "Bolt", 0.25).await;
    let nut = create_product(&app, "Nut", 0.1).await;
    post(&app, "/orders", json!({"customer_id": customer, "products": [bolt, nut]})).await;

    let (status, _) = delete(&app, &format!("/products/{}", bolt)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, orders) = get(&app, "/orders").await;
    assert_eq!(orders[0]["products"], json!([nut]));
    let (_, detail) = get(&app, &format!("/orders/{}", orders[0]["id"])).await;
    assert_eq!(detail["products"], json!([{"product_id": nut, "name": "Nut", "price": 0.1}]));

    let (status, body) = delete(&app, &format!("/products/{}", bolt)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product Not Found");
}

#[tokio::test]
async fn deleting_customer_clears_order_and_account_owner() {
    let Some(app) = pg_app().await else { return };
    let customer = create_customer(&app, "Niklaus", "niklaus@example.com").await;
    post(&app, "/orders", json!({"customer_id": customer, "products": []})).await;
    post(&app, "/customer_account", json!({"username": "nik", "password": "pw", "customer_id": customer})).await;

    let (status, _) = delete(&app, &format!("/customers/{}", customer)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, orders) = get(&app, "/orders").await;
    assert!(orders[0]["customer_id"].is_null());
    let (status, detail) = get(&app, &format!("/orders/{}", orders[0]["id"])).await;
    assert_eq!(status, StatusCode::OK);
    assert!(detail["customer"].is_null());
    let (_, accounts) = get(&app, "/customer_account").await;
    assert!(accounts[0]["customer_id"].is_null());

    let (status, _) = delete(&app, &format!("/customers/{}", customer)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn taken_username_is_a_conflict_on_create_and_update() {
    let Some(app) = pg_app().await else { return };
    let customer = create_customer(&app, "Grace", "grace@example.com").await;
    let (status, _) = post(&app, "/customer_account", json!({"username": "ada", "password": "one", "customer_id": customer})).await;
    assert_eq!(status, StatusCode::CREATED);
    post(&app, "/customer_account", json!({"username": "grace", "password": "two", "customer_id": customer})).await;

    let (status, body) = post(&app, "/customer_account", json!({"username": "ada", "password": "x", "customer_id": customer})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"message": "Username already exists"}));

    let (_, accounts) = get(&app, "/customer_account").await;
    assert_eq!(accounts.as_array().map(Vec::len), Some(2));
    let grace = accounts[1]["id"].as_i64().expect("account id");
    let (status, body) = put(
        &app,
        &format!("/customer_account/{}", grace),
        json!({"username": "ada", "password": "three", "customer_id": customer}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"message": "Username already exists"}));

    let (status, _) = delete(&app, &format!("/customer/{}", grace)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = delete(&app, &format!("/customer/{}", grace)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn readiness_reaches_the_database() {
    let Some(app) = pg_app().await else { return };
    let (status, _) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
}
