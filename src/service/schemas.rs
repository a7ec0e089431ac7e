//! Constraint tables for each resource's input payload.

use super::validation::{FieldKind, FieldRule, RequestValidator, Schema, ValidationErrors};
use crate::models::{NewCustomer, NewCustomerAccount, NewOrder, NewProduct};
use serde_json::Value;

pub const CUSTOMER: Schema = Schema {
    fields: &[
        FieldRule::required("name", FieldKind::String).max_length(255),
        FieldRule::required("email", FieldKind::String).max_length(320),
        FieldRule::required("phone", FieldKind::String).max_length(15),
        FieldRule::optional("order", FieldKind::Integer),
    ],
    ignored: &["id"],
};

pub const ORDER: Schema = Schema {
    fields: &[
        FieldRule::optional("order_date", FieldKind::DateTime),
        FieldRule::optional("delivery_date", FieldKind::DateTime),
        FieldRule::required("customer_id", FieldKind::Integer),
        FieldRule::required("products", FieldKind::IntegerList),
    ],
    ignored: &["id"],
};

pub const PRODUCT: Schema = Schema {
    fields: &[
        FieldRule::required("name", FieldKind::String).min_length(1).max_length(255),
        FieldRule::required("price", FieldKind::Number).minimum(0.0),
        FieldRule::required("quantity", FieldKind::Integer),
    ],
    ignored: &["id"],
};

pub const CUSTOMER_ACCOUNT: Schema = Schema {
    fields: &[
        FieldRule::required("username", FieldKind::String).max_length(255),
        FieldRule::required("password", FieldKind::String).max_length(255),
        FieldRule::required("customer_id", FieldKind::Integer),
    ],
    ignored: &["id"],
};

pub fn customer(body: &Value) -> Result<NewCustomer, ValidationErrors> {
    RequestValidator::load(body, &CUSTOMER)
}

pub fn order(body: &Value) -> Result<NewOrder, ValidationErrors> {
    RequestValidator::load(body, &ORDER)
}

pub fn product(body: &Value) -> Result<NewProduct, ValidationErrors> {
    RequestValidator::load(body, &PRODUCT)
}

pub fn customer_account(body: &Value) -> Result<NewCustomerAccount, ValidationErrors> {
    RequestValidator::load(body, &CUSTOMER_ACCOUNT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn customer_requires_name_email_and_phone() {
        let err = customer(&json!({})).unwrap_err();
        let fields: Vec<&str> = err.fields().collect();
        assert_eq!(fields, vec!["email", "name", "phone"]);
    }

    #[test]
    fn customer_accepts_order_field() {
        let c = customer(&json!({"name": "Ada", "email": "ada@example.com", "phone": "555", "order": 3})).unwrap();
        assert_eq!(c.name, "Ada");
    }

    #[test]
    fn product_price_must_not_be_negative() {
        let err = product(&json!({"name": "Widget", "price": -1, "quantity": 1})).unwrap_err();
        assert_eq!(err.get("price").unwrap(), ["Must be greater than or equal to 0."]);
        let p = product(&json!({"name": "Widget", "price": 0, "quantity": 1})).unwrap();
        assert_eq!(p.price, 0.0);
    }

    #[test]
    fn product_quantity_has_no_range() {
        let p = product(&json!({"name": "Widget", "price": 1.5, "quantity": -40})).unwrap();
        assert_eq!(p.quantity, -40);
    }

    #[test]
    fn order_dates_are_optional() {
        let o = order(&json!({"customer_id": 1, "products": [2, 3]})).unwrap();
        assert!(o.order_date.is_none());
        assert!(o.delivery_date.is_none());
        assert_eq!(o.products, vec![2, 3]);

        let o = order(&json!({"customer_id": 1, "products": [], "delivery_date": "2024-05-01T09:30:00"})).unwrap();
        assert_eq!(o.delivery_date.unwrap().to_string(), "2024-05-01 09:30:00");
    }

    #[test]
    fn order_requires_customer_and_products() {
        let err = order(&json!({"products": "1"})).unwrap_err();
        assert_eq!(err.get("customer_id").unwrap(), ["Missing data for required field."]);
        assert_eq!(err.get("products").unwrap(), ["Not a valid list."]);
    }

    #[test]
    fn account_requires_every_field() {
        let err = customer_account(&json!({"username": "ada"})).unwrap_err();
        let fields: Vec<&str> = err.fields().collect();
        assert_eq!(fields, vec!["customer_id", "password"]);
    }
}
