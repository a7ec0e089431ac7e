//! Response helpers for write acknowledgements.

use crate::error::MessageBody;
use axum::{http::StatusCode, Json};

pub fn created(message: &str) -> (StatusCode, Json<MessageBody>) {
    acknowledge(StatusCode::CREATED, message)
}

pub fn ok(message: &str) -> (StatusCode, Json<MessageBody>) {
    acknowledge(StatusCode::OK, message)
}

fn acknowledge(status: StatusCode, message: &str) -> (StatusCode, Json<MessageBody>) {
    (
        status,
        Json(MessageBody {
            message: message.to_string(),
        }),
    )
}
