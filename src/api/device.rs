use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::StatusCode,
    response::Response,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::response::ApiResponse;
use crate::error::Error;
use crate::store::Store;

#[derive(Deserialize)]
pub struct RegisterDeviceRequest {
    pub device_id: String,
}

#[derive(Debug, Serialize)]
pub struct RegisteredDevice {
    pub user_id: i32,
    pub device_id: String,
    pub created: bool,
}

// POST /api/users/register - Register a device, idempotent on device_id
pub async fn register_device(
    Extension(store): Extension<Store>,
    payload: Result<Json<RegisterDeviceRequest>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(payload) = payload?;
    tracing::Span::current()
        .record("table", "users")
        .record("action", "register_device")
        .record("device_id", payload.device_id.as_str());

    let registration = store.register_device(&payload.device_id).await?;
    let message = registration.message();
    let user = registration.user;

    tracing::Span::current()
        .record("user_id", user.user_id)
        .record("business_event", message);

    let status = if registration.created {
        info!("Registered device for user {}", user.user_id);
        crate::metrics::record_device_registered();
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok(ApiResponse::ok(
        message,
        RegisteredDevice {
            user_id: user.user_id,
            device_id: user.device_id,
            created: registration.created,
        },
    )
    .with_status(status))
}
