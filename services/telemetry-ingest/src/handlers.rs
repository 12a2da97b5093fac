use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};
use vigil_alert::{now_ms, DocumentStore, StoreError};
use vigil_domain::{DeviceStatus, GeoPoint};

use crate::state::AppState;

/// Minimum length for device and owner identifiers
const MIN_ID_LEN: usize = 10;

type ApiError = (StatusCode, Json<Value>);

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(json!({
            "success": false,
            "error": message.into(),
            "timestamp": Utc::now().to_rfc3339()
        })),
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPayload {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRequest {
    pub device_id: String,
    pub owner_uid: String,
    pub status: Option<String>,
    pub last_location: Option<LocationPayload>,
    pub timestamp: Option<u64>,
    pub nonce: Option<String>,
    pub proof: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub uid: String,
    pub token: String,
}

fn validate_telemetry(payload: &TelemetryRequest) -> Result<(), String> {
    if payload.device_id.len() < MIN_ID_LEN {
        return Err("deviceId too short".to_string());
    }
    if payload.owner_uid.len() < MIN_ID_LEN {
        return Err("ownerUid too short".to_string());
    }
    if let Some(status) = &payload.status {
        if DeviceStatus::parse(status) == DeviceStatus::Unknown {
            return Err(format!("Invalid status: {}", status));
        }
    }
    if let Some(location) = &payload.last_location {
        if !(-90.0..=90.0).contains(&location.latitude) {
            return Err("Latitude out of range".to_string());
        }
        if !(-180.0..=180.0).contains(&location.longitude) {
            return Err("Longitude out of range".to_string());
        }
    }
    Ok(())
}

pub async fn ingest_telemetry(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TelemetryRequest>,
) -> Result<Json<Value>, ApiError> {
    validate_telemetry(&payload)
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, format!("Validation error: {}", e)))?;

    if let Some(verifier) = &state.verifier {
        let (timestamp, nonce, proof) = match (&payload.timestamp, &payload.nonce, &payload.proof) {
            (Some(t), Some(n), Some(p)) => (*t, n.as_str(), p.as_str()),
            _ => {
                return Err(error_response(
                    StatusCode::UNAUTHORIZED,
                    "Device proof required",
                ))
            }
        };
        if !verifier.verify(&payload.device_id, &payload.owner_uid, timestamp, nonce, proof) {
            warn!(device_id = %payload.device_id, "Rejected telemetry with bad proof");
            return Err(error_response(StatusCode::UNAUTHORIZED, "Invalid device proof"));
        }
    }

    let before = state
        .store
        .get_device(&payload.owner_uid, &payload.device_id)
        .await
        .map_err(|e| {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("Store error: {}", e))
        })?;

    // 410 tells the device it must go through provisioning again
    let before = match before {
        Some(device) if !device.reset_pending => device,
        _ => {
            return Err(error_response(
                StatusCode::GONE,
                "Device not provisioned",
            ))
        }
    };

    let now = now_ms();
    let mut after = before.clone();
    if let Some(status) = &payload.status {
        after.status = DeviceStatus::parse(status);
    }
    if let Some(location) = &payload.last_location {
        after.last_location = Some(GeoPoint {
            latitude: location.latitude,
            longitude: location.longitude,
            accuracy: location.accuracy,
            captured_at: Some(now),
        });
    }
    after.updated_at = now;

    state.store.put_device(after.clone()).await.map_err(|e| {
        error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("Store error: {}", e))
    })?;

    info!(
        device_id = %payload.device_id,
        status = after.status.as_str(),
        "Device state updated"
    );

    // Fire-and-forget: the fanout logs its own outcome and never errors
    state
        .coordinator
        .on_device_updated(&payload.owner_uid, &payload.device_id, &before, &after)
        .await;

    Ok(Json(json!({
        "success": true,
        "message": "Device state updated",
        "deviceId": payload.device_id,
        "timestamp": Utc::now().to_rfc3339()
    })))
}

pub async fn register_token(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<Value>, ApiError> {
    if payload.token.is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "Token required"));
    }

    match state
        .store
        .register_user_token(&payload.uid, &payload.token)
        .await
    {
        Ok(registration) => {
            info!(
                uid = %payload.uid,
                total = registration.total_tokens,
                duplicate = registration.duplicate,
                "Delivery token registered"
            );
            Ok(Json(json!({
                "success": true,
                "duplicate": registration.duplicate,
                "totalTokens": registration.total_tokens
            })))
        }
        Err(StoreError::NotFound { .. }) => {
            Err(error_response(StatusCode::NOT_FOUND, "User not found"))
        }
        Err(e) => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Store error: {}", e),
        )),
    }
}

pub async fn unregister_token(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<Value>, ApiError> {
    if payload.token.is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "Token required"));
    }

    match state
        .store
        .remove_user_tokens(&payload.uid, &[payload.token.clone()])
        .await
    {
        Ok(()) => {
            info!(uid = %payload.uid, "Delivery token removed");
            Ok(Json(json!({ "success": true })))
        }
        Err(StoreError::NotFound { .. }) => {
            Err(error_response(StatusCode::NOT_FOUND, "User not found"))
        }
        Err(e) => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Store error: {}", e),
        )),
    }
}
