//! API request handlers for the Submission Proxy

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use testdrive_common::{Error, FieldErrors, FormPayload};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::AppState;

const SUBMIT_FAILED: &str = "데이터 전송 실패";
const INVALID_REQUEST: &str = "잘못된 요청 형식입니다";
const INVALID_FIELDS: &str = "입력값을 확인해주세요";

/// The part of a submission the proxy itself reads
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionEnvelope {
    #[serde(default)]
    client_id: Option<String>,
}

/// API Error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub count: Option<usize>,
    pub fields: Option<FieldErrors>,
    pub details: Option<String>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            count: None,
            fields: None,
            details: None,
        }
    }

    /// Map a submission error to what the caller may see. Internal detail is
    /// only attached when `expose_details` is set.
    pub fn from_error(err: Error, expose_details: bool) -> Self {
        match err {
            Error::RateLimited { count, message } => Self {
                count: Some(count),
                ..Self::new(StatusCode::TOO_MANY_REQUESTS, message)
            },
            Error::Validation(fields) => Self {
                fields: Some(fields),
                ..Self::new(StatusCode::BAD_REQUEST, INVALID_FIELDS)
            },
            Error::InvalidPayload(_) | Error::JsonSerialization(_) => {
                Self::new(StatusCode::BAD_REQUEST, INVALID_REQUEST)
            }
            other => {
                error!("Submission failed: {}", other);
                Self {
                    details: expose_details.then(|| other.to_string()),
                    ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, SUBMIT_FAILED)
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = serde_json::json!({
            "success": false,
            "error": self.message
        });

        if let Some(count) = self.count {
            body["count"] = count.into();
        }
        if let Some(fields) = self.fields {
            body["fields"] = serde_json::json!(fields);
        }
        if let Some(details) = self.details {
            body["details"] = details.into();
        }

        (self.status, Json(body)).into_response()
    }
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "submission-proxy"
    }))
}

/// Forward a registration form to the spreadsheet script
pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request_id = Uuid::new_v4();

    submit(&state, &body)
        .instrument(info_span!("submit", %request_id))
        .await
        .map(Json)
        .map_err(|e| ApiError::from_error(e, state.expose_error_details))
}

async fn submit(state: &AppState, body: &[u8]) -> Result<Value, Error> {
    let raw: Value =
        serde_json::from_slice(body).map_err(|e| Error::InvalidPayload(e.to_string()))?;

    if !raw.is_object() {
        return Err(Error::InvalidPayload("expected a JSON object".to_string()));
    }

    let envelope = SubmissionEnvelope::deserialize(&raw)
        .map_err(|e| Error::InvalidPayload(e.to_string()))?;

    if state.validate_fields {
        let form = FormPayload::deserialize(&raw)
            .map_err(|e| Error::InvalidPayload(e.to_string()))?;

        if let Err(fields) = form.validate() {
            info!("Rejected form with invalid fields: {:?}", fields.keys());
            return Err(Error::Validation(fields));
        }
    }

    let client_id = envelope.client_id.as_deref();

    if let Some(gate) = &state.gate {
        let decision = gate.check(client_id).await;
        if !decision.allowed {
            return Err(Error::RateLimited {
                count: decision.count.unwrap_or_default(),
                message: decision.message,
            });
        }
    }

    let upstream = state.upstream.as_ref().ok_or_else(|| {
        Error::Configuration("GOOGLE_SCRIPT_URL is not set".to_string())
    })?;

    let reply = upstream.forward(&raw).await?;

    if reply.accepted {
        info!("Submission accepted upstream");
        if let Some(gate) = &state.gate {
            gate.record(client_id).await;
        }
    } else {
        warn!("Upstream did not accept submission: {}", reply.body);
    }

    Ok(reply.into_relay())
}
