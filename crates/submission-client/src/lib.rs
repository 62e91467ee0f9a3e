//! Client-side submission flow
//!
//! Mirrors what the registration page does in the browser: derive the
//! client identifier, consult the locally held submission record, post the
//! form to the proxy and, once the proxy reports acceptance, append to the
//! local record. The local record is never synchronized with the proxy's.

use serde_json::Value;
use std::sync::Arc;
use submission_gate::{GateDecision, SubmissionGate, SubmissionStore};
use testdrive_common::{
    format_phone_number, ClientFingerprint, Error, FieldErrors, FormPayload, Result,
    UpstreamReply,
};
use tracing::{debug, info, warn};

const SUBMIT_PATH: &str = "/api/submit-to-sheets";
const SUBMIT_FAILED: &str = "폼 제출에 실패했습니다.";

/// Submits registrations to a proxy on behalf of one browser
pub struct SubmissionClient {
    base_url: String,
    client: reqwest::Client,
    fingerprint: ClientFingerprint,
    gate: SubmissionGate,
}

impl SubmissionClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - Proxy origin (e.g., "http://localhost:3000")
    /// * `fingerprint` - Browser attributes the client identifier derives from
    /// * `store` - Local storage holding this browser's submission records
    pub fn new(
        base_url: String,
        fingerprint: ClientFingerprint,
        store: Arc<dyn SubmissionStore>,
    ) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
            fingerprint,
            gate: SubmissionGate::new(store),
        }
    }

    pub fn client_id(&self) -> String {
        self.fingerprint.client_id()
    }

    /// Local view of whether another submission is allowed
    pub async fn check(&self) -> GateDecision {
        self.gate.check(Some(&self.client_id())).await
    }

    /// Validate and submit `form`, returning the proxy's reply body.
    ///
    /// The phone number is normalized before validation and the client
    /// identifier is attached. Nothing is sent when the local record is
    /// already at the limit.
    pub async fn submit(&self, mut form: FormPayload) -> Result<Value> {
        let client_id = self.client_id();

        let decision = self.gate.check(Some(&client_id)).await;
        if !decision.allowed {
            info!("Local submission limit reached for {}", client_id);
            return Err(Error::RateLimited {
                count: decision.count.unwrap_or_default(),
                message: decision.message,
            });
        }

        form.phone_number = format_phone_number(&form.phone_number);
        form.validate().map_err(Error::Validation)?;
        form.client_id = Some(client_id.clone());

        let url = format!("{}{}", self.base_url, SUBMIT_PATH);
        debug!("Posting registration to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&form)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("{}: {}", SUBMIT_FAILED, e)))?;

        let status = response.status();
        let body: Option<Value> = response.json().await.ok();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let count = body
                .as_ref()
                .and_then(|b| b.get("count"))
                .and_then(Value::as_u64)
                .unwrap_or_default() as usize;
            let message = error_message(body.as_ref())
                .unwrap_or_else(|| self.gate.policy().rate_limit_message(count));
            return Err(Error::RateLimited { count, message });
        }

        if status == reqwest::StatusCode::BAD_REQUEST {
            return Err(rejection(body.as_ref()));
        }

        if !status.is_success() {
            warn!("Proxy responded {}", status);
            let detail = error_message(body.as_ref()).unwrap_or_else(|| status.to_string());
            return Err(Error::Upstream(format!("{}: {}", SUBMIT_FAILED, detail)));
        }

        let body = body.ok_or_else(|| Error::Upstream(SUBMIT_FAILED.to_string()))?;
        let reply = UpstreamReply::from_body(body);

        if reply.accepted {
            self.gate.record(Some(&client_id)).await;
        }

        Ok(reply.into_relay())
    }
}

/// Field errors when the proxy reported them, otherwise a malformed request
fn rejection(body: Option<&Value>) -> Error {
    let fields: Option<FieldErrors> = body
        .and_then(|b| b.get("fields"))
        .and_then(|f| serde_json::from_value(f.clone()).ok());

    match fields {
        Some(fields) if !fields.is_empty() => Error::Validation(fields),
        _ => Error::InvalidPayload(
            error_message(body).unwrap_or_else(|| SUBMIT_FAILED.to_string()),
        ),
    }
}

fn error_message(body: Option<&Value>) -> Option<String> {
    body?.get("error")?.as_str().map(str::to_string)
}
