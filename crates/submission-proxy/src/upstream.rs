//! Client for the spreadsheet script endpoint

use serde_json::Value;
use testdrive_common::{Error, Result, UpstreamReply};
use tracing::debug;

/// Forwards submissions to the configured script URL
pub struct UpstreamClient {
    url: String,
    client: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST `payload` as-is and decode the JSON reply.
    ///
    /// One attempt, no retry. Transport errors, non-success statuses and
    /// non-JSON bodies all surface as [`Error::Upstream`].
    pub async fn forward(&self, payload: &Value) -> Result<UpstreamReply> {
        debug!("Forwarding submission to {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!("upstream responded {}", status)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("invalid response body: {}", e)))?;

        Ok(UpstreamReply::from_body(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = UpstreamClient::new("http://localhost:8080/exec".to_string());
        assert_eq!(client.url(), "http://localhost:8080/exec");
    }
}
