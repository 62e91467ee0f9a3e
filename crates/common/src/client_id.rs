//! Client identifier derivation
//!
//! The identifier is a best-effort fingerprint of the browser environment.
//! It is only ever used to key submission records; collisions and spoofing
//! are both possible.

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

/// Key suffix used when a payload carries no client identifier
pub const ANONYMOUS_CLIENT: &str = "anonymous";

const RECORD_KEY_PREFIX: &str = "survey_submissions_";
const CLIENT_ID_LEN: usize = 32;

/// Browser attributes the identifier is derived from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientFingerprint {
    pub user_agent: String,
    pub screen_height: u32,
    pub screen_width: u32,
    pub language: String,
}

impl ClientFingerprint {
    /// Base64 of the concatenated attributes, truncated to 32 characters
    pub fn client_id(&self) -> String {
        let raw = format!(
            "{}{}{}{}",
            self.user_agent, self.screen_height, self.screen_width, self.language
        );

        general_purpose::STANDARD
            .encode(raw.as_bytes())
            .chars()
            .take(CLIENT_ID_LEN)
            .collect()
    }
}

/// Storage key for a client's submission record.
///
/// Missing or blank identifiers share the `anonymous` record.
pub fn record_key(client_id: Option<&str>) -> String {
    let id = client_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(ANONYMOUS_CLIENT);

    format!("{}{}", RECORD_KEY_PREFIX, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint() -> ClientFingerprint {
        ClientFingerprint {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36".to_string(),
            screen_height: 1080,
            screen_width: 1920,
            language: "ko-KR".to_string(),
        }
    }

    #[test]
    fn test_client_id_is_truncated_base64() {
        let id = fingerprint().client_id();
        assert_eq!(id.len(), 32);
        assert!(id.starts_with("TW96aWxsYS81LjAg"));
    }

    #[test]
    fn test_short_fingerprint_is_not_padded() {
        let fp = ClientFingerprint {
            user_agent: "a".to_string(),
            screen_height: 1,
            screen_width: 2,
            language: "k".to_string(),
        };
        // "a12k"
        assert_eq!(fp.client_id(), "YTEyaw==");
    }

    #[test]
    fn test_client_id_is_stable() {
        assert_eq!(fingerprint().client_id(), fingerprint().client_id());
    }

    #[test]
    fn test_record_key() {
        assert_eq!(record_key(Some("abc")), "survey_submissions_abc");
        assert_eq!(record_key(None), "survey_submissions_anonymous");
        assert_eq!(record_key(Some("  ")), "survey_submissions_anonymous");
    }
}
