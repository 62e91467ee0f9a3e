//! Test-drive registration form payload and the rules the form enforces

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Field name -> human readable error message
pub type FieldErrors = BTreeMap<String, String>;

/// Model identifiers offered on the registration page
pub const CAR_MODELS: [&str; 8] = [
    "db12-coupe",
    "db12-volante",
    "dbx707",
    "valhalla",
    "vanquish-coupe",
    "vanquish-volante",
    "vantage-coupe",
    "vantage-roadster",
];

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}-\d{3,4}-\d{4}$").expect("phone pattern is valid"));

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}

/// Registration form as submitted by the page.
///
/// Every field is optional on the wire so that a half-filled form still
/// decodes and can be reported field by field from [`FormPayload::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPayload {
    #[serde(default)]
    pub korean_name: String,

    #[serde(default)]
    pub english_name: String,

    #[serde(default)]
    pub gender: String,

    #[serde(default)]
    pub phone_number: String,

    #[serde(default)]
    pub email: String,

    /// Comma-joined model identifiers, e.g. `"dbx707,valhalla"`
    #[serde(default)]
    pub interested_model: String,

    #[serde(default)]
    pub privacy_agreement: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

impl FormPayload {
    /// Selected model identifiers, in submission order
    pub fn models(&self) -> Vec<&str> {
        self.interested_model
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .collect()
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender.parse().ok()
    }

    /// Check every field against the form rules.
    ///
    /// Returns all failures at once, keyed by the wire field name.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.korean_name.trim().is_empty() {
            errors.insert("koreanName".into(), "국문 성함을 입력해주세요".into());
        }

        if self.english_name.trim().is_empty() {
            errors.insert("englishName".into(), "영문 성함을 입력해주세요".into());
        }

        if self.gender().is_none() {
            errors.insert("gender".into(), "성별을 선택해주세요".into());
        }

        if self.phone_number.is_empty() {
            errors.insert("phoneNumber".into(), "핸드폰 번호를 입력해주세요".into());
        } else if !PHONE_PATTERN.is_match(&self.phone_number) {
            errors.insert(
                "phoneNumber".into(),
                "010-0000-0000 형식으로 입력해주세요".into(),
            );
        }

        if self.email.is_empty() {
            errors.insert("email".into(), "이메일을 입력해주세요".into());
        } else if !EMAIL_PATTERN.is_match(&self.email) {
            errors.insert("email".into(), "유효한 이메일 주소를 입력해주세요".into());
        }

        let models = self.models();
        if models.is_empty() || models.iter().any(|m| !CAR_MODELS.contains(m)) {
            errors.insert("interestedModel".into(), "관심 차종을 선택해주세요".into());
        }

        if !self.privacy_agreement {
            errors.insert(
                "privacyAgreement".into(),
                "개인정보 수집 및 이용에 동의해주세요".into(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Format raw phone input as the page does while the user types:
/// `NNN`, `NNN-NNNN`, then `NNN-NNNN-NNNN`. Digits past the 11th are dropped.
pub fn format_phone_number(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    match digits.len() {
        0..=3 => digits,
        4..=7 => format!("{}-{}", &digits[..3], &digits[3..]),
        len => format!(
            "{}-{}-{}",
            &digits[..3],
            &digits[3..7],
            &digits[7..len.min(11)]
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> FormPayload {
        FormPayload {
            korean_name: "홍길동".to_string(),
            english_name: "Gildong Hong".to_string(),
            gender: "male".to_string(),
            phone_number: "010-1234-5678".to_string(),
            email: "gildong@example.com".to_string(),
            interested_model: "db12-coupe,valhalla".to_string(),
            privacy_agreement: true,
            client_id: Some("abc".to_string()),
        }
    }

    #[test]
    fn test_valid_payload_passes() {
        assert!(valid_payload().validate().is_ok());
    }

    #[test]
    fn test_short_middle_block_phone_is_accepted() {
        let payload = FormPayload {
            phone_number: "011-123-4567".to_string(),
            ..valid_payload()
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let errors = FormPayload::default().validate().unwrap_err();
        assert_eq!(errors.len(), 7);
        assert_eq!(errors["phoneNumber"], "핸드폰 번호를 입력해주세요");
        assert_eq!(errors["email"], "이메일을 입력해주세요");
    }

    #[test]
    fn test_malformed_phone_and_email() {
        let payload = FormPayload {
            phone_number: "01012345678".to_string(),
            email: "not an email".to_string(),
            ..valid_payload()
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors["phoneNumber"], "010-0000-0000 형식으로 입력해주세요");
        assert_eq!(errors["email"], "유효한 이메일 주소를 입력해주세요");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_unknown_model_rejected() {
        let payload = FormPayload {
            interested_model: "dbx707,model-t".to_string(),
            ..valid_payload()
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.contains_key("interestedModel"));
    }

    #[test]
    fn test_privacy_agreement_required() {
        let payload = FormPayload {
            privacy_agreement: false,
            ..valid_payload()
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("privacyAgreement"));
    }

    #[test]
    fn test_decodes_camel_case_wire_format() {
        let payload: FormPayload = serde_json::from_str(
            r#"{"koreanName":"홍길동","interestedModel":"dbx707","privacyAgreement":true,"clientId":"xyz"}"#,
        )
        .unwrap();
        assert_eq!(payload.korean_name, "홍길동");
        assert_eq!(payload.models(), vec!["dbx707"]);
        assert_eq!(payload.client_id.as_deref(), Some("xyz"));
        assert_eq!(payload.gender(), None);
    }

    #[test]
    fn test_format_phone_number() {
        assert_eq!(format_phone_number(""), "");
        assert_eq!(format_phone_number("010"), "010");
        assert_eq!(format_phone_number("0101"), "010-1");
        assert_eq!(format_phone_number("0101234"), "010-1234");
        assert_eq!(format_phone_number("01012345"), "010-1234-5");
        assert_eq!(format_phone_number("010 1234 5678"), "010-1234-5678");
        assert_eq!(format_phone_number("010123456789"), "010-1234-5678");
    }
}
