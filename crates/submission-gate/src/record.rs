//! Submission record encoding
//!
//! A record is stored as a JSON array of RFC 3339 timestamps, oldest first.

use chrono::{DateTime, SecondsFormat, Utc};
use testdrive_common::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionRecord {
    timestamps: Vec<String>,
}

impl SubmissionRecord {
    /// Decode a stored record. Fails on anything but a JSON array of strings.
    pub fn decode(raw: &str) -> Result<Self> {
        let timestamps: Vec<String> = serde_json::from_str(raw)?;
        Ok(Self { timestamps })
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.timestamps)?)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[String] {
        &self.timestamps
    }

    /// Entries strictly newer than `window_start`.
    ///
    /// Entries that do not parse as timestamps never count.
    pub fn count_since(&self, window_start: DateTime<Utc>) -> usize {
        self.timestamps
            .iter()
            .filter_map(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .filter(|ts| ts.with_timezone(&Utc) > window_start)
            .count()
    }

    /// Append `at`; never deduplicates
    pub fn push(&mut self, at: DateTime<Utc>) {
        self.timestamps
            .push(at.to_rfc3339_opts(SecondsFormat::Millis, true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_decode_rejects_non_array() {
        assert!(SubmissionRecord::decode("{\"a\":1}").is_err());
        assert!(SubmissionRecord::decode("not json").is_err());
        assert!(SubmissionRecord::decode("[1, 2]").is_err());
    }

    #[test]
    fn test_push_formats_utc_millis() {
        let mut record = SubmissionRecord::default();
        record.push(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap());
        assert_eq!(record.timestamps(), ["2024-05-01T09:30:00.000Z"]);
        assert_eq!(record.encode().unwrap(), r#"["2024-05-01T09:30:00.000Z"]"#);
    }

    #[test]
    fn test_count_since_is_strict_and_skips_garbage() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut record = SubmissionRecord::default();
        record.push(start);
        record.push(start + Duration::milliseconds(1));
        record.push(start - Duration::days(3));

        let mut raw: Vec<String> = record.timestamps().to_vec();
        raw.push("yesterday".to_string());
        let record = SubmissionRecord::decode(&serde_json::to_string(&raw).unwrap()).unwrap();

        assert_eq!(record.len(), 4);
        assert_eq!(record.count_since(start), 1);
    }

    #[test]
    fn test_count_since_accepts_offsets() {
        let record =
            SubmissionRecord::decode(r#"["2024-06-01T09:00:00+09:00"]"#).unwrap();
        let just_before = Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 59).unwrap();
        let exact = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(record.count_since(just_before), 1);
        assert_eq!(record.count_since(exact), 0);
    }
}
