//! Rate-limit decision and recording

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use testdrive_common::{record_key, LimitPolicy, Result};
use tracing::{debug, error, info, warn};

use crate::record::SubmissionRecord;
use crate::store::SubmissionStore;

const ALLOWED_MESSAGE: &str = "제출 가능합니다.";

/// Outcome of [`SubmissionGate::check`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateDecision {
    pub allowed: bool,

    /// Submissions inside the window. `None` only when the record could not
    /// be read or decoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    pub message: String,
}

impl GateDecision {
    fn open(count: Option<usize>) -> Self {
        Self {
            allowed: true,
            count,
            message: ALLOWED_MESSAGE.to_string(),
        }
    }
}

/// Soft per-client submission limit over a [`SubmissionStore`].
///
/// `check` followed by `record` is not atomic: two concurrent submissions
/// from one client can both pass `check`. The limit tolerates that overshoot.
#[derive(Clone)]
pub struct SubmissionGate {
    store: Arc<dyn SubmissionStore>,
    policy: LimitPolicy,
}

impl SubmissionGate {
    pub fn new(store: Arc<dyn SubmissionStore>) -> Self {
        Self::with_policy(store, LimitPolicy::DEFAULT)
    }

    pub fn with_policy(store: Arc<dyn SubmissionStore>, policy: LimitPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> LimitPolicy {
        self.policy
    }

    pub async fn check(&self, client_id: Option<&str>) -> GateDecision {
        self.check_at(client_id, Utc::now()).await
    }

    /// Decide against the record as seen at `now`.
    ///
    /// Never fails: an unreadable or undecodable record allows the submission.
    pub async fn check_at(&self, client_id: Option<&str>, now: DateTime<Utc>) -> GateDecision {
        let key = record_key(client_id);

        let record = match self.load(&key).await {
            Ok(Some(record)) => record,
            Ok(None) => return GateDecision::open(Some(0)),
            Err(e) => {
                warn!("Submission record {} unreadable, allowing: {}", key, e);
                return GateDecision::open(None);
            }
        };

        let count = record.count_since(self.policy.window_start(now));

        if self.policy.allows(count) {
            debug!("{} has {} recent submissions", key, count);
            GateDecision::open(Some(count))
        } else {
            info!("{} over limit with {} recent submissions", key, count);
            GateDecision {
                allowed: false,
                count: Some(count),
                message: self.policy.rate_limit_message(count),
            }
        }
    }

    pub async fn record(&self, client_id: Option<&str>) {
        self.record_at(client_id, Utc::now()).await
    }

    /// Append `now` to the client's record.
    ///
    /// Call only once the submission has been accepted downstream. Write
    /// failures are logged and dropped.
    pub async fn record_at(&self, client_id: Option<&str>, now: DateTime<Utc>) {
        let key = record_key(client_id);

        if let Err(e) = self.append(&key, now).await {
            error!("Failed to record submission for {}: {}", key, e);
        }
    }

    async fn load(&self, key: &str) -> Result<Option<SubmissionRecord>> {
        match self.store.get(key).await? {
            Some(raw) => Ok(Some(SubmissionRecord::decode(&raw)?)),
            None => Ok(None),
        }
    }

    async fn append(&self, key: &str, now: DateTime<Utc>) -> Result<()> {
        let mut record = match self.load(key).await {
            Ok(record) => record.unwrap_or_default(),
            Err(e) => {
                warn!("Replacing unreadable submission record {}: {}", key, e);
                SubmissionRecord::default()
            }
        };

        record.push(now);
        self.store.set(key, record.encode()?).await?;

        debug!("Recorded submission {} for {}", record.len(), key);
        Ok(())
    }
}
