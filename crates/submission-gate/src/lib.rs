//! Submission Gate
//!
//! Decides whether a client may submit the registration form again and
//! records accepted submissions. Records live in a pluggable key-value
//! [`SubmissionStore`]: an in-memory map on the proxy by default, Redis when
//! configured, or a JSON file for the client-held variant.
//!
//! The gate is a soft control. Any storage failure lets the submission
//! through (`check`) or is logged and dropped (`record`).

pub mod gate;
pub mod record;
pub mod redis_store;
pub mod store;

pub use gate::{GateDecision, SubmissionGate};
pub use record::SubmissionRecord;
pub use redis_store::RedisStore;
pub use store::{FileStore, MemoryStore, SubmissionStore};
