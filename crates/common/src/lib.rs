pub mod client_id;
pub mod error;
pub mod payload;
pub mod policy;
pub mod reply;

pub use client_id::{record_key, ClientFingerprint, ANONYMOUS_CLIENT};
pub use error::{Error, Result};
pub use payload::{format_phone_number, FieldErrors, FormPayload, Gender, CAR_MODELS};
pub use policy::LimitPolicy;
pub use reply::UpstreamReply;
