//! form-vote — typed vote payloads, form encoding, and one-shot signed form submission.

pub mod credentials;
pub mod encoding;
pub mod submitter;
pub mod types;

pub use credentials::SessionCredentials;
pub use encoding::{decode, encode, FORM_CONTENT_TYPE};
pub use submitter::{FormSubmitter, SubmitterOptions, DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT};
pub use types::*;
pub use url::Url;
