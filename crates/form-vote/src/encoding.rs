//! `application/x-www-form-urlencoded` body encoding.
//!
//! Spaces become `+`, everything outside `[A-Za-z0-9*-._]` is
//! percent-encoded. Values are never pre-decoded: a value that already
//! contains `%3D` is sent as `%253D`.

use url::form_urlencoded;

use crate::types::FormFields;

/// Content-Type for form-encoded bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Serialize fields into a form body, keeping insertion order.
pub fn encode(fields: &FormFields) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in fields.iter() {
        serializer.append_pair(name, value);
    }
    serializer.finish()
}

/// Parse a form body back into ordered pairs.
pub fn decode(body: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(body.as_bytes())
        .into_owned()
        .collect()
}
