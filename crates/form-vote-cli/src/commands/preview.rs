//! Show the request that `submit` would send, without sending it.

use anyhow::Result;
use serde_json::json;

use form_vote::{encode, FORM_CONTENT_TYPE};

use crate::config::VoteConfig;
use crate::output;

pub fn run(config: &VoteConfig, json: bool) -> Result<()> {
    if json {
        output::print_json(&render_json(config)?);
    } else {
        print!("{}", render(config)?);
    }
    Ok(())
}

/// Human-readable request preview. Cookie values are masked.
pub fn render(config: &VoteConfig) -> Result<String> {
    let endpoint = config.endpoint_url()?;
    let fields = config.vote.to_form_fields();

    let mut out = String::new();
    out.push_str(&format!("POST {endpoint}\n"));
    out.push_str(&format!("Content-Type: {FORM_CONTENT_TYPE}\n"));
    if let Some(cookie) = config.credentials.masked_cookie_header() {
        out.push_str(&format!("Cookie: {cookie}\n"));
    }
    if config.credentials.bearer_token.is_some() {
        out.push_str("Authorization: Bearer <redacted>\n");
    }
    out.push('\n');
    out.push_str(&encode(&fields));
    out.push('\n');
    Ok(out)
}

pub fn render_json(config: &VoteConfig) -> Result<serde_json::Value> {
    let endpoint = config.endpoint_url()?;
    let fields = config.vote.to_form_fields();

    Ok(json!({
        "method": "POST",
        "endpoint": endpoint.as_str(),
        "content_type": FORM_CONTENT_TYPE,
        "cookie": config.credentials.masked_cookie_header(),
        "bearer_token": config.credentials.bearer_token.is_some(),
        "fields": fields.names(),
        "body": encode(&fields),
    }))
}
