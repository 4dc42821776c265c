//! Explicit session credentials attached to a submission.
//!
//! A browser would send the site's cookies implicitly. Here the caller
//! hands them over: a cookie set (usually the Rails session cookie) and,
//! for endpoints that use it, a bearer token.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{CredentialError, CredentialResult};

/// Cookies and tokens to forward with a request.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredentials {
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

impl SessionCredentials {
    /// No credentials at all.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Parse a raw `Cookie` header value such as `a=b; c=d`.
    pub fn from_cookie_header(raw: &str) -> CredentialResult<Self> {
        let mut creds = Self::default();
        creds.merge_cookie_header(raw)?;
        Ok(creds)
    }

    /// Merge cookies from a raw header value. Later values win.
    pub fn merge_cookie_header(&mut self, raw: &str) -> CredentialResult<()> {
        for part in raw.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (name, value) = part
                .split_once('=')
                .ok_or_else(|| CredentialError::MalformedCookie(part.to_string()))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(CredentialError::MalformedCookie(part.to_string()));
            }
            self.cookies.insert(name.to_string(), value.trim().to_string());
        }
        Ok(())
    }

    pub fn is_anonymous(&self) -> bool {
        self.cookies.is_empty() && self.bearer_token.is_none()
    }

    /// `Cookie` header value, if any cookies are set.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// `Authorization` header value, if a bearer token is set.
    pub fn authorization_header(&self) -> Option<String> {
        self.bearer_token
            .as_deref()
            .map(|token| format!("Bearer {token}"))
    }

    /// Cookie header with values hidden, for display.
    pub fn masked_cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(k, v)| format!("{k}=<{} chars>", v.chars().count()))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

impl std::fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("cookies", &self.cookies.keys().collect::<Vec<_>>())
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
