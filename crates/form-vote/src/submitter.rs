//! One-shot form submission over HTTP.
//!
//! Exactly one POST per call. No retry on 5xx, no backoff on 429:
//! a vote must not be sent twice behind the caller's back.

use std::time::Duration;

use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE, COOKIE};
use url::Url;

use crate::credentials::SessionCredentials;
use crate::encoding::{self, FORM_CONTENT_TYPE};
use crate::types::{
    ClientError, ClientResult, FormFields, SubmissionError, SubmissionReceipt, SubmissionResult,
    VoteSubmission,
};

/// Default request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default user agent.
pub const DEFAULT_USER_AGENT: &str = concat!("form-vote/", env!("CARGO_PKG_VERSION"));

/// Redirects followed after the POST (e.g. Rails' redirect-after-create).
const MAX_REDIRECTS: usize = 5;

/// Client settings for a [`FormSubmitter`].
#[derive(Debug, Clone)]
pub struct SubmitterOptions {
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for SubmitterOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl SubmitterOptions {
    /// Reject settings the HTTP client would not honor.
    pub fn validate(&self) -> ClientResult<()> {
        if self.timeout_ms == 0 {
            return Err(ClientError::ZeroTimeout);
        }
        HeaderValue::from_str(&self.user_agent)
            .map_err(|_| ClientError::InvalidUserAgent(self.user_agent.clone()))?;
        Ok(())
    }
}

/// Posts form-encoded fields to an endpoint.
#[derive(Clone)]
pub struct FormSubmitter {
    client: reqwest::Client,
}

impl FormSubmitter {
    /// Create a submitter with the default user agent.
    pub fn new(timeout_ms: u64) -> ClientResult<Self> {
        Self::with_options(&SubmitterOptions {
            timeout_ms,
            ..SubmitterOptions::default()
        })
    }

    /// Build the client. Invalid options are an error, never a silent
    /// fallback to a client without timeout or redirect limits.
    pub fn with_options(options: &SubmitterOptions) -> ClientResult<Self> {
        options.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(options.timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(options.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }

    /// Submit `fields` to `endpoint` once.
    ///
    /// Non-2xx final status is `HttpStatus`; anything that keeps a
    /// response from arriving (DNS, refused connection, TLS, timeout) is
    /// `Transport`.
    pub async fn submit(
        &self,
        endpoint: &Url,
        fields: &FormFields,
        credentials: &SessionCredentials,
    ) -> SubmissionResult<SubmissionReceipt> {
        let body = encoding::encode(fields);

        let mut builder = self
            .client
            .post(endpoint.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body);

        if let Some(cookie) = credentials.cookie_header() {
            builder = builder.header(COOKIE, cookie);
        }
        if let Some(auth) = credentials.authorization_header() {
            builder = builder.header(AUTHORIZATION, auth);
        }

        tracing::debug!(
            "POST {endpoint} ({} fields, {} cookies)",
            fields.len(),
            credentials.cookies.len()
        );

        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Error sending form to {endpoint}: {e}");
                return Err(SubmissionError::Transport(e));
            }
        };

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            tracing::warn!("Form rejected by {endpoint}: HTTP {}", status.as_u16());
            return Err(SubmissionError::HttpStatus(status.as_u16()));
        }

        tracing::info!("Form sent successfully to {endpoint} (HTTP {})", status.as_u16());

        Ok(SubmissionReceipt {
            status: status.as_u16(),
            final_url,
        })
    }

    /// Submit a vote once.
    pub async fn submit_vote(
        &self,
        endpoint: &Url,
        vote: &VoteSubmission,
        credentials: &SessionCredentials,
    ) -> SubmissionResult<SubmissionReceipt> {
        let fields = vote.to_form_fields();
        let receipt = self.submit(endpoint, &fields, credentials).await?;
        tracing::info!(
            "Vote sent: events {} vs {}, winner {}",
            vote.ship_event_1_id,
            vote.ship_event_2_id,
            vote.winning_project_id
        );
        Ok(receipt)
    }
}
