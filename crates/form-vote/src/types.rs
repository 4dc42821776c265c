//! Core data types for a vote submission and its outcome.

use serde::{Deserialize, Serialize};
use url::Url;

/// Form field names, in the order the vote endpoint expects them.
pub mod field_names {
    pub const AUTHENTICITY_TOKEN: &str = "authenticity_token";
    pub const SHIP_EVENT_1_ID: &str = "vote[ship_event_1_id]";
    pub const SHIP_EVENT_2_ID: &str = "vote[ship_event_2_id]";
    pub const SIGNATURE: &str = "vote[signature]";
    pub const PROJECT_1_DEMO_OPENED: &str = "vote[project_1_demo_opened]";
    pub const PROJECT_1_REPO_OPENED: &str = "vote[project_1_repo_opened]";
    pub const PROJECT_2_DEMO_OPENED: &str = "vote[project_2_demo_opened]";
    pub const PROJECT_2_REPO_OPENED: &str = "vote[project_2_repo_opened]";
    pub const TIME_SPENT_VOTING_MS: &str = "vote[time_spent_voting_ms]";
    pub const MUSIC_PLAYED: &str = "vote[music_played]";
    pub const WINNING_PROJECT_ID: &str = "vote[winning_project_id]";
    pub const EXPLANATION: &str = "vote[explanation]";
    pub const BUTTON: &str = "button";
}

/// One vote comparing two ship events.
///
/// The token and signature are issued by the remote site for the current
/// session and are carried through untouched. Identifiers are opaque too;
/// vote files may write them as strings or numbers.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteSubmission {
    pub authenticity_token: String,
    #[serde(deserialize_with = "opaque_id::deserialize")]
    pub ship_event_1_id: String,
    #[serde(deserialize_with = "opaque_id::deserialize")]
    pub ship_event_2_id: String,
    pub signature: String,
    pub project_1_demo_opened: bool,
    pub project_1_repo_opened: bool,
    pub project_2_demo_opened: bool,
    pub project_2_repo_opened: bool,
    pub time_spent_voting_ms: u64,
    pub music_played: bool,
    #[serde(deserialize_with = "opaque_id::deserialize")]
    pub winning_project_id: String,
    pub explanation: String,
    /// Value of the submit button; the site sends it empty.
    #[serde(default)]
    pub button: String,
}

impl VoteSubmission {
    /// Flatten the vote into ordered form fields.
    pub fn to_form_fields(&self) -> FormFields {
        use field_names::*;

        let pairs = vec![
            (AUTHENTICITY_TOKEN, self.authenticity_token.clone()),
            (SHIP_EVENT_1_ID, self.ship_event_1_id.clone()),
            (SHIP_EVENT_2_ID, self.ship_event_2_id.clone()),
            (SIGNATURE, self.signature.clone()),
            (PROJECT_1_DEMO_OPENED, self.project_1_demo_opened.to_string()),
            (PROJECT_1_REPO_OPENED, self.project_1_repo_opened.to_string()),
            (PROJECT_2_DEMO_OPENED, self.project_2_demo_opened.to_string()),
            (PROJECT_2_REPO_OPENED, self.project_2_repo_opened.to_string()),
            (TIME_SPENT_VOTING_MS, self.time_spent_voting_ms.to_string()),
            (MUSIC_PLAYED, self.music_played.to_string()),
            (WINNING_PROJECT_ID, self.winning_project_id.clone()),
            (EXPLANATION, self.explanation.clone()),
            (BUTTON, self.button.clone()),
        ];

        FormFields {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    /// Names of the session-issued fields that are blank.
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.authenticity_token.trim().is_empty() {
            missing.push(field_names::AUTHENTICITY_TOKEN);
        }
        if self.signature.trim().is_empty() {
            missing.push(field_names::SIGNATURE);
        }
        missing
    }
}

mod opaque_id {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s,
            Raw::Number(n) => n.to_string(),
        })
    }
}

// Token and signature stay out of logs.
impl std::fmt::Debug for VoteSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoteSubmission")
            .field("authenticity_token", &"<redacted>")
            .field("ship_event_1_id", &self.ship_event_1_id)
            .field("ship_event_2_id", &self.ship_event_2_id)
            .field("signature", &"<redacted>")
            .field("time_spent_voting_ms", &self.time_spent_voting_ms)
            .field("winning_project_id", &self.winning_project_id)
            .field("explanation", &self.explanation)
            .finish_non_exhaustive()
    }
}

/// Ordered, non-empty list of form fields.
///
/// Insertion order is kept. Duplicate names are passed through as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    /// Build from name/value pairs. Fails on an empty list.
    pub fn new<I, K, V>(pairs: I) -> FormResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let pairs: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        if pairs.is_empty() {
            return Err(FormError::Empty);
        }

        Ok(Self { pairs })
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Field names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.pairs.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }
}

impl TryFrom<Vec<(String, String)>> for FormFields {
    type Error = FormError;

    fn try_from(pairs: Vec<(String, String)>) -> FormResult<Self> {
        Self::new(pairs)
    }
}

/// What the server answered to an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Final HTTP status (after redirects).
    pub status: u16,
    /// Final URL after redirects.
    pub final_url: Url,
}

/// The HTTP client could not be built from the given options.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("Invalid user agent {0:?}: not a valid header value")]
    InvalidUserAgent(String),

    #[error("Timeout must be greater than zero")]
    ZeroTimeout,

    #[error("HTTP client error: {0}")]
    Build(#[from] reqwest::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Failure of a single form submission.
#[derive(thiserror::Error, Debug)]
pub enum SubmissionError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error! Status: {0}")]
    HttpStatus(u16),
}

impl SubmissionError {
    /// Status code, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            SubmissionError::HttpStatus(code) => Some(*code),
            SubmissionError::Transport(_) => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SubmissionError::Transport(e) if e.is_timeout())
    }
}

pub type SubmissionResult<T> = Result<T, SubmissionError>;

/// Invalid form input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Form has no fields")]
    Empty,
}

pub type FormResult<T> = Result<T, FormError>;

/// Invalid session credentials.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Malformed cookie pair: {0:?}")]
    MalformedCookie(String),
}

pub type CredentialResult<T> = Result<T, CredentialError>;
