//! Configuration loading and resolution.
//!
//! ## Secrets
//!
//! The session cookie is loaded from (in order of priority):
//! 1. `FORM_VOTE_COOKIE_FILE` env → reads the raw `Cookie` header from the file
//! 2. `FORM_VOTE_COOKIE` env → uses the value directly (visible in `ps`)
//! 3. The `credentials.cookies` map of the vote file
//!
//! `FORM_VOTE_AUTHENTICITY_TOKEN`, `FORM_VOTE_SIGNATURE` and
//! `FORM_VOTE_BEARER_TOKEN` replace the matching vote file values.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use form_vote::{SessionCredentials, SubmitterOptions, VoteSubmission, DEFAULT_TIMEOUT_MS};

pub const ENV_FILE: &str = "FORM_VOTE_FILE";
pub const ENV_COOKIE_FILE: &str = "FORM_VOTE_COOKIE_FILE";
pub const ENV_COOKIE: &str = "FORM_VOTE_COOKIE";
pub const ENV_AUTHENTICITY_TOKEN: &str = "FORM_VOTE_AUTHENTICITY_TOKEN";
pub const ENV_SIGNATURE: &str = "FORM_VOTE_SIGNATURE";
pub const ENV_BEARER_TOKEN: &str = "FORM_VOTE_BEARER_TOKEN";

/// Contents of a vote file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteConfig {
    /// Absolute URL the form is posted to.
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub credentials: SessionCredentials,
    pub vote: VoteSubmission,
}

/// Secret values taken from the environment.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub cookie_header: Option<String>,
    pub authenticity_token: Option<String>,
    pub signature: Option<String>,
    pub bearer_token: Option<String>,
}

impl EnvOverrides {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            cookie_header: load_cookie_header()?,
            authenticity_token: non_empty_var(ENV_AUTHENTICITY_TOKEN),
            signature: non_empty_var(ENV_SIGNATURE),
            bearer_token: non_empty_var(ENV_BEARER_TOKEN),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn load_cookie_header() -> Result<Option<String>> {
    // 1. FORM_VOTE_COOKIE_FILE (recommended)
    if let Ok(cookie_path) = std::env::var(ENV_COOKIE_FILE) {
        let raw = std::fs::read_to_string(&cookie_path).with_context(|| {
            format!(
                "Cannot read cookie file at '{cookie_path}'. \
                 Check that the file exists and is readable."
            )
        })?;
        let raw = raw.trim();
        if raw.is_empty() {
            bail!("Cookie file '{cookie_path}' is empty");
        }
        return Ok(Some(raw.to_string()));
    }

    // 2. FORM_VOTE_COOKIE
    Ok(non_empty_var(ENV_COOKIE))
}

/// Resolve the vote file path.
pub fn resolve_config_path(explicit: Option<&str>) -> String {
    if let Some(path) = explicit {
        return path.to_string();
    }

    if let Some(env_path) = non_empty_var(ENV_FILE) {
        return env_path;
    }

    let cwd_config = PathBuf::from(".form-vote/vote.json");
    if cwd_config.exists() {
        return cwd_config.display().to_string();
    }

    resolve_default_config_path()
}

fn resolve_default_config_path() -> String {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".form-vote")
        .join("vote.json")
        .display()
        .to_string()
}

/// Read and parse a vote file.
pub fn load_config(path: &Path) -> Result<VoteConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read vote file: {}", path.display()))?;
    let config: VoteConfig = serde_json::from_str(&raw)
        .with_context(|| format!("invalid vote file: {}", path.display()))?;
    Ok(config)
}

/// Resolve, load, and apply environment and flag overrides.
pub fn load_resolved(explicit: Option<&str>, endpoint_override: Option<&str>) -> Result<VoteConfig> {
    let path = resolve_config_path(explicit);
    tracing::debug!("Loading vote file: {path}");

    let mut config = load_config(Path::new(&path))?;
    config.apply_overrides(&EnvOverrides::from_env()?)?;
    if let Some(endpoint) = endpoint_override {
        config.endpoint = endpoint.to_string();
    }
    Ok(config)
}

impl VoteConfig {
    /// Layer environment secrets over the file values.
    pub fn apply_overrides(&mut self, overrides: &EnvOverrides) -> Result<()> {
        if let Some(raw) = &overrides.cookie_header {
            self.credentials
                .merge_cookie_header(raw)
                .context("invalid cookie header")?;
        }
        if let Some(token) = &overrides.authenticity_token {
            self.vote.authenticity_token = token.clone();
        }
        if let Some(signature) = &overrides.signature {
            self.vote.signature = signature.clone();
        }
        if let Some(token) = &overrides.bearer_token {
            self.credentials.bearer_token = Some(token.clone());
        }
        Ok(())
    }

    /// Parse the endpoint; only `http` and `https` are accepted.
    pub fn endpoint_url(&self) -> Result<Url> {
        let url = Url::parse(&self.endpoint)
            .with_context(|| format!("endpoint is not an absolute URL: {}", self.endpoint))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => bail!("unsupported endpoint scheme '{other}' (expected http or https)"),
        }
    }

    /// Check the config is ready to submit and return the endpoint.
    pub fn validate(&self) -> Result<Url> {
        let url = self.endpoint_url()?;
        let missing = self.vote.missing_secrets();
        if !missing.is_empty() {
            bail!("missing required field(s): {}", missing.join(", "));
        }
        self.submitter_options(None)
            .validate()
            .context("invalid client settings")?;
        if self.credentials.cookies.is_empty() {
            tracing::warn!("No session cookies configured; the endpoint will see an anonymous request");
        }
        Ok(url)
    }

    /// Client settings; `timeout_override` wins over the file.
    pub fn submitter_options(&self, timeout_override: Option<u64>) -> SubmitterOptions {
        let defaults = SubmitterOptions::default();
        SubmitterOptions {
            timeout_ms: timeout_override
                .or(self.timeout_ms)
                .unwrap_or(DEFAULT_TIMEOUT_MS),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn sample_json() -> serde_json::Value {
        serde_json::json!({
            "endpoint": "https://vote.example.com/votes",
            "credentials": { "cookies": { "_session": "abc" } },
            "vote": {
                "authenticity_token": "tok",
                "ship_event_1_id": 541,
                "ship_event_2_id": 2214,
                "signature": "sig",
                "project_1_demo_opened": true,
                "project_1_repo_opened": true,
                "project_2_demo_opened": false,
                "project_2_repo_opened": false,
                "time_spent_voting_ms": 101512,
                "music_played": false,
                "winning_project_id": 10839,
                "explanation": "nice dns server"
            }
        })
    }

    fn sample_config() -> VoteConfig {
        serde_json::from_value(sample_json()).unwrap()
    }

    #[test]
    fn test_explicit_path_wins() {
        assert_eq!(resolve_config_path(Some("/tmp/v.json")), "/tmp/v.json");
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vote.json");
        std::fs::write(&path, sample_json().to_string()).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.vote.ship_event_2_id, "2214");
        assert_eq!(config.timeout_ms, None);
        assert_eq!(
            config.credentials.cookies.get("_session").map(String::as_str),
            Some("abc")
        );
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("nope.json")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read vote file"));
    }

    #[test]
    fn test_load_config_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vote.json");
        std::fs::write(&path, "{ \"endpoint\": ").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("invalid vote file"));
    }

    #[test]
    fn test_overrides_replace_secrets() {
        let mut config = sample_config();
        config
            .apply_overrides(&EnvOverrides {
                cookie_header: Some("_session=fresh; other=1".to_string()),
                authenticity_token: Some("tok2".to_string()),
                signature: Some("sig2".to_string()),
                bearer_token: None,
            })
            .unwrap();

        assert_eq!(config.vote.authenticity_token, "tok2");
        assert_eq!(config.vote.signature, "sig2");
        assert_eq!(
            config.credentials.cookie_header().as_deref(),
            Some("_session=fresh; other=1")
        );
        assert!(config.credentials.bearer_token.is_none());
    }

    #[test]
    fn test_bad_cookie_override() {
        let mut config = sample_config();
        let result = config.apply_overrides(&EnvOverrides {
            cookie_header: Some("garbage".to_string()),
            ..EnvOverrides::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_endpoints() {
        let mut config = sample_config();
        assert!(config.validate().is_ok());

        config.endpoint = "/votes".to_string();
        assert!(config.validate().is_err());

        config.endpoint = "ftp://vote.example.com/votes".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unsupported endpoint scheme"));
    }

    #[test]
    fn test_validate_rejects_blank_secrets() {
        let mut config = sample_config();
        config.vote.authenticity_token = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("authenticity_token"));
    }

    #[test]
    fn test_timeout_precedence() {
        let mut config = sample_config();
        assert_eq!(config.submitter_options(None).timeout_ms, DEFAULT_TIMEOUT_MS);

        config.timeout_ms = Some(3_000);
        assert_eq!(config.submitter_options(None).timeout_ms, 3_000);
        assert_eq!(config.submitter_options(Some(500)).timeout_ms, 500);
    }

    #[test]
    fn test_user_agent_from_file() {
        let mut config = sample_config();
        assert!(config
            .submitter_options(None)
            .user_agent
            .starts_with("form-vote/"));

        config.user_agent = Some("ballot-bot/2.0".to_string());
        assert_eq!(config.submitter_options(None).user_agent, "ballot-bot/2.0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_client_settings() {
        let mut config = sample_config();
        config.user_agent = Some("bad\nagent".to_string());
        let err = config.validate().unwrap_err();
        assert!(format!("{err:#}").contains("Invalid user agent"));

        let mut config = sample_config();
        config.timeout_ms = Some(0);
        assert!(config.validate().is_err());
    }

    // ─────────────────────── environment ───────────────────────

    /// Env vars and the working directory are process-wide.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ALL_VARS: [&str; 6] = [
        ENV_FILE,
        ENV_COOKIE_FILE,
        ENV_COOKIE,
        ENV_AUTHENTICITY_TOKEN,
        ENV_SIGNATURE,
        ENV_BEARER_TOKEN,
    ];

    /// Run `f` with exactly `vars` set among the form-vote variables,
    /// restoring the previous environment afterwards.
    fn with_env<R>(vars: &[(&str, &str)], f: impl FnOnce() -> R) -> R {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let saved: Vec<(&str, Option<String>)> = ALL_VARS
            .iter()
            .map(|name| (*name, std::env::var(name).ok()))
            .collect();
        for name in ALL_VARS {
            std::env::remove_var(name);
        }
        for (name, value) in vars {
            std::env::set_var(name, value);
        }

        let result = f();

        for (name, value) in saved {
            match value {
                Some(v) => std::env::set_var(name, v),
                None => std::env::remove_var(name),
            }
        }
        result
    }

    #[test]
    fn test_from_env_reads_secrets() {
        let overrides = with_env(
            &[
                (ENV_AUTHENTICITY_TOKEN, " tok-env "),
                (ENV_SIGNATURE, "sig-env"),
                (ENV_BEARER_TOKEN, ""),
                (ENV_COOKIE, "_session=from-env"),
            ],
            EnvOverrides::from_env,
        )
        .unwrap();

        assert_eq!(overrides.authenticity_token.as_deref(), Some("tok-env"));
        assert_eq!(overrides.signature.as_deref(), Some("sig-env"));
        assert!(overrides.bearer_token.is_none());
        assert_eq!(overrides.cookie_header.as_deref(), Some("_session=from-env"));
    }

    #[test]
    fn test_from_env_empty_environment() {
        let overrides = with_env(&[], EnvOverrides::from_env).unwrap();
        assert!(overrides.cookie_header.is_none());
        assert!(overrides.authenticity_token.is_none());
        assert!(overrides.signature.is_none());
        assert!(overrides.bearer_token.is_none());
    }

    #[test]
    fn test_cookie_file_wins_over_cookie_var() {
        let dir = tempfile::tempdir().unwrap();
        let cookie_path = dir.path().join("cookie.txt");
        std::fs::write(&cookie_path, "_session=from-file\n").unwrap();
        let cookie_path = cookie_path.display().to_string();

        let overrides = with_env(
            &[
                (ENV_COOKIE_FILE, cookie_path.as_str()),
                (ENV_COOKIE, "_session=from-env"),
            ],
            EnvOverrides::from_env,
        )
        .unwrap();

        assert_eq!(overrides.cookie_header.as_deref(), Some("_session=from-file"));
    }

    #[test]
    fn test_empty_cookie_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cookie_path = dir.path().join("cookie.txt");
        std::fs::write(&cookie_path, "  \n").unwrap();
        let cookie_path = cookie_path.display().to_string();

        let err = with_env(&[(ENV_COOKIE_FILE, cookie_path.as_str())], EnvOverrides::from_env)
            .unwrap_err();
        assert!(err.to_string().contains("is empty"));
    }

    #[test]
    fn test_unreadable_cookie_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cookie_path = dir.path().join("missing.txt").display().to_string();

        let err = with_env(&[(ENV_COOKIE_FILE, cookie_path.as_str())], EnvOverrides::from_env)
            .unwrap_err();
        assert!(format!("{err:#}").contains("Cannot read cookie file"));
    }

    #[test]
    fn test_resolve_path_from_env_var() {
        let path = with_env(&[(ENV_FILE, "/srv/votes/vote.json")], || {
            resolve_config_path(None)
        });
        assert_eq!(path, "/srv/votes/vote.json");

        let path = with_env(&[(ENV_FILE, "/srv/votes/vote.json")], || {
            resolve_config_path(Some("/tmp/flag.json"))
        });
        assert_eq!(path, "/tmp/flag.json");
    }

    #[test]
    fn test_resolve_path_fallbacks() {
        let home = tempfile::tempdir().unwrap();
        let cwd = tempfile::tempdir().unwrap();
        let home_str = home.path().display().to_string();

        let (empty_var_path, unset_path, cwd_path) = with_env(&[(ENV_FILE, "")], || {
            let saved_home = std::env::var("HOME").ok();
            let saved_cwd = std::env::current_dir().unwrap();
            std::env::set_var("HOME", &home_str);
            std::env::set_current_dir(cwd.path()).unwrap();

            // Empty FORM_VOTE_FILE is ignored, no ./.form-vote yet → home.
            let empty_var_path = resolve_config_path(None);
            std::env::remove_var(ENV_FILE);
            let unset_path = resolve_config_path(None);

            std::fs::create_dir_all(cwd.path().join(".form-vote")).unwrap();
            std::fs::write(cwd.path().join(".form-vote/vote.json"), "{}").unwrap();
            let cwd_path = resolve_config_path(None);

            std::env::set_current_dir(saved_cwd).unwrap();
            match saved_home {
                Some(h) => std::env::set_var("HOME", h),
                None => std::env::remove_var("HOME"),
            }
            (empty_var_path, unset_path, cwd_path)
        });

        let expected_home = home
            .path()
            .join(".form-vote")
            .join("vote.json")
            .display()
            .to_string();
        assert_eq!(empty_var_path, expected_home);
        assert_eq!(unset_path, expected_home);
        assert_eq!(cwd_path, ".form-vote/vote.json");
    }
}
