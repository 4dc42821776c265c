//! Submit the configured vote once.

use anyhow::{Context, Result};

use form_vote::{FormSubmitter, SubmissionReceipt};

use crate::config::VoteConfig;
use crate::output;

/// Validate the config, post the vote, and report the outcome.
pub async fn run(config: &VoteConfig, timeout_override: Option<u64>, json: bool) -> Result<()> {
    let receipt = send(config, timeout_override).await?;

    if json {
        output::print_json(&serde_json::json!({
            "success": true,
            "status": receipt.status,
            "final_url": receipt.final_url.as_str(),
        }));
    } else {
        println!("Vote sent successfully! (HTTP {})", receipt.status);
    }

    Ok(())
}

/// Post the vote and return the receipt without printing.
pub async fn send(config: &VoteConfig, timeout_override: Option<u64>) -> Result<SubmissionReceipt> {
    let endpoint = config.validate()?;
    let submitter = FormSubmitter::with_options(&config.submitter_options(timeout_override))
        .context("invalid client settings")?;

    submitter
        .submit_vote(&endpoint, &config.vote, &config.credentials)
        .await
        .context("Error sending vote")
}
