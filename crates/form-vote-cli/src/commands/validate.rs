//! Check a vote file without sending anything.

use anyhow::Result;

use crate::config::VoteConfig;
use crate::output;

pub fn run(path: &str, config: &VoteConfig, json: bool) -> Result<()> {
    let endpoint = config.validate()?;
    let vote = &config.vote;

    if json {
        output::print_json(&serde_json::json!({
            "valid": true,
            "path": path,
            "endpoint": endpoint.as_str(),
            "ship_events": [vote.ship_event_1_id, vote.ship_event_2_id],
            "winning_project_id": vote.winning_project_id,
            "cookies": config.credentials.cookies.keys().collect::<Vec<_>>(),
        }));
        return Ok(());
    }

    println!("Valid vote file: {path}");
    println!("  Endpoint: {endpoint}");
    println!(
        "  Ship events: {} vs {}",
        vote.ship_event_1_id, vote.ship_event_2_id
    );
    println!("  Winner: {}", vote.winning_project_id);
    println!("  Time spent: {}ms", vote.time_spent_voting_ms);
    println!(
        "  Cookies: {}",
        if config.credentials.cookies.is_empty() {
            "none".to_string()
        } else {
            config
                .credentials
                .cookies
                .keys()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        }
    );
    Ok(())
}
