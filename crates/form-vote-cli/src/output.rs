//! Terminal output helpers.

use serde_json::Value;

/// Print a JSON value on stdout.
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("  Error: could not render JSON: {e}"),
    }
}

/// Print an error the way every subcommand reports failure.
pub fn print_error(err: &anyhow::Error, json: bool) {
    if json {
        print_json(&serde_json::json!({
            "error": true,
            "message": format!("{err:#}"),
        }));
    } else {
        eprintln!("  Error: {err:#}");
    }
}
