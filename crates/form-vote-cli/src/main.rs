//! form-vote — entry point.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use form_vote_cli::commands;
use form_vote_cli::config::{load_resolved, resolve_config_path};
use form_vote_cli::output;

#[derive(Parser)]
#[command(
    name = "form-vote",
    about = "form-vote — submit a signed vote form once",
    version,
    after_help = "Run 'form-vote <command> --help' for details on each command.\nRun 'form-vote' with no command to submit the configured vote."
)]
struct Cli {
    /// Path to the JSON vote file.
    /// Also reads from FORM_VOTE_FILE env var.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output results as JSON (machine-readable).
    #[arg(long, global = true)]
    json: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit the configured vote (default).
    Submit {
        /// Override the endpoint from the vote file.
        #[arg(long)]
        endpoint: Option<String>,

        /// Request timeout in milliseconds.
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Print the request that would be sent, without sending it.
    Preview {
        /// Override the endpoint from the vote file.
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Validate a vote file.
    Validate,

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_flag = cli.config.as_deref();
    let json = cli.json;

    let result = match cli.command.unwrap_or(Commands::Submit {
        endpoint: None,
        timeout: None,
    }) {
        Commands::Submit { endpoint, timeout } => {
            match load_resolved(config_flag, endpoint.as_deref()) {
                Ok(config) => commands::submit::run(&config, timeout, json).await,
                Err(e) => Err(e),
            }
        }

        Commands::Preview { endpoint } => load_resolved(config_flag, endpoint.as_deref())
            .and_then(|config| commands::preview::run(&config, json)),

        Commands::Validate => {
            let path = resolve_config_path(config_flag);
            load_resolved(config_flag, None)
                .and_then(|config| commands::validate::run(&path, &config, json))
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "form-vote", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        output::print_error(e, json);
        std::process::exit(1);
    }

    result
}
