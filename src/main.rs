//! hookchat - chat with a webhook from the terminal
//!
#![doc = "hookchat - chat with a webhook from the terminal"]
#![doc = "Main entry point for the hookchat application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hookchat::cli::{Cli, Commands};
use hookchat::commands;
use hookchat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    match cli.command {
        Commands::Chat {
            user,
            email,
            ephemeral,
        } => {
            tracing::info!("Starting interactive chat");
            if ephemeral {
                tracing::debug!("Ephemeral storage enabled");
            }
            commands::chat::run_chat(config, user, email, ephemeral).await?;
            Ok(())
        }
        Commands::Send { user, message } => {
            tracing::info!("Sending one-shot message");
            commands::run_send(config, user, message).await?;
            Ok(())
        }
        Commands::History { user, command } => {
            tracing::info!("Starting history command");
            let storage = commands::open_storage(&config, false)?;
            commands::history::handle_history(storage, &user, command)?;
            Ok(())
        }
        Commands::Signup { name, email } => {
            tracing::info!("Starting signup");
            commands::run_signup(config, name, email).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they do not interleave with chat output on stdout.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "hookchat=debug"
    } else {
        "hookchat=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
