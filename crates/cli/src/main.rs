//! # Capstone CLI
//!
//! Command-line interface for the Capstone project-coordination service.
//!
//! ## Usage
//!
//! ```bash
//! capstone serve    # Start the API server (runs migrations automatically)
//! capstone migrate  # Run database migrations
//! capstone --help   # Show help
//! ```

mod commands;
mod config;
mod server;

use clap::{CommandFactory as _, Parser};
use commands::{Commands, CompletionsArgs};
use error::Result;

/// Capstone - final-year project coordination
#[derive(Parser, Debug)]
#[command(name = "capstone")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (debug, info, warn, error)
    #[arg(short = 'L', long, env = "RUST_LOG", default_value = "info")]
    log_level: String,

    /// Output format (json, pretty, compact)
    #[arg(short, long, env = "CAPSTONE_LOG_FORMAT", default_value = "pretty")]
    log_format: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level, &cli.log_format, None)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    logging::info!(target: "app", command = ?cli.command, "Capstone CLI starting...");

    match cli.command {
        Commands::Serve(args) => {
            let db_config = config::DatabaseConfig::from_env()
                .map_err(|e| anyhow::anyhow!("Invalid database configuration: {}", e))?;
            server::serve(&db_config, &args).await?;
        },
        Commands::Migrate(args) => commands::migrate::run(&args).await?,
        Commands::Completions(args) => completions(&args)?,
        Commands::Validate => commands::validate::run()?,
    }

    logging::info!(target: "app", "Capstone CLI completed successfully");
    Ok(())
}

fn completions(args: &CompletionsArgs) -> Result<()> {
    commands::completions::completions(args.shell, &mut Cli::command())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_parse_serve() {
        let cli = Cli::parse_from(["capstone", "serve", "--host", "127.0.0.1", "--port", "8080"]);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.host, "127.0.0.1");
                assert_eq!(args.port, 8080);
            },
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_validate() {
        let cli = Cli::parse_from(["capstone", "validate"]);
        match cli.command {
            Commands::Validate => {},
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["capstone", "validate"]);
        assert_eq!(cli.log_level, "info");
        assert_eq!(cli.log_format, "pretty");
    }

    #[test]
    fn test_migrate_rollback() {
        let cli = Cli::parse_from(["capstone", "migrate", "--rollback"]);
        match cli.command {
            Commands::Migrate(args) => {
                assert!(args.rollback);
            },
            _ => panic!("Expected Migrate command"),
        }
    }

    #[test]
    fn test_cli_command_factory() {
        let cmd = Cli::command();
        assert!(cmd.get_name() == "capstone");
    }
}
