use anyhow::Result;
use clap::{CommandFactory, Parser};
use nwt::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Path to the ledger file (overrides the configured location)
    #[arg(short, long, global = true)]
    ledger_path: Option<String>,

    #[command(subcommand)]
    command: Option<nwt::Command>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(cmd) => {
            nwt::run_command(cmd, cli.config_path.as_deref(), cli.ledger_path.as_deref()).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
