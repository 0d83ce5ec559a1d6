//! Roundtable terminal front end.
//!
//! Binary name: `rtbl`
//!
//! Parses CLI arguments, loads the config file and credentials, then
//! dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use roundtable_observe::tracing_setup::{init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,roundtable=debug",
        _ => "trace",
    };
    init_tracing(cli.otel, filter).map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "rtbl", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.config.as_deref()).await?;

    let result = match cli.command {
        Commands::Talk(args) => cli::talk::run_talk(&state, args).await,
        Commands::Roster => cli::roster::show_roster(&state),
        Commands::Completions { .. } => unreachable!("handled above"),
    };

    shutdown_tracing();
    result
}
