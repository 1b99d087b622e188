mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cumulo_core::Platform;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a tenant connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "cumulo", &mut std::io::stdout());
            Ok(())
        }

        // Watch keeps a long-lived connection with realtime enabled
        Command::Watch(args) => {
            let mut platform_config = config::build_platform_config(&cli.global)?;
            platform_config.realtime_enabled = true;
            commands::watch::handle(platform_config, args, &cli.global).await
        }

        // All other commands run a one-shot connect/execute/disconnect
        cmd => {
            let platform_config = config::build_platform_config(&cli.global)?;
            let platform = Platform::new(platform_config);
            platform.connect().await.map_err(CliError::from)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &platform, &cli.global).await;
            platform.disconnect().await;
            result
        }
    }
}
