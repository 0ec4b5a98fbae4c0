//! pomoloop - continuous work/break loop
//!
//! Work and break intervals alternate automatically:
//! - 25 minutes of work
//! - 5 minutes of break
//! - repeat until the daemon is told to quit

use std::time::Duration;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use pomoloop::cli::{Cli, Commands, Display, IpcClient, StatusArgs};

/// Redraw period for `status --watch`
const WATCH_INTERVAL: Duration = Duration::from_secs(1);

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    let socket = cli.socket;

    match cli.command {
        Some(Commands::Daemon(args)) => {
            pomoloop::daemon::run(args.into_options(socket)).await?;
        }
        Some(Commands::Start) => {
            let response = IpcClient::connect_to(socket)?.start().await?;
            Display::show_start_success(&response);
        }
        Some(Commands::Pause) => {
            let response = IpcClient::connect_to(socket)?.pause().await?;
            Display::show_pause_success(&response);
        }
        Some(Commands::Status(args)) => {
            show_status(IpcClient::connect_to(socket)?, args).await?;
        }
        Some(Commands::Config(args)) => {
            let response = IpcClient::connect_to(socket)?
                .configure(args.work, args.break_time)
                .await?;
            Display::show_config_success(&response);
        }
        Some(Commands::Reset(args)) => {
            let response = IpcClient::connect_to(socket)?.reset(args.baseline).await?;
            Display::show_reset_success(&response);
        }
        Some(Commands::Quit) => {
            let response = IpcClient::connect_to(socket)?.quit().await?;
            Display::show_quit_success(&response);
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Prints the status once, or redraws it every second until Ctrl-C.
async fn show_status(client: IpcClient, args: StatusArgs) -> Result<()> {
    if !args.watch {
        let response = client.status().await?;
        Display::show_status(&response);
        return Ok(());
    }

    let mut interval = tokio::time::interval(WATCH_INTERVAL);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let result = loop {
        tokio::select! {
            _ = interval.tick() => {
                match client.status().await {
                    Ok(response) => {
                        if let Some(data) = &response.data {
                            Display::show_watch_line(data);
                        }
                    }
                    Err(e) => break Err(e),
                }
            }
            _ = &mut ctrl_c => break Ok(()),
        }
    };

    Display::finish_watch();
    result
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
