mod cli;
mod commands;
mod error;
mod output;

use std::path::Path;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity; keep the appender guard alive
    // for the lifetime of the process.
    let _guard = init_tracing(cli.global.verbose, cli.global.log_file.as_deref());

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Install the tracing subscriber: console always, plus an append-only
/// log file when requested. A file that cannot be opened degrades to
/// console-only logging with a warning -- never a startup failure.
fn init_tracing(
    verbosity: u8,
    log_file: Option<&Path>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let console = fmt::layer().with_target(false);
    let registry = tracing_subscriber::registry().with(filter).with(console);

    match log_file.map(open_log_file) {
        Some(Ok(file)) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            registry
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Some(guard)
        }
        Some(Err(e)) => {
            registry.init();
            tracing::warn!(error = %e, "could not open log file, logging to console only");
            None
        }
        None => {
            registry.init();
            None
        }
    }
}

fn open_log_file(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new().create(true).append(true).open(path)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Connect(args) => commands::connect::handle(&args, &cli.global).await,
        Command::Cert(args) => commands::cert::handle(&args, &cli.global).await,
        Command::Cred(args) => commands::cred::handle(&args, &cli.global),
        Command::Fetch(args) => commands::fetch::handle(&args, &cli.global).await,
        Command::Stats(args) => commands::stats::handle(&args, &cli.global),
        Command::Config(args) => commands::config_cmd::handle(&args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "geoport", &mut std::io::stdout());
            Ok(())
        }
    }
}
