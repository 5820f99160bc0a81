use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod output;
mod utils;

pub use args::*;
use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "purser", version, about = "Secrets steward: collect, audit, and redact")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout is reserved for command output that
    // callers pipe onwards.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::Run {
            cmd,
            redact,
            config,
        } => cmd::run::run_cmd(&cmd, redact, config).await,
        Command::Show { config, output } => cmd::show::show_cmd(config, output).await,
        Command::Export { format, config } => cmd::export::export_cmd(format, config).await,
        Command::Drift {
            providers,
            config,
            output,
        } => cmd::drift::drift_cmd(&providers, config, output).await,
        Command::MirrorDrift {
            source,
            target,
            config,
            output,
        } => cmd::mirror_drift::mirror_drift_cmd(&source, &target, config, output).await,
        Command::Redact {
            input,
            out,
            config,
        } => cmd::redact::redact_cmd(input.as_deref(), out.as_deref(), config).await,
        Command::Put {
            kvs,
            providers,
            path,
            sync,
            config,
        } => cmd::put::put_cmd(&kvs, &providers, path.as_deref(), sync, config).await,
        Command::Delete {
            keys,
            providers,
            path,
            all_keys,
            config,
        } => cmd::delete::delete_cmd(&keys, &providers, path.as_deref(), all_keys, config).await,
        Command::Copy {
            from,
            to,
            sync,
            config,
        } => cmd::copy::copy_cmd(&from, &to, sync, config).await,
    }
}
