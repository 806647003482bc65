use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use demodata_deploy_lambda::cli::{completion_message, run, Cli};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(outcome) => {
            println!("{}", completion_message(&outcome));
            ExitCode::SUCCESS
        }
        Err(error) => {
            // Reported whatever RUST_LOG filters out.
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}
