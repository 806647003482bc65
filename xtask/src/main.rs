use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the demodata deploy workspace",
    long_about = "A unified CLI for CI checks and deployments in the\n\
                  demodata deploy workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::All)]
        job: CiJob,
    },
    /// Package the artifacts and create or update the function
    Deploy {
        /// Directory holding the artifacts
        #[arg(long, env = "DEPLOY_WORKDIR", default_value = ".")]
        workdir: String,
        /// Env file with deployment options
        #[arg(long, default_value = ".env")]
        env_file: String,
        /// Build the deploy binary in release mode
        #[arg(long)]
        release: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting and clippy
    Lint,
    /// Workspace tests
    Test,
    /// Run lint + test
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .unwrap_or_else(|error| {
            eprintln!("failed to execute cargo: {error}");
            exit(1);
        })
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn deploy_args<'a>(workdir: &'a str, env_file: &'a str, release: bool) -> Vec<&'a str> {
    let mut args = vec!["run", "-p", "demodata_deploy_lambda", "--bin", "demodata-deploy"];
    if release {
        args.push("--release");
    }
    args.extend(["--", "--workdir", workdir, "--env-file", env_file]);
    args
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_lint() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);
}

fn ci_test() {
    step("Test demodata_deploy_core");
    run_cargo(&["test", "-p", "demodata_deploy_core"]);

    step("Test demodata_deploy_lambda");
    run_cargo(&["test", "-p", "demodata_deploy_lambda"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { job } => {
            match job {
                CiJob::Lint => ci_lint(),
                CiJob::Test => ci_test(),
                CiJob::All => {
                    ci_lint();
                    ci_test();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::Deploy {
            workdir,
            env_file,
            release,
        } => {
            step("Deploy demodata sender");
            run_cargo(&deploy_args(&workdir, &env_file, release));
        }
    }
}
