mod commands;
mod config;
mod session;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, plan, ApplyArgs, PlanArgs};

/// Hoist - pull members up a type hierarchy
#[derive(Parser, Debug)]
#[command(name = "hoist")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show what a pull-up would do without applying it
    Plan(PlanArgs),

    /// Apply a pull-up to an in-memory workspace
    Apply(ApplyArgs),
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?.display().to_string();

    match cli.command {
        Command::Plan(args) => plan(args, &cwd),
        Command::Apply(args) => apply(args, &cwd),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
