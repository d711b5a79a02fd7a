use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cmdgate::{CommandExecutor, ExecError, SecurityConfig};

#[derive(Parser)]
#[command(
    name = "cmdgate",
    version,
    about = "Allowlist-based gatekeeper for single-command execution"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a command against the security rules and, if it passes, run
    /// it inside the sandbox root
    Run {
        /// Single command to execute (example: "ls -l" or "cat file.txt")
        command: String,

        /// Emit the execution outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what commands and operations are allowed in this environment
    Rules {
        /// Emit the rules snapshot as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();

    let allowed_dir =
        std::env::var("ALLOWED_DIR").context("ALLOWED_DIR must point at the sandbox root")?;
    let config = SecurityConfig::from_env()?;
    let executor = CommandExecutor::new(&allowed_dir, config)?;

    match cli.command {
        Commands::Run { command, json } => run(&executor, &command, json).await,
        Commands::Rules { json } => {
            let rules = executor.rules();
            if json {
                println!("{}", serde_json::to_string_pretty(&rules)?);
            } else {
                print!("{rules}");
            }
            Ok(())
        }
    }
}

async fn run(executor: &CommandExecutor, command: &str, json: bool) -> Result<()> {
    match executor.execute(command).await {
        Ok(outcome) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                if !outcome.stdout.is_empty() {
                    print!("{}", outcome.stdout);
                }
                if !outcome.stderr.is_empty() {
                    eprint!("{}", outcome.stderr);
                }
                eprintln!("Command completed with return code: {}", outcome.exit_code);
            }
            // Mirror the child's exit status to the calling shell.
            std::process::exit(outcome.exit_code);
        }
        Err(ExecError::Rejected(violation)) => {
            eprintln!("Security violation: {violation}");
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
