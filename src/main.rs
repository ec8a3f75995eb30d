//! FormPilot CLI: drive the demo surface and inspect what the autopilot
//! sees.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use formpilot_cli::demo;
use formpilot_engine::{Autopilot, AutopilotConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "formpilot",
    version,
    about = "Autonomous form completion without hand-written selectors"
)]
struct Cli {
    /// Load autopilot configuration from a YAML file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging (repeat for more).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the scripted demo goal against the in-memory campaign form.
    Demo {
        /// Print the full execution result as JSON.
        #[arg(long)]
        json: bool,

        /// Override the step budget.
        #[arg(long)]
        max_steps: Option<u32>,
    },
    /// Print the operator-readable state of the demo surface.
    State,
    /// Explain why a button on the demo surface is (not) clickable.
    Analyze {
        /// Visible button text to analyze.
        text: String,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("formpilot={default},{default}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<AutopilotConfig> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_yaml::from_str(&raw)
                .with_context(|| format!("parsing config {}", path.display()))
        }
        None => Ok(AutopilotConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Demo { json, max_steps } => {
            if let Some(steps) = max_steps {
                config.max_steps = steps;
            }
            let pilot = Autopilot::with_config(demo::campaign_form(), config);
            let result = pilot
                .execute(&demo::campaign_goal())
                .await
                .context("autopilot run aborted")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                for step in &result.steps {
                    println!(
                        "{:>2}. [{}] {} ({}ms){}",
                        step.index,
                        if step.outcome.success { "ok" } else { "failed" },
                        step.action.reason,
                        step.duration_ms,
                        step.outcome
                            .method
                            .as_deref()
                            .map(|m| format!(" via {m}"))
                            .unwrap_or_default(),
                    );
                }
                println!();
                if result.success {
                    println!(
                        "Goal reached in {} steps ({}ms).",
                        result.steps_taken(),
                        result.total_time_ms
                    );
                } else {
                    println!(
                        "Run failed after {} steps: {}",
                        result.steps_taken(),
                        result.error.as_deref().unwrap_or("unknown reason")
                    );
                }
            }
        }
        Command::State => {
            let pilot = Autopilot::with_config(demo::campaign_form(), config);
            println!("{}", pilot.get_readable_state().await?);
        }
        Command::Analyze { text } => {
            let pilot = Autopilot::with_config(demo::campaign_form(), config);
            for reason in pilot.analyze_button(&text).await? {
                println!("- {reason}");
            }
        }
    }

    Ok(())
}
