//! Shotlink CLI - validate, preview and publish asset jobs against the
//! in-memory tracking store.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tabled::{Table, Tabled};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shotlink_core::application::{
    AssetTaskResolver, ExecutionMode, JobBuilder, PublishExecutor,
};
use shotlink_core::domain::PublishJob;
use shotlink_core::port::time_provider::SystemTimeProvider;
use shotlink_infra_memory::InMemoryEntityClient;
use shotlink_infra_timelog::{parse_day_start, FileTimeAccountant, TimelogConfig};

#[derive(Parser)]
#[command(name = "shotlink")]
#[command(about = "Shotlink asset publishing CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Username acting as the API principal
    #[arg(long, env = "SHOTLINK_API_USER", default_value = "shotlink")]
    api_user: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a job document without touching the store
    Validate {
        /// Path to the job JSON file
        job: PathBuf,
    },

    /// Show what a publish would create, without creating anything
    Preview {
        /// Path to the job JSON file
        job: PathBuf,
    },

    /// Publish a job against a seeded store
    Publish {
        /// Path to the job JSON file
        job: PathBuf,

        /// Path to the store seed JSON file
        #[arg(long)]
        seed: PathBuf,

        /// Enable time accounting into this directory
        #[arg(long, env = "SHOTLINK_TIMELOG_DIR")]
        timelog_dir: Option<PathBuf>,

        /// Working-day start for time accounting (HH:MM)
        #[arg(long, env = "SHOTLINK_DAY_START", default_value = "10:00")]
        day_start: String,
    },

    /// List assets publishable under a task
    Assets {
        /// Task id
        #[arg(long)]
        task: String,

        /// Path to the store seed JSON file
        #[arg(long)]
        seed: PathBuf,
    },
}

#[derive(Tabled)]
struct AssetRow {
    name: String,
    #[tabled(rename = "type")]
    asset_type: String,
    id: String,
}

fn init_logging() -> Result<()> {
    let log_format = std::env::var("SHOTLINK_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            EnvFilter::try_new(
                "shotlink_core=info,shotlink_infra_memory=info,shotlink_infra_timelog=info",
            )
        })
        .context("Failed to create env filter")?;

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
    Ok(())
}

fn load_job(path: &PathBuf) -> Result<PublishJob> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job file {}", path.display()))?;
    let value = serde_json::from_str(&raw).context("Job file is not valid JSON")?;
    JobBuilder::from_value(value, &SystemTimeProvider)
        .map_err(|e| anyhow::anyhow!("Invalid job document: {e}"))
}

fn seeded_client(api_user: &str, seed: &PathBuf) -> Result<Arc<InMemoryEntityClient>> {
    let client = Arc::new(InMemoryEntityClient::new(api_user));
    let raw = std::fs::read_to_string(seed)
        .with_context(|| format!("Failed to read seed file {}", seed.display()))?;
    client
        .load_seed(&raw)
        .map_err(|e| anyhow::anyhow!("Invalid seed document: {e}"))?;
    Ok(client)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { job } => {
            let job = load_job(&job)?;
            let (ok, errors) = job.validate();
            if ok {
                println!("{}", "✓ Job is valid".green().bold());
            } else {
                println!("{}", "✗ Job is invalid:".red().bold());
                for error in errors {
                    println!("  - {error}");
                }
                std::process::exit(1);
            }
        }

        Commands::Preview { job } => {
            let job = load_job(&job)?;
            let client = Arc::new(InMemoryEntityClient::new(&cli.api_user));
            let executor = PublishExecutor::new(client, ExecutionMode::Preview);
            let result = executor.execute(&job).await;

            if !result.succeeded {
                println!("{}", "✗ Preview failed".red().bold());
                if let Some(message) = &result.error_message {
                    println!("{message}");
                }
                std::process::exit(1);
            }

            println!("{}", "Publish plan".cyan().bold());
            println!();
            for action in &result.planned_actions {
                println!("  {action}");
            }
            println!();
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Publish {
            job,
            seed,
            timelog_dir,
            day_start,
        } => {
            let job = load_job(&job)?;
            let client = seeded_client(&cli.api_user, &seed)?;

            let mut executor =
                PublishExecutor::new(client.clone(), ExecutionMode::Publish);
            if let Some(dir) = timelog_dir {
                let day_start = parse_day_start(&day_start)
                    .with_context(|| format!("Invalid day start '{day_start}', expected HH:MM"))?;
                let config = TimelogConfig::new(dir).with_day_start(day_start);
                executor = executor
                    .with_time_accountant(Arc::new(FileTimeAccountant::new(client, config)));
            }

            let result = executor.execute(&job).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            println!();

            if result.succeeded {
                let version = result
                    .version_number
                    .map(|n| format!(" v{n:03}"))
                    .unwrap_or_default();
                println!("{}", format!("✓ Published{version}").green().bold());
            } else {
                println!("{}", "✗ Publish failed".red().bold());
                std::process::exit(1);
            }
        }

        Commands::Assets { task, seed } => {
            let client = seeded_client(&cli.api_user, &seed)?;
            let resolver = AssetTaskResolver::new(client);
            let listing = resolver
                .list_assets_for_task(&task)
                .await
                .map_err(|e| anyhow::anyhow!("Asset listing failed: {e}"))?;

            if listing.ids.is_empty() {
                println!("{}", "No assets found".yellow());
                return Ok(());
            }

            let rows: Vec<AssetRow> = listing
                .ids
                .iter()
                .map(|(name, id)| AssetRow {
                    name: name.clone(),
                    asset_type: listing
                        .types
                        .get(name)
                        .cloned()
                        .unwrap_or_default(),
                    id: id.clone(),
                })
                .collect();
            println!("{}", Table::new(rows));
        }
    }

    Ok(())
}
