use bucketlog::cli::run::RunOverrides;
use bucketlog::config::resolve_config_path;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bucketlog")]
#[command(about = "Fetch, merge and translate bucket access logs", long_about = None)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download, merge and translate logs for the configured range
    Run {
        /// Process only these buckets (repeatable)
        #[arg(long = "bucket")]
        buckets: Vec<String>,

        /// Override the configured lookback window
        #[arg(long)]
        days_to_look_back: Option<i64>,

        /// Override the configured ignore window
        #[arg(long)]
        days_to_ignore: Option<i64>,
    },
    /// List buckets with their logging target
    List,
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a starter config file
    Init {
        #[arg(long)]
        stdout: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bucketlog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config.as_deref());

    match cli.command {
        Some(Commands::Run {
            buckets,
            days_to_look_back,
            days_to_ignore,
        }) => {
            let overrides = RunOverrides {
                buckets,
                days_to_look_back,
                days_to_ignore,
            };
            bucketlog::cli::run::run(config_path, overrides)?;
        }
        None => {
            bucketlog::cli::run::run(config_path, RunOverrides::default())?;
        }
        Some(Commands::List) => {
            bucketlog::cli::list::list(config_path)?;
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { stdout } => {
                bucketlog::cli::init::init(stdout)?;
            }
        },
    }

    Ok(())
}
