// src/main.rs
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gesture_server::data::{self, CommandLog};
use gesture_server::{load_model, session, GestureConfig, GestureEngine};

#[derive(Parser)]
#[command(name = "gesture_server", about = "Hand gesture media control server")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Accept landmark streams and answer with gesture commands
    Serve {
        #[arg(long, default_value = "0.0.0.0:8765")]
        addr: String,
    },
    /// Run a recorded sequence through a fresh engine
    Replay {
        file: PathBuf,
        #[arg(long, default_value_t = 15.0)]
        fps: f64,
        /// Directory to write commands.csv into
        #[arg(long)]
        export: Option<PathBuf>,
        #[arg(long)]
        session: Option<String>,
    },
    /// Print the effective configuration as JSON
    PrintConfig,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = GestureConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Serve { addr } => {
            let model = load_model(&config.model);
            session::serve(addr, config, model).await
        }
        Commands::Replay {
            file,
            fps,
            export,
            session,
        } => {
            let frames = data::load_sequence(&file)?;
            info!("Replaying {} frames from {}", frames.len(), file.display());

            let model = load_model(&config.model);
            let mut engine = GestureEngine::new(config, model);
            let events = data::replay(&mut engine, &frames, fps)?;
            for event in &events {
                println!("{:>6} {:>8.3}s {}", event.frame, event.timestamp, event.command);
            }

            if let Some(dir) = export {
                let mut log = CommandLog::new(dir, session);
                log.extend(events);
                let path = log.export_csv()?;
                info!("Exported {} commands to {}", log.len(), path.display());
            }
            Ok(())
        }
        Commands::PrintConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}
