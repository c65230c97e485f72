//! formsmith - drag fields onto a canvas, fill them in, preview the form

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use formsmith::builder::FormBuilder;
use formsmith::config::{self, Config};
use formsmith::tui::TuiApp;

#[derive(Parser)]
#[command(name = "formsmith")]
#[command(author, version, about = "A terminal drag-and-drop form builder")]
struct Cli {
    /// Config file (default: ~/.formsmith/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log file (default: ~/.formsmith/formsmith.log)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Number of leading fields that must be filled before preview
    #[arg(long, global = true)]
    required: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the form builder (default)
    Tui,

    /// Print the field palette
    Catalog {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default config.toml
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = config::resolve_path(cli.config.clone(), |paths| paths.config)?;

    let mut config = config::load_config(&config_path)?;
    if let Some(required) = cli.required {
        config.required_count = required;
    }

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let log_file = config::resolve_path(cli.log_file, |paths| paths.log_file)?;
            init_logging(&log_file, &config)?;
            tracing::info!("formsmith v{}", env!("CARGO_PKG_VERSION"));

            let catalog = config.build_catalog()?;
            let builder = FormBuilder::new(catalog, config.required_count);
            let mut app = TuiApp::new(builder);
            app.run()?;
            tracing::info!(fields = app.builder().canvas().len(), "session ended");
        }
        Commands::Catalog { json } => {
            let catalog = config.build_catalog()?;
            if json {
                let archetypes: Vec<_> = catalog.iter().collect();
                println!("{}", serde_json::to_string_pretty(&archetypes)?);
            } else {
                println!("{:<4} {:<20} {:<16}", "#", "LABEL", "KIND");
                println!("{}", "-".repeat(40));
                for (i, archetype) in catalog.iter().enumerate() {
                    println!("{:<4} {:<20} {:<16}", i, archetype.label, archetype.kind);
                }
            }
        }
        Commands::Init => {
            if config_path.exists() {
                println!("Config already exists at {}", config_path.display());
                return Ok(());
            }
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            config::save_config(&Config::default(), &config_path)?;
            println!("Created {}", config_path.display());
        }
    }

    Ok(())
}

/// Send tracing output to a file; the terminal belongs to the TUI
fn init_logging(log_file: &Path, config: &Config) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();

    Ok(())
}
