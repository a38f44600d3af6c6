//! Dashwire CLI
//!
//! Command-line interface for the bundled dashboards:
//! - Serve an app over HTTP and WebSocket
//! - Print its layout or callback graph
//! - Invoke a callback offline
//! - Generate a default config file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dashwire::apps::{self, AppKind};
use dashwire::config::{generate_default_config, Config, LoggingConfig};
use dashwire::server::dto::UpdateResponse;
use dashwire::server::{serve, AppState};

#[derive(Parser)]
#[command(name = "dashwire")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reactive single-page dashboards")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// App to use (overrides the config file)
    #[arg(short, long, value_enum, global = true)]
    pub app: Option<AppKind>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the app
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the layout as JSON
    Layout,

    /// Print the callback bindings as JSON
    Dependencies,

    /// Run one callback with explicit values and print its outputs
    Invoke {
        /// Output spec, e.g. `my-div.children` or `..a.x...b.y..`
        output: String,
        /// Input values in declared order (JSON, or plain text)
        #[arg(short, long = "input")]
        inputs: Vec<String>,
        /// State values in declared order (JSON, or plain text)
        #[arg(short, long = "state")]
        states: Vec<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_default(),
    };
    if let Some(app) = cli.app {
        config.app = app;
    }

    init_tracing(&config.logging);

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            tracing::info!(
                "Starting Dashwire v{} with app {}",
                env!("CARGO_PKG_VERSION"),
                config.app
            );
            let app = apps::load(config.app, &config.data)
                .await
                .with_context(|| format!("Failed to build app {}", config.app))?;

            let state = AppState::new(Arc::new(app), config.server.clone());
            serve(state, &config.server).await?;
        }

        Commands::Layout => {
            let app = apps::load(config.app, &config.data).await?;
            print_json(&app.layout_tree().to_value())?;
        }

        Commands::Dependencies => {
            let app = apps::load(config.app, &config.data).await?;
            print_json(&app.dependencies())?;
        }

        Commands::Invoke {
            output,
            inputs,
            states,
        } => {
            let app = apps::load(config.app, &config.data).await?;
            let inputs: Vec<Value> = inputs.iter().map(|raw| parse_value(raw)).collect();
            let states: Vec<Value> = states.iter().map(|raw| parse_value(raw)).collect();

            match app.invoke(&output, &inputs, &states) {
                Ok(outputs) => print_json(&UpdateResponse::from_outputs(outputs))?,
                Err(e) if e.is_prevent_update() => eprintln!("Update prevented; outputs unchanged"),
                Err(e) => return Err(e).context("Callback failed"),
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    eprintln!("Wrote config to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// Logs go to stderr so printed JSON stays clean
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("dashwire={},tower_http=info", logging.level).into()
    });

    if logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// JSON when it parses, otherwise the raw text as a string
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
