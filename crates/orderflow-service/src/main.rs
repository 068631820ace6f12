//! Main entry point for the orderflow service.
//!
//! This binary provides a complete order management implementation that
//! creates, warehouses, ships, cancels and deletes retail orders. It uses a
//! modular architecture with pluggable implementations for the storage and
//! factory collaborators, driven by an interactive console menu.

use clap::Parser;
use orderflow_config::Config;
use orderflow_core::EngineBuilder;
use std::path::PathBuf;
use std::sync::Arc;

mod menu;
mod registry;

/// Command-line arguments for the orderflow service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "warn")]
	log_level: String,
}

/// Main entry point for the orderflow service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the lifecycle engine with all implementations
/// 5. Runs the console menu until the user exits
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	// Create env filter with default from args
	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt().with_env_filter(env_filter).with_target(true).init();

	tracing::info!("Started order service");

	// Load configuration
	let config = Config::from_file(args.config.to_str().unwrap()).await?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	// Build the lifecycle engine with all registered implementations
	let engine = EngineBuilder::new(config).build(registry::engine_factories())?;
	let engine = Arc::new(engine);

	// Log lifecycle events in the background while the menu runs
	let mut events = engine.event_bus().subscribe();
	tokio::spawn(async move {
		while let Ok(event) = events.recv().await {
			tracing::debug!(?event, "Lifecycle event");
		}
	});

	menu::Menu::new(engine).run().await?;

	tracing::info!("Stopped order service");
	Ok(())
}
