//! RFPlayer sensor platform runner.
//!
//! Usage:
//!   receiver-decoder | rfplayer-sensors --entry entry.json
//!
//! Loads the config entry, sets up the sensor platform and routes the
//! newline-delimited JSON device-info records read from stdin. Runs until
//! stdin closes or Ctrl+C.

use clap::Parser;
use log::{error, info, warn};
use rfplayer_sensors::config::{self, Config, ConfigEntry};
use rfplayer_sensors::input::{EventRouter, run_line_source};
use rfplayer_sensors::platform::{HostPlatform, IntegrationData};
use rfplayer_sensors::setup::setup_entry;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;

#[derive(Parser, Debug)]
#[command(name = "rfplayer-sensors", about = "RFPlayer sensor platform")]
struct Args {
    /// Config entry JSON file
    #[arg(long, env = "RFPLAYER_ENTRY_FILE")]
    entry: Option<PathBuf>,

    /// Override the automatic add default
    #[arg(long)]
    automatic_add: Option<bool>,
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    // Before the runtime exists, so no other thread reads the environment
    config::load_dotenv();
    init_logger();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };
    runtime.block_on(run());
}

async fn run() {
    info!("Starting RFPlayer sensor platform");

    let args = Args::parse();
    let mut config = Config::from_env();
    if let Some(path) = args.entry {
        config.entry_path = path;
    }
    if let Some(automatic_add) = args.automatic_add {
        config.automatic_add = automatic_add;
    }
    info!("Configuration loaded:");
    info!("  Entry file: {}", config.entry_path.display());
    info!("  Automatic add default: {}", config.automatic_add);

    let entry = if config.entry_path.exists() {
        match ConfigEntry::load(&config.entry_path) {
            Ok(entry) => entry,
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        }
    } else {
        info!("No config entry found, starting without configured devices");
        ConfigEntry::default()
    };

    let data = Arc::new(IntegrationData::new());
    let platform = Arc::new(HostPlatform::new(data.clone()));

    // Log every state change pushed by the entities
    let mut changes = platform.subscribe();
    let state_task = tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(change) => info!("{} -> {:?}", change.entity_id, change.state),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("State log lagged, {} change(s) skipped", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let handle = match setup_entry(&entry, &config, data.clone(), platform.clone()).await {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to set up sensor platform: {}", e);
            std::process::exit(1);
        }
    };

    let router = EventRouter::new(data.clone());
    info!("Reading device events from stdin, press Ctrl+C to exit");

    tokio::select! {
        result = run_line_source(BufReader::new(tokio::io::stdin()), &router) => {
            if let Err(e) = result {
                error!("Event source failed: {}", e);
            }
        }
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Received shutdown signal"),
                Err(e) => error!("Failed to listen for shutdown signal: {}", e),
            }
        }
    }

    handle.unload().await;
    state_task.abort();

    for entity in platform.entities() {
        info!(
            "  {} = {:?} {}",
            entity.entity_id().unwrap_or("-"),
            entity.state(),
            entity.unit_of_measurement().unwrap_or("")
        );
    }
    info!("RFPlayer sensor platform stopped");
}
