//! Command-line host runner for the brewd OWFS plugin.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, reload};

use brewd_owfs::{Bus, DEFAULT_MOUNT, OWFS_PATH_KEY};
use brewd_plugin_sdk::{ConfigStore, ConfigType, Host, LevelReload};

/// brewd - run the OWFS temperature plugin against a 1-Wire mount.
#[derive(Parser, Debug)]
#[command(name = "brewd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Start the host with the OWFS plugin registered.
    Run {
        /// Configuration file to persist entries to.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the OWFS mount path for this run.
        #[arg(short, long)]
        mount: Option<String>,
        /// Sensor instance id.
        #[arg(long, default_value = "owfs-temp-1")]
        sensor_id: String,
    },
    /// Validate an OWFS mount path and exit.
    Check {
        /// Mount path to validate.
        #[arg(short, long, default_value = DEFAULT_MOUNT)]
        mount: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let reload = init_tracing(args.verbose);

    match args.command {
        Command::Run {
            config,
            mount,
            sensor_id,
        } => run(config, mount, &sensor_id, reload).await,
        Command::Check { mount } => check(&mount),
    }
}

/// Set up the subscriber with a reloadable filter so the plugin's
/// configured level can be applied after startup.
fn init_tracing(verbose: bool) -> LevelReload {
    let default = if verbose { directives("debug") } else { directives("info") };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();

    LevelReload::new(move |level| {
        let directives = directives(&level.to_string().to_lowercase());
        let _ = handle.reload(EnvFilter::new(directives));
    })
}

/// Filter directives covering all workspace crates at the given level.
fn directives(level: &str) -> String {
    format!("brewd={level},brewd_plugin_sdk={level},brewd_owfs={level}")
}

async fn run(
    config: Option<PathBuf>,
    mount: Option<String>,
    sensor_id: &str,
    reload: LevelReload,
) -> Result<()> {
    let store = match config {
        Some(path) => ConfigStore::with_file(path),
        None => ConfigStore::new(),
    };
    store.load().await?;

    let host = Host::new(store).with_log_reload(reload);
    if let Some(mount) = mount {
        host.config()
            .add(OWFS_PATH_KEY, json!(mount), ConfigType::String, "OWFS mount path", vec![])
            .await?;
    }

    brewd_owfs::register(&host).await?;
    host.init_extensions().await?;

    let sensor = host
        .spawn_sensor("OwfsTemps", sensor_id, HashMap::new())
        .await?;

    let mut updates = host.sensor_bus().subscribe();
    tokio::spawn(async move {
        while let Ok(update) = updates.recv().await {
            tracing::info!(sensor = %update.sensor_id, value = %update.value, "update");
        }
    });

    tracing::info!("host running, press ctrl-c to stop");
    tokio::signal::ctrl_c().await?;

    sensor.stop();
    sensor.join().await;
    tracing::info!("stopped");
    Ok(())
}

fn check(mount: &str) -> Result<()> {
    let bus = Bus::open(mount)?;
    println!("OWFS mount ok: {}", bus.mount().display());
    Ok(())
}
