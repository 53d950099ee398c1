mod desktop;
mod terminal;

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    sync::Mutex,
};

use lebirun_core::{
    config::{self, AppConfig},
    FsStorage, PowerAction, PowerLatch, SessionMachine,
};
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::terminal::CrosstermTerminal;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    let storage = FsStorage::new(config.data_root());
    info!(data = %storage.root().display(), "starting lebirun {}", config.version);

    let result = tokio::task::spawn_blocking(move || run(config, storage)).await?;
    if let Err(err) = &result {
        error!("console stopped: {err:#}");
    }
    result
}

/// Run sessions until one of them shuts down. A reboot starts a fresh
/// session at the boot menu; the save file on disk is all that carries over.
fn run(config: AppConfig, storage: FsStorage) -> Result<()> {
    let power = PowerLatch::new();
    let mut term = CrosstermTerminal::start(power.clone())?;
    let outcome = run_sessions(&mut term, &config, &storage, &power);
    term.restore()?;
    outcome
}

fn run_sessions(
    term: &mut CrosstermTerminal,
    config: &AppConfig,
    storage: &FsStorage,
    power: &PowerLatch,
) -> Result<()> {
    loop {
        let mut machine = SessionMachine::new(
            config.clone(),
            Box::new(storage.clone()),
            Box::new(power.clone()),
        );
        info!("session started");
        loop {
            machine.dispatch_one_step(term)?;
            match power.take() {
                Some(PowerAction::Reboot) => {
                    info!("rebooting");
                    break;
                }
                Some(PowerAction::Shutdown) => {
                    info!("shutting down");
                    return Ok(());
                }
                None => {}
            }
        }
    }
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("lebirun.log"))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // The console owns stdout, so logs only go to the file.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
