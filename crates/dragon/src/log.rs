//! Logging for dragon.
use anyhow::Context;
use dragon_core::get_data_dir;
use std::io::LineWriter;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::OffsetTime;

const SERVER_FILTER: &str = "dragon=info,dragon_core=info";

/// Initializes file based logging for the interactive commands.
///
/// Logs go to `<data_dir>/dragon.log`. A log file larger than 100KB is moved
/// to `dragon.log.old` first, replacing any previous backup.
pub fn setup_logging() -> anyhow::Result<()> {
    let data_dir = get_data_dir().context("Failed to get data directory")?;
    let log_path = data_dir.join("dragon.log");

    if log_path.exists() {
        let metadata = std::fs::metadata(&log_path)?;
        if metadata.len() > 100 * 1024 {
            let backup_path = data_dir.join("dragon.log.old");
            if backup_path.exists() {
                std::fs::remove_file(&backup_path)?;
            }
            std::fs::rename(&log_path, backup_path)?;
        }
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    // Flush after every line
    let writer = Mutex::new(LineWriter::new(log_file));

    tracing_subscriber::fmt()
        .with_env_filter("dragon=debug,dragon_core=debug,rustyline=info")
        .with_writer(writer)
        .with_ansi(false)
        .with_timer(OffsetTime::local_rfc_3339()?)
        .init();
    Ok(())
}

/// Initializes stderr logging for the relay server. `RUST_LOG` overrides the
/// default filter.
pub fn setup_server_logging(verbose: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("dragon=debug,dragon_core=debug")
        } else {
            EnvFilter::new(SERVER_FILTER)
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_timer(OffsetTime::local_rfc_3339()?)
        .init();
    Ok(())
}
