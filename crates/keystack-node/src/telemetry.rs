//! Log output for the node.
//!
//! A single fmt layer writes either to stdout or, when `log_file` is set,
//! to that file through a background writer thread. The writer's guard is
//! parked in `FILE_GUARD` so queued lines are flushed on exit.

use crate::config::{LogFormat, LoggingConfig};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

static FILE_GUARD: Mutex<Option<WorkerGuard>> = Mutex::new(None);

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber. Fails if one is already set.
pub fn init(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&logging.level)
        .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", logging.level, e))?;

    let (layer, guard) = match &logging.log_file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(open_log_file(path)?);
            (file_layer(logging.format, writer), Some(guard))
        }
        None => (stdout_layer(logging.format), None),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()?;

    if let Some(guard) = guard {
        if let Ok(mut slot) = FILE_GUARD.lock() {
            *slot = Some(guard);
        }
    }

    Ok(())
}

fn stdout_layer(format: LogFormat) -> BoxedLayer {
    match format {
        LogFormat::Pretty => Box::new(fmt::layer().pretty()),
        LogFormat::Json => Box::new(fmt::layer().json()),
    }
}

fn file_layer(format: LogFormat, writer: NonBlocking) -> BoxedLayer {
    match format {
        LogFormat::Pretty => Box::new(fmt::layer().with_ansi(false).with_writer(writer)),
        LogFormat::Json => Box::new(fmt::layer().json().with_writer(writer)),
    }
}

/// Open `path` for appending, creating missing parent directories.
pub fn open_log_file(path: &Path) -> anyhow::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!("Failed to create log directory '{}': {}", parent.display(), e)
        })?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file '{}': {}", path.display(), e))
}
