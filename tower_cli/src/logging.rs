//! Console and optional file logging.

use std::path::Path;

use eyre::{Result, eyre};
use tower_config::Logging;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::cli::{Cli, FILE_GUARD};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Console goes to stderr so stdout stays clean for dry-run records.
pub fn init(cli: &Cli, logging: &Logging) -> Result<()> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let console: BoxedLayer = if cli.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    };

    let mut layers = vec![console];
    if let Some(file) = &logging.file {
        layers.push(file_layer(Path::new(file), logging)?);
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| eyre!("failed to install logger: {e}"))
}

fn file_layer(path: &Path, logging: &Logging) -> Result<BoxedLayer> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| eyre!("logging.file has no file name: {}", path.display()))?;

    let appender = match logging.rotation.as_deref() {
        Some("hourly") => tracing_appender::rolling::hourly(dir, name),
        Some("daily") => tracing_appender::rolling::daily(dir, name),
        _ => tracing_appender::rolling::never(dir, name),
    };
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = FILE_GUARD.set(guard);

    let level = logging.level.as_deref().unwrap_or("info");
    Ok(fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(EnvFilter::new(level))
        .boxed())
}
