//! Startup sequence: config, optional edit session, device and store wiring.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use eyre::{Result, WrapErr};
use tower_config::{Config, ConfigError};
use tower_core::runner::{self, RunSummary};
use tower_core::{BridgeError, PipelineMode, ReadingAssembler};
use tower_io::influx::DEFAULT_TIMEOUT;
use tower_io::{InfluxSettings, InfluxWriter, JsonLinesSink};
use tower_traits::{LineSource, PointSink};
use tower_ui::{EditError, Editor};

use crate::cli::Cli;

/// Log a config load failure (one event per missing key) and classify it.
pub fn config_failure(path: &Path, e: ConfigError) -> BridgeError {
    match &e {
        ConfigError::MissingKeys(keys) => {
            for key in keys {
                tracing::error!(key, path = %path.display(), "missing config key");
            }
        }
        other => tracing::error!(error = %other, "unable to use config file"),
    }
    BridgeError::from(e)
}

/// Offer the interactive editor; persist and return the edited config when accepted.
///
/// `--check` never prompts and never writes the config file.
pub fn maybe_edit(cli: &Cli, cfg: Config) -> Result<Config> {
    if cli.no_prompt || cli.check {
        return Ok(cfg);
    }
    let stdin = io::stdin();
    let mut editor = Editor::new(stdin.lock(), io::stderr());
    if !editor.confirm("Enter configuration mode?")? {
        return Ok(cfg);
    }
    let edited = match editor.edit(&cfg) {
        Ok(c) => c,
        Err(EditError::Config(e)) => return Err(BridgeError::from(e).into()),
        Err(e) => return Err(e).wrap_err("configuration editor failed"),
    };
    edited.save(&cli.config).map_err(BridgeError::from)?;
    tracing::info!(path = %cli.config.display(), "configuration saved");
    Ok(edited)
}

/// Print what the bridge would run with.
pub fn print_check(cfg: &Config, assembler: &ReadingAssembler) {
    let names: Vec<&str> = assembler.registry().names().collect();
    let wl = cfg.water_level();
    let ls = cfg.light_schedule();
    println!("config ok");
    println!("  measurement: {}", cfg.measurement());
    println!(
        "  tags: towerName={} towerGroup={}",
        cfg.tags().tower_name,
        cfg.tags().tower_group
    );
    println!(
        "  db: {}:{}/{} as {} (ssl={})",
        cfg.db().host_name,
        cfg.db().host_port,
        cfg.db().dbname,
        cfg.db().username,
        cfg.db().ssl
    );
    println!(
        "  serial: {} @ {} baud",
        cfg.serial_port(),
        cfg.baud_rate()
    );
    println!(
        "  water level: height={} max={} min={}",
        wl.sensor_height, wl.max_water_level, wl.min_water_level
    );
    println!(
        "  lights expected on {:02}:{:02} to {:02}:{:02}",
        ls.expected_start_on_hour,
        ls.expected_start_on_min,
        ls.expected_start_off_hour,
        ls.expected_start_off_min
    );
    println!("  fields ({}): {}", names.len(), names.join(", "));
}

pub fn open_source(cli: &Cli, cfg: &Config) -> Result<Box<dyn LineSource + Send>> {
    if let Some(path) = &cli.replay {
        let src = tower_io::open_replay(path).map_err(|e| {
            tracing::error!(error = %e, path = %path.display(), "unable to open replay file");
            BridgeError::DeviceUnavailable(format!("{}: {e}", path.display()))
        })?;
        return Ok(Box::new(src));
    }

    let port = cli.port.as_deref().unwrap_or_else(|| cfg.serial_port());
    match tower_io::open_serial(port, cfg.baud_rate()) {
        Ok(src) => Ok(Box::new(src)),
        Err(e) => {
            tracing::error!(
                error = %e,
                available = ?tower_io::serial::available_ports(),
                "unable to configure serial port"
            );
            Err(BridgeError::DeviceUnavailable(e.to_string()).into())
        }
    }
}

pub fn open_sink(cli: &Cli, cfg: &Config) -> Result<Box<dyn PointSink>> {
    if cli.dry_run {
        tracing::info!("dry run: records go to stdout");
        return Ok(Box::new(JsonLinesSink::new(io::stdout())));
    }
    let db = cfg.db();
    if cli.db_password.is_none() {
        tracing::warn!("no database password supplied (--db-password or TOWER_DB_PASSWORD)");
    }
    let settings = InfluxSettings {
        host: db.host_name.clone(),
        port: db.host_port,
        dbname: db.dbname.clone(),
        username: db.username.clone(),
        password: cli.db_password.clone(),
        ssl: db.ssl,
        timeout: DEFAULT_TIMEOUT,
    };
    match InfluxWriter::connect(settings) {
        Ok(w) => Ok(Box::new(w)),
        Err(e) => {
            tracing::error!(
                error = %e,
                host = %db.host_name,
                port = db.host_port,
                username = %db.username,
                "unable to configure database client"
            );
            Err(BridgeError::DatabaseUnavailable(e.to_string()).into())
        }
    }
}

pub fn pipeline_mode(cli: &Cli) -> PipelineMode {
    cli.queue.map_or(PipelineMode::Sequential, |n| PipelineMode::Queued {
        capacity: usize::from(n),
    })
}

/// Wire everything up and run until shutdown, end of replay, or device loss.
pub fn run_bridge(
    cli: &Cli,
    cfg: &Config,
    assembler: &ReadingAssembler,
    shutdown: Arc<AtomicBool>,
) -> Result<RunSummary> {
    let source = open_source(cli, cfg)?;
    let mut sink = open_sink(cli, cfg)?;
    runner::run(source, sink.as_mut(), assembler, pipeline_mode(cli), shutdown)
}
