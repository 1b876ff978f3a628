mod bridge;
mod cli;
mod error_fmt;
mod logging;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::Result;
use tower_config::Logging;
use tower_core::{BridgeError, ReadingAssembler, StopReason};

use crate::cli::{Cli, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    if let Err(e) = run(&cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn run(cli: &Cli) -> Result<()> {
    // The logging section lives in the config, so read it before installing
    // the subscriber; load failures are reported once logging is up.
    let loaded = tower_config::load(&cli.config);
    let logging: Logging = loaded
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    logging::init(cli, &logging)?;

    let cfg = loaded.map_err(|e| bridge::config_failure(&cli.config, e))?;
    tracing::info!(path = %cli.config.display(), measurement = cfg.measurement(), "configuration loaded");

    let cfg = bridge::maybe_edit(cli, cfg)?;
    let assembler = ReadingAssembler::from_config(&cfg).map_err(|e: BridgeError| {
        tracing::error!(error = %e, "unable to build field converters");
        e
    })?;

    if cli.check {
        bridge::print_check(&cfg, &assembler);
        return Ok(());
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
        tracing::warn!(error = %e, "unable to install Ctrl-C handler");
    }

    let summary = bridge::run_bridge(cli, &cfg, &assembler, shutdown)?;
    if summary.reason == StopReason::Shutdown {
        tracing::info!("interrupted, exiting");
    }
    Ok(())
}
