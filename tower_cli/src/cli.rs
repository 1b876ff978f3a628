//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(
    name = "tower",
    version,
    about = "Forward tower sensor readings from the serial port to InfluxDB"
)]
pub struct Cli {
    /// Path to the JSON configuration
    #[arg(long, value_name = "FILE", default_value = tower_config::CONFIG_FILENAME)]
    pub config: PathBuf,

    /// Skip the "enter configuration mode?" prompt
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_prompt: bool,

    /// Serial device, overriding arduino.serial_port
    #[arg(long, value_name = "DEVICE")]
    pub port: Option<String>,

    /// Read captured device lines from FILE instead of the serial port
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,

    /// Print records as JSON lines instead of writing to the database
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Read on a background thread with a queue of N lines
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub queue: Option<u16>,

    /// Validate the configuration, print a summary and exit; never prompts
    #[arg(long, action = ArgAction::SetTrue)]
    pub check: bool,

    /// Database password (never stored in the config file)
    #[arg(long, value_name = "PASSWORD", env = "TOWER_DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,
}
