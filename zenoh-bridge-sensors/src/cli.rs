//! Command line of the sensors bridge.

use clap::Parser;
use pinesense_bridge_framework::{BridgeArgs, parse_with_default_config};

/// Config file used when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "sensors.json5";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "zenoh-bridge-sensors",
    version,
    about = "Poll the K30 CO2 sensor and battery gauge and publish readings to Zenoh"
)]
pub struct SensorArgs {
    #[command(flatten)]
    pub bridge: BridgeArgs,

    /// Poll every collector once, print the field sets as JSON lines and exit.
    #[arg(long)]
    pub once: bool,

    /// Print a sample configuration file and exit.
    #[arg(long, conflicts_with = "once")]
    pub sample_config: bool,
}

impl SensorArgs {
    /// Parse the process arguments.
    pub fn parse_args() -> Self {
        parse_with_default_config(DEFAULT_CONFIG)
    }
}
