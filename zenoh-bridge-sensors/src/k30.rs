//! K30 CO2 sensor read over a Bluetooth GATT characteristic.
//!
//! Each cycle runs `gatttool --char-read` once and decodes the four bytes it
//! prints into the CO2 concentration.

use std::time::Duration;

use pinesense_common::{Fields, Tags};
use tracing::debug;

use crate::collector::{Accumulator, Collector, CollectorError};
use crate::config::K30Config;
use crate::exec::{BoundedExecutor, CommandRunner};
use crate::gatt;
use crate::resolve::Resolver;

/// Collector name and measurement.
pub const NAME: &str = "k30_reader";

/// Value of the `sensor` tag.
pub const SENSOR_TAG: &str = "k30_co2";

/// Field holding the reading.
pub const FIELD: &str = "co2";

pub const DEFAULT_GATTTOOL: &str = "/usr/bin/gatttool";
pub const DEFAULT_MACADDR: &str = "C1:C4:E4:05:14:95";
pub const DEFAULT_VARHANDLE: &str = "0x000e";
pub const DEFAULT_GATTFLAGS: &str = "-t random --char-read";

pub const ENV_GATTTOOL: &str = "GATTTOOL";
pub const ENV_MACADDR: &str = "MACADDR";
pub const ENV_VARHANDLE: &str = "VAR_HANDLE";
pub const ENV_GATTFLAGS: &str = "GATTFLAGS";

const SAMPLE_CONFIG: &str = r#"    k30: {
      enabled: true,
      // Path to gatttool (env GATTTOOL, default "/usr/bin/gatttool").
      gatttool: "",
      // Sensor Bluetooth address (env MACADDR, default "C1:C4:E4:05:14:95").
      macaddr: "",
      // Characteristic handle (env VAR_HANDLE, default "0x000e").
      varhandle: "",
      // Extra gatttool flags (env GATTFLAGS, default "-t random --char-read").
      gattflags: "",
      // gatttool is killed after this many seconds.
      timeout_secs: 10,
    },"#;

/// Parameters of one read, resolved at the start of the cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct K30Params {
    pub gatttool: String,
    pub macaddr: String,
    pub varhandle: String,
    pub gattflags: String,
}

impl K30Params {
    pub fn resolve(config: &K30Config, resolver: &Resolver) -> Self {
        Self {
            gatttool: resolver.resolve(&config.gatttool, ENV_GATTTOOL, DEFAULT_GATTTOOL),
            macaddr: resolver.resolve(&config.macaddr, ENV_MACADDR, DEFAULT_MACADDR),
            varhandle: resolver.resolve(&config.varhandle, ENV_VARHANDLE, DEFAULT_VARHANDLE),
            gattflags: resolver.resolve(&config.gattflags, ENV_GATTFLAGS, DEFAULT_GATTFLAGS),
        }
    }

    /// `<gatttool> -b <macaddr> <gattflags> --handle=<varhandle>`
    pub fn command_line(&self) -> String {
        format!(
            "{} -b {} {} --handle={}",
            self.gatttool, self.macaddr, self.gattflags, self.varhandle
        )
    }
}

/// Reads the K30 through an injected [`CommandRunner`].
#[derive(Debug)]
pub struct K30Reader<R = BoundedExecutor> {
    config: K30Config,
    resolver: Resolver,
    runner: R,
}

impl K30Reader {
    /// Reader that runs gatttool under the configured timeout.
    pub fn new(config: K30Config, resolver: Resolver) -> Self {
        let runner = BoundedExecutor::new(Duration::from_secs(config.timeout_secs));
        Self::with_runner(config, resolver, runner)
    }
}

impl<R: CommandRunner> K30Reader<R> {
    pub fn with_runner(config: K30Config, resolver: Resolver, runner: R) -> Self {
        Self {
            config,
            resolver,
            runner,
        }
    }

    pub fn config(&self) -> &K30Config {
        &self.config
    }

    /// Parameters as they would resolve right now.
    pub fn params(&self) -> K30Params {
        K30Params::resolve(&self.config, &self.resolver)
    }
}

impl<R: CommandRunner> Collector for K30Reader<R> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Read the K30 CO2 sensor over Bluetooth with gatttool"
    }

    fn sample_config(&self) -> &'static str {
        SAMPLE_CONFIG
    }

    async fn gather(&self, acc: &mut dyn Accumulator) -> Result<(), CollectorError> {
        let command_line = self.params().command_line();
        debug!(command = %command_line, "Reading K30");

        let output = self.runner.run(&command_line).await?;
        let co2 = gatt::decode(&output)?;

        debug!(co2, "K30 reading decoded");

        let mut fields = Fields::new();
        fields.insert(FIELD.to_string(), co2.into());
        let mut tags = Tags::new();
        tags.insert("sensor".to_string(), SENSOR_TAG.to_string());

        acc.add_fields(NAME, fields, tags);
        Ok(())
    }
}
