//! Collector interface and the sinks collectors write into.

use std::future::Future;
use std::num::ParseFloatError;
use std::path::PathBuf;

use pinesense_common::{FieldSet, Fields, Tags};

use crate::battery::BatteryReader;
use crate::config::SensorsConfig;
use crate::exec::ExecError;
use crate::gatt::DecodeError;
use crate::k30::K30Reader;
use crate::resolve::Resolver;

/// Why a gather cycle produced nothing.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("Failed to decode sensor frame: {0}")]
    Decode(#[from] DecodeError),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid number '{value}' in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        value: String,
        #[source]
        source: ParseFloatError,
    },
}

impl CollectorError {
    /// Whether the cycle was cut off by the command deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, CollectorError::Exec(e) if e.is_timeout())
    }
}

/// Sink for the field sets a collector produces.
pub trait Accumulator: Send {
    fn add_field_set(&mut self, set: FieldSet);

    /// Add one measurement stamped with the current time.
    fn add_fields(&mut self, measurement: &str, fields: Fields, tags: Tags) {
        let mut set = FieldSet::new(measurement);
        set.fields = fields;
        set.tags = tags;
        self.add_field_set(set);
    }
}

/// Buffers field sets in memory.
///
/// The poller gives each collector a fresh buffer, so a failed cycle leaves
/// nothing behind to publish.
#[derive(Debug, Default)]
pub struct MemoryAccumulator {
    sets: Vec<FieldSet>,
}

impl MemoryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn sets(&self) -> &[FieldSet] {
        &self.sets
    }

    pub fn into_sets(self) -> Vec<FieldSet> {
        self.sets
    }
}

impl Accumulator for MemoryAccumulator {
    fn add_field_set(&mut self, set: FieldSet) {
        self.sets.push(set);
    }
}

/// A sensor that can be polled once per cycle.
pub trait Collector: Send + Sync {
    /// Short identifier, also the measurement name.
    fn name(&self) -> &'static str;

    /// One-line human description.
    fn description(&self) -> &'static str;

    /// JSON5 snippet documenting this collector's settings.
    fn sample_config(&self) -> &'static str;

    /// Read the sensor and write its field set into `acc`.
    ///
    /// On error nothing has been written.
    fn gather(
        &self,
        acc: &mut dyn Accumulator,
    ) -> impl Future<Output = Result<(), CollectorError>> + Send;
}

/// Every collector this bridge knows about.
#[derive(Debug)]
pub enum SensorInput {
    K30(K30Reader),
    Battery(BatteryReader),
}

impl Collector for SensorInput {
    fn name(&self) -> &'static str {
        match self {
            SensorInput::K30(c) => c.name(),
            SensorInput::Battery(c) => c.name(),
        }
    }

    fn description(&self) -> &'static str {
        match self {
            SensorInput::K30(c) => c.description(),
            SensorInput::Battery(c) => c.description(),
        }
    }

    fn sample_config(&self) -> &'static str {
        match self {
            SensorInput::K30(c) => c.sample_config(),
            SensorInput::Battery(c) => c.sample_config(),
        }
    }

    async fn gather(&self, acc: &mut dyn Accumulator) -> Result<(), CollectorError> {
        match self {
            SensorInput::K30(c) => c.gather(acc).await,
            SensorInput::Battery(c) => c.gather(acc).await,
        }
    }
}

/// Whether collectors are available on this build target.
pub const fn platform_supported() -> bool {
    cfg!(target_os = "linux")
}

/// Build the enabled collectors.
///
/// Empty when the target is not Linux: the sensors only exist there.
pub fn registry(config: &SensorsConfig, resolver: &Resolver) -> Vec<SensorInput> {
    if !platform_supported() {
        return Vec::new();
    }
    all_collectors(config, resolver)
}

fn all_collectors(config: &SensorsConfig, resolver: &Resolver) -> Vec<SensorInput> {
    let mut collectors = Vec::new();

    if config.k30.enabled {
        collectors.push(SensorInput::K30(K30Reader::new(
            config.k30.clone(),
            resolver.clone(),
        )));
    }

    if config.battery.enabled {
        collectors.push(SensorInput::Battery(BatteryReader::new(
            config.battery.clone(),
            resolver.clone(),
        )));
    }

    collectors
}

/// Sample snippets of every collector, enabled or not.
pub fn sample_configs() -> Vec<(&'static str, &'static str)> {
    all_collectors(&SensorsConfig::default(), &Resolver::default())
        .iter()
        .map(|c| (c.name(), c.sample_config()))
        .collect()
}
