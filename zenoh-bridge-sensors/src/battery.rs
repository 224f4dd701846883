//! Battery fuel gauge read from sysfs.
//!
//! Five attribute files are read in a fixed order. A file's last path
//! segment names its field and decides how its content is interpreted.

use std::path::{Path, PathBuf};

use pinesense_common::{FieldValue, Fields, Tags};
use tracing::debug;

use crate::collector::{Accumulator, Collector, CollectorError};
use crate::config::BatteryConfig;
use crate::resolve::Resolver;

/// Collector name and measurement.
pub const NAME: &str = "battery";

/// Value of the `sensor` tag.
pub const SENSOR_TAG: &str = "battery";

pub const DEFAULT_STATUS: &str = "/sys/class/power_supply/battery/status";
pub const DEFAULT_VOLTAGE: &str = "/sys/class/power_supply/battery/voltage_now";
pub const DEFAULT_CURRENT: &str = "/sys/class/power_supply/battery/current_now";
pub const DEFAULT_CAPACITY: &str = "/sys/class/power_supply/battery/capacity";
pub const DEFAULT_HEALTH: &str = "/sys/class/power_supply/battery/health";

pub const ENV_STATUS: &str = "BATT_STATUS";
pub const ENV_VOLTAGE: &str = "BATT_VOLTAGE";
pub const ENV_CURRENT: &str = "BATT_CURRENT";
pub const ENV_CAPACITY: &str = "BATT_CAPACITY";
pub const ENV_HEALTH: &str = "BATT_HEALTH";

const SAMPLE_CONFIG: &str = r#"    battery: {
      enabled: true,
      // sysfs attribute files. Empty uses env BATT_STATUS, BATT_VOLTAGE,
      // BATT_CURRENT, BATT_CAPACITY and BATT_HEALTH, then
      // /sys/class/power_supply/battery/<attribute>.
      battstatus: "",
      battvoltage: "",
      battcurrent: "",
      battcapacity: "",
      batthealth: "",
    },"#;

/// How an attribute file's content is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Text,
    Numeric,
}

impl AttributeKind {
    fn for_field(field: &str) -> Self {
        match field {
            "status" | "health" => AttributeKind::Text,
            _ => AttributeKind::Numeric,
        }
    }
}

/// One sysfs file and the field it feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub path: PathBuf,
    pub field: String,
    pub kind: AttributeKind,
}

impl Attribute {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let field = field_name(&path);
        let kind = AttributeKind::for_field(&field);
        Self { path, field, kind }
    }

    /// Interpret the file content.
    pub fn parse(&self, content: &str) -> Result<FieldValue, CollectorError> {
        match self.kind {
            AttributeKind::Text => Ok(FieldValue::Text(content.trim().to_string())),
            AttributeKind::Numeric => {
                let raw = content.trim_matches('\n');
                let value: f64 = raw.parse().map_err(|source| CollectorError::Parse {
                    path: self.path.clone(),
                    value: raw.to_string(),
                    source,
                })?;
                Ok(FieldValue::Float(convert_units(&self.field, value)))
            }
        }
    }
}

fn field_name(path: &Path) -> String {
    let text = path.to_string_lossy();
    text.rsplit('/').next().unwrap_or_default().to_string()
}

/// Scale a raw sysfs value to its published unit.
///
/// `voltage_now` is reported in microvolts and published in volts. Other
/// attributes pass through unchanged.
pub fn convert_units(field: &str, value: f64) -> f64 {
    match field {
        "voltage_now" => (value / 10000.0) * 0.01,
        _ => value,
    }
}

/// Resolve the five attribute paths, in read order.
pub fn attributes(config: &BatteryConfig, resolver: &Resolver) -> Vec<Attribute> {
    [
        (&config.battstatus, ENV_STATUS, DEFAULT_STATUS),
        (&config.battvoltage, ENV_VOLTAGE, DEFAULT_VOLTAGE),
        (&config.battcurrent, ENV_CURRENT, DEFAULT_CURRENT),
        (&config.battcapacity, ENV_CAPACITY, DEFAULT_CAPACITY),
        (&config.batthealth, ENV_HEALTH, DEFAULT_HEALTH),
    ]
    .into_iter()
    .map(|(value, env, default)| Attribute::new(resolver.resolve(value, env, default)))
    .collect()
}

/// Polls the battery attribute files.
#[derive(Debug)]
pub struct BatteryReader {
    config: BatteryConfig,
    resolver: Resolver,
}

impl BatteryReader {
    pub fn new(config: BatteryConfig, resolver: Resolver) -> Self {
        Self { config, resolver }
    }

    pub fn config(&self) -> &BatteryConfig {
        &self.config
    }

    /// Attribute files as they would resolve right now.
    pub fn attributes(&self) -> Vec<Attribute> {
        attributes(&self.config, &self.resolver)
    }

    /// Read every attribute, stopping at the first failure.
    pub async fn read_fields(&self) -> Result<Fields, CollectorError> {
        let mut fields = Fields::new();

        for attribute in self.attributes() {
            let content = tokio::fs::read_to_string(&attribute.path)
                .await
                .map_err(|source| CollectorError::Read {
                    path: attribute.path.clone(),
                    source,
                })?;

            let value = attribute.parse(&content)?;
            debug!(path = %attribute.path.display(), field = %attribute.field, %value, "Read battery attribute");
            fields.insert(attribute.field, value);
        }

        Ok(fields)
    }
}

impl Collector for BatteryReader {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Read battery state from the kernel power_supply class"
    }

    fn sample_config(&self) -> &'static str {
        SAMPLE_CONFIG
    }

    async fn gather(&self, acc: &mut dyn Accumulator) -> Result<(), CollectorError> {
        let fields = self.read_fields().await?;

        let mut tags = Tags::new();
        tags.insert("sensor".to_string(), SENSOR_TAG.to_string());

        acc.add_fields(NAME, fields, tags);
        Ok(())
    }
}
