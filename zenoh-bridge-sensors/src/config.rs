//! Configuration for the sensors bridge.

use pinesense_bridge_framework::{BridgeConfig, BridgeError, Format, LoggingConfig, ZenohConfig};
use serde::{Deserialize, Serialize};

use crate::resolve::FallbackPolicy;

/// Complete bridge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorBridgeConfig {
    /// Zenoh connection settings.
    #[serde(default)]
    pub zenoh: ZenohConfig,

    /// Encoding of published field sets.
    #[serde(default)]
    pub serialization: Format,

    /// Sensor polling settings.
    #[serde(default)]
    pub sensors: SensorsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Polling settings shared by all collectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorsConfig {
    /// Key expression prefix (default: "pinesense/sensors").
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Hostname used in key expressions. "auto" detects it.
    #[serde(default = "default_hostname")]
    pub hostname: String,

    /// Seconds between poll cycles (default: 10).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Fallback when neither config nor environment set a parameter.
    #[serde(default)]
    pub env_fallback: FallbackPolicy,

    #[serde(default)]
    pub k30: K30Config,

    #[serde(default)]
    pub battery: BatteryConfig,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            hostname: default_hostname(),
            poll_interval_secs: default_poll_interval(),
            env_fallback: FallbackPolicy::default(),
            k30: K30Config::default(),
            battery: BatteryConfig::default(),
        }
    }
}

fn default_key_prefix() -> String {
    pinesense_common::KEY_PREFIX.to_string()
}

fn default_hostname() -> String {
    "auto".to_string()
}

fn default_poll_interval() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    10
}

/// K30 CO2 sensor read over Bluetooth with gatttool.
///
/// Empty strings defer to the environment, then to built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct K30Config {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// gatttool executable.
    #[serde(default)]
    pub gatttool: String,

    /// Bluetooth device address.
    #[serde(default)]
    pub macaddr: String,

    /// Characteristic handle.
    #[serde(default)]
    pub varhandle: String,

    /// Extra gatttool flags.
    #[serde(default)]
    pub gattflags: String,

    /// Hard limit for one gatttool run.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for K30Config {
    fn default() -> Self {
        Self {
            enabled: true,
            gatttool: String::new(),
            macaddr: String::new(),
            varhandle: String::new(),
            gattflags: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Battery fuel gauge exposed through sysfs.
///
/// Empty strings defer to the environment, then to built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub battstatus: String,

    #[serde(default)]
    pub battvoltage: String,

    #[serde(default)]
    pub battcurrent: String,

    #[serde(default)]
    pub battcapacity: String,

    #[serde(default)]
    pub batthealth: String,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            battstatus: String::new(),
            battvoltage: String::new(),
            battcurrent: String::new(),
            battcapacity: String::new(),
            batthealth: String::new(),
        }
    }
}

impl BridgeConfig for SensorBridgeConfig {
    fn zenoh(&self) -> &ZenohConfig {
        &self.zenoh
    }

    fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    fn key_prefix(&self) -> &str {
        &self.sensors.key_prefix
    }

    fn format(&self) -> Format {
        self.serialization
    }

    fn validate(&self) -> pinesense_bridge_framework::Result<()> {
        let sensors = &self.sensors;

        if sensors.key_prefix.trim_matches('/').is_empty() {
            return Err(BridgeError::validation("key_prefix must not be empty"));
        }

        if sensors.poll_interval_secs == 0 {
            return Err(BridgeError::validation("poll_interval_secs must be > 0"));
        }

        if !sensors.k30.enabled && !sensors.battery.enabled {
            return Err(BridgeError::validation(
                "At least one collector must be enabled",
            ));
        }

        if sensors.k30.enabled {
            if sensors.k30.timeout_secs == 0 {
                return Err(BridgeError::validation("k30.timeout_secs must be > 0"));
            }
            if sensors.k30.timeout_secs > sensors.poll_interval_secs {
                return Err(BridgeError::validation(format!(
                    "k30.timeout_secs ({}) must not exceed poll_interval_secs ({})",
                    sensors.k30.timeout_secs, sensors.poll_interval_secs
                )));
            }
        }

        Ok(())
    }
}

impl SensorBridgeConfig {
    /// Get the hostname to use, resolving "auto" if needed.
    pub fn get_hostname(&self) -> String {
        if self.sensors.hostname == "auto" {
            hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_else(|| "unknown".to_string())
        } else {
            self.sensors.hostname.clone()
        }
    }

    /// Names of the collectors switched on in this configuration.
    pub fn enabled_collectors(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.sensors.k30.enabled {
            names.push(crate::k30::NAME);
        }
        if self.sensors.battery.enabled {
            names.push(crate::battery::NAME);
        }
        names
    }
}

/// Full sample configuration, with each collector's documented settings.
pub fn sample_config() -> String {
    let mut out = String::from(
        r#"// PineSense sensors bridge configuration (JSON5).
{
  zenoh: {
    mode: "peer",
    connect: [],
    listen: [],
  },

  // "json" or "cbor".
  serialization: "json",

  sensors: {
    key_prefix: "pinesense/sensors",
    // "auto" uses the system hostname.
    hostname: "auto",
    poll_interval_secs: 10,
    // "default" or "env_name".
    env_fallback: "default",

"#,
    );

    for (_, snippet) in crate::collector::sample_configs() {
        out.push_str(snippet);
        out.push('\n');
    }

    out.push_str(
        r#"  },

  logging: {
    level: "info",
    // "text" or "json".
    format: "text",
  },
}
"#,
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config = SensorBridgeConfig::parse("{}").unwrap();

        assert_eq!(config.sensors.key_prefix, "pinesense/sensors");
        assert_eq!(config.sensors.hostname, "auto");
        assert_eq!(config.sensors.poll_interval_secs, 10);
        assert_eq!(config.sensors.env_fallback, FallbackPolicy::Default);
        assert!(config.sensors.k30.enabled);
        assert!(config.sensors.k30.gatttool.is_empty());
        assert_eq!(config.sensors.k30.timeout_secs, 10);
        assert!(config.sensors.battery.enabled);
        assert_eq!(config.format(), Format::Json);
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            zenoh: { mode: "client", connect: ["tcp/10.0.0.1:7447"] },
            serialization: "cbor",
            sensors: {
                key_prefix: "farm/air",
                hostname: "greenhouse",
                poll_interval_secs: 30,
                env_fallback: "env_name",
                k30: {
                    gatttool: "/opt/bluez/gatttool",
                    macaddr: "AA:BB:CC:DD:EE:FF",
                    varhandle: "0x0010",
                    gattflags: "-t public --char-read",
                    timeout_secs: 15,
                },
                battery: {
                    enabled: false,
                    battstatus: "/sys/class/power_supply/axp20x-battery/status",
                },
            },
            logging: { level: "debug" },
        }"#;

        let config = SensorBridgeConfig::parse(json).unwrap();

        assert_eq!(config.key_prefix(), "farm/air");
        assert_eq!(config.get_hostname(), "greenhouse");
        assert_eq!(config.format(), Format::Cbor);
        assert_eq!(config.sensors.env_fallback, FallbackPolicy::EnvName);
        assert_eq!(config.sensors.k30.macaddr, "AA:BB:CC:DD:EE:FF");
        assert_eq!(config.sensors.k30.timeout_secs, 15);
        assert!(!config.sensors.battery.enabled);
        assert_eq!(config.enabled_collectors(), vec!["k30_reader"]);
    }

    #[test]
    fn test_validate_zero_interval() {
        let result = SensorBridgeConfig::parse("{ sensors: { poll_interval_secs: 0 } }");
        assert!(matches!(result, Err(BridgeError::ConfigValidation(_))));
    }

    #[test]
    fn test_validate_no_collectors() {
        let result = SensorBridgeConfig::parse(
            "{ sensors: { k30: { enabled: false }, battery: { enabled: false } } }",
        );
        assert!(matches!(result, Err(BridgeError::ConfigValidation(_))));
    }

    #[test]
    fn test_validate_timeout_longer_than_interval() {
        let result = SensorBridgeConfig::parse(
            "{ sensors: { poll_interval_secs: 5, k30: { timeout_secs: 10 } } }",
        );
        assert!(matches!(result, Err(BridgeError::ConfigValidation(msg)) if msg.contains("timeout")));

        // Irrelevant when the K30 collector is off.
        let config = SensorBridgeConfig::parse(
            "{ sensors: { poll_interval_secs: 5, k30: { enabled: false, timeout_secs: 10 } } }",
        )
        .unwrap();
        assert_eq!(config.enabled_collectors(), vec!["battery"]);
    }

    #[test]
    fn test_sample_config_is_valid() {
        let sample = sample_config();
        let config = SensorBridgeConfig::parse(&sample).unwrap();

        assert_eq!(config.enabled_collectors(), vec!["k30_reader", "battery"]);
        assert_eq!(config.sensors.poll_interval_secs, 10);
        assert!(sample.contains("VAR_HANDLE"));
        assert!(sample.contains("BATT_CAPACITY"));
    }

    #[test]
    fn test_auto_hostname_not_empty() {
        let config = SensorBridgeConfig::default();
        assert!(!config.get_hostname().is_empty());
    }
}
