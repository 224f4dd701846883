//! End-to-end tests of the sensors bridge without Zenoh or real hardware.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use pinesense_bridge_framework::BridgeConfig;
use pinesense_common::{FieldSet, Format, decode, encode};
use zenoh_bridge_sensors::battery::BatteryReader;
use zenoh_bridge_sensors::config::{BatteryConfig, K30Config};
use zenoh_bridge_sensors::exec::{CommandRunner, ExecError};
use zenoh_bridge_sensors::gatt::encode_frame;
use zenoh_bridge_sensors::k30::K30Reader;
use zenoh_bridge_sensors::{
    Accumulator, Collector, CollectorError, FallbackPolicy, Resolver, SensorBridgeConfig,
    SensorPoller,
};

/// Prints a fixed CO2 value the way gatttool does.
struct CannedGatt(f32);

impl CommandRunner for CannedGatt {
    async fn run(&self, _command_line: &str) -> Result<Vec<u8>, ExecError> {
        Ok(format!("Characteristic value/descriptor: {} \n", &encode_frame(self.0)[3..]).into_bytes())
    }
}

enum TestInput {
    K30(K30Reader<CannedGatt>),
    Battery(BatteryReader),
}

impl Collector for TestInput {
    fn name(&self) -> &'static str {
        match self {
            TestInput::K30(c) => c.name(),
            TestInput::Battery(c) => c.name(),
        }
    }

    fn description(&self) -> &'static str {
        "test"
    }

    fn sample_config(&self) -> &'static str {
        ""
    }

    async fn gather(&self, acc: &mut dyn Accumulator) -> Result<(), CollectorError> {
        match self {
            TestInput::K30(c) => c.gather(acc).await,
            TestInput::Battery(c) => c.gather(acc).await,
        }
    }
}

fn write_battery(dir: &Path, voltage: &str) {
    fs::write(dir.join("status"), "Discharging\n").unwrap();
    fs::write(dir.join("voltage_now"), voltage).unwrap();
    fs::write(dir.join("current_now"), "120000\n").unwrap();
    fs::write(dir.join("capacity"), "64\n").unwrap();
    fs::write(dir.join("health"), "Good\n").unwrap();
}

/// Resolver whose environment points the battery reader at `dir`.
fn resolver_for(dir: &Path) -> Resolver {
    let path = |name: &str| dir.join(name).to_string_lossy().into_owned();
    let env: HashMap<String, String> = [
        ("BATT_STATUS".to_string(), path("status")),
        ("BATT_VOLTAGE".to_string(), path("voltage_now")),
        ("BATT_CURRENT".to_string(), path("current_now")),
        ("BATT_CAPACITY".to_string(), path("capacity")),
        ("BATT_HEALTH".to_string(), path("health")),
    ]
    .into_iter()
    .collect();
    Resolver::with_env(FallbackPolicy::Default, env)
}

#[tokio::test]
async fn test_full_cycle() {
    let dir = tempfile::tempdir().unwrap();
    write_battery(dir.path(), "3712000\n");
    let resolver = resolver_for(dir.path());

    let poller = SensorPoller::new(
        vec![
            TestInput::K30(K30Reader::with_runner(
                K30Config::default(),
                resolver.clone(),
                CannedGatt(412.5),
            )),
            TestInput::Battery(BatteryReader::new(BatteryConfig::default(), resolver)),
        ],
        "pinephone",
        Duration::from_secs(10),
    );

    let report = poller.poll_cycle().await;
    assert!(report.is_success());
    assert_eq!(report.sets.len(), 2);

    let k30 = &report.sets[0];
    assert_eq!(k30.measurement, "k30_reader");
    assert_eq!(k30.field("co2").and_then(|v| v.as_f64()), Some(412.5));

    let battery = &report.sets[1];
    assert_eq!(battery.measurement, "battery");
    assert_eq!(battery.field("status").and_then(|v| v.as_str()), Some("Discharging"));
    let volts = battery.field("voltage_now").and_then(|v| v.as_f64()).unwrap();
    assert!((volts - 3.712).abs() < 1e-9);
    assert_eq!(battery.field("capacity").and_then(|v| v.as_f64()), Some(64.0));
}

#[tokio::test]
async fn test_broken_battery_keeps_k30_reading() {
    let dir = tempfile::tempdir().unwrap();
    write_battery(dir.path(), "garbage\n");
    let resolver = resolver_for(dir.path());

    let poller = SensorPoller::new(
        vec![
            TestInput::K30(K30Reader::with_runner(
                K30Config::default(),
                resolver.clone(),
                CannedGatt(1.0),
            )),
            TestInput::Battery(BatteryReader::new(BatteryConfig::default(), resolver)),
        ],
        "pinephone",
        Duration::from_secs(10),
    );

    let report = poller.poll_cycle().await;

    assert_eq!(report.sets.len(), 1);
    assert_eq!(report.sets[0].measurement, "k30_reader");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, "battery");
    assert!(matches!(report.failures[0].1, CollectorError::Parse { .. }));
}

#[test]
fn test_field_set_wire_encoding() {
    let set = FieldSet::new("battery")
        .with_field("status", "Charging")
        .with_field("capacity", 87.0_f64)
        .with_tag("sensor", "battery");

    let json = encode(&set, Format::Json).unwrap();
    let text = String::from_utf8(json.clone()).unwrap();
    assert!(text.contains("\"status\":\"Charging\""));
    assert!(text.contains("\"capacity\":87.0"));

    let back: FieldSet = decode(&json, Format::Json).unwrap();
    assert_eq!(back, set);

    let cbor = encode(&set, Format::Cbor).unwrap();
    let back: FieldSet = decode(&cbor, Format::Cbor).unwrap();
    assert_eq!(back, set);
}

#[test]
fn test_load_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sensors.json5");
    fs::write(
        &path,
        r#"{
            // Battery only, on a PinePhone.
            sensors: {
                hostname: "pinephone",
                poll_interval_secs: 60,
                k30: { enabled: false },
                battery: { battvoltage: "/sys/class/power_supply/axp20x-battery/voltage_now" },
            },
        }"#,
    )
    .unwrap();

    let config = SensorBridgeConfig::load(&path).unwrap();

    assert_eq!(config.get_hostname(), "pinephone");
    assert_eq!(config.enabled_collectors(), vec!["battery"]);

    let attrs = zenoh_bridge_sensors::battery::attributes(
        &config.sensors.battery,
        &Resolver::with_env(FallbackPolicy::Default, HashMap::new()),
    );
    assert_eq!(
        attrs[1].path,
        Path::new("/sys/class/power_supply/axp20x-battery/voltage_now")
    );
}

#[test]
fn test_missing_config_file() {
    let result = SensorBridgeConfig::load(Path::new("/nonexistent/sensors.json5"));
    assert!(result.is_err());
}
