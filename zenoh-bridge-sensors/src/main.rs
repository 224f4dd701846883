//! Zenoh bridge for PineSense environmental sensors.
//!
//! Polls the K30 CO2 sensor and the battery gauge and publishes their
//! readings to Zenoh.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use pinesense_bridge_framework::{BridgeConfig, BridgeRunner, effective_logging};

use zenoh_bridge_sensors::cli::SensorArgs;
use zenoh_bridge_sensors::collector::{self, platform_supported};
use zenoh_bridge_sensors::config::{self as sensors_config, SensorBridgeConfig};
use zenoh_bridge_sensors::poller::SensorPoller;
use zenoh_bridge_sensors::resolve::Resolver;

#[tokio::main]
async fn main() -> Result<()> {
    let args = SensorArgs::parse_args();

    if args.sample_config {
        print!("{}", sensors_config::sample_config());
        return Ok(());
    }

    let config = SensorBridgeConfig::load(&args.bridge.config)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    if args.once {
        return run_once(&args, &config).await;
    }

    let hostname = config.get_hostname();

    let mut runner = BridgeRunner::new_with_args("sensors", config, Some(&args.bridge))
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?
        .with_status_publishing();

    let sensors = runner.config().sensors.clone();
    let resolver = Resolver::new(sensors.env_fallback);
    let collectors = collector::registry(&sensors, &resolver);

    if !platform_supported() {
        tracing::warn!("Sensor collectors are only available on Linux; nothing will be polled");
    }

    tracing::info!(
        "Sensors bridge running (prefix: {}, interval: {}s, hostname: {})",
        sensors.key_prefix,
        sensors.poll_interval_secs,
        hostname
    );

    let poller = SensorPoller::new(
        collectors,
        hostname.clone(),
        Duration::from_secs(sensors.poll_interval_secs),
    );

    let metadata = serde_json::json!({
        "hostname": hostname,
        "collectors": poller.collector_names(),
        "poll_interval_secs": sensors.poll_interval_secs,
        "env_fallback": sensors.env_fallback,
    });

    let publisher = runner.publisher();
    runner.spawn(async move {
        poller.run(publisher).await;
    });

    runner
        .run_with_metadata(Some(metadata))
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))
}

/// Poll every collector once and print the field sets as JSON lines.
async fn run_once(args: &SensorArgs, config: &SensorBridgeConfig) -> Result<()> {
    let logging = effective_logging(config.logging(), Some(&args.bridge));
    pinesense_common::init_tracing(&logging).map_err(|e| anyhow::anyhow!("{}", e))?;

    if !platform_supported() {
        tracing::warn!("Sensor collectors are only available on Linux; nothing will be polled");
    }

    let resolver = Resolver::new(config.sensors.env_fallback);
    let poller = SensorPoller::new(
        collector::registry(&config.sensors, &resolver),
        config.get_hostname(),
        Duration::from_secs(config.sensors.poll_interval_secs),
    );

    let report = poller.poll_cycle().await;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for set in &report.sets {
        serde_json::to_writer(&mut out, set)?;
        writeln!(out)?;
    }
    out.flush()?;

    for (name, e) in &report.failures {
        tracing::error!(collector = *name, error = %e, "Sensor read failed");
    }

    if report.is_success() {
        Ok(())
    } else {
        anyhow::bail!(
            "{} of {} collectors failed",
            report.failures.len(),
            poller.collector_names().len()
        )
    }
}
