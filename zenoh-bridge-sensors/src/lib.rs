//! Zenoh bridge for PineSense environmental sensors.
//!
//! Polls a K30 CO2 sensor (over Bluetooth, through `gatttool`) and a sysfs
//! battery gauge, and publishes one field set per sensor and cycle.
//!
//! # Key Expressions
//!
//! ```text
//! pinesense/sensors/<hostname>/k30_reader   { co2 }
//! pinesense/sensors/<hostname>/battery      { status, voltage_now, current_now, capacity, health }
//! pinesense/sensors/@/status                bridge status
//! ```

pub mod battery;
pub mod cli;
pub mod collector;
pub mod config;
pub mod exec;
pub mod gatt;
pub mod k30;
pub mod poller;
pub mod resolve;

pub use collector::{Accumulator, Collector, CollectorError, MemoryAccumulator, SensorInput};
pub use config::SensorBridgeConfig;
pub use poller::{CycleReport, SensorPoller};
pub use resolve::{FallbackPolicy, Resolver};
