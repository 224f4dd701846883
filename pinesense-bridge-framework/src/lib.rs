//! PineSense Bridge Framework
//!
//! Common abstractions for bridges that poll local sensors and publish the
//! readings to Zenoh.
//!
//! # Overview
//!
//! - [`BridgeConfig`] trait for configuration loading and validation
//! - [`BridgeRunner`] for the bridge lifecycle (startup, shutdown, signal handling)
//! - [`Publisher`] for publishing field sets with automatic serialization
//! - [`BridgeArgs`] for common CLI argument parsing
//! - [`BridgeStatus`] for standardized status reporting

mod args;
mod config;
mod error;
mod publisher;
mod runner;
mod status;

pub use args::{BridgeArgs, parse_with_default_config};
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use publisher::{PublishStats, Publisher};
pub use runner::{BridgeRunner, effective_logging};
pub use status::{BridgeState, BridgeStatus, StatusPublisher};

// Re-export commonly used types from pinesense-common
pub use pinesense_common::{FieldSet, FieldValue, Format, LoggingConfig, ZenohConfig};
