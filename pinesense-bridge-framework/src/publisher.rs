//! Field set publisher for Zenoh.

use std::sync::Arc;

use pinesense_common::{FieldSet, Format, KeyExprBuilder, encode};

use crate::error::{BridgeError, Result};

/// Publishes [`FieldSet`]s to Zenoh with automatic serialization.
///
/// Each set lands on `<prefix>/<source>/<measurement>`.
#[derive(Clone, Debug)]
pub struct Publisher {
    session: Arc<zenoh::Session>,
    keys: KeyExprBuilder,
    format: Format,
}

impl Publisher {
    /// Create a new publisher.
    pub fn new(
        session: Arc<zenoh::Session>,
        key_prefix: impl Into<String>,
        format: Format,
    ) -> Self {
        Self {
            session,
            keys: KeyExprBuilder::new(key_prefix),
            format,
        }
    }

    /// Get the key prefix.
    pub fn key_prefix(&self) -> &str {
        self.keys.prefix()
    }

    /// Key expression builder bound to this publisher's prefix.
    pub fn keys(&self) -> &KeyExprBuilder {
        &self.keys
    }

    /// Get the serialization format.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Publish one field set for `source`.
    pub async fn publish(&self, source: &str, set: &FieldSet) -> Result<()> {
        let key = self.keys.build(source, &set.measurement);
        let payload =
            encode(set, self.format).map_err(|e| BridgeError::Serialization(e.to_string()))?;

        self.publish_raw(&key, payload).await
    }

    /// Publish a batch of field sets for `source`.
    ///
    /// Failures are logged and counted, not propagated.
    pub async fn publish_batch<'a, I>(&self, source: &str, sets: I) -> PublishStats
    where
        I: IntoIterator<Item = &'a FieldSet>,
    {
        let mut stats = PublishStats::default();

        for set in sets {
            match self.publish(source, set).await {
                Ok(()) => stats.success += 1,
                Err(e) => {
                    stats.failed += 1;
                    tracing::warn!(
                        measurement = %set.measurement,
                        error = %e,
                        "Failed to publish field set"
                    );
                }
            }
        }

        stats
    }

    /// Publish raw bytes to a full key.
    pub async fn publish_raw(&self, key: &str, payload: Vec<u8>) -> Result<()> {
        self.session
            .put(key, payload)
            .await
            .map_err(|e| BridgeError::Publish {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    /// Publish a JSON value to a full key.
    pub async fn publish_json<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let payload = serde_json::to_vec(value)?;
        self.publish_raw(key, payload).await
    }
}

/// Outcome counts of a batch publish.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishStats {
    /// Number of successfully published sets.
    pub success: usize,
    /// Number of failed publishes.
    pub failed: usize,
}

impl PublishStats {
    /// Total number of attempted publishes.
    pub fn total(&self) -> usize {
        self.success + self.failed
    }
}
