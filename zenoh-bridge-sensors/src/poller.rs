//! Host collection loop.
//!
//! Collectors are polled one after the other, once per tick. Each one writes
//! into its own buffer; only a collector whose gather succeeded gets its
//! field sets published.

use std::time::Duration;

use pinesense_bridge_framework::Publisher;
use pinesense_common::FieldSet;
use tracing::{debug, error, info, warn};

use crate::collector::{Collector, CollectorError, MemoryAccumulator, SensorInput};

/// Outcome of one pass over every collector.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Field sets from collectors that succeeded, in poll order.
    pub sets: Vec<FieldSet>,
    /// Collectors that failed, with the reason.
    pub failures: Vec<(&'static str, CollectorError)>,
}

impl CycleReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Polls a fixed set of collectors.
pub struct SensorPoller<C = SensorInput> {
    collectors: Vec<C>,
    hostname: String,
    interval: Duration,
}

impl<C: Collector> SensorPoller<C> {
    pub fn new(collectors: Vec<C>, hostname: impl Into<String>, interval: Duration) -> Self {
        Self {
            collectors,
            hostname: hostname.into(),
            interval,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn collector_names(&self) -> Vec<&'static str> {
        self.collectors.iter().map(|c| c.name()).collect()
    }

    /// Gather every collector once.
    pub async fn poll_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        for collector in &self.collectors {
            let mut acc = MemoryAccumulator::new();
            match collector.gather(&mut acc).await {
                Ok(()) => report.sets.extend(acc.into_sets()),
                Err(e) => report.failures.push((collector.name(), e)),
            }
        }

        report
    }

    /// Poll and publish until the task is aborted.
    pub async fn run(self, publisher: Publisher) {
        if self.collectors.is_empty() {
            warn!("No sensor collectors registered; nothing to poll");
            return;
        }

        info!(
            hostname = %self.hostname,
            collectors = ?self.collector_names(),
            interval_secs = self.interval.as_secs(),
            "Starting sensor poller"
        );

        loop {
            let report = self.poll_cycle().await;

            for (name, e) in &report.failures {
                if e.is_timeout() {
                    error!(collector = *name, error = %e, "Sensor read timed out");
                } else {
                    error!(collector = *name, error = %e, "Sensor read failed");
                }
            }

            let stats = publisher.publish_batch(&self.hostname, &report.sets).await;
            debug!(
                published = stats.success,
                failed = stats.failed,
                "Poll cycle complete"
            );

            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::Accumulator;
    use crate::gatt::DecodeError;

    enum Fake {
        Reading(&'static str, f64),
        Broken(&'static str),
    }

    impl Collector for Fake {
        fn name(&self) -> &'static str {
            match self {
                Fake::Reading(name, _) | Fake::Broken(name) => *name,
            }
        }

        fn description(&self) -> &'static str {
            "fake"
        }

        fn sample_config(&self) -> &'static str {
            ""
        }

        async fn gather(&self, acc: &mut dyn Accumulator) -> Result<(), CollectorError> {
            match self {
                Fake::Reading(name, value) => {
                    acc.add_field_set(FieldSet::new(*name).with_field("value", *value));
                    Ok(())
                }
                Fake::Broken(_) => Err(DecodeError::MissingSeparator.into()),
            }
        }
    }

    #[tokio::test]
    async fn test_failed_collector_does_not_block_others() {
        let poller = SensorPoller::new(
            vec![
                Fake::Reading("first", 1.0),
                Fake::Broken("broken"),
                Fake::Reading("last", 2.0),
            ],
            "host",
            Duration::from_secs(10),
        );

        let report = poller.poll_cycle().await;

        let measurements: Vec<_> = report.sets.iter().map(|s| s.measurement.as_str()).collect();
        assert_eq!(measurements, vec!["first", "last"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "broken");
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn test_empty_poller() {
        let poller: SensorPoller<Fake> = SensorPoller::new(Vec::new(), "host", Duration::from_secs(1));
        let report = poller.poll_cycle().await;
        assert!(report.sets.is_empty());
        assert!(report.is_success());
        assert_eq!(poller.hostname(), "host");
    }
}
