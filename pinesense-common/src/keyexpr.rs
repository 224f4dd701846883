/// Default key expression prefix for sensor field sets.
pub const KEY_PREFIX: &str = "pinesense/sensors";

/// Builder for PineSense key expressions.
///
/// Key expressions follow the pattern:
/// `<prefix>/<hostname>/<measurement>`
#[derive(Debug, Clone)]
pub struct KeyExprBuilder {
    prefix: String,
}

impl Default for KeyExprBuilder {
    fn default() -> Self {
        Self::new(KEY_PREFIX)
    }
}

impl KeyExprBuilder {
    /// Create a builder with a custom prefix. A trailing `/` is ignored.
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        while prefix.ends_with('/') {
            prefix.pop();
        }
        Self { prefix }
    }

    /// The configured prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Build the key a measurement from `source` is published on.
    ///
    /// # Example
    /// ```
    /// use pinesense_common::keyexpr::KeyExprBuilder;
    ///
    /// let key = KeyExprBuilder::default().build("pine64", "battery");
    /// assert_eq!(key, "pinesense/sensors/pine64/battery");
    /// ```
    pub fn build(&self, source: &str, measurement: &str) -> String {
        format!("{}/{}/{}", self.prefix, source, measurement)
    }

    /// Key the bridge status is published on.
    pub fn status_key(&self) -> String {
        format!("{}/@/status", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_builder() {
        let builder = KeyExprBuilder::new("farm/sensors/");

        assert_eq!(builder.prefix(), "farm/sensors");
        assert_eq!(
            builder.build("greenhouse", "k30_reader"),
            "farm/sensors/greenhouse/k30_reader"
        );
        assert_eq!(builder.status_key(), "farm/sensors/@/status");
    }

    #[test]
    fn test_default_prefix() {
        let builder = KeyExprBuilder::default();

        assert_eq!(builder.prefix(), KEY_PREFIX);
        assert_eq!(builder.status_key(), "pinesense/sensors/@/status");
    }
}
