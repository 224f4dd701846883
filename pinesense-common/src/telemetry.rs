use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Field name to value mapping produced by a collector.
pub type Fields = BTreeMap<String, FieldValue>;

/// Categorical labels attached to a field set (e.g. `sensor` → `battery`).
pub type Tags = BTreeMap<String, String>;

/// One cycle's worth of readings from a single sensor.
///
/// This is the unit handed from a collector to the accumulator and, from
/// there, published by the bridge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSet {
    /// Unix epoch milliseconds when the reading was taken.
    pub timestamp: i64,

    /// Measurement name (e.g., "k30_reader", "battery").
    pub measurement: String,

    /// The decoded values.
    pub fields: Fields,

    /// Labels identifying the source sensor.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: Tags,
}

impl FieldSet {
    /// Create an empty field set stamped with the current time.
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            timestamp: current_timestamp_millis(),
            measurement: measurement.into(),
            fields: Fields::new(),
            tags: Tags::new(),
        }
    }

    /// Add a field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Look up a tag by key.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Typed field value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    /// Numeric reading.
    Float(f64),

    /// Text reading (e.g. battery status).
    Text(String),
}

impl FieldValue {
    /// Numeric value, if this is a float field.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }

    /// Text value, if this is a string field.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Float(_) => None,
            FieldValue::Text(s) => Some(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float(f64::from(v))
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// Get the current timestamp in milliseconds since Unix epoch.
///
/// Returns 0 if system time is before Unix epoch (should never happen in practice).
pub fn current_timestamp_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
