use serde::{Serialize, de::DeserializeOwned};

use crate::error::{Error, Result};

/// Wire format for published field sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// JSON (human-readable, the default).
    #[default]
    Json,

    /// CBOR (compact binary).
    Cbor,
}

/// Encode a value to bytes using the specified format.
pub fn encode<T: Serialize>(value: &T, format: Format) -> Result<Vec<u8>> {
    match format {
        Format::Json => serde_json::to_vec(value).map_err(Error::from),
        Format::Cbor => {
            let mut buf = Vec::new();
            ciborium::into_writer(value, &mut buf)?;
            Ok(buf)
        }
    }
}

/// Decode bytes to a value using the specified format.
pub fn decode<T: DeserializeOwned>(data: &[u8], format: Format) -> Result<T> {
    match format {
        Format::Json => serde_json::from_slice(data).map_err(Error::from),
        Format::Cbor => ciborium::from_reader(data).map_err(Error::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{FieldSet, FieldValue};

    fn battery_set() -> FieldSet {
        FieldSet::new("battery")
            .with_field("status", "Discharging")
            .with_field("voltage_now", 3.712)
            .with_tag("sensor", "battery")
    }

    #[test]
    fn test_cbor_preserves_mixed_fields() {
        let set = battery_set();

        let encoded = encode(&set, Format::Cbor).unwrap();
        let decoded: FieldSet = decode(&encoded, Format::Cbor).unwrap();

        assert_eq!(decoded, set);
        assert_eq!(
            decoded.field("status"),
            Some(&FieldValue::Text("Discharging".to_string()))
        );
    }

    #[test]
    fn test_cbor_is_smaller() {
        let set = battery_set();

        let json = encode(&set, Format::Json).unwrap();
        let cbor = encode(&set, Format::Cbor).unwrap();

        assert!(cbor.len() < json.len(), "CBOR should be smaller than JSON");
    }

    #[test]
    fn test_cbor_bytes_are_not_json() {
        let cbor = encode(&battery_set(), Format::Cbor).unwrap();
        let result: Result<FieldSet> = decode(&cbor, Format::Json);
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_format_names() {
        let format: Format = serde_json::from_str("\"cbor\"").unwrap();
        assert_eq!(format, Format::Cbor);
        assert_eq!(Format::default(), Format::Json);
    }
}
