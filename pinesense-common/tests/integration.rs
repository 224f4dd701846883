//! Integration tests for pinesense-common.

use pinesense_common::{
    FieldSet, FieldValue, Format, KeyExprBuilder, LogFormat, LoggingConfig, ZenohConfig, decode,
    encode,
};

#[test]
fn test_field_set_workflow() {
    let set = FieldSet::new("battery")
        .with_field("status", "Charging")
        .with_field("voltage_now", 4.0)
        .with_field("current_now", 250000.0)
        .with_field("capacity", 87.0)
        .with_field("health", "Good")
        .with_tag("sensor", "battery");

    let json = encode(&set, Format::Json).expect("JSON encode failed");
    let text = String::from_utf8(json.clone()).unwrap();
    assert!(text.contains("\"status\":\"Charging\""));
    assert!(text.contains("\"capacity\":87.0"));
    assert!(text.contains("\"sensor\":\"battery\""));

    let decoded: FieldSet = decode(&json, Format::Json).expect("JSON decode failed");
    assert_eq!(decoded, set);

    let cbor = encode(&set, Format::Cbor).expect("CBOR encode failed");
    let from_cbor: FieldSet = decode(&cbor, Format::Cbor).expect("CBOR decode failed");
    assert_eq!(from_cbor.fields.len(), 5);
    assert_eq!(from_cbor.field("health"), Some(&FieldValue::Text("Good".into())));
}

#[test]
fn test_key_expressions() {
    let builder = KeyExprBuilder::new("pinesense/sensors/");

    assert_eq!(builder.build("pine64", "k30_reader"), "pinesense/sensors/pine64/k30_reader");
    assert_eq!(builder.status_key(), "pinesense/sensors/@/status");
}

#[test]
fn test_shared_settings_embedded_in_bridge_config() {
    #[derive(serde::Deserialize)]
    struct Outer {
        #[serde(default)]
        zenoh: ZenohConfig,
        #[serde(default)]
        logging: LoggingConfig,
        name: String,
    }

    let outer: Outer = json5::from_str(
        r#"{
            // comments are allowed in JSON5
            logging: { format: "json" },
            name: "pine64",
        }"#,
    )
    .unwrap();

    assert_eq!(outer.name, "pine64");
    assert_eq!(outer.logging.format, LogFormat::Json);
    assert_eq!(outer.logging.level, "info");
    assert_eq!(outer.zenoh.mode, "peer");
}
