//! FILENAME: tests/test_definition.rs
//! Integration tests for JSON-configured clouds.

mod common;

use cloud_engine::{coords, CloudDefinition, Filter, Measure, Record, Value};
use common::SalesFixture;

const SALES_SCHEMA: &str = r#"{
    "axes": [
        {"name": "region"},
        {"name": "product"}
    ],
    "default": 0,
    "measure": {"kind": "sum", "field": "amount"}
}"#;

#[test]
fn test_schema_driven_sales_cloud() {
    let def = CloudDefinition::from_json(SALES_SCHEMA).unwrap();
    let mut cloud = def.build::<Record>().unwrap();
    let loaded = def.load(&mut cloud, SalesFixture::records()).unwrap();

    assert_eq!(loaded, SalesFixture::data().len());
    assert_eq!(cloud.value_at(coords!["US", "Gadget"]), Ok(&Value::Int(150)));
    assert_eq!(cloud.sum(&[Filter::equals("product", "Widget")]), Ok(Value::Int(510)));
    assert_eq!(cloud.sum(&[]), Ok(Value::Int(SalesFixture::total() as i64)));
}

#[test]
fn test_schema_over_raw_json_rows() {
    let def = CloudDefinition::from_json(
        r#"{"axes": [{"name": "status", "field": "state"}], "measure": {"kind": "count"}}"#,
    )
    .unwrap();
    assert_eq!(def.measure, Measure::Count);

    let rows: Vec<serde_json::Value> = serde_json::from_str(
        r#"[{"state": "open"}, {"state": "open"}, {"state": "done"}, {"state": null}]"#,
    )
    .unwrap();

    let mut cloud = def.build::<serde_json::Value>().unwrap();
    def.load(&mut cloud, rows).unwrap();

    assert_eq!(cloud.get(&coords!["open"]), Some(&Value::Int(2)));
    assert_eq!(cloud.get(&coords![Value::None]), Some(&Value::Int(1)));
    assert_eq!(cloud.sum(&[Filter::within("status", ["open", "done"])]), Ok(Value::Int(3)));
}

#[test]
fn test_schema_rows_missing_an_axis_field() {
    let def = CloudDefinition::from_json(SALES_SCHEMA).unwrap();
    let mut cloud = def.build::<Record>().unwrap();
    let rows = vec![Record::new().with("region", "EU").with("amount", 1)];
    assert!(def.load(&mut cloud, rows).is_err());
    assert!(cloud.is_empty());
}
