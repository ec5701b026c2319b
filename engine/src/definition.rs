//! FILENAME: engine/src/definition.rs
//! Cloud Definition - The serializable configuration.
//!
//! This module contains the types needed to DESCRIBE a cloud: which axes it
//! has, which row field each axis reads, the default value of new points and
//! how rows are folded into points. Definitions are plain data and can be
//! loaded from JSON. `build` turns one into a working `Cloud`.

use serde::{Deserialize, Serialize};

use crate::axis::Axis;
use crate::cloud::Cloud;
use crate::error::{CloudError, CloudResult};
use crate::record::Row;
use crate::value::Value;

// ============================================================================
// AXES
// ============================================================================

/// One axis of a cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisDefinition {
    /// Axis name, used in lookups and filters.
    pub name: String,

    /// Row field to read. Defaults to the axis name.
    #[serde(default)]
    pub field: Option<String>,
}

impl AxisDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        AxisDefinition {
            name: name.into(),
            field: None,
        }
    }

    pub fn reading(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn to_axis<R: Row>(&self) -> Axis<R> {
        match &self.field {
            Some(field) => Axis::field_as(self.name.clone(), field.clone()),
            None => Axis::field(self.name.clone()),
        }
    }
}

// ============================================================================
// MEASURE
// ============================================================================

/// How rows landing on the same point are combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Measure {
    /// Number of rows per point.
    Count,
    /// Running total of a numeric field.
    Sum { field: String },
    /// Field value of the last row per point.
    Last { field: String },
}

impl Default for Measure {
    fn default() -> Self {
        Measure::Count
    }
}

impl Measure {
    /// Combines one row into the current value of its point.
    /// A row lacking a numeric `Sum` field leaves the point unchanged.
    pub fn fold<R: Row>(&self, row: &R, current: &Value) -> Value {
        match self {
            Measure::Count => add_number(current, 1.0),
            Measure::Sum { field } => match row.field(field).as_ref().and_then(Value::as_f64) {
                Some(n) => add_number(current, n),
                None => {
                    log::warn!("[CLOUD] row has no numeric '{}' field, point left unchanged", field);
                    current.clone()
                }
            },
            Measure::Last { field } => row.field(field).unwrap_or(Value::None),
        }
    }
}

/// Adds `n` to a numeric value, keeping integers integral while possible.
/// An `i64` overflow promotes to a number. `None` counts as zero.
fn add_number(current: &Value, n: f64) -> Value {
    match current {
        Value::None => add_number(&Value::Int(0), n),
        Value::Int(i) if n.fract() == 0.0 && n.abs() < 9.0e15 => match i.checked_add(n as i64) {
            Some(sum) => Value::Int(sum),
            None => Value::number(*i as f64 + n),
        },
        other => match other.as_f64() {
            Some(c) => Value::number(c + n),
            None => other.clone(),
        },
    }
}

// ============================================================================
// CLOUD DEFINITION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudDefinition {
    pub axes: Vec<AxisDefinition>,

    /// Value of a point that no row has reached yet.
    #[serde(default = "default_point_value")]
    pub default: Value,

    #[serde(default)]
    pub measure: Measure,
}

fn default_point_value() -> Value {
    Value::Int(0)
}

impl CloudDefinition {
    pub fn new(axes: Vec<AxisDefinition>) -> Self {
        CloudDefinition {
            axes,
            default: default_point_value(),
            measure: Measure::Count,
        }
    }

    pub fn with_measure(mut self, measure: Measure) -> Self {
        self.measure = measure;
        self
    }

    pub fn from_json(json: &str) -> CloudResult<Self> {
        let definition: CloudDefinition =
            serde_json::from_str(json).map_err(|e| CloudError::Definition(e.to_string()))?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn to_json(&self) -> CloudResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CloudError::Definition(e.to_string()))
    }

    pub fn validate(&self) -> CloudResult<()> {
        if let Some(axis) = self.axes.iter().find(|a| a.name.is_empty()) {
            return Err(CloudError::Definition(format!(
                "axis with empty name (field {:?})",
                axis.field
            )));
        }
        Ok(())
    }

    /// Builds an empty cloud for this definition.
    pub fn build<R: Row>(&self) -> CloudResult<Cloud<R, Value>> {
        self.validate()?;
        let axes = self.axes.iter().map(AxisDefinition::to_axis).collect();
        Cloud::with_constant(axes, self.default.clone())
    }

    /// Folds rows into `cloud` using this definition's measure.
    pub fn load<R, I>(&self, cloud: &mut Cloud<R, Value>, rows: I) -> CloudResult<usize>
    where
        R: Row,
        I: IntoIterator<Item = R>,
    {
        let measure = &self.measure;
        cloud.load_data_with(rows, |row, current| measure.fold(&row, current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords;
    use crate::filter::Filter;
    use crate::record::Record;

    const SCHEMA: &str = r#"{
        "axes": [
            {"name": "region"},
            {"name": "year", "field": "fiscal_year"}
        ],
        "measure": {"kind": "sum", "field": "n"}
    }"#;

    #[test]
    fn test_definition_from_json() {
        let def = CloudDefinition::from_json(SCHEMA).unwrap();
        assert_eq!(def.axes.len(), 2);
        assert_eq!(def.axes[1], AxisDefinition::new("year").reading("fiscal_year"));
        assert_eq!(def.default, Value::Int(0));
        assert_eq!(def.measure, Measure::Sum { field: "n".to_string() });
    }

    #[test]
    fn test_definition_build_and_load() {
        let def = CloudDefinition::from_json(SCHEMA).unwrap();
        let mut cloud = def.build::<Record>().unwrap();
        let rows = vec![
            Record::new().with("region", "EU").with("fiscal_year", 2020).with("n", 3),
            Record::new().with("region", "EU").with("fiscal_year", 2020).with("n", 2),
            Record::new().with("region", "US").with("fiscal_year", 2021).with("n", 5),
        ];
        def.load(&mut cloud, rows).unwrap();

        assert_eq!(cloud.value_at(coords!["EU", 2020]), Ok(&Value::Int(5)));
        assert_eq!(cloud.sum(&[Filter::equals("region", "EU")]), Ok(Value::Int(5)));
        assert_eq!(cloud.sum(&[]), Ok(Value::Int(10)));
    }

    #[test]
    fn test_count_measure_over_json_rows() {
        let def = CloudDefinition::new(vec![AxisDefinition::new("color")]);
        let mut cloud = def.build::<serde_json::Value>().unwrap();
        let rows = vec![
            serde_json::json!({"color": "red"}),
            serde_json::json!({"color": "red"}),
            serde_json::json!({"color": "blue"}),
        ];
        def.load(&mut cloud, rows).unwrap();
        assert_eq!(cloud.get(&coords!["red"]), Some(&Value::Int(2)));
        assert_eq!(cloud.get(&coords!["blue"]), Some(&Value::Int(1)));
    }

    #[test]
    fn test_fractional_sums_promote_to_number() {
        let def = CloudDefinition::new(vec![AxisDefinition::new("k")])
            .with_measure(Measure::Sum { field: "x".to_string() });
        let mut cloud = def.build::<Record>().unwrap();
        let rows = vec![
            Record::new().with("k", "a").with("x", 1),
            Record::new().with("k", "a").with("x", 0.5),
            Record::new().with("k", "a"),
        ];
        def.load(&mut cloud, rows).unwrap();
        assert_eq!(cloud.get(&coords!["a"]), Some(&Value::number(1.5)));
    }

    #[test]
    fn test_last_measure() {
        let def = CloudDefinition::new(vec![AxisDefinition::new("k")])
            .with_measure(Measure::Last { field: "status".to_string() });
        let mut cloud = def.build::<Record>().unwrap();
        let rows = vec![
            Record::new().with("k", "a").with("status", "open"),
            Record::new().with("k", "a").with("status", "closed"),
        ];
        def.load(&mut cloud, rows).unwrap();
        assert_eq!(cloud.get(&coords!["a"]), Some(&Value::text("closed")));
    }

    #[test]
    fn test_invalid_definitions() {
        assert!(matches!(
            CloudDefinition::from_json(r#"{"axes": [{"name": ""}]}"#),
            Err(CloudError::Definition(_))
        ));
        assert!(matches!(
            CloudDefinition::from_json(r#"{"axes": 3}"#),
            Err(CloudError::Definition(_))
        ));
        let dup = CloudDefinition::new(vec![AxisDefinition::new("a"), AxisDefinition::new("a")]);
        assert_eq!(
            dup.build::<Record>().err(),
            Some(CloudError::DuplicateAxis("a".to_string()))
        );
    }

    #[test]
    fn test_json_round_trip_of_definition() {
        let def = CloudDefinition::from_json(SCHEMA).unwrap();
        let again = CloudDefinition::from_json(&def.to_json().unwrap()).unwrap();
        assert_eq!(def, again);
    }

    #[test]
    fn test_integer_overflow_promotes_to_number() {
        let def = CloudDefinition::from_json(
            r#"{"axes": [{"name": "k"}], "default": 9223372036854775807}"#,
        )
        .unwrap();
        let mut cloud = def.build::<Record>().unwrap();
        def.load(&mut cloud, vec![Record::new().with("k", "a")]).unwrap();

        assert_eq!(
            cloud.get(&coords!["a"]),
            Some(&Value::number(i64::MAX as f64 + 1.0))
        );
    }
}
