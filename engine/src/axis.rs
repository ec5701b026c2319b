//! FILENAME: engine/src/axis.rs
//! PURPOSE: A named rule that extracts one coordinate from a row.
//! CONTEXT: A cloud owns an ordered list of axes. The position of an axis in
//! that list is the position of its component in every coordinate tuple.

use std::fmt;

use crate::error::{CloudError, CloudResult};
use crate::record::Row;
use crate::value::Coordinate;

/// Projection function of an axis.
pub type Projection<R> = Box<dyn Fn(&R) -> CloudResult<Coordinate> + Send + Sync>;

pub struct Axis<R> {
    name: String,
    projection: Projection<R>,
}

impl<R> Axis<R> {
    /// Creates an axis with an explicit projection.
    pub fn new<F>(name: impl Into<String>, projection: F) -> Self
    where
        F: Fn(&R) -> Coordinate + Send + Sync + 'static,
    {
        Axis {
            name: name.into(),
            projection: Box::new(move |row| Ok(projection(row))),
        }
    }

    /// Creates an axis whose projection may fail, e.g. when a row lacks data.
    pub fn try_new<F>(name: impl Into<String>, projection: F) -> Self
    where
        F: Fn(&R) -> CloudResult<Coordinate> + Send + Sync + 'static,
    {
        Axis {
            name: name.into(),
            projection: Box::new(projection),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Projects the row onto the axis. Errors from the projection propagate.
    pub fn project(&self, row: &R) -> CloudResult<Coordinate> {
        (self.projection)(row)
    }
}

impl<R: Row> Axis<R> {
    /// Axis reading the field named like the axis itself.
    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::field_as(name.clone(), name)
    }

    /// Axis named `name` reading the row field `field`.
    pub fn field_as(name: impl Into<String>, field: impl Into<String>) -> Self {
        let name = name.into();
        let field = field.into();
        let axis_name = name.clone();
        Axis {
            name,
            projection: Box::new(move |row: &R| match row.field(&field) {
                Some(value) => Ok(value),
                None if row.has_field(&field) => Err(CloudError::UnhashableField {
                    axis: axis_name.clone(),
                    field: field.clone(),
                }),
                None => Err(CloudError::MissingField {
                    axis: axis_name.clone(),
                    field: field.clone(),
                }),
            }),
        }
    }
}

impl<R> fmt::Debug for Axis<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Axis").field("name", &self.name).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::value::Value;

    #[test]
    fn test_field_projection() {
        let axis: Axis<Record> = Axis::field("region");
        let row = Record::new().with("region", "EU");
        assert_eq!(axis.name(), "region");
        assert_eq!(axis.project(&row), Ok(Value::text("EU")));
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let axis: Axis<Record> = Axis::field("region");
        let row = Record::new().with("year", 2020);
        assert_eq!(
            axis.project(&row),
            Err(CloudError::MissingField {
                axis: "region".to_string(),
                field: "region".to_string(),
            })
        );
    }

    #[test]
    fn test_field_as_reads_other_field() {
        let axis: Axis<Record> = Axis::field_as("country", "cc");
        let row = Record::new().with("cc", "FR");
        assert_eq!(axis.project(&row), Ok(Value::text("FR")));
    }

    #[test]
    fn test_explicit_projection_on_plain_struct() {
        struct Sale {
            amount: f64,
        }
        let axis = Axis::new("bucket", |s: &Sale| Value::Int((s.amount / 100.0).floor() as i64));
        assert_eq!(axis.project(&Sale { amount: 250.0 }), Ok(Value::Int(2)));
    }

    #[test]
    fn test_list_field_is_not_reported_missing() {
        let axis: Axis<serde_json::Value> = Axis::field("tags");
        assert_eq!(
            axis.project(&serde_json::json!({"tags": ["a", "b"]})),
            Err(CloudError::UnhashableField {
                axis: "tags".to_string(),
                field: "tags".to_string(),
            })
        );
        assert!(matches!(
            axis.project(&serde_json::json!({"other": 1})),
            Err(CloudError::MissingField { .. })
        ));
    }
}
