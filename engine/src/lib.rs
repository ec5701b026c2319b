//! FILENAME: engine/src/lib.rs
//! PURPOSE: Main library entry point for the data cloud engine.
//! CONTEXT: A cloud indexes rows by a tuple of coordinates, one per axis, and
//! keeps one value per coordinate tuple. Rows are folded into values during
//! loading. Points are read back by coordinates or by filters, and matched
//! values can be aggregated.
//!
//! Layers:
//! - `value` / `record`: scalars and rows
//! - `axis`: how a row maps onto one coordinate
//! - `cloud`: storage, lookup, ingestion, filtering
//! - `filter` / `aggregate`: query criteria and numeric aggregation
//! - `definition`: serializable configuration (what a cloud IS)
//! - `shared`: lock-guarded handle for multi-threaded callers

pub mod aggregate;
pub mod axis;
pub mod cloud;
pub mod definition;
pub mod error;
pub mod filter;
pub mod record;
pub mod shared;
pub mod value;

// Re-export commonly used types at the crate root
pub use aggregate::{AggregateAccumulator, AggregationType, ExactSum, Numeric};
pub use axis::{Axis, Projection};
pub use cloud::{Cloud, Coords, DefaultPolicy};
pub use definition::{AxisDefinition, CloudDefinition, Measure};
pub use error::{CloudError, CloudResult};
pub use filter::{one_of, Filter, Lookup, LookupFn, LookupRegistry, Operand, LOOKUP_SEPARATOR};
pub use record::{Record, Row};
pub use shared::SharedCloud;
pub use value::{Coordinate, CoordinateTuple, OrderedFloat, Value};
