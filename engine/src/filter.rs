//! FILENAME: engine/src/filter.rs
//! PURPOSE: Filter criteria over coordinate tuples.
//! CONTEXT: A filter names an axis, a lookup and an operand. Lookups are
//! resolved through a `LookupRegistry`, so callers can add predicates without
//! touching the matching code. The `axis__lookup` string form exists only as a
//! parsing front-end (`Filter::from_key`).
//!
//! BUILT-IN LOOKUPS:
//! - `equals`: actual == operand
//! - `in`:     actual is one of the operand values

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{CloudError, CloudResult};
use crate::value::{Coordinate, Value};

/// Separator between axis name and lookup name in filter keys.
pub const LOOKUP_SEPARATOR: &str = "__";

// ============================================================================
// LOOKUP
// ============================================================================

/// A named comparison operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lookup {
    Equals,
    In,
    /// A caller-registered lookup, by name.
    Custom(String),
}

impl Lookup {
    pub fn name(&self) -> &str {
        match self {
            Lookup::Equals => "equals",
            Lookup::In => "in",
            Lookup::Custom(name) => name,
        }
    }
}

impl Default for Lookup {
    fn default() -> Self {
        Lookup::Equals
    }
}

impl FromStr for Lookup {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equals" => Ok(Lookup::Equals),
            "in" => Ok(Lookup::In),
            "" => Err(CloudError::UnknownLookup(s.to_string())),
            other if other.contains(LOOKUP_SEPARATOR) => {
                Err(CloudError::UnknownLookup(other.to_string()))
            }
            other => Ok(Lookup::Custom(other.to_string())),
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// OPERAND
// ============================================================================

/// Right-hand side of a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Value(Value),
    Set(Vec<Value>),
}

impl Operand {
    /// Membership test. A single value behaves as a one-element set.
    pub fn contains(&self, actual: &Coordinate) -> bool {
        match self {
            Operand::Value(v) => v == actual,
            Operand::Set(values) => values.contains(actual),
        }
    }
}

macro_rules! impl_operand_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Operand {
                fn from(v: $t) -> Self {
                    Operand::Value(Value::from(v))
                }
            }
        )*
    };
}

impl_operand_from_scalar!(Value, &str, String, bool, i32, i64, u32, f64);

impl From<Vec<Value>> for Operand {
    fn from(values: Vec<Value>) -> Self {
        Operand::Set(values)
    }
}

/// Builds a set operand for `in` lookups.
pub fn one_of<I, T>(values: I) -> Operand
where
    I: IntoIterator<Item = T>,
    T: Into<Value>,
{
    Operand::Set(values.into_iter().map(Into::into).collect())
}

// ============================================================================
// FILTER
// ============================================================================

/// One criterion: `axis <lookup> operand`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub axis: String,
    #[serde(default)]
    pub lookup: Lookup,
    pub operand: Operand,
}

impl Filter {
    pub fn new(axis: impl Into<String>, lookup: Lookup, operand: impl Into<Operand>) -> Self {
        Filter {
            axis: axis.into(),
            lookup,
            operand: operand.into(),
        }
    }

    pub fn equals(axis: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::new(axis, Lookup::Equals, Operand::Value(value.into()))
    }

    pub fn within<I, T>(axis: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Filter::new(axis, Lookup::In, one_of(values))
    }

    /// Parses a filter key of the form `axis` or `axis__lookup`.
    /// A key without a suffix uses `equals`.
    pub fn from_key(key: &str, operand: impl Into<Operand>) -> CloudResult<Self> {
        let (axis, lookup) = match key.split_once(LOOKUP_SEPARATOR) {
            Some((axis, lookup)) => (axis, lookup.parse::<Lookup>()?),
            None => (key, Lookup::Equals),
        };
        if axis.is_empty() {
            return Err(CloudError::UnknownAxis(key.to_string()));
        }
        Ok(Filter::new(axis, lookup, operand))
    }

    /// The `axis__lookup` key this filter would be written as.
    pub fn key(&self) -> String {
        match self.lookup {
            Lookup::Equals => self.axis.clone(),
            ref lookup => format!("{}{}{}", self.axis, LOOKUP_SEPARATOR, lookup),
        }
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Predicate signature: `(operand, actual) -> matches`.
pub type LookupFn = Arc<dyn Fn(&Operand, &Coordinate) -> CloudResult<bool> + Send + Sync>;

/// Maps lookups to predicates. Starts with `equals` and `in`.
#[derive(Clone)]
pub struct LookupRegistry {
    lookups: FxHashMap<Lookup, LookupFn>,
}

impl LookupRegistry {
    pub fn new() -> Self {
        let mut registry = LookupRegistry {
            lookups: FxHashMap::default(),
        };
        registry.register(Lookup::Equals, |operand, actual| match operand {
            Operand::Value(v) => Ok(v == actual),
            Operand::Set(_) => Err(CloudError::InvalidOperand {
                lookup: "equals".to_string(),
                message: "expected a single value, found a set".to_string(),
            }),
        });
        registry.register(Lookup::In, |operand, actual| Ok(operand.contains(actual)));
        registry
    }

    /// Registers (or replaces) the predicate for a lookup.
    pub fn register<F>(&mut self, lookup: Lookup, predicate: F)
    where
        F: Fn(&Operand, &Coordinate) -> CloudResult<bool> + Send + Sync + 'static,
    {
        self.lookups.insert(lookup, Arc::new(predicate));
    }

    pub fn get(&self, lookup: &Lookup) -> Option<&LookupFn> {
        self.lookups.get(lookup)
    }

    pub fn contains(&self, lookup: &Lookup) -> bool {
        self.lookups.contains_key(lookup)
    }

    /// Evaluates a lookup against one coordinate.
    pub fn test(&self, lookup: &Lookup, operand: &Operand, actual: &Coordinate) -> CloudResult<bool> {
        let predicate = self
            .lookups
            .get(lookup)
            .ok_or_else(|| CloudError::UnknownLookup(lookup.name().to_string()))?;
        predicate(operand, actual)
    }
}

impl Default for LookupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LookupRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.lookups.keys().map(Lookup::name).collect();
        names.sort_unstable();
        f.debug_struct("LookupRegistry").field("lookups", &names).finish()
    }
}
