//! FILENAME: engine/src/aggregate.rs
//! PURPOSE: Numeric aggregation over the values of matched points.
//! CONTEXT: The cloud itself knows nothing about what it stores; aggregation
//! only needs a numeric view of each value, supplied by the `Numeric` trait.
//! `AggregateAccumulator` folds numbers incrementally (Welford for variance).

use serde::{Deserialize, Serialize};

use crate::value::Value;

// ============================================================================
// NUMERIC VIEW
// ============================================================================

/// A value that may be read as a number for aggregation.
/// Returning `None` from `to_f64` marks the value as non-numeric.
pub trait Numeric {
    fn to_f64(&self) -> Option<f64>;

    /// Exact integer view, for values that are integers. Floats return `None`.
    fn to_i64(&self) -> Option<i64> {
        None
    }
}

macro_rules! impl_numeric_for_integer {
    ($($t:ty),*) => {
        $(
            impl Numeric for $t {
                fn to_f64(&self) -> Option<f64> {
                    Some(*self as f64)
                }

                fn to_i64(&self) -> Option<i64> {
                    i64::try_from(*self).ok()
                }
            }
        )*
    };
}

macro_rules! impl_numeric_for_float {
    ($($t:ty),*) => {
        $(
            impl Numeric for $t {
                fn to_f64(&self) -> Option<f64> {
                    Some(*self as f64)
                }
            }
        )*
    };
}

impl_numeric_for_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);
impl_numeric_for_float!(f32, f64);

impl<T: Numeric> Numeric for Option<T> {
    fn to_f64(&self) -> Option<f64> {
        self.as_ref().and_then(Numeric::to_f64)
    }

    fn to_i64(&self) -> Option<i64> {
        self.as_ref().and_then(Numeric::to_i64)
    }
}

// ============================================================================
// EXACT SUM
// ============================================================================

/// Running total that stays an exact `i64` while every addend is an integer
/// and no addition overflows. Otherwise the total is the `f64` sum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExactSum {
    integer: Option<i64>,
    float: f64,
}

impl ExactSum {
    pub fn new() -> Self {
        ExactSum {
            integer: Some(0),
            float: 0.0,
        }
    }

    /// Adds one value. Returns `false`, leaving the total unchanged, if the value is not numeric.
    pub fn add<N: Numeric + ?Sized>(&mut self, value: &N) -> bool {
        let Some(f) = value.to_f64() else {
            return false;
        };
        self.float += f;
        self.integer = match (self.integer, value.to_i64()) {
            (Some(total), Some(i)) => total.checked_add(i),
            _ => None,
        };
        true
    }

    /// `Value::Int` for an exact integer total, `Value::Number` otherwise.
    pub fn total(&self) -> Value {
        match self.integer {
            Some(i) => Value::Int(i),
            None => Value::number(self.float),
        }
    }
}

impl Default for ExactSum {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported aggregation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationType {
    Sum,
    Count,
    Average,
    Min,
    Max,
    Product,
    StdDev,
    StdDevP,
    Var,
    VarP,
}

impl Default for AggregationType {
    fn default() -> Self {
        AggregationType::Sum
    }
}

/// Accumulator for computing aggregates incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateAccumulator {
    pub sum: f64,
    pub count: u64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub product: Option<f64>,
    /// Sum of squared differences from the running mean.
    pub m2: f64,
    pub mean: f64,
}

impl AggregateAccumulator {
    pub fn new() -> Self {
        AggregateAccumulator {
            sum: 0.0,
            count: 0,
            min: None,
            max: None,
            product: None,
            m2: 0.0,
            mean: 0.0,
        }
    }

    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;

        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.product = Some(self.product.map_or(value, |p| p * value));

        // Welford's algorithm for variance
        let delta = value - self.mean;
        self.mean += delta / (self.count as f64);
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    /// Computes the final aggregate value. Empty accumulators yield 0.
    pub fn compute(&self, aggregation: AggregationType) -> f64 {
        let n = self.count as f64;
        match aggregation {
            AggregationType::Sum => self.sum,
            AggregationType::Count => n,
            AggregationType::Average => {
                if self.count > 0 {
                    self.sum / n
                } else {
                    0.0
                }
            }
            AggregationType::Min => self.min.unwrap_or(0.0),
            AggregationType::Max => self.max.unwrap_or(0.0),
            AggregationType::Product => self.product.unwrap_or(0.0),
            AggregationType::Var => {
                if self.count > 1 {
                    self.m2 / (n - 1.0)
                } else {
                    0.0
                }
            }
            AggregationType::VarP => {
                if self.count > 0 {
                    self.m2 / n
                } else {
                    0.0
                }
            }
            AggregationType::StdDev => self.compute(AggregationType::Var).sqrt(),
            AggregationType::StdDevP => self.compute(AggregationType::VarP).sqrt(),
        }
    }
}

impl Default for AggregateAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
