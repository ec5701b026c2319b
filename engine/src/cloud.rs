//! FILENAME: engine/src/cloud.rs
//! PURPOSE: The multi-dimensional store: axes, points and the default-value policy.
//! CONTEXT: A `Cloud` maps coordinate tuples (one component per axis) to values.
//! Reading a coordinate that was never written materializes it with the
//! default policy. That path is `get_or_insert_default`, and every lookup that
//! can create a point takes `&mut self`. Filtering and aggregation only read.
//!
//! Storage keeps points in insertion order: an entry vector plus a hash index
//! from tuple to entry position. Points are never removed, so positions stay valid.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::aggregate::{AggregateAccumulator, AggregationType, ExactSum, Numeric};
use crate::axis::Axis;
use crate::error::{CloudError, CloudResult};
use crate::filter::{Filter, Lookup, LookupRegistry, Operand};
use crate::value::{Coordinate, CoordinateTuple, Value};

// ============================================================================
// DEFAULT POLICY
// ============================================================================

/// How the value of a never-seen coordinate is produced.
pub enum DefaultPolicy<V> {
    /// Every new point starts from a clone of this value.
    Constant(V),
    /// Called once per new point.
    Generator(Box<dyn Fn() -> V + Send + Sync>),
}

impl<V> DefaultPolicy<V> {
    pub fn generator<F>(f: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
    {
        DefaultPolicy::Generator(Box::new(f))
    }
}

impl<V: Clone> DefaultPolicy<V> {
    pub fn produce(&self) -> V {
        match self {
            DefaultPolicy::Constant(v) => v.clone(),
            DefaultPolicy::Generator(f) => f(),
        }
    }
}

impl<V: Default + 'static> Default for DefaultPolicy<V> {
    fn default() -> Self {
        DefaultPolicy::Generator(Box::new(V::default))
    }
}

impl<V: fmt::Debug> fmt::Debug for DefaultPolicy<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultPolicy::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            DefaultPolicy::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

// ============================================================================
// COORDINATE INPUT
// ============================================================================

/// Coordinates for a point lookup, positional or by axis name.
/// Giving both forms is rejected when the coordinates are resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coords {
    positional: Vec<Coordinate>,
    named: Vec<(String, Coordinate)>,
}

impl Coords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coordinates already in axis order.
    pub fn positional<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Coords {
            positional: values.into_iter().map(Into::into).collect(),
            named: Vec::new(),
        }
    }

    /// Coordinates keyed by axis name.
    pub fn named<I, K, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<Value>,
    {
        Coords {
            positional: Vec::new(),
            named: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Appends a positional component.
    pub fn at(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Adds a named component.
    pub fn with(mut self, axis: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.push((axis.into(), value.into()));
        self
    }
}

impl From<CoordinateTuple> for Coords {
    fn from(tuple: CoordinateTuple) -> Self {
        Coords {
            positional: tuple.into_vec(),
            named: Vec::new(),
        }
    }
}

impl From<Vec<Value>> for Coords {
    fn from(values: Vec<Value>) -> Self {
        Coords {
            positional: values,
            named: Vec::new(),
        }
    }
}

// ============================================================================
// CLOUD
// ============================================================================

pub struct Cloud<R, V> {
    axes: Vec<Axis<R>>,
    /// Axis name to position in `axes`.
    axis_index: FxHashMap<String, usize>,
    /// Points in insertion order.
    entries: Vec<(CoordinateTuple, V)>,
    /// Tuple to position in `entries`.
    index: FxHashMap<CoordinateTuple, usize>,
    default: DefaultPolicy<V>,
    lookups: LookupRegistry,
}

impl<R, V> Cloud<R, V> {
    /// Creates an empty cloud. Axis names must be unique.
    pub fn new(axes: Vec<Axis<R>>, default: DefaultPolicy<V>) -> CloudResult<Self> {
        let mut axis_index = FxHashMap::default();
        for (i, axis) in axes.iter().enumerate() {
            if axis_index.insert(axis.name().to_string(), i).is_some() {
                return Err(CloudError::DuplicateAxis(axis.name().to_string()));
            }
        }

        Ok(Cloud {
            axes,
            axis_index,
            entries: Vec::new(),
            index: FxHashMap::default(),
            default,
            lookups: LookupRegistry::new(),
        })
    }

    pub fn with_constant(axes: Vec<Axis<R>>, default: V) -> CloudResult<Self> {
        Self::new(axes, DefaultPolicy::Constant(default))
    }

    pub fn with_generator<F>(axes: Vec<Axis<R>>, generator: F) -> CloudResult<Self>
    where
        F: Fn() -> V + Send + Sync + 'static,
    {
        Self::new(axes, DefaultPolicy::generator(generator))
    }

    // ------------------------------------------------------------------------
    // Schema
    // ------------------------------------------------------------------------

    pub fn axes(&self) -> &[Axis<R>] {
        &self.axes
    }

    pub fn axis_names(&self) -> Vec<&str> {
        self.axes.iter().map(Axis::name).collect()
    }

    /// Number of axes, i.e. the length of every coordinate tuple.
    pub fn arity(&self) -> usize {
        self.axes.len()
    }

    /// Position of the named axis, or `None` if there is no such axis.
    pub fn get_axis_index(&self, axis_name: &str) -> Option<usize> {
        self.axis_index.get(axis_name).copied()
    }

    /// Converts `(axis name, coordinate)` pairs into a tuple in axis order.
    /// Axes missing from `named` get `Value::None`. If a name repeats, its last pair wins.
    pub fn named_coords_to_tuple<K: AsRef<str>>(&self, named: &[(K, Coordinate)]) -> CoordinateTuple {
        self.axes
            .iter()
            .map(|axis| {
                named
                    .iter()
                    .rev()
                    .find(|(name, _)| name.as_ref() == axis.name())
                    .map(|(_, value)| value.clone())
                    .unwrap_or(Value::None)
            })
            .collect()
    }

    /// Registers a custom lookup usable as `axis__name` in filters.
    pub fn register_lookup<F>(&mut self, name: &str, predicate: F)
    where
        F: Fn(&Operand, &Coordinate) -> CloudResult<bool> + Send + Sync + 'static,
    {
        let lookup = name.parse::<Lookup>().unwrap_or_else(|_| Lookup::Custom(name.to_string()));
        self.lookups.register(lookup, predicate);
    }

    pub fn lookups(&self) -> &LookupRegistry {
        &self.lookups
    }

    // ------------------------------------------------------------------------
    // Projection
    // ------------------------------------------------------------------------

    /// Projects a row onto every axis.
    pub fn project(&self, row: &R) -> CloudResult<CoordinateTuple> {
        self.axes.iter().map(|axis| axis.project(row)).collect()
    }

    fn resolve(&self, coords: Coords) -> CloudResult<CoordinateTuple> {
        let Coords { positional, named } = coords;
        if !positional.is_empty() && !named.is_empty() {
            return Err(CloudError::AmbiguousArguments);
        }

        let tuple: CoordinateTuple = if named.is_empty() {
            positional.into_iter().collect()
        } else {
            for (name, _) in named.iter().filter(|(n, _)| !self.axis_index.contains_key(n)) {
                log::debug!("[CLOUD] ignoring coordinate for unknown axis '{}'", name);
            }
            self.named_coords_to_tuple(&named)
        };

        self.check_arity(&tuple)?;
        Ok(tuple)
    }

    fn check_arity(&self, tuple: &[Coordinate]) -> CloudResult<()> {
        if tuple.len() != self.axes.len() {
            return Err(CloudError::Shape {
                expected: self.axes.len(),
                actual: tuple.len(),
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Non-materializing reads
    // ------------------------------------------------------------------------

    /// Number of materialized points.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, tuple: &[Coordinate]) -> bool {
        self.index.contains_key(tuple)
    }

    /// Stored value at `tuple`, without materializing a default.
    pub fn get(&self, tuple: &[Coordinate]) -> Option<&V> {
        self.index.get(tuple).map(|&i| &self.entries[i].1)
    }

    /// Single-pass view over all materialized points, in insertion order.
    pub fn iter_points(&self) -> impl Iterator<Item = (&CoordinateTuple, &V)> + '_ {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Materialized points ordered by coordinates.
    pub fn sorted_points(&self) -> Vec<(&CoordinateTuple, &V)> {
        let mut points: Vec<_> = self.iter_points().collect();
        points.sort_by(|a, b| a.0.cmp(b.0));
        points
    }

    /// Distinct coordinates seen on one axis, sorted.
    pub fn distinct(&self, axis_name: &str) -> CloudResult<Vec<Coordinate>> {
        let position = self
            .get_axis_index(axis_name)
            .ok_or_else(|| CloudError::UnknownAxis(axis_name.to_string()))?;
        let seen: FxHashSet<&Coordinate> = self.entries.iter().map(|(k, _)| &k[position]).collect();
        let mut values: Vec<Coordinate> = seen.into_iter().cloned().collect();
        values.sort();
        Ok(values)
    }

    // ------------------------------------------------------------------------
    // Filtering
    // ------------------------------------------------------------------------

    /// Tests one filter against a coordinate tuple.
    pub fn test_for_axis(&self, tuple: &[Coordinate], filter: &Filter) -> CloudResult<bool> {
        self.check_arity(tuple)?;
        let position = self
            .get_axis_index(&filter.axis)
            .ok_or_else(|| CloudError::UnknownAxis(filter.axis.clone()))?;
        self.lookups.test(&filter.lookup, &filter.operand, &tuple[position])
    }

    /// Rejects filters naming unknown axes or lookups before any point is scanned.
    fn validate_filters(&self, filters: &[Filter]) -> CloudResult<()> {
        for filter in filters {
            if !self.axis_index.contains_key(&filter.axis) {
                return Err(CloudError::UnknownAxis(filter.axis.clone()));
            }
            if !self.lookups.contains(&filter.lookup) {
                return Err(CloudError::UnknownLookup(filter.lookup.name().to_string()));
            }
        }
        Ok(())
    }

    fn matches(&self, tuple: &[Coordinate], filters: &[Filter]) -> CloudResult<bool> {
        for filter in filters {
            if !self.test_for_axis(tuple, filter)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Points whose coordinates satisfy every filter. No filters match everything.
    pub fn points_at(&self, filters: &[Filter]) -> CloudResult<Vec<(&CoordinateTuple, &V)>> {
        self.validate_filters(filters)?;
        let mut matched = Vec::new();
        for (tuple, value) in &self.entries {
            if self.matches(tuple, filters)? {
                matched.push((tuple, value));
            }
        }
        Ok(matched)
    }

    /// Values of the points matched by `filters`.
    pub fn values_at(&self, filters: &[Filter]) -> CloudResult<Vec<&V>> {
        Ok(self.points_at(filters)?.into_iter().map(|(_, v)| v).collect())
    }

    pub fn count(&self, filters: &[Filter]) -> CloudResult<usize> {
        Ok(self.points_at(filters)?.len())
    }
}

impl<R, V: Numeric> Cloud<R, V> {
    /// Sum of the values matched by `filters`. Every matched value must be numeric.
    /// Integer values sum exactly to `Value::Int`; any float, or an `i64`
    /// overflow, gives a `Value::Number`. No match sums to `Value::Int(0)`.
    pub fn sum(&self, filters: &[Filter]) -> CloudResult<Value> {
        let mut total = ExactSum::new();
        for (tuple, value) in self.points_at(filters)? {
            if !total.add(value) {
                return Err(CloudError::NotNumeric {
                    coordinates: tuple.clone(),
                });
            }
        }
        Ok(total.total())
    }

    /// Aggregates the values matched by `filters`.
    /// `Count` counts matched points; every other aggregation requires numeric values.
    pub fn aggregate(&self, filters: &[Filter], aggregation: AggregationType) -> CloudResult<f64> {
        let points = self.points_at(filters)?;
        if aggregation == AggregationType::Count {
            return Ok(points.len() as f64);
        }

        let mut acc = AggregateAccumulator::new();
        for (tuple, value) in points {
            let n = value.to_f64().ok_or_else(|| CloudError::NotNumeric {
                coordinates: tuple.clone(),
            })?;
            acc.add(n);
        }
        Ok(acc.compute(aggregation))
    }
}

impl<R, V: Clone> Cloud<R, V> {
    // ------------------------------------------------------------------------
    // Materializing access
    // ------------------------------------------------------------------------

    /// Position of `tuple` in storage, inserting the default value first if absent.
    fn materialize(&mut self, tuple: CoordinateTuple) -> usize {
        if let Some(&i) = self.index.get(&tuple) {
            return i;
        }
        log::trace!("[CLOUD] materializing default at {:?}", tuple);
        let value = self.default.produce();
        let position = self.entries.len();
        self.index.insert(tuple.clone(), position);
        self.entries.push((tuple, value));
        position
    }

    /// The value at `tuple`, inserting the default value first if absent.
    /// Reading through here is a write whenever the point is new.
    pub fn get_or_insert_default(&mut self, tuple: CoordinateTuple) -> CloudResult<&mut V> {
        self.check_arity(&tuple)?;
        let position = self.materialize(tuple);
        Ok(&mut self.entries[position].1)
    }

    /// The point at the given coordinates, materialized from the default if new.
    pub fn point_at(&mut self, coords: impl Into<Coords>) -> CloudResult<(&CoordinateTuple, &V)> {
        let tuple = self.resolve(coords.into())?;
        let position = self.materialize(tuple);
        let (tuple, value) = &self.entries[position];
        Ok((tuple, value))
    }

    /// The value at the given coordinates. See `point_at`.
    pub fn value_at(&mut self, coords: impl Into<Coords>) -> CloudResult<&V> {
        self.point_at(coords).map(|(_, v)| v)
    }

    /// Reusable snapshot of all materialized points.
    pub fn points(&self) -> Vec<(CoordinateTuple, V)> {
        self.entries.clone()
    }

    // ------------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------------

    /// Folds rows into the cloud in input order.
    ///
    /// Each row is projected onto every axis. `make_point` then receives the row
    /// and the current value at its coordinates, and its result is stored there.
    /// The first row that fails to project aborts the load. Earlier rows stay
    /// applied and the failing row leaves storage untouched.
    /// Returns the number of rows loaded.
    pub fn load_data_with<I, F>(&mut self, rows: I, mut make_point: F) -> CloudResult<usize>
    where
        I: IntoIterator<Item = R>,
        F: FnMut(R, &V) -> V,
    {
        let before = self.entries.len();
        let mut loaded = 0;
        for row in rows {
            let tuple = self.project(&row)?;
            let position = self.materialize(tuple);
            let value = make_point(row, &self.entries[position].1);
            self.entries[position].1 = value;
            loaded += 1;
        }
        log::debug!(
            "[CLOUD] loaded {} rows, {} new points ({} total)",
            loaded,
            self.entries.len() - before,
            self.entries.len()
        );
        Ok(loaded)
    }

    /// Loads rows with last-write-wins semantics: each point holds the last row projected onto it.
    pub fn load_data<I>(&mut self, rows: I) -> CloudResult<usize>
    where
        I: IntoIterator<Item = R>,
        R: Into<V>,
    {
        self.load_data_with(rows, |row, _| row.into())
    }
}

impl<R, V: fmt::Debug> fmt::Debug for Cloud<R, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cloud")
            .field("axes", &self.axis_names())
            .field("points", &self.entries.len())
            .field("default", &self.default)
            .finish()
    }
}
