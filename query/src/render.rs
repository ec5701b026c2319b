//! FILENAME: query/src/render.rs
//! PURPOSE: Executes parsed tags against named clouds.
//! CONTEXT: A value tag turns its criteria into named coordinates and reads
//! one point. A total tag turns them into filters and sums. Operands that are
//! bare identifiers come from the `Variables` context; a tag ending in
//! `as name` stores its result there and renders as an empty string.

use crate::ast::{Criterion, OperandExpr, QueryTag, TagKind};
use crate::error::{QueryError, QueryResult};
use crate::parser::parse;
use cloud_engine::{Cloud, Coords, Filter, Numeric, Operand, Value, LOOKUP_SEPARATOR};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// CONTEXT
// ============================================================================

/// Template variables visible to tag operands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variables {
    values: FxHashMap<String, Value>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    fn resolve(&self, name: &str) -> QueryResult<Value> {
        self.get(name)
            .cloned()
            .ok_or_else(|| QueryError::UndefinedVariable(name.to_string()))
    }
}

// ============================================================================
// EXECUTION
// ============================================================================

/// Result of running one tag.
#[derive(Debug, Clone, PartialEq)]
pub enum TagOutput<V> {
    Value(V),
    /// `Value::Int` when every summed value is an integer.
    Total(Value),
}

impl<V: Clone + Into<Value>> TagOutput<V> {
    pub fn to_value(&self) -> Value {
        match self {
            TagOutput::Value(v) => v.clone().into(),
            TagOutput::Total(t) => t.clone(),
        }
    }

    pub fn render(&self) -> String {
        self.to_value().to_string()
    }
}

/// Runs a parsed tag against `cloud`. The tag's cloud name and binding are ignored here.
pub fn execute<R, V>(
    tag: &QueryTag,
    cloud: &mut Cloud<R, V>,
    variables: &Variables,
) -> QueryResult<TagOutput<V>>
where
    V: Clone + Numeric,
{
    match tag.kind {
        TagKind::Value => {
            let coords = value_coords(&tag.criteria, variables)?;
            let value = cloud.value_at(coords)?;
            Ok(TagOutput::Value(value.clone()))
        }
        TagKind::Total => {
            let filters = total_filters(&tag.criteria, variables)?;
            Ok(TagOutput::Total(cloud.sum(&filters)?))
        }
    }
}

fn value_coords(criteria: &[Criterion], variables: &Variables) -> QueryResult<Coords> {
    let mut coords = Coords::new();
    for criterion in criteria {
        if criterion.key.contains(LOOKUP_SEPARATOR) {
            return Err(QueryError::LookupNotAllowed(criterion.key.clone()));
        }
        let value = match &criterion.operand {
            OperandExpr::List(_) => {
                return Err(QueryError::InvalidCriterion {
                    key: criterion.key.clone(),
                    message: "a point coordinate cannot be a list".to_string(),
                });
            }
            scalar => resolve_scalar(&criterion.key, scalar, variables)?,
        };
        coords = coords.with(criterion.key.clone(), value);
    }
    Ok(coords)
}

fn total_filters(criteria: &[Criterion], variables: &Variables) -> QueryResult<Vec<Filter>> {
    criteria
        .iter()
        .map(|criterion| -> QueryResult<Filter> {
            let operand = match &criterion.operand {
                OperandExpr::List(items) => Operand::Set(
                    items
                        .iter()
                        .map(|item| resolve_scalar(&criterion.key, item, variables))
                        .collect::<QueryResult<_>>()?,
                ),
                scalar => Operand::Value(resolve_scalar(&criterion.key, scalar, variables)?),
            };
            Ok(Filter::from_key(&criterion.key, operand)?)
        })
        .collect()
}

fn resolve_scalar(key: &str, expr: &OperandExpr, variables: &Variables) -> QueryResult<Value> {
    match expr {
        OperandExpr::Literal(value) => Ok(value.clone()),
        OperandExpr::Variable(name) => variables.resolve(name),
        OperandExpr::List(_) => Err(QueryError::InvalidCriterion {
            key: key.to_string(),
            message: "lists cannot be nested".to_string(),
        }),
    }
}

// ============================================================================
// RENDERER
// ============================================================================

/// Named clouds plus a variable context; renders tag strings to text.
pub struct Renderer<R, V> {
    clouds: FxHashMap<String, Cloud<R, V>>,
    variables: Variables,
}

impl<R, V> Renderer<R, V> {
    pub fn new(variables: Variables) -> Self {
        Renderer {
            clouds: FxHashMap::default(),
            variables,
        }
    }

    /// Registers `cloud` under `name`, returning any cloud it replaces.
    pub fn register(&mut self, name: impl Into<String>, cloud: Cloud<R, V>) -> Option<Cloud<R, V>> {
        self.clouds.insert(name.into(), cloud)
    }

    pub fn cloud(&self, name: &str) -> Option<&Cloud<R, V>> {
        self.clouds.get(name)
    }

    pub fn cloud_mut(&mut self, name: &str) -> Option<&mut Cloud<R, V>> {
        self.clouds.get_mut(name)
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut Variables {
        &mut self.variables
    }
}

impl<R, V> Renderer<R, V>
where
    V: Clone + Numeric + Into<Value>,
{
    /// Parses and runs one tag, returning its raw output.
    pub fn evaluate(&mut self, source: &str) -> QueryResult<TagOutput<V>> {
        let tag = parse(source)?;
        self.run(&tag)
    }

    /// Parses and runs one tag. A bound tag stores its result and renders as "".
    pub fn render(&mut self, source: &str) -> QueryResult<String> {
        let tag = parse(source)?;
        let output = self.run(&tag)?;

        match &tag.bind_as {
            Some(name) => {
                log::debug!("[QUERY] {} {} bound to '{}'", tag.kind, tag.cloud, name);
                self.variables.set(name.clone(), output.to_value());
                Ok(String::new())
            }
            None => Ok(output.render()),
        }
    }

    fn run(&mut self, tag: &QueryTag) -> QueryResult<TagOutput<V>> {
        let cloud = self
            .clouds
            .get_mut(&tag.cloud)
            .ok_or_else(|| QueryError::UnknownCloud(tag.cloud.clone()))?;
        execute(tag, cloud, &self.variables)
    }
}

impl<R, V> Default for Renderer<R, V> {
    fn default() -> Self {
        Self::new(Variables::new())
    }
}
