// Rows are ordered name -> value maps owned by a table; filters match them loosely.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Column name -> raw value, as supplied by callers for inserts and updates.
pub type RowValues = Map<String, Value>;

/// Column name -> expected value, matched as a conjunction.
pub type Filter = Map<String, Value>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    values: Map<String, Value>,
}

impl Row {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub(crate) fn set(&mut self, column: impl Into<String>, value: Value) {
        self.values.insert(column.into(), value);
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_values(self) -> Map<String, Value> {
        self.values
    }

    /// True when every filter entry loosely equals the stored value.
    pub fn matches(&self, filter: &Filter) -> bool {
        filter
            .iter()
            .all(|(column, expected)| match self.values.get(column) {
                Some(stored) => loosely_equal(stored, expected),
                None => expected.is_null(),
            })
    }
}

/// Equality that coerces numbers, numeric strings and booleans, so a filter value of
/// `"1"` selects a stored `1`. Missing columns read as `null` and match only `null`.
pub fn loosely_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => {
            false
        }
        _ => match (numeric_reading(left), numeric_reading(right)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

fn numeric_reading(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Some(0.0);
            }
            trimmed.parse::<f64>().ok().filter(|number| !number.is_nan())
        }
        _ => None,
    }
}
