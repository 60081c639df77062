//! Indexed item and its payload values
//!
//! An item is a `term` (the text users complete against), a numeric `score`
//! used for ranking, and any number of caller-supplied payload fields that
//! are carried through the store untouched.
//!
//! Payload fields are restricted to a closed set of scalar and array
//! variants. Nested objects are rejected when a payload is decoded.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Payload field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// JSON null
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Array of values
    Array(Vec<Value>),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

/// An autocomplete entry
///
/// Serializes as a flat JSON object: `term`, `score` and every payload field
/// side by side.
///
/// # Example
///
/// ```
/// use typeahead_core::Item;
///
/// let item = Item::new("Apple").with_score(10.0).with_field("kind", "fruit");
/// let json = item.to_json().unwrap();
/// assert_eq!(Item::from_json(&json).unwrap(), item);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Canonical text of the entry
    pub term: String,
    /// Ranking score, higher first
    #[serde(default)]
    pub score: f64,
    /// Caller-supplied payload fields
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl Item {
    /// Create an item with score 0 and no payload fields
    pub fn new(term: impl Into<String>) -> Self {
        Item {
            term: term.into(),
            score: 0.0,
            fields: BTreeMap::new(),
        }
    }

    /// Set the ranking score
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    /// Attach a payload field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Check the item can be indexed
    ///
    /// # Errors
    ///
    /// Returns `MalformedItem` if the term is empty or whitespace-only, or if
    /// the score is not a finite number.
    pub fn validate(&self) -> Result<()> {
        if self.term.trim().is_empty() {
            return Err(Error::malformed("item term must not be empty"));
        }
        if !self.score.is_finite() {
            return Err(Error::malformed(format!(
                "item score must be finite, got {}",
                self.score
            )));
        }
        Ok(())
    }

    /// Encode as the stored JSON payload
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode an item from JSON text
    ///
    /// # Errors
    ///
    /// `Serialization` if the text is not JSON, `MalformedItem` if the
    /// object has no string `term` or a non-numeric `score`.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_str(text)?;
        Item::try_from(raw)
    }
}

impl TryFrom<serde_json::Value> for Item {
    type Error = Error;

    fn try_from(raw: serde_json::Value) -> Result<Self> {
        let obj = raw
            .as_object()
            .ok_or_else(|| Error::malformed("item must be a JSON object"))?;
        match obj.get("term") {
            Some(serde_json::Value::String(_)) => {}
            Some(_) => return Err(Error::malformed("item term must be a string")),
            None => return Err(Error::malformed("item should have key term")),
        }
        if let Some(score) = obj.get("score") {
            if !score.is_number() {
                return Err(Error::malformed("item score must be a number"));
            }
        }
        Ok(serde_json::from_value(raw)?)
    }
}
