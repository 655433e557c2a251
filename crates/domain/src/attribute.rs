//! Typed feature attribute values carried by reporting events.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Attribute name holding a zone's intensity level (0–100).
pub const LEVEL: &str = "level";

/// Attribute name → value, as reported for a single feature.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// A single typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// Numeric view of the value, if it is numeric.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Bool(_) | Self::String(_) => None,
        }
    }
}

/// Attributes describing a zone at `level`.
#[must_use]
pub fn level(level: f32) -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert(LEVEL.to_string(), AttributeValue::Float(f64::from(level)));
    attrs
}
