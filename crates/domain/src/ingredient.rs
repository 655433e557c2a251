//! Ingredients — typed parameter descriptors for triggers and actions.
//!
//! Every trigger and action variant declares a static, ordered schema of
//! [`Ingredient`]s. User supplied values arrive as a JSON object keyed by
//! ingredient id and are checked against the schema by [`IngredientBinder`]
//! before any variant is constructed.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BindError;

/// Raw ingredient values keyed by ingredient id.
pub type IngredientValues = serde_json::Map<String, Value>;

/// Wire type of an ingredient value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientKind {
    String,
    Boolean,
    Integer,
    Float,
    /// Milliseconds on the wire.
    Duration,
    Datetime,
}

impl IngredientKind {
    /// Phrase used in type mismatch messages, e.g. `"an integer"`.
    #[must_use]
    pub fn expectation(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Boolean => "a boolean",
            Self::Integer => "an integer",
            Self::Float => "a float",
            Self::Duration => "an integer (milliseconds)",
            Self::Datetime => "a datetime",
        }
    }
}

impl fmt::Display for IngredientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Duration => "duration",
            Self::Datetime => "datetime",
        })
    }
}

/// A named, typed parameter of a trigger or action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ingredient {
    #[serde(rename = "ID")]
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "Type")]
    pub kind: IngredientKind,
    pub required: bool,
    /// Entity kind the value refers to (e.g. `"zone"`), for UI binding only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<&'static str>,
}

/// A value that passed its schema check.
#[derive(Debug, Clone, PartialEq)]
enum Bound {
    String(String),
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Duration(Duration),
}

/// Validated view over ingredient values for one schema.
///
/// Construction checks every declared ingredient in schema order and fails on
/// the first violation, so a binder only exists when the whole set is valid.
/// Accessors then hand out typed values, falling back to the zero value for
/// absent optional ingredients.
#[derive(Debug)]
pub struct IngredientBinder {
    bound: Vec<(&'static str, Bound)>,
}

impl IngredientBinder {
    /// Validate `values` against `schema`.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] naming the first ingredient that is missing,
    /// mistyped, out of range or of an unsupported kind.
    pub fn new(schema: &[Ingredient], values: &IngredientValues) -> Result<Self, BindError> {
        let mut bound = Vec::with_capacity(schema.len());
        for ingredient in schema {
            match values.get(ingredient.id) {
                None | Some(Value::Null) => {
                    if ingredient.required {
                        return Err(BindError::Missing {
                            ingredient: ingredient.id,
                        });
                    }
                }
                Some(value) => bound.push((ingredient.id, bind_value(ingredient, value)?)),
            }
        }
        Ok(Self { bound })
    }

    fn get(&self, id: &str) -> Option<&Bound> {
        self.bound.iter().find(|(k, _)| *k == id).map(|(_, v)| v)
    }

    #[must_use]
    pub fn string(&self, id: &str) -> String {
        match self.get(id) {
            Some(Bound::String(v)) => v.clone(),
            _ => String::new(),
        }
    }

    #[must_use]
    pub fn boolean(&self, id: &str) -> bool {
        matches!(self.get(id), Some(Bound::Boolean(true)))
    }

    #[must_use]
    pub fn integer(&self, id: &str) -> i64 {
        match self.get(id) {
            Some(Bound::Integer(v)) => *v,
            _ => 0,
        }
    }

    #[must_use]
    pub fn float(&self, id: &str) -> f64 {
        match self.get(id) {
            Some(Bound::Float(v)) => *v,
            _ => 0.0,
        }
    }

    #[must_use]
    pub fn duration(&self, id: &str) -> Duration {
        match self.get(id) {
            Some(Bound::Duration(v)) => *v,
            _ => Duration::ZERO,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bind_value(ingredient: &Ingredient, value: &Value) -> Result<Bound, BindError> {
    let mismatch = || BindError::TypeMismatch {
        ingredient: ingredient.id,
        expected: ingredient.kind,
    };
    match ingredient.kind {
        IngredientKind::String => value
            .as_str()
            .map(|s| Bound::String(s.to_string()))
            .ok_or_else(mismatch),
        IngredientKind::Boolean => value.as_bool().map(Bound::Boolean).ok_or_else(mismatch),
        IngredientKind::Integer => value
            .as_f64()
            .map(|n| Bound::Integer(n as i64))
            .ok_or_else(mismatch),
        IngredientKind::Float => value.as_f64().map(Bound::Float).ok_or_else(mismatch),
        IngredientKind::Duration => {
            let millis = value.as_f64().ok_or_else(mismatch)?;
            if millis < 0.0 || !millis.is_finite() {
                return Err(BindError::InvalidValue {
                    ingredient: ingredient.id,
                    reason: "duration must be a non-negative number of milliseconds".to_string(),
                });
            }
            Ok(Bound::Duration(Duration::from_millis(millis as u64)))
        }
        IngredientKind::Datetime => Err(BindError::Unsupported {
            ingredient: ingredient.id,
            kind: ingredient.kind,
        }),
    }
}

/// JSON representation of a duration ingredient value.
#[must_use]
pub fn duration_value(duration: Duration) -> Value {
    Value::from(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCHEMA: &[Ingredient] = &[
        Ingredient {
            id: "Name",
            name: "Name",
            description: "",
            kind: IngredientKind::String,
            required: true,
            reference: None,
        },
        Ingredient {
            id: "Count",
            name: "Count",
            description: "",
            kind: IngredientKind::Integer,
            required: false,
            reference: None,
        },
        Ingredient {
            id: "Window",
            name: "Window",
            description: "",
            kind: IngredientKind::Duration,
            required: false,
            reference: None,
        },
        Ingredient {
            id: "Armed",
            name: "Armed",
            description: "",
            kind: IngredientKind::Boolean,
            required: false,
            reference: None,
        },
    ];

    fn values(v: Value) -> IngredientValues {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn should_fail_when_required_ingredient_is_missing() {
        let err = IngredientBinder::new(SCHEMA, &values(json!({"Count": 2}))).unwrap_err();
        assert_eq!(err, BindError::Missing { ingredient: "Name" });
    }

    #[test]
    fn should_treat_null_as_missing() {
        let err = IngredientBinder::new(SCHEMA, &values(json!({"Name": null}))).unwrap_err();
        assert_eq!(err, BindError::Missing { ingredient: "Name" });
    }

    #[test]
    fn should_leave_optional_ingredients_at_zero_value() {
        let binder = IngredientBinder::new(SCHEMA, &values(json!({"Name": "x"}))).unwrap();
        assert_eq!(binder.integer("Count"), 0);
        assert_eq!(binder.duration("Window"), Duration::ZERO);
        assert!(!binder.boolean("Armed"));
    }

    #[test]
    fn should_narrow_floating_wire_numbers_to_integer() {
        let binder =
            IngredientBinder::new(SCHEMA, &values(json!({"Name": "x", "Count": 3.0}))).unwrap();
        assert_eq!(binder.integer("Count"), 3);
    }

    #[test]
    fn should_convert_milliseconds_to_duration() {
        let binder =
            IngredientBinder::new(SCHEMA, &values(json!({"Name": "x", "Window": 1500}))).unwrap();
        assert_eq!(binder.duration("Window"), Duration::from_millis(1500));
    }

    #[test]
    fn should_reject_negative_duration() {
        let err = IngredientBinder::new(SCHEMA, &values(json!({"Name": "x", "Window": -1})))
            .unwrap_err();
        assert_eq!(err.ingredient(), "Window");
        assert!(matches!(err, BindError::InvalidValue { .. }));
    }

    #[test]
    fn should_reject_type_mismatch_with_expected_kind() {
        let err = IngredientBinder::new(SCHEMA, &values(json!({"Name": 12}))).unwrap_err();
        assert_eq!(
            err,
            BindError::TypeMismatch {
                ingredient: "Name",
                expected: IngredientKind::String,
            }
        );
    }

    #[test]
    fn should_reject_supplied_datetime_value() {
        const WITH_DATETIME: &[Ingredient] = &[Ingredient {
            id: "At",
            name: "At",
            description: "",
            kind: IngredientKind::Datetime,
            required: false,
            reference: None,
        }];
        let err = IngredientBinder::new(WITH_DATETIME, &values(json!({"At": "2024-01-01"})))
            .unwrap_err();
        assert!(matches!(err, BindError::Unsupported { .. }));
        assert_eq!(
            err.to_string(),
            "unsupported ingredient type datetime for At"
        );

        assert!(IngredientBinder::new(WITH_DATETIME, &IngredientValues::new()).is_ok());
    }

    #[test]
    fn should_ignore_undeclared_values() {
        let binder =
            IngredientBinder::new(SCHEMA, &values(json!({"Name": "x", "Extra": [1, 2]}))).unwrap();
        assert_eq!(binder.string("Name"), "x");
    }

    #[test]
    fn should_serialize_schema_for_clients() {
        let json = serde_json::to_value(SCHEMA[2]).unwrap();
        assert_eq!(
            json,
            json!({
                "ID": "Window",
                "Name": "Window",
                "Description": "",
                "Type": "duration",
                "Required": false
            })
        );
    }

    #[test]
    fn should_encode_duration_as_milliseconds() {
        assert_eq!(duration_value(Duration::from_secs(2)), json!(2000));
    }
}
