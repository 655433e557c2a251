//! Field-level validation errors and their client-facing JSON body.
//!
//! Every validation failure reported back to a caller uses the same shape:
//!
//! ```json
//! { "errors": { "trigger.id": { "message": "invalid trigger ID: Foo" } } }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{HestiaError, IntegrityError};

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted path of the field, e.g. `action.ingredients.Level`.
    pub field: String,
    /// Human readable explanation, e.g. `"required field"`.
    pub message: String,
}

/// Accumulates field errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Whether any error has been recorded.
    #[must_use]
    pub fn has(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }
}

/// Message wrapper inside an [`ErrorBody`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMessage {
    pub message: String,
}

/// The uniform validation error body sent back to clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub errors: BTreeMap<String, FieldMessage>,
}

impl From<&FieldErrors> for ErrorBody {
    fn from(errors: &FieldErrors) -> Self {
        let errors = errors
            .iter()
            .map(|e| {
                (
                    e.field.clone(),
                    FieldMessage {
                        message: e.message.clone(),
                    },
                )
            })
            .collect();
        Self { errors }
    }
}

impl From<&HestiaError> for ErrorBody {
    fn from(err: &HestiaError) -> Self {
        let mut errors = FieldErrors::new();
        match err {
            HestiaError::Validation(e) => errors.add(e.field(), e.to_string()),
            HestiaError::Binding(e) => errors.add(e.ingredient(), e.to_string()),
            HestiaError::NotFound(e) => errors.add("id", e.to_string()),
            HestiaError::Integrity(e @ IntegrityError::DuplicateAddress { .. }) => {
                errors.add("address", e.to_string());
            }
            HestiaError::Integrity(e @ IntegrityError::DuplicateRecipe(_)) => {
                errors.add("id", e.to_string());
            }
            HestiaError::Transport(_) | HestiaError::Storage(_) => {
                errors.add("_", err.to_string());
            }
        }
        Self::from(&errors)
    }
}
