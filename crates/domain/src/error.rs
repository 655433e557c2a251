//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`HestiaError`]
//! via `#[from]`. Adapter errors are boxed into the `Transport` or `Storage`
//! variants.

use std::error::Error as StdError;

use crate::ingredient::IngredientKind;

/// Boxed error source coming from an adapter.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Crate-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum HestiaError {
    /// A recipe submission or persisted record is malformed.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Ingredient values could not be bound onto a trigger or action.
    #[error("binding error: {0}")]
    Binding(#[from] BindError),

    /// A referenced item does not exist.
    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    /// A mutation would break a uniqueness invariant.
    #[error("integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    /// Connecting to or transmitting to hardware failed.
    #[error("transport error")]
    Transport(#[source] BoxError),

    /// Reading or writing persisted state failed.
    #[error("storage error")]
    Storage(#[source] BoxError),
}

/// Malformed recipe submission or persisted record.
///
/// Validation is fail-fast: the first violation found is reported.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("missing {key} key")]
    MissingKey { key: &'static str },

    #[error("invalid value for {key}, must be {expected}")]
    InvalidType {
        key: &'static str,
        expected: &'static str,
    },

    #[error("invalid trigger ID: {0}")]
    UnknownTrigger(String),

    #[error("invalid action ID: {0}")]
    UnknownAction(String),

    #[error("invalid {section} ingredients: {source}")]
    Ingredients {
        /// `"trigger"` or `"action"`.
        section: &'static str,
        #[source]
        source: BindError,
    },
}

impl ValidationError {
    /// Dotted path of the offending field, as reported to clients.
    #[must_use]
    pub fn field(&self) -> String {
        match self {
            Self::MissingKey { key } | Self::InvalidType { key, .. } => (*key).to_string(),
            Self::UnknownTrigger(_) => "trigger.id".to_string(),
            Self::UnknownAction(_) => "action.id".to_string(),
            Self::Ingredients { section, source } => {
                format!("{section}.ingredients.{}", source.ingredient())
            }
        }
    }
}

/// Failure while binding ingredient values onto a trigger or action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("missing required ingredient {ingredient}")]
    Missing { ingredient: &'static str },

    #[error("invalid type, {ingredient} must be {}", expected.expectation())]
    TypeMismatch {
        ingredient: &'static str,
        expected: IngredientKind,
    },

    #[error("invalid value for {ingredient}: {reason}")]
    InvalidValue {
        ingredient: &'static str,
        reason: String,
    },

    #[error("unsupported ingredient type {kind} for {ingredient}")]
    Unsupported {
        ingredient: &'static str,
        kind: IngredientKind,
    },
}

impl BindError {
    /// Id of the ingredient that failed to bind.
    #[must_use]
    pub fn ingredient(&self) -> &'static str {
        match self {
            Self::Missing { ingredient }
            | Self::TypeMismatch { ingredient, .. }
            | Self::InvalidValue { ingredient, .. }
            | Self::Unsupported { ingredient, .. } => ingredient,
        }
    }
}

/// A referenced item does not exist.
#[derive(Debug, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A uniqueness invariant would be violated.
#[derive(Debug, thiserror::Error)]
pub enum IntegrityError {
    #[error("duplicate {entity} address {address}")]
    DuplicateAddress {
        entity: &'static str,
        address: String,
    },

    #[error("duplicate recipe id {0}")]
    DuplicateRecipe(String),
}
