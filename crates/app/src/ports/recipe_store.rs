//! Persistence port for recipe records.

use std::future::Future;

use hestia_domain::error::HestiaError;
use hestia_domain::id::RecipeId;
use hestia_domain::recipe::RecipeRecord;

/// One persisted entry, parsed or not.
///
/// A store reports unreadable entries individually so that one bad file
/// never prevents the others from loading.
#[derive(Debug)]
pub struct StoredRecipe {
    /// Where the entry came from (a file path, a key), for logging.
    pub source: String,
    pub record: Result<RecipeRecord, HestiaError>,
}

/// Persistence for [`RecipeRecord`]s, keyed by recipe id.
pub trait RecipeStore: Send + Sync {
    /// Read every persisted recipe.
    fn load_all(&self) -> impl Future<Output = Result<Vec<StoredRecipe>, HestiaError>> + Send;

    /// Create or overwrite the record stored under its recipe id.
    fn save(&self, record: &RecipeRecord) -> impl Future<Output = Result<(), HestiaError>> + Send;

    /// Remove the record stored under `id`.
    fn delete(&self, id: &RecipeId) -> impl Future<Output = Result<(), HestiaError>> + Send;
}
