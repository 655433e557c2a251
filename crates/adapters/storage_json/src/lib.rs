//! # hestia-adapter-storage-json
//!
//! Recipe persistence as one JSON file per recipe.
//!
//! ## Responsibilities
//! - Implement the `RecipeStore` port defined in `hestia-app::ports`
//! - Store each recipe record as `<recipe id>.json` inside one directory
//! - Replace files atomically (write to a temporary file, then rename)
//! - Report unreadable files individually so the rest still load
//!
//! ## Dependency rule
//! Depends on `hestia-app` (for port traits) and `hestia-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;

pub use error::StorageError;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use hestia_app::ports::{RecipeStore, StoredRecipe};
use hestia_domain::error::HestiaError;
use hestia_domain::id::RecipeId;
use hestia_domain::recipe::RecipeRecord;

const EXTENSION: &str = "json";

/// Directory-backed recipe store.
#[derive(Debug, Clone)]
pub struct JsonRecipeStore {
    dir: PathBuf,
}

impl JsonRecipeStore {
    /// Store recipes in `dir`, created on first use.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &RecipeId) -> Result<PathBuf, StorageError> {
        let id = id.as_str();
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(StorageError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{id}.{EXTENSION}")))
    }

    async fn ensure_dir(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StorageError::Io {
                path: self.dir.clone(),
                source,
            })
    }

    async fn read_record(path: &Path) -> Result<RecipeRecord, StorageError> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|source| StorageError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        serde_json::from_slice(&content).map_err(|source| StorageError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl RecipeStore for JsonRecipeStore {
    async fn load_all(&self) -> Result<Vec<StoredRecipe>, HestiaError> {
        self.ensure_dir().await?;
        let io_error = |source| StorageError::Io {
            path: self.dir.clone(),
            source,
        };

        let mut paths = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(io_error)?;
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == EXTENSION) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut stored = Vec::with_capacity(paths.len());
        for path in paths {
            let record = Self::read_record(&path).await.map_err(HestiaError::from);
            stored.push(StoredRecipe {
                source: path.display().to_string(),
                record,
            });
        }
        tracing::debug!(dir = %self.dir.display(), count = stored.len(), "recipe files listed");
        Ok(stored)
    }

    async fn save(&self, record: &RecipeRecord) -> Result<(), HestiaError> {
        let path = self.path_for(&record.identifiable.id)?;
        self.ensure_dir().await?;

        let content = serde_json::to_vec_pretty(record).map_err(|source| StorageError::Json {
            path: path.clone(),
            source,
        })?;
        let tmp = path.with_extension(format!("{EXTENSION}.tmp"));
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|source| StorageError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(path = %path.display(), "recipe saved");
        Ok(())
    }

    async fn delete(&self, id: &RecipeId) -> Result<(), HestiaError> {
        let path = self.path_for(id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "recipe file already gone");
                Ok(())
            }
            Err(source) => Err(StorageError::Io { path, source }.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hestia_domain::cookbook::{CookBook, Factories};
    use hestia_domain::recipe::Recipe;
    use serde_json::json;

    fn record(time: &str) -> RecipeRecord {
        let factories = Factories::from_cookbooks(CookBook::catalog());
        let recipe = Recipe::from_submission(
            &json!({
                "name": "Evening Lights",
                "description": "",
                "trigger": {"id": "TimeTrigger", "ingredients": {"Time": time}},
                "action": {"id": "ZoneSetLevelAction", "ingredients": {"ZoneID": "z1", "Level": 75.0}}
            }),
            &factories,
        )
        .unwrap();
        RecipeRecord::from_recipe(&recipe)
    }

    #[tokio::test]
    async fn should_create_missing_directory_and_load_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonRecipeStore::new(tmp.path().join("recipes"));
        assert!(store.load_all().await.unwrap().is_empty());
        assert!(store.dir().is_dir());
    }

    #[tokio::test]
    async fn should_write_one_file_per_recipe_and_load_it_back() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonRecipeStore::new(tmp.path());
        let record = record("20:00");
        store.save(&record).await.unwrap();

        let file = tmp.path().join(format!("{}.json", record.identifiable.id));
        assert!(file.is_file());

        let loaded = store.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].record.as_ref().unwrap(), &record);
    }

    #[tokio::test]
    async fn should_overwrite_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonRecipeStore::new(tmp.path());
        let mut record = record("20:00");
        store.save(&record).await.unwrap();
        record.enabled = false;
        store.save(&record).await.unwrap();

        let loaded = store.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(!loaded[0].record.as_ref().unwrap().enabled);
    }

    #[tokio::test]
    async fn should_report_broken_files_individually() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonRecipeStore::new(tmp.path());
        store.save(&record("07:00")).await.unwrap();
        tokio::fs::write(tmp.path().join("broken.json"), b"{ not json")
            .await
            .unwrap();
        tokio::fs::write(tmp.path().join("notes.txt"), b"ignored")
            .await
            .unwrap();

        let loaded = store.load_all().await.unwrap();
        assert_eq!(loaded.len(), 2);
        let broken = loaded
            .iter()
            .find(|s| s.source.ends_with("broken.json"))
            .unwrap();
        assert!(matches!(broken.record, Err(HestiaError::Storage(_))));
        assert_eq!(loaded.iter().filter(|s| s.record.is_ok()).count(), 1);
    }

    #[tokio::test]
    async fn should_delete_file_and_tolerate_missing_one() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonRecipeStore::new(tmp.path());
        let record = record("20:00");
        store.save(&record).await.unwrap();

        store.delete(&record.identifiable.id).await.unwrap();
        assert!(store.load_all().await.unwrap().is_empty());
        store.delete(&record.identifiable.id).await.unwrap();
    }

    #[tokio::test]
    async fn should_refuse_ids_escaping_the_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonRecipeStore::new(tmp.path());
        let err = store.delete(&RecipeId::from("../etc")).await.unwrap_err();
        assert!(matches!(err, HestiaError::Storage(_)));
    }
}
