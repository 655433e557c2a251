//! Recipe manager — registry and lifecycle of every recipe.
//!
//! The manager owns the in-memory recipe list, the trigger/action factories
//! derived from the cookbook catalog, and the recipe store. Every mutation of
//! the list holds the list lock for its whole duration, store I/O included,
//! so mutations never interleave.

use std::sync::Arc;

use hestia_domain::cookbook::{CookBook, CookBookView, Factories, VariantSchema};
use hestia_domain::error::{HestiaError, IntegrityError, NotFoundError};
use hestia_domain::id::RecipeId;
use hestia_domain::recipe::{Recipe, RecipeRecord};
use tokio::sync::Mutex;

use crate::broker::EventBroker;
use crate::ports::RecipeStore;
use crate::recipe::LiveRecipe;
use crate::system::System;

pub struct RecipeManager<S> {
    store: S,
    broker: Arc<EventBroker>,
    system: Arc<System>,
    cookbooks: &'static [CookBook],
    factories: Factories,
    recipes: Mutex<Vec<Arc<LiveRecipe>>>,
}

fn not_found(id: &RecipeId) -> HestiaError {
    NotFoundError {
        entity: "Recipe",
        id: id.to_string(),
    }
    .into()
}

impl<S: RecipeStore> RecipeManager<S> {
    /// Create an empty manager using the built-in cookbook catalog.
    pub fn new(store: S, broker: Arc<EventBroker>, system: Arc<System>) -> Self {
        let cookbooks = CookBook::catalog();
        Self {
            store,
            broker,
            system,
            cookbooks,
            factories: Factories::from_cookbooks(cookbooks),
            recipes: Mutex::new(Vec::new()),
        }
    }

    /// Load every persisted recipe and start it.
    ///
    /// Entries that fail to parse or rebuild, and entries whose id was
    /// already loaded, are skipped with a warning. Returns how many recipes
    /// were started.
    ///
    /// # Errors
    ///
    /// Returns a storage error only when the store cannot be listed at all.
    #[tracing::instrument(skip(self))]
    pub async fn init(&self) -> Result<usize, HestiaError> {
        let entries = self.store.load_all().await?;
        let mut recipes = self.recipes.lock().await;
        for entry in entries {
            let recipe = match entry
                .record
                .and_then(|record| {
                    record
                        .into_recipe(&self.factories)
                        .map_err(HestiaError::from)
                })
            {
                Ok(recipe) => recipe,
                Err(err) => {
                    tracing::warn!(source = %entry.source, error = %err, "skipping unreadable recipe");
                    continue;
                }
            };
            if recipes.iter().any(|r| r.id() == recipe.id()) {
                tracing::warn!(source = %entry.source, recipe_id = %recipe.id(), "skipping duplicate recipe id");
                continue;
            }
            let live = LiveRecipe::new(recipe, Arc::clone(&self.system));
            live.start(&self.broker);
            recipes.push(live);
        }
        tracing::info!(count = recipes.len(), "recipes loaded");
        Ok(recipes.len())
    }

    /// Validate a raw submission and build a new, enabled recipe.
    ///
    /// The recipe is neither persisted nor registered.
    ///
    /// # Errors
    ///
    /// Returns [`HestiaError::Validation`] describing the first problem found.
    pub fn unmarshal_new_recipe(&self, raw: &serde_json::Value) -> Result<Recipe, HestiaError> {
        Ok(Recipe::from_submission(raw, &self.factories)?)
    }

    /// Persist `recipe` under its id; with `append`, also add it (stopped) to
    /// the in-memory list.
    ///
    /// # Errors
    ///
    /// Returns [`HestiaError::Integrity`] when appending an id already in the
    /// list (nothing is written), or a storage error.
    #[tracing::instrument(skip(self, recipe), fields(recipe_id = %recipe.id()))]
    pub async fn save_recipe(&self, recipe: Recipe, append: bool) -> Result<(), HestiaError> {
        let mut recipes = self.recipes.lock().await;
        if append && recipes.iter().any(|r| r.id() == recipe.id()) {
            return Err(IntegrityError::DuplicateRecipe(recipe.id().to_string()).into());
        }
        self.store.save(&RecipeRecord::from_recipe(&recipe)).await?;
        if append {
            recipes.push(LiveRecipe::new(recipe, Arc::clone(&self.system)));
        }
        Ok(())
    }

    /// Subscribe a listed recipe to the broker.
    ///
    /// # Errors
    ///
    /// Returns [`HestiaError::NotFound`] for an unknown id.
    #[tracing::instrument(skip(self))]
    pub async fn register_and_start(&self, id: &RecipeId) -> Result<(), HestiaError> {
        let live = self.recipe_by_id(id).await.ok_or_else(|| not_found(id))?;
        live.start(&self.broker);
        Ok(())
    }

    /// Unsubscribe a listed recipe from the broker, keeping it listed.
    ///
    /// # Errors
    ///
    /// Returns [`HestiaError::NotFound`] for an unknown id.
    #[tracing::instrument(skip(self))]
    pub async fn unregister_and_stop(&self, id: &RecipeId) -> Result<(), HestiaError> {
        let live = self.recipe_by_id(id).await.ok_or_else(|| not_found(id))?;
        live.stop(&self.broker);
        Ok(())
    }

    /// Validate, persist, list and start a submitted recipe in one go.
    ///
    /// # Errors
    ///
    /// Returns the first validation, integrity or storage error.
    pub async fn add_recipe(
        &self,
        raw: &serde_json::Value,
    ) -> Result<Arc<LiveRecipe>, HestiaError> {
        let recipe = self.unmarshal_new_recipe(raw)?;
        let id = recipe.id().clone();
        self.save_recipe(recipe, true).await?;
        self.register_and_start(&id).await?;
        self.recipe_by_id(&id).await.ok_or_else(|| not_found(&id))
    }

    pub async fn recipe_by_id(&self, id: &RecipeId) -> Option<Arc<LiveRecipe>> {
        self.recipes
            .lock()
            .await
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    /// Snapshot of the recipe list.
    pub async fn recipes(&self) -> Vec<Arc<LiveRecipe>> {
        self.recipes.lock().await.clone()
    }

    /// Enable or disable a recipe and persist the new state.
    ///
    /// Asking for the current state succeeds without touching the store.
    ///
    /// # Errors
    ///
    /// Returns [`HestiaError::NotFound`] for an unknown id, or a storage
    /// error, in which case the recipe keeps its previous state.
    #[tracing::instrument(skip(self))]
    pub async fn enable_recipe(&self, id: &RecipeId, enabled: bool) -> Result<(), HestiaError> {
        let recipes = self.recipes.lock().await;
        let live = recipes
            .iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| not_found(id))?;
        if live.enabled() == enabled {
            return Ok(());
        }
        let mut recipe = live.snapshot();
        recipe.enabled = enabled;
        self.store.save(&RecipeRecord::from_recipe(&recipe)).await?;
        live.set_enabled(enabled);
        tracing::info!(recipe_id = %id, enabled, "recipe state changed");
        Ok(())
    }

    /// Delete the persisted recipe, drop it from the list and unsubscribe it.
    ///
    /// # Errors
    ///
    /// Returns [`HestiaError::NotFound`] for an unknown id (the list is left
    /// unchanged), or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_recipe(&self, id: &RecipeId) -> Result<(), HestiaError> {
        let mut recipes = self.recipes.lock().await;
        let index = recipes
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| not_found(id))?;
        self.store.delete(id).await?;
        let live = recipes.remove(index);
        live.stop(&self.broker);
        tracing::info!(recipe_id = %id, "recipe deleted");
        Ok(())
    }

    #[must_use]
    pub fn cookbooks(&self) -> Vec<CookBookView> {
        self.cookbooks.iter().map(CookBookView::from).collect()
    }

    /// Schema of every known trigger variant.
    #[must_use]
    pub fn trigger_catalog(&self) -> Vec<VariantSchema> {
        self.factories
            .trigger_types()
            .into_iter()
            .map(|t| t.schema())
            .collect()
    }

    /// Schema of every known action variant.
    #[must_use]
    pub fn action_catalog(&self) -> Vec<VariantSchema> {
        self.factories
            .action_types()
            .into_iter()
            .map(|a| a.schema())
            .collect()
    }

    /// Stop every recipe, keeping them listed.
    pub async fn shutdown(&self) {
        for live in self.recipes.lock().await.iter() {
            live.stop(&self.broker);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_processor::command_queue;
    use crate::ports::StoredRecipe;
    use hestia_domain::command::CommandGroup;
    use hestia_domain::device::{Device, Zone};
    use hestia_domain::error::ValidationError;
    use hestia_domain::event::Event;
    use hestia_domain::id::{ButtonId, DeviceId, ZoneId};
    use hestia_domain::inventory::Inventory;
    use serde_json::{Value, json};
    use std::collections::BTreeMap;
    use std::future::Future;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct InMemoryRecipeStore {
        records: StdMutex<BTreeMap<String, RecipeRecord>>,
        broken: StdMutex<Vec<String>>,
        writes: AtomicUsize,
    }

    impl RecipeStore for Arc<InMemoryRecipeStore> {
        fn load_all(&self) -> impl Future<Output = Result<Vec<StoredRecipe>, HestiaError>> + Send {
            let mut entries: Vec<StoredRecipe> = self
                .records
                .lock()
                .unwrap()
                .iter()
                .map(|(key, record)| StoredRecipe {
                    source: key.clone(),
                    record: Ok(record.clone()),
                })
                .collect();
            for source in self.broken.lock().unwrap().iter() {
                entries.push(StoredRecipe {
                    source: source.clone(),
                    record: Err(ValidationError::MissingKey { key: "Trigger" }.into()),
                });
            }
            async { Ok(entries) }
        }

        fn save(&self, record: &RecipeRecord) -> impl Future<Output = Result<(), HestiaError>> + Send {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.records
                .lock()
                .unwrap()
                .insert(record.identifiable.id.to_string(), record.clone());
            async { Ok(()) }
        }

        fn delete(&self, id: &RecipeId) -> impl Future<Output = Result<(), HestiaError>> + Send {
            self.records.lock().unwrap().remove(id.as_str());
            async { Ok(()) }
        }
    }

    struct Fixture {
        manager: RecipeManager<Arc<InMemoryRecipeStore>>,
        store: Arc<InMemoryRecipeStore>,
        broker: Arc<EventBroker>,
        commands: mpsc::Receiver<CommandGroup>,
    }

    fn fixture_with(store: Arc<InMemoryRecipeStore>) -> Fixture {
        let mut device = Device::builder().id("bridge").address("1").build();
        device
            .add_zone(Zone::new(ZoneId::from("z1"), "Kitchen", "12"))
            .unwrap();
        let mut inventory = Inventory::new();
        inventory.add_device(device).unwrap();
        let (queue, commands) = command_queue(8);
        let system = Arc::new(System::new(inventory, queue));
        let broker = Arc::new(EventBroker::new(16));
        Fixture {
            manager: RecipeManager::new(Arc::clone(&store), Arc::clone(&broker), system),
            store,
            broker,
            commands,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(Arc::new(InMemoryRecipeStore::default()))
    }

    fn submission(button: &str) -> Value {
        json!({
            "name": "Kitchen button",
            "description": "",
            "trigger": {"id": "ButtonTrigger", "ingredients": {"ButtonID": button}},
            "action": {"id": "ZoneSetLevelAction", "ingredients": {"ZoneID": "z1", "Level": 40}}
        })
    }

    fn press(button: &str) -> Event {
        Event::button_press(DeviceId::from("k1"), ButtonId::from(button))
    }

    #[tokio::test]
    async fn should_add_persist_and_start_submitted_recipe() {
        let mut f = fixture();
        let live = f.manager.add_recipe(&submission("b1")).await.unwrap();

        assert!(live.started());
        assert!(f.store.records.lock().unwrap().contains_key(live.id().as_str()));

        f.broker.enqueue(press("b1"));
        assert!(f.commands.try_recv().is_ok());
    }

    #[tokio::test]
    async fn should_reject_invalid_submission_without_side_effects() {
        let f = fixture();
        let mut raw = submission("b1");
        raw["trigger"]["id"] = json!("Foo");
        let err = f.manager.add_recipe(&raw).await.unwrap_err();
        assert!(matches!(
            err,
            HestiaError::Validation(ValidationError::UnknownTrigger(_))
        ));
        assert!(f.manager.recipes().await.is_empty());
        assert_eq!(f.store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn should_reject_appending_duplicate_id() {
        let f = fixture();
        let recipe = f.manager.unmarshal_new_recipe(&submission("b1")).unwrap();
        f.manager.save_recipe(recipe.clone(), true).await.unwrap();

        let err = f.manager.save_recipe(recipe, true).await.unwrap_err();
        assert!(matches!(err, HestiaError::Integrity(_)));
        assert_eq!(f.store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(f.manager.recipes().await.len(), 1);
    }

    #[tokio::test]
    async fn should_never_fire_deleted_recipe() {
        let mut f = fixture();
        let live = f.manager.add_recipe(&submission("b1")).await.unwrap();
        let id = live.id().clone();

        f.manager.delete_recipe(&id).await.unwrap();
        f.broker.enqueue(press("b1"));

        assert!(f.commands.try_recv().is_err());
        assert!(!f.broker.has_consumer(id.as_str()));
        assert!(f.manager.recipe_by_id(&id).await.is_none());
        assert!(f.store.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_fail_deleting_unknown_recipe_and_keep_list() {
        let f = fixture();
        f.manager.add_recipe(&submission("b1")).await.unwrap();

        let err = f
            .manager
            .delete_recipe(&RecipeId::from("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, HestiaError::NotFound(_)));
        assert_eq!(f.manager.recipes().await.len(), 1);
    }

    #[tokio::test]
    async fn should_skip_store_write_when_enable_state_unchanged() {
        let f = fixture();
        let live = f.manager.add_recipe(&submission("b1")).await.unwrap();
        let writes = f.store.writes.load(Ordering::SeqCst);

        f.manager.enable_recipe(live.id(), true).await.unwrap();
        assert_eq!(f.store.writes.load(Ordering::SeqCst), writes);

        f.manager.enable_recipe(live.id(), false).await.unwrap();
        assert_eq!(f.store.writes.load(Ordering::SeqCst), writes + 1);
        assert!(!live.enabled());
        let stored = f.store.records.lock().unwrap()[live.id().as_str()].clone();
        assert!(!stored.enabled);
    }

    #[tokio::test]
    async fn should_pause_disabled_recipe() {
        let mut f = fixture();
        let live = f.manager.add_recipe(&submission("b1")).await.unwrap();
        f.manager.enable_recipe(live.id(), false).await.unwrap();

        f.broker.enqueue(press("b1"));
        assert!(f.commands.try_recv().is_err());
        assert!(f.broker.has_consumer(live.id().as_str()));
    }

    #[tokio::test]
    async fn should_reload_persisted_recipes_and_skip_bad_entries() {
        let first = fixture();
        let kept = first.manager.add_recipe(&submission("b1")).await.unwrap();
        first
            .manager
            .enable_recipe(kept.id(), false)
            .await
            .unwrap();
        first.store.broken.lock().unwrap().push("broken.json".to_string());

        let mut second = fixture_with(Arc::clone(&first.store));
        let loaded = second.manager.init().await.unwrap();
        assert_eq!(loaded, 1);

        let reloaded = second.manager.recipe_by_id(kept.id()).await.unwrap();
        assert!(reloaded.started());
        assert_eq!(reloaded.snapshot(), kept.snapshot());

        second.manager.enable_recipe(kept.id(), true).await.unwrap();
        second.broker.enqueue(press("b1"));
        assert!(second.commands.try_recv().is_ok());
    }

    #[tokio::test]
    async fn should_stop_every_recipe_on_shutdown() {
        let f = fixture();
        f.manager.add_recipe(&submission("b1")).await.unwrap();
        f.manager.add_recipe(&submission("b2")).await.unwrap();
        assert_eq!(f.broker.consumer_count(), 2);

        f.manager.shutdown().await;
        assert_eq!(f.broker.consumer_count(), 0);
        assert_eq!(f.manager.recipes().await.len(), 2);
    }

    #[tokio::test]
    async fn should_unregister_and_restart_listed_recipe() {
        let f = fixture();
        let live = f.manager.add_recipe(&submission("b1")).await.unwrap();

        f.manager.unregister_and_stop(live.id()).await.unwrap();
        assert!(!f.broker.has_consumer(live.id().as_str()));
        f.manager.register_and_start(live.id()).await.unwrap();
        assert!(f.broker.has_consumer(live.id().as_str()));
    }

    #[test]
    fn should_expose_catalogs() {
        let f = fixture();
        let triggers: Vec<&str> = f.manager.trigger_catalog().iter().map(|s| s.id).collect();
        assert_eq!(triggers, vec!["ButtonTrigger", "TimeTrigger"]);
        assert_eq!(f.manager.action_catalog().len(), 4);
        assert_eq!(f.manager.cookbooks()[0].name, "Lighting Bridge");
    }
}
