//! Live recipe — a recipe registered with the broker.
//!
//! While started, the recipe is a broker consumer: every accepted event is fed
//! to its trigger and, when the trigger fires and the recipe is enabled, the
//! action is planned and queued on the spot. A disabled recipe stays
//! subscribed but ignores events.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hestia_domain::action::Action;
use hestia_domain::event::Event;
use hestia_domain::id::RecipeId;
use hestia_domain::recipe::{Identifiable, Recipe};
use hestia_domain::trigger::Trigger;

use crate::broker::{EventBroker, EventConsumer};
use crate::system::System;

struct Parts {
    trigger: Trigger,
    action: Action,
}

pub struct LiveRecipe {
    identifiable: Identifiable,
    enabled: AtomicBool,
    started: AtomicBool,
    parts: Mutex<Parts>,
    system: Arc<System>,
}

impl LiveRecipe {
    /// Wrap `recipe`; the result is stopped until [`start`](Self::start).
    #[must_use]
    pub fn new(recipe: Recipe, system: Arc<System>) -> Arc<Self> {
        Arc::new(Self {
            identifiable: recipe.identifiable,
            enabled: AtomicBool::new(recipe.enabled),
            started: AtomicBool::new(false),
            parts: Mutex::new(Parts {
                trigger: recipe.trigger,
                action: recipe.action,
            }),
            system,
        })
    }

    #[must_use]
    pub fn id(&self) -> &RecipeId {
        &self.identifiable.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.identifiable.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.identifiable.description
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    #[must_use]
    pub fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    fn parts(&self) -> MutexGuard<'_, Parts> {
        self.parts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to the broker. Starting twice keeps a single subscription.
    pub fn start(self: &Arc<Self>, broker: &EventBroker) {
        self.started.store(true, Ordering::SeqCst);
        broker.add_consumer(Arc::clone(self) as Arc<dyn EventConsumer>);
        tracing::info!(recipe_id = %self.id(), name = %self.name(), "recipe started");
    }

    /// Unsubscribe from the broker. Once this returns the action is never
    /// invoked again. Safe on a stopped recipe.
    pub fn stop(&self, broker: &EventBroker) {
        {
            // waits for an in-flight delivery to finish
            let _parts = self.parts();
            self.started.store(false, Ordering::SeqCst);
        }
        broker.remove_consumer(self.id().as_str());
        tracing::info!(recipe_id = %self.id(), "recipe stopped");
    }

    /// Current state as a domain recipe, for persistence.
    #[must_use]
    pub fn snapshot(&self) -> Recipe {
        let parts = self.parts();
        Recipe {
            identifiable: self.identifiable.clone(),
            enabled: self.enabled(),
            trigger: parts.trigger.clone(),
            action: parts.action.clone(),
        }
    }
}

impl EventConsumer for LiveRecipe {
    fn key(&self) -> &str {
        self.id().as_str()
    }

    fn accepts(&self, event: &Event) -> bool {
        self.parts().trigger.interested(event)
    }

    fn consume(&self, event: &Event) {
        let mut parts = self.parts();
        if !self.started() || !self.enabled() {
            return;
        }
        if !parts.trigger.evaluate(event) {
            return;
        }
        tracing::debug!(recipe_id = %self.id(), trigger = %parts.trigger, %event, "trigger fired");
        match self.system.execute(&mut parts.action) {
            Ok(group_id) => {
                tracing::info!(recipe_id = %self.id(), %group_id, "recipe action queued");
            }
            Err(err) => {
                tracing::warn!(recipe_id = %self.id(), error = %err, "recipe action failed");
            }
        }
    }
}

impl std::fmt::Debug for LiveRecipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveRecipe")
            .field("id", self.id())
            .field("name", &self.name())
            .field("enabled", &self.enabled())
            .field("started", &self.started())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_processor::command_queue;
    use hestia_domain::action::ActionType;
    use hestia_domain::command::CommandGroup;
    use hestia_domain::device::{Device, Zone};
    use hestia_domain::id::{ButtonId, DeviceId, ZoneId};
    use hestia_domain::inventory::Inventory;
    use hestia_domain::trigger::TriggerType;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn system(capacity: usize) -> (Arc<System>, mpsc::Receiver<CommandGroup>) {
        let mut device = Device::builder().id("bridge").address("1").build();
        device
            .add_zone(Zone::new(ZoneId::from("z1"), "Kitchen", "12"))
            .unwrap();
        let mut inventory = Inventory::new();
        inventory.add_device(device).unwrap();
        let (queue, rx) = command_queue(capacity);
        (Arc::new(System::new(inventory, queue)), rx)
    }

    fn recipe(zone: &str) -> Recipe {
        let trigger = TriggerType::Button
            .bind(json!({"ButtonID": "b1"}).as_object().unwrap())
            .unwrap();
        let action = ActionType::ZoneSetLevel
            .bind(json!({"ZoneID": zone, "Level": 50}).as_object().unwrap())
            .unwrap();
        Recipe::new("Kitchen button", "", trigger, action)
    }

    fn press() -> Event {
        Event::button_press(DeviceId::from("k1"), ButtonId::from("b1"))
    }

    #[test]
    fn should_queue_action_when_trigger_fires() {
        let (system, mut rx) = system(4);
        let broker = EventBroker::new(16);
        let live = LiveRecipe::new(recipe("z1"), system);
        live.start(&broker);

        broker.enqueue(press());

        let group = rx.try_recv().unwrap();
        assert_eq!(group.description, "Zone[Kitchen] Set Level: 50");
    }

    #[test]
    fn should_ignore_events_until_started() {
        let (system, mut rx) = system(4);
        let live = LiveRecipe::new(recipe("z1"), system);
        live.consume(&press());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn should_stay_subscribed_but_idle_while_disabled() {
        let (system, mut rx) = system(4);
        let broker = EventBroker::new(16);
        let live = LiveRecipe::new(recipe("z1"), system);
        live.start(&broker);
        live.set_enabled(false);

        broker.enqueue(press());
        assert!(broker.has_consumer(live.id().as_str()));
        assert!(rx.try_recv().is_err());

        live.set_enabled(true);
        broker.enqueue(press());
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn should_start_idempotently_and_stop_safely() {
        let (system, mut rx) = system(4);
        let broker = EventBroker::new(16);
        let live = LiveRecipe::new(recipe("z1"), system);
        live.start(&broker);
        live.start(&broker);
        assert_eq!(broker.consumer_count(), 1);

        broker.enqueue(press());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());

        live.stop(&broker);
        live.stop(&broker);
        broker.enqueue(press());
        assert!(rx.try_recv().is_err());
        assert!(!live.started());
    }

    #[test]
    fn should_survive_failing_action() {
        let (system, mut rx) = system(4);
        let broker = EventBroker::new(16);
        let live = LiveRecipe::new(recipe("missing"), system);
        live.start(&broker);

        broker.enqueue(press());
        assert!(rx.try_recv().is_err());
        assert!(broker.has_consumer(live.id().as_str()));
    }

    #[test]
    fn should_snapshot_current_state() {
        let (system, _rx) = system(4);
        let recipe_before = recipe("z1");
        let live = LiveRecipe::new(recipe_before.clone(), system);
        live.set_enabled(false);

        let snapshot = live.snapshot();
        assert_eq!(snapshot.identifiable, recipe_before.identifiable);
        assert!(!snapshot.enabled);
    }
}
