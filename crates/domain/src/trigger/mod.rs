//! Trigger — the condition that fires a recipe's action.
//!
//! Each variant declares a static ingredient schema and binds user values
//! through [`TriggerType::bind`], which only returns a trigger when every
//! ingredient validated. Triggers keep their own evaluation state (a press
//! run, the last fired minute) and are never shared between recipes.

mod button;
mod time_of_day;

pub use button::ButtonTrigger;
pub use time_of_day::TimeTrigger;

use crate::cookbook::VariantSchema;
use crate::error::BindError;
use crate::event::Event;
use crate::ingredient::{Ingredient, IngredientValues};

/// The trigger variants known to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerType {
    Button,
    Time,
}

impl TriggerType {
    pub const ALL: &'static [Self] = &[Self::Button, Self::Time];

    /// Stable tag used for persistence and factory lookup.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Button => "ButtonTrigger",
            Self::Time => "TimeTrigger",
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Button => "Button Press",
            Self::Time => "Time of Day",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Button => "Fires when a keypad button is pressed one or more times",
            Self::Time => "Fires every day at the given local time",
        }
    }

    #[must_use]
    pub fn ingredients(self) -> &'static [Ingredient] {
        match self {
            Self::Button => button::INGREDIENTS,
            Self::Time => time_of_day::INGREDIENTS,
        }
    }

    #[must_use]
    pub fn schema(self) -> VariantSchema {
        VariantSchema {
            id: self.tag(),
            name: self.name(),
            description: self.description(),
            ingredients: self.ingredients(),
        }
    }

    /// A zero-valued trigger of this variant.
    #[must_use]
    pub fn new_trigger(self) -> Trigger {
        match self {
            Self::Button => Trigger::Button(ButtonTrigger::default()),
            Self::Time => Trigger::Time(TimeTrigger::default()),
        }
    }

    /// Build a trigger of this variant from raw ingredient values.
    ///
    /// # Errors
    ///
    /// Returns the first [`BindError`] found; no trigger is built.
    pub fn bind(self, values: &IngredientValues) -> Result<Trigger, BindError> {
        Ok(match self {
            Self::Button => Trigger::Button(ButtonTrigger::bind(values)?),
            Self::Time => Trigger::Time(TimeTrigger::bind(values)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    Button(ButtonTrigger),
    Time(TimeTrigger),
}

impl Trigger {
    #[must_use]
    pub fn trigger_type(&self) -> TriggerType {
        match self {
            Self::Button(_) => TriggerType::Button,
            Self::Time(_) => TriggerType::Time,
        }
    }

    /// Whether this trigger wants to see `event` at all.
    #[must_use]
    pub fn interested(&self, event: &Event) -> bool {
        match self {
            Self::Button(t) => t.interested(event),
            Self::Time(_) => TimeTrigger::interested(event),
        }
    }

    /// Feed an event, returning `true` when the trigger fires.
    pub fn evaluate(&mut self, event: &Event) -> bool {
        match self {
            Self::Button(t) => t.evaluate(event),
            Self::Time(t) => t.evaluate(event),
        }
    }

    /// Current ingredient values, as persisted.
    #[must_use]
    pub fn ingredient_values(&self) -> IngredientValues {
        match self {
            Self::Button(t) => t.ingredient_values(),
            Self::Time(t) => t.ingredient_values(),
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Button(t) => write!(f, "button({})", t.button_id),
            Self::Time(t) => write!(f, "time({})", t.time.format("%H:%M")),
        }
    }
}
