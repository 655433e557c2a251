//! Button trigger: fires after a number of presses of one keypad button.

use std::time::Duration;

use serde_json::Value;

use crate::error::BindError;
use crate::event::{Event, EventKind};
use crate::id::ButtonId;
use crate::ingredient::{
    Ingredient, IngredientBinder, IngredientKind, IngredientValues, duration_value,
};
use crate::time::Timestamp;

pub(super) const INGREDIENTS: &[Ingredient] = &[
    Ingredient {
        id: "ButtonID",
        name: "Button",
        description: "The button that fires the trigger",
        kind: IngredientKind::String,
        required: true,
        reference: Some("button"),
    },
    Ingredient {
        id: "PressCount",
        name: "Press count",
        description: "How many presses are needed to fire, 1 if unset",
        kind: IngredientKind::Integer,
        required: false,
        reference: None,
    },
    Ingredient {
        id: "MaxDuration",
        name: "Max duration",
        description: "Window after the first press in which every press must land, unbounded if unset",
        kind: IngredientKind::Duration,
        required: false,
        reference: None,
    },
];

/// Fires once `press_count` presses of `button_id` are seen within
/// `max_duration` of the first press of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonTrigger {
    pub button_id: ButtonId,
    /// `0` behaves as `1`.
    pub press_count: u32,
    /// [`Duration::ZERO`] disables the window.
    pub max_duration: Duration,
    run: Option<Run>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Run {
    started: Timestamp,
    presses: u32,
}

impl Default for ButtonTrigger {
    fn default() -> Self {
        Self::new(ButtonId::from(""), 0, Duration::ZERO)
    }
}

impl ButtonTrigger {
    #[must_use]
    pub fn new(button_id: ButtonId, press_count: u32, max_duration: Duration) -> Self {
        Self {
            button_id,
            press_count,
            max_duration,
            run: None,
        }
    }

    pub(super) fn bind(values: &IngredientValues) -> Result<Self, BindError> {
        let binder = IngredientBinder::new(INGREDIENTS, values)?;
        let press_count =
            u32::try_from(binder.integer("PressCount")).map_err(|_| BindError::InvalidValue {
                ingredient: "PressCount",
                reason: "must be a non-negative integer".to_string(),
            })?;
        Ok(Self::new(
            ButtonId::from(binder.string("ButtonID")),
            press_count,
            binder.duration("MaxDuration"),
        ))
    }

    pub(super) fn ingredient_values(&self) -> IngredientValues {
        let mut values = IngredientValues::new();
        values.insert(
            "ButtonID".to_string(),
            Value::from(self.button_id.as_str()),
        );
        values.insert("PressCount".to_string(), Value::from(self.press_count));
        values.insert("MaxDuration".to_string(), duration_value(self.max_duration));
        values
    }

    pub(super) fn interested(&self, event: &Event) -> bool {
        matches!(event.kind(), EventKind::ButtonPress { button_id } if *button_id == self.button_id)
    }

    pub(super) fn evaluate(&mut self, event: &Event) -> bool {
        if !self.interested(event) {
            return false;
        }
        let at = event.timestamp();
        let run = match self.run {
            Some(run) if !self.expired(run, at) => Run {
                presses: run.presses + 1,
                ..run
            },
            _ => Run {
                started: at,
                presses: 1,
            },
        };
        if run.presses >= self.press_count.max(1) {
            self.run = None;
            true
        } else {
            self.run = Some(run);
            false
        }
    }

    fn expired(&self, run: Run, at: Timestamp) -> bool {
        if self.max_duration.is_zero() {
            return false;
        }
        (at - run.started)
            .to_std()
            .is_ok_and(|elapsed| elapsed > self.max_duration)
    }
}
