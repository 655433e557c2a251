//! Fires once when the local clock reaches `HH:MM`.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde_json::Value;

use crate::error::BindError;
use crate::event::{Event, EventKind};
use crate::ingredient::{Ingredient, IngredientBinder, IngredientKind, IngredientValues};

pub(super) const INGREDIENTS: &[Ingredient] = &[Ingredient {
    id: "Time",
    name: "Time",
    description: "Local time of day, 24h HH:MM",
    kind: IngredientKind::String,
    required: true,
    reference: None,
}];

const FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq)]
pub struct TimeTrigger {
    pub time: NaiveTime,
    /// Date of the minute this trigger last fired in.
    last_fired: Option<NaiveDate>,
}

impl Default for TimeTrigger {
    fn default() -> Self {
        Self::new(NaiveTime::MIN)
    }
}

impl TimeTrigger {
    /// Trigger at `time`, truncated to the minute.
    #[must_use]
    pub fn new(time: NaiveTime) -> Self {
        let time = time
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(time);
        Self {
            time,
            last_fired: None,
        }
    }

    pub(super) fn bind(values: &IngredientValues) -> Result<Self, BindError> {
        let binder = IngredientBinder::new(INGREDIENTS, values)?;
        let raw = binder.string("Time");
        let time =
            NaiveTime::parse_from_str(raw.trim(), FORMAT).map_err(|e| BindError::InvalidValue {
                ingredient: "Time",
                reason: format!("{raw:?} is not a HH:MM time ({e})"),
            })?;
        Ok(Self::new(time))
    }

    pub(super) fn ingredient_values(&self) -> IngredientValues {
        let mut values = IngredientValues::new();
        values.insert(
            "Time".to_string(),
            Value::from(self.time.format(FORMAT).to_string()),
        );
        values
    }

    pub(super) fn interested(event: &Event) -> bool {
        matches!(event.kind(), EventKind::ClockTick { .. })
    }

    pub(super) fn evaluate(&mut self, event: &Event) -> bool {
        let EventKind::ClockTick { local } = event.kind() else {
            return false;
        };
        if local.hour() != self.time.hour() || local.minute() != self.time.minute() {
            return false;
        }
        let day = local.date();
        if self.last_fired == Some(day) {
            return false;
        }
        self.last_fired = Some(day);
        true
    }
}
