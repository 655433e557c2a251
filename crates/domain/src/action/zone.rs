//! Zone level actions.

use serde_json::Value;

use crate::command::{Command, CommandGroup};
use crate::error::{BindError, HestiaError, NotFoundError};
use crate::id::ZoneId;
use crate::ingredient::{Ingredient, IngredientBinder, IngredientKind, IngredientValues};
use crate::inventory::Inventory;

const ZONE_ID: Ingredient = Ingredient {
    id: "ZoneID",
    name: "Zone",
    description: "The zone to drive",
    kind: IngredientKind::String,
    required: true,
    reference: Some("zone"),
};

const fn level(id: &'static str, name: &'static str) -> Ingredient {
    Ingredient {
        id,
        name,
        description: "Intensity between 0 and 100",
        kind: IngredientKind::Float,
        required: true,
        reference: None,
    }
}

pub(super) const SET_LEVEL_INGREDIENTS: &[Ingredient] = &[ZONE_ID, level("Level", "Level")];

pub(super) const TOGGLE_INGREDIENTS: &[Ingredient] = &[
    ZONE_ID,
    level("Level1", "First level"),
    level("Level2", "Second level"),
];

fn set_level(inventory: &Inventory, zone_id: &ZoneId, level: f64) -> Result<CommandGroup, HestiaError> {
    let zone = inventory.zone(zone_id).ok_or_else(|| NotFoundError {
        entity: "Zone",
        id: zone_id.to_string(),
    })?;
    #[allow(clippy::cast_possible_truncation)]
    let command = Command::zone_set_level(zone, level as f32);
    Ok(CommandGroup::single(command))
}

/// Set a zone to a fixed level.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSetLevelAction {
    pub zone_id: ZoneId,
    pub level: f64,
}

impl Default for ZoneSetLevelAction {
    fn default() -> Self {
        Self {
            zone_id: ZoneId::from(""),
            level: 0.0,
        }
    }
}

impl ZoneSetLevelAction {
    pub(super) fn bind(values: &IngredientValues) -> Result<Self, BindError> {
        let binder = IngredientBinder::new(SET_LEVEL_INGREDIENTS, values)?;
        Ok(Self {
            zone_id: ZoneId::from(binder.string("ZoneID")),
            level: binder.float("Level"),
        })
    }

    pub(super) fn ingredient_values(&self) -> IngredientValues {
        let mut values = IngredientValues::new();
        values.insert("ZoneID".to_string(), Value::from(self.zone_id.as_str()));
        values.insert("Level".to_string(), Value::from(self.level));
        values
    }

    pub(super) fn command_group(&self, inventory: &Inventory) -> Result<CommandGroup, HestiaError> {
        set_level(inventory, &self.zone_id, self.level)
    }
}

/// Alternate a zone between two levels, starting with `level1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSetLevelToggleAction {
    pub zone_id: ZoneId,
    pub level1: f64,
    pub level2: f64,
    second_next: bool,
}

impl Default for ZoneSetLevelToggleAction {
    fn default() -> Self {
        Self {
            zone_id: ZoneId::from(""),
            level1: 0.0,
            level2: 0.0,
            second_next: false,
        }
    }
}

impl ZoneSetLevelToggleAction {
    pub(super) fn bind(values: &IngredientValues) -> Result<Self, BindError> {
        let binder = IngredientBinder::new(TOGGLE_INGREDIENTS, values)?;
        Ok(Self {
            zone_id: ZoneId::from(binder.string("ZoneID")),
            level1: binder.float("Level1"),
            level2: binder.float("Level2"),
            second_next: false,
        })
    }

    pub(super) fn ingredient_values(&self) -> IngredientValues {
        let mut values = IngredientValues::new();
        values.insert("ZoneID".to_string(), Value::from(self.zone_id.as_str()));
        values.insert("Level1".to_string(), Value::from(self.level1));
        values.insert("Level2".to_string(), Value::from(self.level2));
        values
    }

    pub(super) fn command_group(
        &mut self,
        inventory: &Inventory,
    ) -> Result<CommandGroup, HestiaError> {
        let level = if self.second_next {
            self.level2
        } else {
            self.level1
        };
        let group = set_level(inventory, &self.zone_id, level)?;
        self.second_next = !self.second_next;
        Ok(group)
    }
}
