//! Scene actions.

use serde_json::Value;

use crate::command::CommandGroup;
use crate::error::{BindError, HestiaError, NotFoundError};
use crate::id::SceneId;
use crate::ingredient::{Ingredient, IngredientBinder, IngredientKind, IngredientValues};
use crate::inventory::Inventory;

const fn scene(id: &'static str, name: &'static str) -> Ingredient {
    Ingredient {
        id,
        name,
        description: "The scene to apply",
        kind: IngredientKind::String,
        required: true,
        reference: Some("scene"),
    }
}

pub(super) const SET_INGREDIENTS: &[Ingredient] = &[scene("SceneID", "Scene")];

pub(super) const TOGGLE_INGREDIENTS: &[Ingredient] = &[
    scene("SceneID1", "First scene"),
    scene("SceneID2", "Second scene"),
];

fn apply(inventory: &Inventory, scene_id: &SceneId) -> Result<CommandGroup, HestiaError> {
    let scene = inventory.scene(scene_id).ok_or_else(|| NotFoundError {
        entity: "Scene",
        id: scene_id.to_string(),
    })?;
    Ok(scene.command_group())
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneSetAction {
    pub scene_id: SceneId,
}

impl Default for SceneSetAction {
    fn default() -> Self {
        Self {
            scene_id: SceneId::from(""),
        }
    }
}

impl SceneSetAction {
    pub(super) fn bind(values: &IngredientValues) -> Result<Self, BindError> {
        let binder = IngredientBinder::new(SET_INGREDIENTS, values)?;
        Ok(Self {
            scene_id: SceneId::from(binder.string("SceneID")),
        })
    }

    pub(super) fn ingredient_values(&self) -> IngredientValues {
        let mut values = IngredientValues::new();
        values.insert("SceneID".to_string(), Value::from(self.scene_id.as_str()));
        values
    }

    pub(super) fn command_group(&self, inventory: &Inventory) -> Result<CommandGroup, HestiaError> {
        apply(inventory, &self.scene_id)
    }
}

/// Alternate between two scenes, starting with `scene_id1`.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSetToggleAction {
    pub scene_id1: SceneId,
    pub scene_id2: SceneId,
    second_next: bool,
}

impl Default for SceneSetToggleAction {
    fn default() -> Self {
        Self {
            scene_id1: SceneId::from(""),
            scene_id2: SceneId::from(""),
            second_next: false,
        }
    }
}

impl SceneSetToggleAction {
    pub(super) fn bind(values: &IngredientValues) -> Result<Self, BindError> {
        let binder = IngredientBinder::new(TOGGLE_INGREDIENTS, values)?;
        Ok(Self {
            scene_id1: SceneId::from(binder.string("SceneID1")),
            scene_id2: SceneId::from(binder.string("SceneID2")),
            second_next: false,
        })
    }

    pub(super) fn ingredient_values(&self) -> IngredientValues {
        let mut values = IngredientValues::new();
        values.insert("SceneID1".to_string(), Value::from(self.scene_id1.as_str()));
        values.insert("SceneID2".to_string(), Value::from(self.scene_id2.as_str()));
        values
    }

    pub(super) fn command_group(
        &mut self,
        inventory: &Inventory,
    ) -> Result<CommandGroup, HestiaError> {
        let scene_id = if self.second_next {
            &self.scene_id2
        } else {
            &self.scene_id1
        };
        let group = apply(inventory, scene_id)?;
        self.second_next = !self.second_next;
        Ok(group)
    }
}
