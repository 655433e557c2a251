//! Action — what a recipe does when its trigger fires.
//!
//! An action only plans work: [`Action::command_group`] resolves its targets
//! in the inventory and returns the [`CommandGroup`] to enqueue. It never
//! touches hardware, so it is safe to run on every trigger firing.

mod scene;
mod zone;

pub use scene::{SceneSetAction, SceneSetToggleAction};
pub use zone::{ZoneSetLevelAction, ZoneSetLevelToggleAction};

use crate::command::CommandGroup;
use crate::cookbook::VariantSchema;
use crate::error::{BindError, HestiaError};
use crate::ingredient::{Ingredient, IngredientValues};
use crate::inventory::Inventory;

/// The action variants known to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    ZoneSetLevel,
    ZoneSetLevelToggle,
    SceneSet,
    SceneSetToggle,
}

impl ActionType {
    pub const ALL: &'static [Self] = &[
        Self::ZoneSetLevel,
        Self::ZoneSetLevelToggle,
        Self::SceneSet,
        Self::SceneSetToggle,
    ];

    /// Stable tag used for persistence and factory lookup.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::ZoneSetLevel => "ZoneSetLevelAction",
            Self::ZoneSetLevelToggle => "ZoneSetLevelToggleAction",
            Self::SceneSet => "SceneSetAction",
            Self::SceneSetToggle => "SceneSetToggleAction",
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ZoneSetLevel => "Set Zone Level",
            Self::ZoneSetLevelToggle => "Toggle Zone Level",
            Self::SceneSet => "Set Scene",
            Self::SceneSetToggle => "Toggle Scene",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::ZoneSetLevel => "Sets a zone to a level",
            Self::ZoneSetLevelToggle => "Alternates a zone between two levels",
            Self::SceneSet => "Applies a scene",
            Self::SceneSetToggle => "Alternates between two scenes",
        }
    }

    #[must_use]
    pub fn ingredients(self) -> &'static [Ingredient] {
        match self {
            Self::ZoneSetLevel => zone::SET_LEVEL_INGREDIENTS,
            Self::ZoneSetLevelToggle => zone::TOGGLE_INGREDIENTS,
            Self::SceneSet => scene::SET_INGREDIENTS,
            Self::SceneSetToggle => scene::TOGGLE_INGREDIENTS,
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

    /// A zero-valued action of this variant.
    #[must_use]
    pub fn new_action(self) -> Action {
        match self {
            Self::ZoneSetLevel => Action::ZoneSetLevel(ZoneSetLevelAction::default()),
            Self::ZoneSetLevelToggle => {
                Action::ZoneSetLevelToggle(ZoneSetLevelToggleAction::default())
            }
            Self::SceneSet => Action::SceneSet(SceneSetAction::default()),
            Self::SceneSetToggle => Action::SceneSetToggle(SceneSetToggleAction::default()),
        }
    }

    /// Build an action of this variant from raw ingredient values.
    ///
    /// # Errors
    ///
    /// Returns the first [`BindError`] found; no action is built.
    pub fn bind(self, values: &IngredientValues) -> Result<Action, BindError> {
        Ok(match self {
            Self::ZoneSetLevel => Action::ZoneSetLevel(ZoneSetLevelAction::bind(values)?),
            Self::ZoneSetLevelToggle => {
                Action::ZoneSetLevelToggle(ZoneSetLevelToggleAction::bind(values)?)
            }
            Self::SceneSet => Action::SceneSet(SceneSetAction::bind(values)?),
            Self::SceneSetToggle => Action::SceneSetToggle(SceneSetToggleAction::bind(values)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ZoneSetLevel(ZoneSetLevelAction),
    ZoneSetLevelToggle(ZoneSetLevelToggleAction),
    SceneSet(SceneSetAction),
    SceneSetToggle(SceneSetToggleAction),
}

impl Action {
    #[must_use]
    pub fn action_type(&self) -> ActionType {
        match self {
            Self::ZoneSetLevel(_) => ActionType::ZoneSetLevel,
            Self::ZoneSetLevelToggle(_) => ActionType::ZoneSetLevelToggle,
            Self::SceneSet(_) => ActionType::SceneSet,
            Self::SceneSetToggle(_) => ActionType::SceneSetToggle,
        }
    }

    /// Plan the commands for one execution.
    ///
    /// Toggle variants advance to their other state only when planning
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`HestiaError::NotFound`] if the target zone or scene is not in
    /// the inventory.
    pub fn command_group(&mut self, inventory: &Inventory) -> Result<CommandGroup, HestiaError> {
        match self {
            Self::ZoneSetLevel(a) => a.command_group(inventory),
            Self::ZoneSetLevelToggle(a) => a.command_group(inventory),
            Self::SceneSet(a) => a.command_group(inventory),
            Self::SceneSetToggle(a) => a.command_group(inventory),
        }
    }

    /// Current ingredient values, as persisted.
    #[must_use]
    pub fn ingredient_values(&self) -> IngredientValues {
        match self {
            Self::ZoneSetLevel(a) => a.ingredient_values(),
            Self::ZoneSetLevelToggle(a) => a.ingredient_values(),
            Self::SceneSet(a) => a.ingredient_values(),
            Self::SceneSetToggle(a) => a.ingredient_values(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::device::{Device, Zone};
    use crate::id::{SceneId, ZoneId};
    use crate::scene::Scene;
    use serde_json::{Value, json};

    fn inventory() -> Inventory {
        let mut bridge = Device::builder().id("bridge").address("1").build();
        bridge
            .add_zone(Zone::new(ZoneId::from("z1"), "Kitchen", "12"))
            .unwrap();
        bridge
            .add_zone(Zone::new(ZoneId::from("z2"), "Hall", "13"))
            .unwrap();
        let kitchen = bridge.zones()[0].clone();
        let hall = bridge.zones()[1].clone();

        let mut inventory = Inventory::new();
        inventory.add_device(bridge).unwrap();
        inventory.add_scene(Scene::new(
            SceneId::from("on"),
            "All on",
            vec![
                Command::zone_set_level(&kitchen, 100.0),
                Command::zone_set_level(&hall, 100.0),
            ],
        ));
        inventory.add_scene(Scene::new(
            SceneId::from("off"),
            "All off",
            vec![Command::zone_turn_off(&kitchen), Command::zone_turn_off(&hall)],
        ));
        inventory
    }

    fn bind(ty: ActionType, values: Value) -> Action {
        ty.bind(values.as_object().unwrap()).unwrap()
    }

    fn level_of(group: &CommandGroup) -> f32 {
        match &group.commands[0] {
            Command::ZoneSetLevel { level, .. } => *level,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn should_plan_single_set_level_command() {
        let mut action = bind(
            ActionType::ZoneSetLevel,
            json!({"ZoneID": "z1", "Level": 75.0}),
        );
        let group = action.command_group(&inventory()).unwrap();
        assert_eq!(group.description, "Zone[Kitchen] Set Level: 75");
        assert_eq!(group.commands.len(), 1);
        assert_eq!(level_of(&group), 75.0);
    }

    #[test]
    fn should_fail_with_not_found_for_unknown_zone() {
        let mut action = bind(
            ActionType::ZoneSetLevel,
            json!({"ZoneID": "missing", "Level": 10}),
        );
        let err = action.command_group(&inventory()).unwrap_err();
        assert!(matches!(err, HestiaError::NotFound(_)));
    }

    #[test]
    fn should_alternate_levels_starting_with_first() {
        let inventory = inventory();
        let mut action = bind(
            ActionType::ZoneSetLevelToggle,
            json!({"ZoneID": "z1", "Level1": 100, "Level2": 0}),
        );
        let levels: Vec<f32> = (0..3)
            .map(|_| level_of(&action.command_group(&inventory).unwrap()))
            .collect();
        assert_eq!(levels, vec![100.0, 0.0, 100.0]);
    }

    #[test]
    fn should_not_advance_toggle_when_planning_fails() {
        let mut action = bind(
            ActionType::SceneSetToggle,
            json!({"SceneID1": "gone", "SceneID2": "off"}),
        );
        let inventory = inventory();
        assert!(action.command_group(&inventory).is_err());
        assert!(action.command_group(&inventory).is_err());
    }

    #[test]
    fn should_apply_scene_commands_in_order() {
        let mut action = bind(ActionType::SceneSet, json!({"SceneID": "off"}));
        let group = action.command_group(&inventory()).unwrap();
        assert_eq!(group.commands.len(), 2);
        assert!(matches!(group.commands[0], Command::ZoneTurnOff { .. }));
    }

    #[test]
    fn should_alternate_scenes() {
        let inventory = inventory();
        let mut action = bind(
            ActionType::SceneSetToggle,
            json!({"SceneID1": "on", "SceneID2": "off"}),
        );
        let first = action.command_group(&inventory).unwrap();
        let second = action.command_group(&inventory).unwrap();
        assert_eq!(first.description, "Scene[All on] Set");
        assert_eq!(second.description, "Scene[All off] Set");
    }

    #[test]
    fn should_rebind_every_variant_from_exported_values() {
        let samples = [
            (ActionType::ZoneSetLevel, json!({"ZoneID": "z1", "Level": 12.5})),
            (
                ActionType::ZoneSetLevelToggle,
                json!({"ZoneID": "z1", "Level1": 1, "Level2": 2}),
            ),
            (ActionType::SceneSet, json!({"SceneID": "on"})),
            (
                ActionType::SceneSetToggle,
                json!({"SceneID1": "on", "SceneID2": "off"}),
            ),
        ];
        for (ty, values) in samples {
            let action = bind(ty, values);
            let rebound = ty.bind(&action.ingredient_values()).unwrap();
            assert_eq!(rebound, action);
            assert_eq!(rebound.action_type(), ty);
        }
    }

    #[test]
    fn should_produce_zero_valued_instance_of_same_variant() {
        let inventory = inventory();
        for ty in ActionType::ALL {
            let mut action = ty.new_action();
            assert_eq!(action.action_type(), *ty);
            // no target yet, so nothing to plan
            assert!(matches!(
                action.command_group(&inventory),
                Err(HestiaError::NotFound(_))
            ));
        }
    }

    #[test]
    fn should_reject_string_level() {
        let err = ActionType::ZoneSetLevel
            .bind(json!({"ZoneID": "z1", "Level": "high"}).as_object().unwrap())
            .unwrap_err();
        assert_eq!(err.ingredient(), "Level");
    }
}
