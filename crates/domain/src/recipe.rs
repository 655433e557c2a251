//! One trigger bound to one action.
//!
//! Recipes enter the system two ways: from a user submission
//! ([`Recipe::from_submission`]) or from a persisted [`RecipeRecord`]. Both
//! paths resolve the variant tags through [`Factories`] and bind ingredient
//! values before a recipe exists, so a half-configured recipe is never built.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::Action;
use crate::cookbook::Factories;
use crate::error::{BindError, ValidationError};
use crate::id::RecipeId;
use crate::ingredient::IngredientValues;
use crate::trigger::Trigger;

/// Identity shared by user-visible objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Identifiable {
    #[serde(rename = "ID")]
    pub id: RecipeId,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub identifiable: Identifiable,
    pub enabled: bool,
    pub trigger: Trigger,
    pub action: Action,
}

impl Recipe {
    /// A new enabled recipe with a fresh id.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        trigger: Trigger,
        action: Action,
    ) -> Self {
        Self {
            identifiable: Identifiable {
                id: RecipeId::new(),
                name: name.into(),
                description: description.into(),
            },
            enabled: true,
            trigger,
            action,
        }
    }

    #[must_use]
    pub fn id(&self) -> &RecipeId {
        &self.identifiable.id
    }

    /// Validate a raw submission and build a new, enabled recipe from it.
    ///
    /// Expected shape:
    ///
    /// ```json
    /// { "name": "...", "description": "...",
    ///   "trigger": { "id": "TimeTrigger", "ingredients": { "Time": "20:00" } },
    ///   "action": { "id": "ZoneSetLevelAction", "ingredients": { "ZoneID": "z1", "Level": 75 } } }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, checking keys in order:
    /// `name`, `description`, `trigger`, `action`, then ingredient binding.
    pub fn from_submission(raw: &Value, factories: &Factories) -> Result<Self, ValidationError> {
        let name = string_key(raw, "name", "name")?;
        let description = string_key(raw, "description", "description")?;

        let trigger = section(raw, "trigger", "trigger.id", "trigger.ingredients")?;
        let trigger_type = factories
            .trigger(trigger.id)
            .ok_or_else(|| ValidationError::UnknownTrigger(trigger.id.to_string()))?;

        let action = section(raw, "action", "action.id", "action.ingredients")?;
        let action_type = factories
            .action(action.id)
            .ok_or_else(|| ValidationError::UnknownAction(action.id.to_string()))?;

        let trigger = trigger_type
            .bind(trigger.ingredients)
            .map_err(ingredients("trigger"))?;
        let action = action_type
            .bind(action.ingredients)
            .map_err(ingredients("action"))?;

        Ok(Self::new(name, description, trigger, action))
    }
}

struct Section<'a> {
    id: &'a str,
    ingredients: &'a IngredientValues,
}

fn string_key<'a>(
    raw: &'a Value,
    key: &str,
    path: &'static str,
) -> Result<&'a str, ValidationError> {
    raw.get(key)
        .ok_or(ValidationError::MissingKey { key: path })?
        .as_str()
        .ok_or(ValidationError::InvalidType {
            key: path,
            expected: "a string",
        })
}

fn section<'a>(
    raw: &'a Value,
    key: &'static str,
    id_path: &'static str,
    ingredients_path: &'static str,
) -> Result<Section<'a>, ValidationError> {
    let value = raw.get(key).ok_or(ValidationError::MissingKey { key })?;
    if !value.is_object() {
        return Err(ValidationError::InvalidType {
            key,
            expected: "an object",
        });
    }
    let id = string_key(value, "id", id_path)?;
    let ingredients = value
        .get("ingredients")
        .ok_or(ValidationError::MissingKey {
            key: ingredients_path,
        })?
        .as_object()
        .ok_or(ValidationError::InvalidType {
            key: ingredients_path,
            expected: "an object",
        })?;
    Ok(Section { id, ingredients })
}

fn ingredients(section: &'static str) -> impl Fn(BindError) -> ValidationError {
    move |source| ValidationError::Ingredients { section, source }
}

/// Persisted variant: its tag and flat ingredient values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub fields: IngredientValues,
}

/// On-disk representation of a [`Recipe`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    #[serde(rename = "Identifiable")]
    pub identifiable: Identifiable,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(rename = "Trigger")]
    pub trigger: PartRecord,
    #[serde(rename = "Action")]
    pub action: PartRecord,
}

fn enabled_by_default() -> bool {
    true
}

impl RecipeRecord {
    #[must_use]
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            identifiable: recipe.identifiable.clone(),
            enabled: recipe.enabled,
            trigger: PartRecord {
                kind: recipe.trigger.trigger_type().tag().to_string(),
                fields: recipe.trigger.ingredient_values(),
            },
            action: PartRecord {
                kind: recipe.action.action_type().tag().to_string(),
                fields: recipe.action.ingredient_values(),
            },
        }
    }

    /// Rebuild the recipe, keeping its persisted id and enabled flag.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an unknown variant tag or fields that
    /// no longer bind.
    pub fn into_recipe(self, factories: &Factories) -> Result<Recipe, ValidationError> {
        let trigger_type = factories
            .trigger(&self.trigger.kind)
            .ok_or_else(|| ValidationError::UnknownTrigger(self.trigger.kind.clone()))?;
        let action_type = factories
            .action(&self.action.kind)
            .ok_or_else(|| ValidationError::UnknownAction(self.action.kind.clone()))?;
        Ok(Recipe {
            trigger: trigger_type
                .bind(&self.trigger.fields)
                .map_err(ingredients("trigger"))?,
            action: action_type
                .bind(&self.action.fields)
                .map_err(ingredients("action"))?,
            identifiable: self.identifiable,
            enabled: self.enabled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionType;
    use crate::cookbook::CookBook;
    use crate::trigger::TriggerType;
    use serde_json::json;

    fn factories() -> Factories {
        Factories::from_cookbooks(CookBook::catalog())
    }

    fn evening_lights() -> Value {
        json!({
            "name": "Evening Lights",
            "description": "Kitchen on at eight",
            "trigger": {"id": "TimeTrigger", "ingredients": {"Time": "20:00"}},
            "action": {"id": "ZoneSetLevelAction", "ingredients": {"ZoneID": "z1", "Level": 75.0}}
        })
    }

    fn submit(raw: &Value) -> Result<Recipe, ValidationError> {
        Recipe::from_submission(raw, &factories())
    }

    #[test]
    fn should_build_enabled_recipe_from_valid_submission() {
        let recipe = submit(&evening_lights()).unwrap();
        assert_eq!(recipe.identifiable.name, "Evening Lights");
        assert!(recipe.enabled);
        assert_eq!(recipe.trigger.trigger_type(), TriggerType::Time);
        assert_eq!(recipe.action.action_type(), ActionType::ZoneSetLevel);
    }

    #[test]
    fn should_report_first_missing_key() {
        let mut raw = evening_lights();
        raw.as_object_mut().unwrap().remove("name");
        raw.as_object_mut().unwrap().remove("action");
        let err = submit(&raw).unwrap_err();
        assert_eq!(err.to_string(), "missing name key");
    }

    #[test]
    fn should_reject_non_string_name() {
        let mut raw = evening_lights();
        raw["name"] = json!(42);
        let err = submit(&raw).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for name, must be a string");
    }

    #[test]
    fn should_require_nested_trigger_keys() {
        let mut raw = evening_lights();
        raw["trigger"] = json!({"ingredients": {}});
        assert_eq!(submit(&raw).unwrap_err().field(), "trigger.id");

        raw["trigger"] = json!({"id": "TimeTrigger"});
        assert_eq!(submit(&raw).unwrap_err().field(), "trigger.ingredients");

        raw["trigger"] = json!({"id": "TimeTrigger", "ingredients": []});
        assert!(matches!(
            submit(&raw).unwrap_err(),
            ValidationError::InvalidType {
                key: "trigger.ingredients",
                ..
            }
        ));
    }

    #[test]
    fn should_reject_unknown_trigger_and_action_ids() {
        let mut raw = evening_lights();
        raw["trigger"]["id"] = json!("Foo");
        assert_eq!(submit(&raw).unwrap_err().to_string(), "invalid trigger ID: Foo");

        let mut raw = evening_lights();
        raw["action"]["id"] = json!("Bar");
        assert_eq!(submit(&raw).unwrap_err().to_string(), "invalid action ID: Bar");
    }

    #[test]
    fn should_wrap_binding_errors_with_section() {
        let mut raw = evening_lights();
        raw["action"]["ingredients"] = json!({"ZoneID": "z1"});
        let err = submit(&raw).unwrap_err();
        assert_eq!(err.field(), "action.ingredients.Level");
    }

    #[test]
    fn should_roundtrip_through_record() {
        let mut recipe = submit(&evening_lights()).unwrap();
        recipe.enabled = false;

        let record = RecipeRecord::from_recipe(&recipe);
        let json = serde_json::to_string(&record).unwrap();
        let parsed: RecipeRecord = serde_json::from_str(&json).unwrap();
        let restored = parsed.into_recipe(&factories()).unwrap();

        assert_eq!(restored, recipe);
    }

    #[test]
    fn should_persist_in_documented_layout() {
        let recipe = submit(&evening_lights()).unwrap();
        let json = serde_json::to_value(RecipeRecord::from_recipe(&recipe)).unwrap();
        assert_eq!(json["Identifiable"]["Name"], "Evening Lights");
        assert_eq!(json["Identifiable"]["ID"], recipe.id().as_str());
        assert_eq!(json["enabled"], true);
        assert_eq!(json["Trigger"]["type"], "TimeTrigger");
        assert_eq!(json["Trigger"]["fields"]["Time"], "20:00");
        assert_eq!(json["Action"]["type"], "ZoneSetLevelAction");
        assert_eq!(json["Action"]["fields"]["Level"], 75.0);
    }

    #[test]
    fn should_reject_record_with_unknown_variant() {
        let recipe = submit(&evening_lights()).unwrap();
        let mut record = RecipeRecord::from_recipe(&recipe);
        record.action.kind = "Gone".to_string();
        assert!(matches!(
            record.into_recipe(&factories()),
            Err(ValidationError::UnknownAction(_))
        ));
    }
}
