//! Compile-time catalogs of trigger and action variants.
//!
//! A cookbook groups the variants relevant to one hardware family. The
//! factories used to rebuild recipes are derived from the catalog once at
//! start-up.

use std::collections::HashMap;

use serde::Serialize;

use crate::action::ActionType;
use crate::ingredient::Ingredient;
use crate::trigger::TriggerType;

/// UI-facing description of one trigger or action variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VariantSchema {
    #[serde(rename = "ID")]
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub ingredients: &'static [Ingredient],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookBook {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub logo_url: &'static str,
    pub triggers: &'static [TriggerType],
    pub actions: &'static [ActionType],
}

const LIGHTING_BRIDGE: CookBook = CookBook {
    id: "lighting-bridge",
    name: "Lighting Bridge",
    description: "Keypads, dimmers and scenes driven through a lighting bridge",
    logo_url: "/assets/cookbooks/lighting-bridge.png",
    triggers: TriggerType::ALL,
    actions: ActionType::ALL,
};

impl CookBook {
    /// Every cookbook shipped with the controller.
    #[must_use]
    pub fn catalog() -> &'static [CookBook] {
        &[LIGHTING_BRIDGE]
    }
}

/// Serialized form of a cookbook, with its variants expanded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CookBookView {
    #[serde(rename = "ID")]
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "LogoURL")]
    pub logo_url: &'static str,
    pub triggers: Vec<VariantSchema>,
    pub actions: Vec<VariantSchema>,
}

impl From<&CookBook> for CookBookView {
    fn from(book: &CookBook) -> Self {
        Self {
            id: book.id,
            name: book.name,
            description: book.description,
            logo_url: book.logo_url,
            triggers: book.triggers.iter().map(|t| t.schema()).collect(),
            actions: book.actions.iter().map(|a| a.schema()).collect(),
        }
    }
}

/// Variant tag → variant lookup tables.
#[derive(Debug, Clone, Default)]
pub struct Factories {
    triggers: HashMap<&'static str, TriggerType>,
    actions: HashMap<&'static str, ActionType>,
}

impl Factories {
    /// Collect every variant named by `cookbooks`.
    #[must_use]
    pub fn from_cookbooks(cookbooks: &[CookBook]) -> Self {
        let mut factories = Self::default();
        for book in cookbooks {
            for ty in book.triggers {
                factories.triggers.insert(ty.tag(), *ty);
            }
            for ty in book.actions {
                factories.actions.insert(ty.tag(), *ty);
            }
        }
        factories
    }

    #[must_use]
    pub fn trigger(&self, tag: &str) -> Option<TriggerType> {
        self.triggers.get(tag).copied()
    }

    #[must_use]
    pub fn action(&self, tag: &str) -> Option<ActionType> {
        self.actions.get(tag).copied()
    }

    /// Known trigger variants, sorted by tag.
    #[must_use]
    pub fn trigger_types(&self) -> Vec<TriggerType> {
        let mut types: Vec<_> = self.triggers.values().copied().collect();
        types.sort_by_key(|t| t.tag());
        types
    }

    /// Known action variants, sorted by tag.
    #[must_use]
    pub fn action_types(&self) -> Vec<ActionType> {
        let mut types: Vec<_> = self.actions.values().copied().collect();
        types.sort_by_key(|a| a.tag());
        types
    }
}
