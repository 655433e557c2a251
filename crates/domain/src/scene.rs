//! A named, ordered set of commands applied together.

use serde::{Deserialize, Serialize};

use crate::command::{Command, CommandGroup};
use crate::id::SceneId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    pub name: String,
    pub description: String,
    pub commands: Vec<Command>,
}

impl Scene {
    #[must_use]
    pub fn new(id: SceneId, name: impl Into<String>, commands: Vec<Command>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            commands,
        }
    }

    /// The scene's commands as one group, in scene order.
    #[must_use]
    pub fn command_group(&self) -> CommandGroup {
        CommandGroup::new(format!("Scene[{}] Set", self.name), self.commands.clone())
    }
}
