//! The state actions execute against.
//!
//! Holds the inventory and the producer side of the command queue. Shared by
//! every live recipe behind an `Arc`.

use hestia_domain::action::Action;
use hestia_domain::error::HestiaError;
use hestia_domain::id::CommandGroupId;
use hestia_domain::inventory::Inventory;

use crate::command_processor::CommandQueue;

#[derive(Debug)]
pub struct System {
    inventory: Inventory,
    commands: CommandQueue,
}

impl System {
    #[must_use]
    pub fn new(inventory: Inventory, commands: CommandQueue) -> Self {
        Self {
            inventory,
            commands,
        }
    }

    #[must_use]
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    #[must_use]
    pub fn commands(&self) -> &CommandQueue {
        &self.commands
    }

    /// Plan `action` against the inventory and queue the resulting group.
    ///
    /// Never waits on hardware: a full command queue is an immediate error.
    ///
    /// # Errors
    ///
    /// Returns [`HestiaError::NotFound`] when the action's target is missing,
    /// or [`HestiaError::Transport`] when the command queue rejects the group.
    pub fn execute(&self, action: &mut Action) -> Result<CommandGroupId, HestiaError> {
        let group = action.command_group(&self.inventory)?;
        let id = group.id.clone();
        self.commands.enqueue(group)?;
        Ok(id)
    }
}
