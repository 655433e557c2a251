//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the core and the adapter
//! layer can depend on them without creating circular dependencies.

pub mod connector;
pub mod extension;
pub mod recipe_store;
pub mod transport;

pub use connector::Connector;
pub use extension::{BuiltCommand, CommandBuilder, EventDecoder, Extension, Extensions, Suppression};
pub use recipe_store::{RecipeStore, StoredRecipe};
pub use transport::Transport;
