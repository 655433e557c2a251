//! # hestia-app
//!
//! Application layer — the event/command pipeline and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `RecipeStore` — persist and load recipe records
//!   - `Transport` — transmit built commands to hardware
//!   - `Connector` — open a device's event byte stream
//!   - `Extension` — per hardware family command builders and event decoders
//! - Provide the **event broker**: consumers, enqueue filters, ingest channel, observers
//! - Provide the **command processor** draining the bounded command queue
//! - Run **live recipes** and supervise them through the `RecipeManager`
//! - Frame device byte streams into events and emit clock ticks
//!
//! ## Dependency rule
//! Depends on `hestia-domain` only (plus `tokio` for channels and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod broker;
pub mod clock;
pub mod command_processor;
pub mod ingest;
pub mod ports;
pub mod recipe;
pub mod recipe_manager;
pub mod system;
