//! # hestia-domain
//!
//! Pure domain model for the hestia home automation controller.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Events** (raw device lines, feature reports, button presses, clock ticks)
//! - Define the **Inventory** (devices owning zones, buttons and sensors; scenes)
//! - Define **Commands** and **Command Groups** (hardware-agnostic instructions)
//! - Define **Ingredients** and the binding rules that configure triggers and actions
//! - Define **Triggers**, **Actions**, **Cookbooks** and **Recipes**
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;
pub mod validation;

pub mod action;
pub mod attribute;
pub mod command;
pub mod cookbook;
pub mod device;
pub mod event;
pub mod ingredient;
pub mod inventory;
pub mod recipe;
pub mod scene;
pub mod trigger;
