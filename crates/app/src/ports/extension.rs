//! Extension port — hardware-family plug-ins.
//!
//! An extension recognises devices (usually by model number) and supplies the
//! pieces needed to talk to them: a [`CommandBuilder`] turning abstract
//! commands into wire payloads, and an [`EventDecoder`] turning received
//! lines into events.

use std::sync::Arc;
use std::time::Duration;

use hestia_domain::attribute::Attributes;
use hestia_domain::command::Command;
use hestia_domain::device::Device;
use hestia_domain::error::HestiaError;
use hestia_domain::event::Event;
use hestia_domain::id::{DeviceId, FeatureId};
use hestia_domain::inventory::Inventory;

/// Request to hide echoed reporting for a feature after a command is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Suppression {
    pub feature_id: FeatureId,
    /// Values replayed to observers before the filter goes up.
    pub attrs: Option<Attributes>,
    pub delay: Duration,
}

/// A hardware-specific, transmittable command.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltCommand {
    pub payload: String,
    pub suppress: Option<Suppression>,
}

pub trait CommandBuilder: Send + Sync {
    /// Translate `command` into this hardware family's wire format.
    ///
    /// # Errors
    ///
    /// Returns [`HestiaError::Transport`] for commands the hardware cannot express.
    fn build(&self, command: &Command) -> Result<BuiltCommand, HestiaError>;
}

pub trait EventDecoder: Send + Sync {
    /// Decode one framed line received from the connection of `device_id`.
    ///
    /// Lines the decoder does not understand yield no events.
    fn decode(&self, inventory: &Inventory, device_id: &DeviceId, line: &str) -> Vec<Event>;
}

pub trait Extension: Send + Sync {
    /// Unique name identifying this extension (e.g. `"virtual"`).
    fn name(&self) -> &'static str;

    fn builder_for_device(&self, device: &Device) -> Option<Arc<dyn CommandBuilder>>;

    fn decoder_for_device(&self, device: &Device) -> Option<Arc<dyn EventDecoder>>;
}

/// Registered extensions, asked in registration order.
#[derive(Clone, Default)]
pub struct Extensions {
    extensions: Vec<Arc<dyn Extension>>,
}

impl Extensions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, extension: impl Extension + 'static) {
        tracing::info!(extension = extension.name(), "extension registered");
        self.extensions.push(Arc::new(extension));
    }

    /// First builder offered for `device`.
    #[must_use]
    pub fn find_builder(&self, device: &Device) -> Option<Arc<dyn CommandBuilder>> {
        self.extensions
            .iter()
            .find_map(|e| e.builder_for_device(device))
    }

    /// First decoder offered for `device`.
    #[must_use]
    pub fn find_decoder(&self, device: &Device) -> Option<Arc<dyn EventDecoder>> {
        self.extensions
            .iter()
            .find_map(|e| e.decoder_for_device(device))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl std::fmt::Debug for Extensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.extensions.iter().map(|e| e.name()))
            .finish()
    }
}
