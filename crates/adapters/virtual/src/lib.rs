//! # hestia-adapter-virtual
//!
//! Virtual lighting bridge for testing and demonstration.
//!
//! ## Provided pieces
//!
//! | Piece | Port | Behaviour |
//! |-------|------|-----------|
//! | [`VirtualExtension`] | `Extension` | Recognises devices with model number `virtual-bridge` |
//! | [`LineCommandBuilder`] | `CommandBuilder` | Zone commands to `#OUTPUT,<address>,1,<level>` |
//! | [`LineEventDecoder`] | `EventDecoder` | `~OUTPUT` and `~DEVICE` reports to events |
//! | [`VirtualBridge`] | `Transport`, `Connector` | Simulated hardware echoing level changes |
//! | [`demo_inventory`] | | Bridge, zones, keypad and scenes it simulates |
//!
//! ## Dependency rule
//!
//! Depends on `hestia-app` (port traits) and `hestia-domain` only.

mod bridge;
mod builder;
mod decoder;
mod demo;
mod error;

use std::sync::Arc;
use std::time::Duration;

use hestia_app::ports::{CommandBuilder, EventDecoder, Extension};
use hestia_domain::device::Device;

pub use bridge::VirtualBridge;
pub use builder::{FULL_LEVEL, LineCommandBuilder};
pub use decoder::LineEventDecoder;
pub use demo::{BRIDGE_ID, demo_inventory};
pub use error::VirtualError;

/// Model number of devices served by this extension.
pub const MODEL_NUMBER: &str = "virtual-bridge";

/// Default time echoed level reports stay hidden after a command.
pub const DEFAULT_SUPPRESS_WINDOW: Duration = Duration::from_millis(1500);

pub struct VirtualExtension {
    builder: Arc<LineCommandBuilder>,
    decoder: Arc<LineEventDecoder>,
}

impl Default for VirtualExtension {
    fn default() -> Self {
        Self::new(DEFAULT_SUPPRESS_WINDOW)
    }
}

impl VirtualExtension {
    #[must_use]
    pub fn new(suppress_window: Duration) -> Self {
        Self {
            builder: Arc::new(LineCommandBuilder::new(suppress_window)),
            decoder: Arc::new(LineEventDecoder),
        }
    }

    fn serves(device: &Device) -> bool {
        device.model_number == MODEL_NUMBER
    }
}

impl Extension for VirtualExtension {
    fn name(&self) -> &'static str {
        "virtual"
    }

    fn builder_for_device(&self, device: &Device) -> Option<Arc<dyn CommandBuilder>> {
        Self::serves(device).then(|| Arc::clone(&self.builder) as Arc<dyn CommandBuilder>)
    }

    fn decoder_for_device(&self, device: &Device) -> Option<Arc<dyn EventDecoder>> {
        Self::serves(device).then(|| Arc::clone(&self.decoder) as Arc<dyn EventDecoder>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hestia_app::ports::Extensions;
    use hestia_domain::id::DeviceId;

    #[test]
    fn should_return_virtual_as_name() {
        assert_eq!(VirtualExtension::default().name(), "virtual");
    }

    #[test]
    fn should_serve_only_bridge_model() {
        let inventory = demo_inventory().unwrap();
        let bridge = inventory.device(&DeviceId::from(BRIDGE_ID)).unwrap();
        let keypad = inventory.device(&DeviceId::from("keypad-hall")).unwrap();

        let mut extensions = Extensions::new();
        extensions.register(VirtualExtension::default());

        assert!(extensions.find_builder(bridge).is_some());
        assert!(extensions.find_decoder(bridge).is_some());
        assert!(extensions.find_builder(keypad).is_none());
        assert!(extensions.find_decoder(keypad).is_none());
    }
}
