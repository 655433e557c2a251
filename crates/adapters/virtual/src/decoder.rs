//! Bridge report lines to domain events.
//!
//! | line | event |
//! |------|-------|
//! | `~OUTPUT,<zone address>,1,<level>` | `FeatureReporting` of the zone's level |
//! | `~DEVICE,<device address>,<button address>,3` | `ButtonPress` |
//! | `~DEVICE,<device address>,<button address>,4` | `ButtonRelease` |
//!
//! Anything else, or a line naming an address the inventory does not know,
//! decodes to nothing.

use hestia_app::ports::EventDecoder;
use hestia_domain::attribute;
use hestia_domain::event::Event;
use hestia_domain::id::DeviceId;
use hestia_domain::inventory::Inventory;

const PRESS: &str = "3";
const RELEASE: &str = "4";

pub struct LineEventDecoder;

impl LineEventDecoder {
    fn output(
        inventory: &Inventory,
        device_id: &DeviceId,
        address: &str,
        level: &str,
    ) -> Option<Event> {
        let Ok(level) = level.parse::<f32>() else {
            tracing::debug!(level, "unparsable output level");
            return None;
        };
        let Some(zone) = inventory.zone_by_address(device_id, address) else {
            tracing::debug!(device = %device_id, address, "report for unknown zone");
            return None;
        };
        Some(Event::feature_reporting(
            Some(device_id.clone()),
            zone.feature_id(),
            attribute::level(level),
        ))
    }

    fn button(
        inventory: &Inventory,
        device_id: &DeviceId,
        device_address: &str,
        address: &str,
        action: &str,
    ) -> Option<Event> {
        let Some(button) = inventory.button_by_address(device_id, device_address, address) else {
            tracing::debug!(device = %device_id, device_address, address, "unknown button");
            return None;
        };
        match action {
            PRESS => Some(Event::button_press(button.device_id.clone(), button.id.clone())),
            RELEASE => Some(Event::button_release(button.device_id.clone(), button.id.clone())),
            _ => None,
        }
    }
}

impl EventDecoder for LineEventDecoder {
    fn decode(&self, inventory: &Inventory, device_id: &DeviceId, line: &str) -> Vec<Event> {
        let mut fields = line.split(',');
        let kind = fields.next();
        let rest: Vec<&str> = fields.collect();

        let event = match (kind, rest.as_slice()) {
            (Some("~OUTPUT"), [address, "1", level]) => {
                Self::output(inventory, device_id, address, level)
            }
            (Some("~DEVICE"), [device_address, address, action]) => {
                Self::button(inventory, device_id, device_address, address, action)
            }
            _ => None,
        };
        event.into_iter().collect()
    }
}
