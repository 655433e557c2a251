//! Demo inventory served by the virtual bridge.
//!
//! | id | kind | address |
//! |----|------|---------|
//! | `virtual-bridge` | bridge device | `1` |
//! | `z1` Kitchen | light | `11` |
//! | `z2` Living Room | light | `12` |
//! | `z3` Patio Shade | shade | `13` |
//! | `z4` Porch | switch (binary) | `14` |
//! | `keypad-hall` | keypad device | `2` |
//! | `b-evening`, `b-all-off` | keypad buttons | `1`, `2` |
//! | `evening`, `all-off` | scenes | |

use hestia_domain::command::Command;
use hestia_domain::device::{Button, Device, Output, Sensor, Zone, ZoneKind};
use hestia_domain::error::IntegrityError;
use hestia_domain::id::{ButtonId, SceneId, SensorId, ZoneId};
use hestia_domain::inventory::Inventory;
use hestia_domain::scene::Scene;

use crate::MODEL_NUMBER;

pub const BRIDGE_ID: &str = "virtual-bridge";

const KEYPAD_MODEL: &str = "virtual-keypad";

fn bridge() -> Result<Device, IntegrityError> {
    let mut keypad = Device::builder()
        .id("keypad-hall")
        .name("Hall Keypad")
        .address("2")
        .model_number(KEYPAD_MODEL)
        .build();
    let buttons = [
        Button::new(ButtonId::from("b-evening"), "Evening", "1"),
        Button::new(ButtonId::from("b-all-off"), "All Off", "2"),
    ];
    for button in buttons {
        keypad.add_button(button)?;
    }

    let mut bridge = Device::builder()
        .id(BRIDGE_ID)
        .name("Virtual Bridge")
        .description("Simulated lighting bridge")
        .address("1")
        .model_number(MODEL_NUMBER)
        .build();
    let zones = [
        Zone::new(ZoneId::from("z1"), "Kitchen", "11").with_kind(ZoneKind::Light),
        Zone::new(ZoneId::from("z2"), "Living Room", "12").with_kind(ZoneKind::Light),
        Zone::new(ZoneId::from("z3"), "Patio Shade", "13").with_kind(ZoneKind::Shade),
        Zone::new(ZoneId::from("z4"), "Porch", "14")
            .with_kind(ZoneKind::Switch)
            .with_output(Output::Binary),
    ];
    for zone in zones {
        bridge.add_zone(zone)?;
    }
    bridge.add_sensor(Sensor::new(
        SensorId::from("s-lux"),
        "Outdoor Light",
        "21",
        "illuminance",
    ))?;
    bridge.add_device(keypad)?;
    Ok(bridge)
}

fn scenes(bridge: &Device) -> Vec<Scene> {
    let zone = |id: &str| bridge.zones().iter().find(|z| z.id.as_str() == id);
    let mut evening = Vec::new();
    if let (Some(kitchen), Some(living)) = (zone("z1"), zone("z2")) {
        evening.push(Command::zone_set_level(kitchen, 75.0));
        evening.push(Command::zone_set_level(living, 40.0));
    }
    let all_off = bridge.zones().iter().map(Command::zone_turn_off).collect();

    vec![
        Scene::new(SceneId::from("evening"), "Evening", evening),
        Scene::new(SceneId::from("all-off"), "All Off", all_off),
    ]
}

/// Inventory describing the hardware simulated by [`VirtualBridge`](crate::VirtualBridge).
///
/// # Errors
///
/// Returns an [`IntegrityError`] if two demo entities share an address.
pub fn demo_inventory() -> Result<Inventory, IntegrityError> {
    let bridge = bridge()?;
    let mut inventory = Inventory::new();
    for scene in scenes(&bridge) {
        inventory.add_scene(scene);
    }
    inventory.add_device(bridge)?;
    Ok(inventory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hestia_domain::id::DeviceId;

    #[test]
    fn should_expose_bridge_zones_and_nested_keypad() {
        let inventory = demo_inventory().unwrap();
        let bridge = inventory.device(&DeviceId::from(BRIDGE_ID)).unwrap();
        assert_eq!(bridge.zones().len(), 4);
        assert_eq!(bridge.sensors().len(), 1);
        assert!(inventory.device(&DeviceId::from("keypad-hall")).is_some());
        assert_eq!(
            inventory.zone(&ZoneId::from("z1")).unwrap().device_id,
            DeviceId::from(BRIDGE_ID)
        );
    }

    #[test]
    fn should_define_scenes_over_bridge_zones() {
        let inventory = demo_inventory().unwrap();
        let evening = inventory.scene(&SceneId::from("evening")).unwrap();
        assert_eq!(evening.commands.len(), 2);
        let all_off = inventory.scene(&SceneId::from("all-off")).unwrap();
        assert_eq!(all_off.commands.len(), 4);
    }
}
