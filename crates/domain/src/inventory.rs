//! The devices and scenes known to the controller.
//!
//! How the inventory is discovered or persisted is outside the core; the
//! composition root builds it and hands it over.

use crate::device::{Button, Device, Zone};
use crate::error::IntegrityError;
use crate::id::{DeviceId, SceneId, ZoneId};
use crate::scene::Scene;

#[derive(Debug, Clone, Default)]
pub struct Inventory {
    devices: Vec<Device>,
    scenes: Vec<Scene>,
}

impl Inventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a top-level device.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::DuplicateAddress`] if another top-level
    /// device uses the same address.
    pub fn add_device(&mut self, device: Device) -> Result<(), IntegrityError> {
        if self.devices.iter().any(|d| d.address == device.address) {
            return Err(IntegrityError::DuplicateAddress {
                entity: "device",
                address: device.address,
            });
        }
        self.devices.push(device);
        Ok(())
    }

    pub fn add_scene(&mut self, scene: Scene) {
        self.scenes.retain(|s| s.id != scene.id);
        self.scenes.push(scene);
    }

    /// Top-level devices.
    #[must_use]
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    #[must_use]
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    fn all_devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter().flat_map(Device::walk)
    }

    /// Look a device up by id at any depth.
    #[must_use]
    pub fn device(&self, id: &DeviceId) -> Option<&Device> {
        self.all_devices().find(|d| &d.id == id)
    }

    #[must_use]
    pub fn zone(&self, id: &ZoneId) -> Option<&Zone> {
        self.all_devices()
            .flat_map(Device::zones)
            .find(|z| &z.id == id)
    }

    /// Zone at `address` on the given device.
    #[must_use]
    pub fn zone_by_address(&self, device_id: &DeviceId, address: &str) -> Option<&Zone> {
        self.device(device_id)?
            .zones()
            .iter()
            .find(|z| z.address == address)
    }

    /// Button `address` on the device addressed `device_address`, searched
    /// below `root` (the device whose connection produced the line).
    #[must_use]
    pub fn button_by_address(
        &self,
        root: &DeviceId,
        device_address: &str,
        address: &str,
    ) -> Option<&Button> {
        self.device(root)?
            .walk()
            .find(|d| d.address == device_address)?
            .buttons()
            .iter()
            .find(|b| b.address == address)
    }

    #[must_use]
    pub fn scene(&self, id: &SceneId) -> Option<&Scene> {
        self.scenes.iter().find(|s| &s.id == id)
    }
}
