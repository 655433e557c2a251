//! Device — an addressable piece of hardware owning zones, buttons, sensors
//! and child devices.
//!
//! Addresses are unique among siblings of the same kind: a device never holds
//! two zones (or two buttons, sensors, child devices) at the same address.

use serde::{Deserialize, Serialize};

use crate::error::IntegrityError;
use crate::id::{ButtonId, DeviceId, FeatureId, SensorId, ZoneId};

/// What a zone drives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Light,
    Shade,
    Switch,
    #[default]
    Unknown,
}

/// How a zone's output can be driven.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Output {
    /// On or off only.
    Binary,
    /// Any level between 0 and 100.
    #[default]
    Continuous,
}

/// A controllable output of a device (a light circuit, a shade motor, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub address: String,
    pub device_id: DeviceId,
    pub kind: ZoneKind,
    pub output: Output,
}

impl Zone {
    #[must_use]
    pub fn new(id: ZoneId, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            address: address.into(),
            device_id: DeviceId::from(""),
            kind: ZoneKind::default(),
            output: Output::default(),
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ZoneKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    /// Feature under which this zone reports its level.
    #[must_use]
    pub fn feature_id(&self) -> FeatureId {
        FeatureId::from(&self.id)
    }
}

/// A physical keypad button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub id: ButtonId,
    pub name: String,
    pub address: String,
    pub device_id: DeviceId,
}

impl Button {
    #[must_use]
    pub fn new(id: ButtonId, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            address: address.into(),
            device_id: DeviceId::from(""),
        }
    }
}

/// A read-only measurement point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sensor {
    pub id: SensorId,
    pub name: String,
    pub address: String,
    pub device_id: DeviceId,
    /// Attribute name reported by this sensor, e.g. `"temperature"`.
    pub attribute: String,
}

impl Sensor {
    #[must_use]
    pub fn new(
        id: SensorId,
        name: impl Into<String>,
        address: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            address: address.into(),
            device_id: DeviceId::from(""),
            attribute: attribute.into(),
        }
    }
}

/// A physical or virtual device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub description: String,
    pub address: String,
    /// Used by extensions to recognise the hardware family.
    pub model_number: String,
    zones: Vec<Zone>,
    buttons: Vec<Button>,
    sensors: Vec<Sensor>,
    devices: Vec<Device>,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Attach a zone, taking ownership of it.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::DuplicateAddress`] if a zone already uses the
    /// same address; the device is left unchanged.
    pub fn add_zone(&mut self, mut zone: Zone) -> Result<(), IntegrityError> {
        ensure_unique("zone", &zone.address, self.zones.iter().map(|z| &z.address))?;
        zone.device_id = self.id.clone();
        self.zones.push(zone);
        Ok(())
    }

    /// Attach a button.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::DuplicateAddress`] on an address clash.
    pub fn add_button(&mut self, mut button: Button) -> Result<(), IntegrityError> {
        ensure_unique(
            "button",
            &button.address,
            self.buttons.iter().map(|b| &b.address),
        )?;
        button.device_id = self.id.clone();
        self.buttons.push(button);
        Ok(())
    }

    /// Attach a sensor.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::DuplicateAddress`] on an address clash.
    pub fn add_sensor(&mut self, mut sensor: Sensor) -> Result<(), IntegrityError> {
        ensure_unique(
            "sensor",
            &sensor.address,
            self.sensors.iter().map(|s| &s.address),
        )?;
        sensor.device_id = self.id.clone();
        self.sensors.push(sensor);
        Ok(())
    }

    /// Attach a child device.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::DuplicateAddress`] on an address clash.
    pub fn add_device(&mut self, device: Device) -> Result<(), IntegrityError> {
        ensure_unique(
            "device",
            &device.address,
            self.devices.iter().map(|d| &d.address),
        )?;
        self.devices.push(device);
        Ok(())
    }

    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    #[must_use]
    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    #[must_use]
    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    #[must_use]
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// This device followed by all of its descendants, depth first.
    pub fn walk(&self) -> Box<dyn Iterator<Item = &Device> + '_> {
        Box::new(std::iter::once(self).chain(self.devices.iter().flat_map(Device::walk)))
    }
}

fn ensure_unique<'a>(
    entity: &'static str,
    address: &str,
    mut existing: impl Iterator<Item = &'a String>,
) -> Result<(), IntegrityError> {
    if existing.any(|a| a == address) {
        return Err(IntegrityError::DuplicateAddress {
            entity,
            address: address.to_string(),
        });
    }
    Ok(())
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    name: Option<String>,
    description: Option<String>,
    address: Option<String>,
    model_number: Option<String>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<DeviceId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn model_number(mut self, model_number: impl Into<String>) -> Self {
        self.model_number = Some(model_number.into());
        self
    }

    #[must_use]
    pub fn build(self) -> Device {
        Device {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            model_number: self.model_number.unwrap_or_default(),
            zones: Vec::new(),
            buttons: Vec::new(),
            sensors: Vec::new(),
            devices: Vec::new(),
        }
    }
}
