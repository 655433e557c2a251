//! Commands — hardware-agnostic instructions and the groups they travel in.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::Zone;
use crate::id::{CommandGroupId, DeviceId, FeatureId, ZoneId};

/// Where a zone command lands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneTarget {
    pub zone_id: ZoneId,
    pub zone_address: String,
    pub zone_name: String,
    pub device_id: DeviceId,
}

impl From<&Zone> for ZoneTarget {
    fn from(zone: &Zone) -> Self {
        Self {
            zone_id: zone.id.clone(),
            zone_address: zone.address.clone(),
            zone_name: zone.name.clone(),
            device_id: zone.device_id.clone(),
        }
    }
}

/// An abstract instruction for one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    ZoneSetLevel {
        #[serde(flatten)]
        target: ZoneTarget,
        level: f32,
    },
    ZoneTurnOn {
        #[serde(flatten)]
        target: ZoneTarget,
    },
    ZoneTurnOff {
        #[serde(flatten)]
        target: ZoneTarget,
    },
}

impl Command {
    #[must_use]
    pub fn zone_set_level(zone: &Zone, level: f32) -> Self {
        Self::ZoneSetLevel {
            target: zone.into(),
            level,
        }
    }

    #[must_use]
    pub fn zone_turn_on(zone: &Zone) -> Self {
        Self::ZoneTurnOn {
            target: zone.into(),
        }
    }

    #[must_use]
    pub fn zone_turn_off(zone: &Zone) -> Self {
        Self::ZoneTurnOff {
            target: zone.into(),
        }
    }

    fn target(&self) -> &ZoneTarget {
        match self {
            Self::ZoneSetLevel { target, .. }
            | Self::ZoneTurnOn { target }
            | Self::ZoneTurnOff { target } => target,
        }
    }

    /// Device the command must be sent to.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.target().device_id
    }

    /// Feature whose state the command changes.
    #[must_use]
    pub fn feature_id(&self) -> FeatureId {
        FeatureId::from(&self.target().zone_id)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZoneSetLevel { target, level } => {
                write!(f, "Zone[{}] Set Level: {level}", target.zone_name)
            }
            Self::ZoneTurnOn { target } => write!(f, "Zone[{}] Turn On", target.zone_name),
            Self::ZoneTurnOff { target } => write!(f, "Zone[{}] Turn Off", target.zone_name),
        }
    }
}

/// The atomic unit submitted to the command processor; commands run in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandGroup {
    pub id: CommandGroupId,
    pub description: String,
    pub commands: Vec<Command>,
}

impl CommandGroup {
    #[must_use]
    pub fn new(description: impl Into<String>, commands: Vec<Command>) -> Self {
        Self {
            id: CommandGroupId::new(),
            description: description.into(),
            commands,
        }
    }

    /// A group holding a single command, described by that command.
    #[must_use]
    pub fn single(command: Command) -> Self {
        Self::new(command.to_string(), vec![command])
    }
}
