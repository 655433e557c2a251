//! Typed identifier newtypes.
//!
//! Identifiers are strings so that ids restored from storage or supplied by an
//! inventory (e.g. `"z1"`) are kept verbatim. Freshly generated ids are UUID v4.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Borrow the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a [`Recipe`](crate::recipe::Recipe).
    RecipeId
);

define_id!(
    /// Unique identifier for a [`Device`](crate::device::Device).
    DeviceId
);

define_id!(
    /// Unique identifier for a [`Zone`](crate::device::Zone).
    ZoneId
);

define_id!(
    /// Unique identifier for a [`Scene`](crate::scene::Scene).
    SceneId
);

define_id!(
    /// Unique identifier for a [`Button`](crate::device::Button).
    ButtonId
);

define_id!(
    /// Unique identifier for a [`Sensor`](crate::device::Sensor).
    SensorId
);

define_id!(
    /// Addressable hardware attribute targeted by commands and reported by events.
    FeatureId
);

define_id!(
    /// Unique identifier for an [`Event`](crate::event::Event).
    EventId
);

define_id!(
    /// Unique identifier for a [`CommandGroup`](crate::command::CommandGroup).
    CommandGroupId
);

impl From<&ZoneId> for FeatureId {
    fn from(zone: &ZoneId) -> Self {
        Self(zone.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_unique_ids_when_called_twice() {
        let a = RecipeId::new();
        let b = RecipeId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn should_generate_uuid_formatted_ids() {
        let id = DeviceId::new();
        assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn should_keep_supplied_ids_verbatim() {
        let id: ZoneId = "z1".parse().unwrap();
        assert_eq!(id.as_str(), "z1");
        assert_eq!(id.to_string(), "z1");
    }

    #[test]
    fn should_serialize_as_plain_string() {
        let id = SceneId::from("evening");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"evening\"");
        let parsed: SceneId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn should_derive_feature_id_from_zone_id() {
        let zone = ZoneId::from("z1");
        assert_eq!(FeatureId::from(&zone).as_str(), "z1");
    }
}
