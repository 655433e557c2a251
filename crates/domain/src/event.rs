//! Event — an immutable record of something that happened on a device.
//!
//! Events are produced by device connections (raw lines, decoded button
//! presses, feature reports), by the clock, and synthetically by the core
//! (e.g. replaying just-set values before suppressing hardware echo).

use serde::{Deserialize, Serialize};

use crate::attribute::Attributes;
use crate::id::{ButtonId, DeviceId, EventId, FeatureId};
use crate::time::{LocalDateTime, Timestamp, now};

/// What happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// A framed line received from a device connection, undecoded.
    RawLine { line: String },
    /// The current values of a feature, as reported by hardware or replayed by the core.
    FeatureReporting {
        feature_id: FeatureId,
        attrs: Attributes,
    },
    /// A physical keypad button went down.
    ButtonPress { button_id: ButtonId },
    /// A physical keypad button came back up.
    ButtonRelease { button_id: ButtonId },
    /// Periodic wall-clock tick in local time.
    ClockTick { local: LocalDateTime },
    /// Anything else, identified by name.
    Generic {
        name: String,
        #[serde(default)]
        data: serde_json::Value,
    },
}

/// An immutable event, optionally attributed to the device that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    device_id: Option<DeviceId>,
    kind: EventKind,
    timestamp: Timestamp,
}

impl Event {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(device_id: Option<DeviceId>, kind: EventKind) -> Self {
        Self {
            id: EventId::new(),
            device_id,
            kind,
            timestamp: now(),
        }
    }

    #[must_use]
    pub fn raw_line(device_id: DeviceId, line: impl Into<String>) -> Self {
        Self::new(Some(device_id), EventKind::RawLine { line: line.into() })
    }

    #[must_use]
    pub fn feature_reporting(
        device_id: Option<DeviceId>,
        feature_id: FeatureId,
        attrs: Attributes,
    ) -> Self {
        Self::new(device_id, EventKind::FeatureReporting { feature_id, attrs })
    }

    #[must_use]
    pub fn button_press(device_id: DeviceId, button_id: ButtonId) -> Self {
        Self::new(Some(device_id), EventKind::ButtonPress { button_id })
    }

    #[must_use]
    pub fn button_release(device_id: DeviceId, button_id: ButtonId) -> Self {
        Self::new(Some(device_id), EventKind::ButtonRelease { button_id })
    }

    #[must_use]
    pub fn clock_tick(local: LocalDateTime) -> Self {
        Self::new(None, EventKind::ClockTick { local })
    }

    #[must_use]
    pub fn generic(name: impl Into<String>, data: serde_json::Value) -> Self {
        Self::new(
            None,
            EventKind::Generic {
                name: name.into(),
                data,
            },
        )
    }

    /// Replace the timestamp at construction time.
    #[must_use]
    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn id(&self) -> &EventId {
        &self.id
    }

    /// The originating device, `None` for synthetic events.
    #[must_use]
    pub fn device_id(&self) -> Option<&DeviceId> {
        self.device_id.as_ref()
    }

    #[must_use]
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// The reported feature, for `FeatureReporting` events.
    #[must_use]
    pub fn reported_feature(&self) -> Option<&FeatureId> {
        match &self.kind {
            EventKind::FeatureReporting { feature_id, .. } => Some(feature_id),
            _ => None,
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            EventKind::RawLine { line } => write!(f, "raw_line({})", line.trim_end()),
            EventKind::FeatureReporting { feature_id, .. } => {
                write!(f, "feature_reporting({feature_id})")
            }
            EventKind::ButtonPress { button_id } => write!(f, "button_press({button_id})"),
            EventKind::ButtonRelease { button_id } => write!(f, "button_release({button_id})"),
            EventKind::ClockTick { local } => write!(f, "clock_tick({})", local.format("%H:%M")),
            EventKind::Generic { name, .. } => write!(f, "generic({name})"),
        }
    }
}
