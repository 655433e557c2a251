//! Domain commands to bridge `#OUTPUT` lines.

use std::time::Duration;

use hestia_app::ports::{BuiltCommand, CommandBuilder, Suppression};
use hestia_domain::attribute;
use hestia_domain::command::Command;
use hestia_domain::error::HestiaError;

use crate::error::VirtualError;

/// Level sent for `ZoneTurnOn`.
pub const FULL_LEVEL: f32 = 100.0;

pub struct LineCommandBuilder {
    suppress_window: Duration,
}

impl LineCommandBuilder {
    #[must_use]
    pub fn new(suppress_window: Duration) -> Self {
        Self { suppress_window }
    }
}

impl CommandBuilder for LineCommandBuilder {
    fn build(&self, command: &Command) -> Result<BuiltCommand, HestiaError> {
        let (target, level) = match command {
            Command::ZoneSetLevel { target, level } => (target, *level),
            Command::ZoneTurnOn { target } => (target, FULL_LEVEL),
            Command::ZoneTurnOff { target } => (target, 0.0),
        };
        if !(0.0..=FULL_LEVEL).contains(&level) {
            return Err(VirtualError::LevelOutOfRange(level).into());
        }

        // the bridge ramps and echoes intermediate levels; keep only ours
        Ok(BuiltCommand {
            payload: format!("#OUTPUT,{},1,{level:.2}", target.zone_address),
            suppress: Some(Suppression {
                feature_id: command.feature_id(),
                attrs: Some(attribute::level(level)),
                delay: self.suppress_window,
            }),
        })
    }
}
