//! Simulated bridge hardware.
//!
//! The bridge accepts `#OUTPUT,<address>,1,<level>` payloads, remembers the
//! level of each zone address and reports the change on every open link the
//! way real hardware does: a ramp step halfway to the target, then the
//! target itself, each as a `~OUTPUT` line behind a `GNET> ` prompt.
//! Links are in-memory duplex streams handed out by [`Connector::connect`].

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use hestia_app::ports::{BuiltCommand, Connector, Transport};
use hestia_domain::device::Device;
use hestia_domain::error::HestiaError;
use tokio::io::{AsyncWriteExt, DuplexStream};

use crate::MODEL_NUMBER;
use crate::error::VirtualError;

const PROMPT: &str = "GNET> ";
const DEFAULT_LINK_BUFFER: usize = 4096;

pub struct VirtualBridge {
    levels: Mutex<HashMap<String, f32>>,
    links: tokio::sync::Mutex<Vec<DuplexStream>>,
    link_buffer: usize,
}

impl Default for VirtualBridge {
    fn default() -> Self {
        Self::new(DEFAULT_LINK_BUFFER)
    }
}

fn output_line(address: &str, level: f32) -> String {
    format!("{PROMPT}~OUTPUT,{address},1,{level:.2}\r\n")
}

fn parse_output(payload: &str) -> Result<(&str, f32), VirtualError> {
    let malformed = || VirtualError::MalformedPayload(payload.to_string());
    let fields: Vec<&str> = payload.split(',').collect();
    match fields.as_slice() {
        ["#OUTPUT", address, "1", level] => {
            let level = level.parse::<f32>().map_err(|_| malformed())?;
            Ok((*address, level))
        }
        _ => Err(malformed()),
    }
}

fn served(device: &Device) -> Result<(), VirtualError> {
    if device.model_number == MODEL_NUMBER {
        Ok(())
    } else {
        Err(VirtualError::UnknownDevice(device.id.to_string()))
    }
}

impl VirtualBridge {
    /// Bridge whose links buffer up to `link_buffer` bytes of unread reports.
    #[must_use]
    pub fn new(link_buffer: usize) -> Self {
        Self {
            levels: Mutex::new(HashMap::new()),
            links: tokio::sync::Mutex::new(Vec::new()),
            link_buffer,
        }
    }

    /// Last level set on the zone at `address`.
    #[must_use]
    pub fn level(&self, address: &str) -> Option<f32> {
        self.levels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .copied()
    }

    pub async fn link_count(&self) -> usize {
        self.links.lock().await.len()
    }

    /// Simulate a press and release of keypad button `button_address` on the
    /// device addressed `device_address`.
    pub async fn press_button(&self, device_address: &str, button_address: &str) {
        let report = format!(
            "{PROMPT}~DEVICE,{device_address},{button_address},3\r\n\
             {PROMPT}~DEVICE,{device_address},{button_address},4\r\n"
        );
        self.broadcast(&report).await;
    }

    async fn broadcast(&self, report: &str) {
        let mut links = self.links.lock().await;
        let mut open = Vec::with_capacity(links.len());
        for mut link in links.drain(..) {
            match link.write_all(report.as_bytes()).await {
                Ok(()) => open.push(link),
                Err(err) => tracing::debug!(error = %err, "bridge link closed"),
            }
        }
        *links = open;
    }
}

impl Transport for VirtualBridge {
    async fn send(&self, device: &Device, command: &BuiltCommand) -> Result<(), HestiaError> {
        served(device)?;
        let (address, level) = parse_output(&command.payload)?;
        let previous = self
            .levels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(address.to_string(), level)
            .unwrap_or(0.0);

        let midway = previous + (level - previous) / 2.0;
        let mut report = String::new();
        if (midway - level).abs() > f32::EPSILON {
            report.push_str(&output_line(address, midway));
        }
        report.push_str(&output_line(address, level));

        tracing::debug!(device = %device.id, address, level, "virtual output set");
        self.broadcast(&report).await;
        Ok(())
    }
}

impl Connector for VirtualBridge {
    type Stream = DuplexStream;

    async fn connect(&self, device: &Device) -> Result<DuplexStream, HestiaError> {
        served(device)?;
        let (client, bridge_end) = tokio::io::duplex(self.link_buffer);
        self.links.lock().await.push(bridge_end);
        tracing::info!(device = %device.id, "virtual bridge link opened");
        Ok(client)
    }
}
