//! Device readers — from a connection's bytes to broker events.
//!
//! Each device connection gets its own task. The byte stream is framed into
//! lines, every line is forwarded as a `RawLine` event, and the device's
//! extension decoder turns it into higher-level events (button presses,
//! feature reports). Everything goes through the bounded ingest channel, so a
//! slow broker holds the reader back instead of buffering without limit.

use std::io;
use std::sync::Arc;

use hestia_domain::device::Device;
use hestia_domain::event::Event;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;

use crate::broker::EventSender;
use crate::ports::{Connector, EventDecoder};
use crate::system::System;

const PROMPT: &[char] = &['G', 'N', 'E', 'T', '>', ' '];

/// Strip the bridge prompt from a received line, `None` if nothing is left.
#[must_use]
pub fn normalize_line(line: &str) -> Option<&str> {
    let line = line.trim_start_matches(PROMPT).trim_end_matches('\r');
    (!line.is_empty()).then_some(line)
}

/// Frames a byte stream into `\n` terminated lines.
///
/// Lines are decoded lossily: bytes that are not UTF-8 become U+FFFD and only
/// that line is affected.
pub struct LineReader<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            buf: Vec::new(),
        }
    }

    /// Next line without its `\n`, `None` once the stream ends.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the read itself fails.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf).await? == 0 {
            return Ok(None);
        }
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

/// Frame `reader` into lines (`\r\n` or `\n` terminated).
pub fn lines<R: AsyncRead + Unpin>(reader: R) -> LineReader<R> {
    LineReader::new(reader)
}

/// Connect to `device` and forward its events until the stream ends or the
/// broker stops ingesting.
pub fn spawn_device_reader<C>(
    connector: Arc<C>,
    device: Device,
    decoder: Arc<dyn EventDecoder>,
    system: Arc<System>,
    sender: EventSender,
) -> JoinHandle<()>
where
    C: Connector + 'static,
{
    tokio::spawn(async move {
        let stream = match connector.connect(&device).await {
            Ok(stream) => stream,
            Err(err) => {
                tracing::error!(device = %device.id, error = %err, "device connection failed");
                return;
            }
        };
        tracing::info!(device = %device.id, name = %device.name, "device reader started");

        let mut lines = lines(stream);
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    tracing::warn!(device = %device.id, error = %err, "device stream failed");
                    break;
                }
            };
            let Some(line) = normalize_line(&line) else {
                continue;
            };

            let decoded = decoder.decode(system.inventory(), &device.id, line);
            let events = std::iter::once(Event::raw_line(device.id.clone(), line)).chain(decoded);
            for event in events {
                if sender.send(event).await.is_err() {
                    tracing::debug!(device = %device.id, "ingest closed, reader exiting");
                    return;
                }
            }
        }
        tracing::info!(device = %device.id, "device reader stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::ingest_channel;
    use crate::command_processor::command_queue;
    use hestia_domain::error::HestiaError;
    use hestia_domain::event::EventKind;
    use hestia_domain::id::{ButtonId, DeviceId};
    use hestia_domain::inventory::Inventory;
    use std::future::Future;

    #[test]
    fn should_strip_prompt_and_skip_empty_lines() {
        assert_eq!(normalize_line("GNET> ~OUTPUT,1,1,50"), Some("~OUTPUT,1,1,50"));
        assert_eq!(normalize_line("GNET> "), None);
        assert_eq!(normalize_line(""), None);
        assert_eq!(normalize_line("~DEVICE,1,2,3\r"), Some("~DEVICE,1,2,3"));
    }

    #[tokio::test]
    async fn should_frame_crlf_lines() {
        let bytes: &[u8] = b"GNET> ~A\r\n\r\n~B\r\nGNET> ";
        let mut reader = lines(bytes);
        let mut framed = Vec::new();
        while let Some(line) = reader.next_line().await.unwrap() {
            framed.extend(normalize_line(&line).map(str::to_string));
        }
        assert_eq!(framed, vec!["~A".to_string(), "~B".to_string()]);
    }

    struct StaticConnector(&'static [u8]);

    impl Connector for StaticConnector {
        type Stream = &'static [u8];

        fn connect(
            &self,
            _device: &Device,
        ) -> impl Future<Output = Result<Self::Stream, HestiaError>> + Send {
            let bytes = self.0;
            async move { Ok(bytes) }
        }
    }

    struct PressDecoder;

    impl EventDecoder for PressDecoder {
        fn decode(&self, _inventory: &Inventory, device_id: &DeviceId, line: &str) -> Vec<Event> {
            line.strip_prefix("PRESS ")
                .map(|b| Event::button_press(device_id.clone(), ButtonId::from(b)))
                .into_iter()
                .collect()
        }
    }

    #[tokio::test]
    async fn should_forward_raw_and_decoded_events() {
        let (queue, _commands) = command_queue(1);
        let system = Arc::new(System::new(Inventory::new(), queue));
        let (sender, mut receiver) = ingest_channel(8);
        let device = Device::builder().id("bridge").build();

        spawn_device_reader(
            Arc::new(StaticConnector(b"PRESS b1\r\nnoise\r\n")),
            device,
            Arc::new(PressDecoder),
            system,
            sender,
        )
        .await
        .unwrap();

        let mut kinds = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            kinds.push(event.kind().clone());
        }
        assert_eq!(kinds.len(), 3);
        assert!(matches!(kinds[0], EventKind::RawLine { .. }));
        assert!(matches!(kinds[1], EventKind::ButtonPress { .. }));
        assert!(matches!(kinds[2], EventKind::RawLine { .. }));
    }

    #[tokio::test]
    async fn should_keep_reading_after_a_line_with_invalid_utf8() {
        let (queue, _commands) = command_queue(1);
        let system = Arc::new(System::new(Inventory::new(), queue));
        let (sender, mut receiver) = ingest_channel(8);
        let device = Device::builder().id("bridge").build();

        spawn_device_reader(
            Arc::new(StaticConnector(b"~A\r\n~B\xff\r\n~C\r\n~D\r\n")),
            device,
            Arc::new(PressDecoder),
            system,
            sender,
        )
        .await
        .unwrap();

        let mut raw = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            if let EventKind::RawLine { line } = event.kind() {
                raw.push(line.clone());
            }
        }
        assert_eq!(raw, vec!["~A", "~B\u{FFFD}", "~C", "~D"]);
    }
}
