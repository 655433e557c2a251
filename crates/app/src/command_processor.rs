//! Command processor — turns queued command groups into hardware traffic.
//!
//! Actions push [`CommandGroup`]s through a bounded [`CommandQueue`] without
//! waiting. The processor task drains the queue and, for every command in a
//! group, resolves the target device, builds the payload with the device's
//! extension, applies any requested reporting suppression, and transmits it.
//! Commands of one group run in order; the first failure abandons the rest of
//! that group only.

use std::sync::Arc;

use hestia_domain::command::{Command, CommandGroup};
use hestia_domain::device::Device;
use hestia_domain::error::{HestiaError, NotFoundError};
use hestia_domain::event::Event;
use tokio::sync::mpsc;

use crate::broker::EventBroker;
use crate::ports::{Extensions, Transport};
use crate::system::System;

/// Name of the event published when a group is abandoned.
pub const COMMAND_GROUP_FAILED: &str = "command_group_failed";

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("command queue is full")]
    Full,
    #[error("command processor has stopped")]
    Closed,
}

impl From<QueueError> for HestiaError {
    fn from(err: QueueError) -> Self {
        Self::Transport(Box::new(err))
    }
}

/// Producer side of the bounded command queue.
#[derive(Debug, Clone)]
pub struct CommandQueue {
    sender: mpsc::Sender<CommandGroup>,
}

/// Create the command queue: actions get the [`CommandQueue`], the receiver
/// goes to [`CommandProcessor::run`].
#[must_use]
pub fn command_queue(capacity: usize) -> (CommandQueue, mpsc::Receiver<CommandGroup>) {
    let (sender, receiver) = mpsc::channel(capacity);
    (CommandQueue { sender }, receiver)
}

impl CommandQueue {
    /// Queue `group` without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Full`] when the queue is at capacity, or
    /// [`QueueError::Closed`] once the processor is gone.
    pub fn enqueue(&self, group: CommandGroup) -> Result<(), QueueError> {
        self.sender.try_send(group).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => QueueError::Full,
            mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
        })
    }
}

pub struct CommandProcessor<T> {
    system: Arc<System>,
    broker: Arc<EventBroker>,
    extensions: Extensions,
    transport: T,
}

impl<T: Transport> CommandProcessor<T> {
    pub fn new(
        system: Arc<System>,
        broker: Arc<EventBroker>,
        extensions: Extensions,
        transport: T,
    ) -> Self {
        Self {
            system,
            broker,
            extensions,
            transport,
        }
    }

    /// Process groups until every [`CommandQueue`] handle is dropped.
    pub async fn run(self, mut receiver: mpsc::Receiver<CommandGroup>) {
        while let Some(group) = receiver.recv().await {
            // failures are logged and published by `process`
            let _ = self.process(&group).await;
        }
        tracing::info!("command processor stopped");
    }

    /// Send every command of `group`, in order.
    ///
    /// # Errors
    ///
    /// Returns the first command's failure; later commands are not sent.
    #[tracing::instrument(skip(self, group), fields(group_id = %group.id, description = %group.description))]
    pub async fn process(&self, group: &CommandGroup) -> Result<(), HestiaError> {
        for (index, command) in group.commands.iter().enumerate() {
            if let Err(err) = self.send(command).await {
                tracing::error!(
                    error = %err,
                    command = %command,
                    index,
                    remaining = group.commands.len() - index - 1,
                    "command group aborted"
                );
                self.broker.enqueue(Event::generic(
                    COMMAND_GROUP_FAILED,
                    serde_json::json!({
                        "group_id": group.id,
                        "description": group.description,
                        "command": command.to_string(),
                        "error": err.to_string(),
                    }),
                ));
                return Err(err);
            }
        }
        Ok(())
    }

    async fn send(&self, command: &Command) -> Result<(), HestiaError> {
        let device = self.device(command)?;
        let builder = self
            .extensions
            .find_builder(&device)
            .ok_or_else(|| NotFoundError {
                entity: "CommandBuilder",
                id: device.model_number.clone(),
            })?;
        let built = builder.build(command)?;

        if let Some(suppression) = &built.suppress {
            self.broker.suppress_feature_reporting(
                &suppression.feature_id,
                suppression.attrs.clone(),
                suppression.delay,
            );
        }

        tracing::debug!(device = %device.id, payload = %built.payload, "transmitting command");
        self.transport.send(&device, &built).await
    }

    fn device(&self, command: &Command) -> Result<Device, HestiaError> {
        let device_id = command.device_id();
        self.system
            .inventory()
            .device(device_id)
            .cloned()
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Device",
                    id: device_id.to_string(),
                }
                .into()
            })
    }
}
