//! # hestiad — hestia daemon
//!
//! Composition root that wires the recipe engine to its adapters and runs it.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Install the tracing subscriber
//! - Build the inventory, broker, command queue and extensions
//! - Start the ingest pump, command processor, device readers and clock
//! - Load persisted recipes and start them
//! - Handle graceful shutdown (Ctrl-C)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use hestia_adapter_storage_json::JsonRecipeStore;
use hestia_adapter_virtual::{VirtualBridge, VirtualExtension, demo_inventory};
use hestia_app::broker::{EventBroker, ingest_channel};
use hestia_app::clock::spawn_clock;
use hestia_app::command_processor::{CommandProcessor, command_queue};
use hestia_app::ingest::spawn_device_reader;
use hestia_app::ports::Extensions;
use hestia_app::recipe_manager::RecipeManager;
use hestia_app::system::System;
use hestia_domain::inventory::Inventory;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Log every event the broker delivers.
fn spawn_observer(mut events: broadcast::Receiver<hestia_domain::event::Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::debug!(event_id = %event.id(), "{event}"),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event observer lagging");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    let filter = EnvFilter::try_new(&config.logging.filter)
        .with_context(|| format!("invalid log filter {:?}", config.logging.filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Inventory and extensions
    let mut extensions = Extensions::new();
    let inventory = if config.integrations.virtual_enabled {
        extensions.register(VirtualExtension::new(config.suppress_window()));
        demo_inventory().context("invalid demo inventory")?
    } else {
        Inventory::new()
    };
    let bridge = Arc::new(VirtualBridge::default());

    // Core pipeline
    let (commands, command_receiver) = command_queue(config.commands.queue_capacity);
    let system = Arc::new(System::new(inventory, commands));
    let broker = Arc::new(EventBroker::new(config.broker.observer_capacity));
    let (events, ingest_receiver) = ingest_channel(config.broker.ingest_capacity);

    let mut tasks = vec![
        spawn_observer(broker.subscribe()),
        tokio::spawn(Arc::clone(&broker).run_ingest(ingest_receiver)),
        tokio::spawn(
            CommandProcessor::new(
                Arc::clone(&system),
                Arc::clone(&broker),
                extensions.clone(),
                Arc::clone(&bridge),
            )
            .run(command_receiver),
        ),
    ];

    // Device readers
    let devices = system.inventory().devices().to_vec();
    for device in devices {
        let Some(decoder) = extensions.find_decoder(&device) else {
            tracing::warn!(device = %device.id, model = %device.model_number, "no extension for device");
            continue;
        };
        tasks.push(spawn_device_reader(
            Arc::clone(&bridge),
            device,
            decoder,
            Arc::clone(&system),
            events.clone(),
        ));
    }
    tasks.push(spawn_clock(events, config.tick_period()));

    // Recipes
    let store = JsonRecipeStore::new(&config.storage.recipes_dir);
    let manager = RecipeManager::new(store, Arc::clone(&broker), Arc::clone(&system));
    for cookbook in manager.cookbooks() {
        tracing::info!(cookbook = %cookbook.id, name = %cookbook.name, "cookbook available");
    }
    let started = manager
        .init()
        .await
        .context("failed to load persisted recipes")?;
    tracing::info!(
        recipes = started,
        dir = %config.storage.recipes_dir.display(),
        extensions = extensions.len(),
        "hestiad running"
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutting down");

    manager.shutdown().await;
    for task in tasks {
        task.abort();
    }
    Ok(())
}
