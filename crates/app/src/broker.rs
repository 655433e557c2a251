//! In-process event broker.
//!
//! Producers hand events to [`EventBroker::enqueue`], directly or through the
//! bounded ingest channel pumped by [`EventBroker::run_ingest`]. Each event is
//! first checked against the active enqueue filters; a filtered event is
//! dropped silently. Otherwise it is delivered to every registered
//! [`EventConsumer`] that accepts it, then broadcast to observers.
//!
//! Enqueue filters are keyed by feature and expire on their own: each one
//! schedules an eviction task for its expiry and is also checked against the
//! clock on every enqueue.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use hestia_domain::attribute::Attributes;
use hestia_domain::event::{Event, EventKind};
use hestia_domain::id::FeatureId;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

/// Something that receives events from the broker.
///
/// `consume` runs synchronously inside the enqueue call and must not block.
pub trait EventConsumer: Send + Sync {
    /// Registration key; registering a second consumer under the same key
    /// replaces the first.
    fn key(&self) -> &str;

    /// Whether the consumer wants `event`.
    fn accepts(&self, event: &Event) -> bool;

    fn consume(&self, event: &Event);
}

type Predicate = Box<dyn Fn(&Event) -> bool + Send + Sync>;

struct EnqueueFilter {
    predicate: Predicate,
    expires_at: Instant,
    generation: u64,
}

impl EnqueueFilter {
    fn blocks(&self, event: &Event, now: Instant) -> bool {
        now < self.expires_at && (self.predicate)(event)
    }
}

type Filters = Arc<RwLock<HashMap<FeatureId, EnqueueFilter>>>;

/// Returned when the broker side of the ingest channel is gone.
#[derive(Debug, thiserror::Error)]
#[error("event ingest channel closed")]
pub struct IngestClosed;

/// Producer handle for the broker's bounded ingest channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Queue `event`, waiting for capacity when the channel is full.
    ///
    /// # Errors
    ///
    /// Returns [`IngestClosed`] once the ingest pump has stopped.
    pub async fn send(&self, event: Event) -> Result<(), IngestClosed> {
        self.sender.send(event).await.map_err(|_| IngestClosed)
    }
}

/// Create the ingest channel: producers get the [`EventSender`], the receiver
/// goes to [`EventBroker::run_ingest`].
#[must_use]
pub fn ingest_channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (sender, receiver) = mpsc::channel(capacity);
    (EventSender { sender }, receiver)
}

pub struct EventBroker {
    consumers: RwLock<HashMap<String, Arc<dyn EventConsumer>>>,
    filters: Filters,
    generation: AtomicU64,
    observers: broadcast::Sender<Event>,
}

impl EventBroker {
    /// Create a broker whose observer channel keeps `observer_capacity`
    /// events for slow observers.
    #[must_use]
    pub fn new(observer_capacity: usize) -> Self {
        let (observers, _) = broadcast::channel(observer_capacity);
        Self {
            consumers: RwLock::new(HashMap::new()),
            filters: Arc::new(RwLock::new(HashMap::new())),
            generation: AtomicU64::new(0),
            observers,
        }
    }

    /// Receive every event that passes the filters.
    ///
    /// A lagging observer loses the oldest events rather than slowing the
    /// broker down.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.observers.subscribe()
    }

    pub fn add_consumer(&self, consumer: Arc<dyn EventConsumer>) {
        let key = consumer.key().to_string();
        let mut consumers = self
            .consumers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if consumers.insert(key.clone(), consumer).is_some() {
            tracing::debug!(consumer = %key, "consumer replaced");
        }
    }

    /// Unregister the consumer registered under `key`, if any.
    pub fn remove_consumer(&self, key: &str) {
        self.consumers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    #[must_use]
    pub fn has_consumer(&self, key: &str) -> bool {
        self.consumers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    #[must_use]
    pub fn consumer_count(&self) -> usize {
        self.consumers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Filter or deliver `event`. Never fails towards the producer.
    pub fn enqueue(&self, event: Event) {
        if self.is_filtered(&event) {
            tracing::debug!(%event, "event dropped by enqueue filter");
            return;
        }

        let consumers: Vec<Arc<dyn EventConsumer>> = self
            .consumers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|c| c.accepts(&event))
            .cloned()
            .collect();

        tracing::debug!(%event, consumers = consumers.len(), "delivering event");
        for consumer in consumers {
            consumer.consume(&event);
        }

        // fails only when no observer is subscribed
        let _ = self.observers.send(event);
    }

    fn is_filtered(&self, event: &Event) -> bool {
        let Some(feature_id) = event.reported_feature() else {
            return false;
        };
        self.filters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(feature_id)
            .is_some_and(|filter| filter.blocks(event, Instant::now()))
    }

    /// Drop events for `feature_id` matching `predicate` until `ttl` elapses.
    ///
    /// Replaces any filter already installed for the feature.
    pub fn add_enqueue_filter(
        &self,
        feature_id: FeatureId,
        predicate: impl Fn(&Event) -> bool + Send + Sync + 'static,
        ttl: Duration,
    ) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let expires_at = Instant::now() + ttl;
        self.filters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                feature_id.clone(),
                EnqueueFilter {
                    predicate: Box::new(predicate),
                    expires_at,
                    generation,
                },
            );
        tracing::debug!(feature = %feature_id, ?ttl, "enqueue filter installed");

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let filters = Arc::clone(&self.filters);
            handle.spawn(async move {
                tokio::time::sleep_until(expires_at).await;
                evict(&filters, &feature_id, generation);
            });
        }
    }

    /// Remove the filter for `feature_id`. Removing a missing filter is a no-op.
    pub fn remove_enqueue_filter(&self, feature_id: &FeatureId) {
        self.filters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(feature_id);
    }

    /// Whether an unexpired filter is installed for `feature_id`.
    #[must_use]
    pub fn has_enqueue_filter(&self, feature_id: &FeatureId) -> bool {
        let now = Instant::now();
        self.filters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(feature_id)
            .is_some_and(|f| now < f.expires_at)
    }

    /// Replay `attrs` as the feature's current state, then hide reporting for
    /// the feature until `delay` elapses.
    ///
    /// Used right after a command is transmitted: observers see the target
    /// value at once instead of the intermediate values hardware reports
    /// while it ramps.
    pub fn suppress_feature_reporting(
        &self,
        feature_id: &FeatureId,
        attrs: Option<Attributes>,
        delay: Duration,
    ) {
        self.remove_enqueue_filter(feature_id);
        if let Some(attrs) = attrs {
            self.enqueue(Event::feature_reporting(None, feature_id.clone(), attrs));
        }
        self.add_enqueue_filter(
            feature_id.clone(),
            |event| matches!(event.kind(), EventKind::FeatureReporting { .. }),
            delay,
        );
    }

    /// Drain the ingest channel into [`enqueue`](Self::enqueue) until every
    /// sender is dropped.
    pub async fn run_ingest(self: Arc<Self>, mut receiver: mpsc::Receiver<Event>) {
        while let Some(event) = receiver.recv().await {
            self.enqueue(event);
        }
        tracing::info!("event ingest stopped");
    }
}

fn evict(filters: &Filters, feature_id: &FeatureId, generation: u64) {
    let mut filters = filters.write().unwrap_or_else(PoisonError::into_inner);
    if filters
        .get(feature_id)
        .is_some_and(|f| f.generation == generation)
    {
        filters.remove(feature_id);
        tracing::debug!(feature = %feature_id, "enqueue filter expired");
    }
}

impl std::fmt::Debug for EventBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBroker")
            .field("consumers", &self.consumer_count())
            .finish_non_exhaustive()
    }
}
