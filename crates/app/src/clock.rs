//! Periodic local-time ticks for time triggers.

use std::time::Duration;

use hestia_domain::event::Event;
use hestia_domain::time::local_now;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::broker::EventSender;

/// Send a `ClockTick` every `period` until the ingest channel closes.
///
/// The first tick is sent immediately. `period` must be shorter than a
/// minute for time triggers to see every minute.
pub fn spawn_clock(sender: EventSender, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if sender.send(Event::clock_tick(local_now())).await.is_err() {
                break;
            }
        }
        tracing::debug!("clock stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::ingest_channel;
    use hestia_domain::event::EventKind;

    #[tokio::test(start_paused = true)]
    async fn should_tick_every_period() {
        let (sender, mut receiver) = ingest_channel(8);
        let clock = spawn_clock(sender, Duration::from_secs(15));

        for _ in 0..3 {
            let event = receiver.recv().await.unwrap();
            assert!(matches!(event.kind(), EventKind::ClockTick { .. }));
        }
        clock.abort();
    }

    #[tokio::test]
    async fn should_stop_when_ingest_closes() {
        let (sender, receiver) = ingest_channel(1);
        drop(receiver);
        let clock = spawn_clock(sender, Duration::from_millis(1));
        clock.await.unwrap();
    }
}
