//! Periodic tick loop driving the simulation.

use crate::telemetry::data::FeedMessage;
use crate::telemetry::hub::BroadcastHub;
use crate::telemetry::registry::SensorRegistry;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;
use tracing::{debug, error, info};

/// Handle to a running scheduler task.
///
/// The task runs until [`SchedulerHandle::shutdown`] is called or the handle
/// is dropped at process exit.
#[derive(Debug)]
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop the tick loop and wait for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }
}

/// Start the telemetry scheduler.
///
/// On every tick, every sensor is advanced in registry order and the
/// resulting batch is published to the hub as one `update` message. A tick
/// that overruns the period fires late rather than being dropped; there is
/// no catch-up burst.
pub fn start(
    registry: Arc<RwLock<SensorRegistry>>,
    hub: BroadcastHub,
    period: Duration,
) -> SchedulerHandle {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = IntervalStream::new(interval);

        info!(period_ms = period.as_millis() as u64, "telemetry scheduler started");

        loop {
            tokio::select! {
                _ = ticks.next() => {
                    let now = Utc::now();
                    let batch = {
                        let mut registry = registry.write().await;
                        registry.advance_all(now)
                    };

                    match hub.publish(&FeedMessage::update(batch, now)) {
                        Ok(delivered) => {
                            debug!(subscribers = delivered, "tick broadcast");
                        }
                        Err(e) => {
                            error!(error = %e, "failed to broadcast tick");
                        }
                    }
                }
                _ = shutdown_rx.changed() => {
                    info!("telemetry scheduler stopped");
                    break;
                }
            }
        }
    });

    SchedulerHandle { shutdown_tx, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_SENSOR_POSITIONS;

    #[tokio::test]
    async fn scheduler_publishes_one_update_per_tick() {
        let registry = Arc::new(RwLock::new(SensorRegistry::new(DEFAULT_SENSOR_POSITIONS)));
        let hub = BroadcastHub::new(16);
        let mut rx = hub.subscribe();

        let handle = start(registry, hub, Duration::from_millis(20));

        for _ in 0..3 {
            let payload = tokio::time::timeout(Duration::from_secs(2), rx.recv())
                .await
                .expect("tick within deadline")
                .expect("channel open");
            let message = FeedMessage::from_json(&payload).unwrap();
            assert!(!message.is_initial());
            assert_eq!(message.data().len(), 4);
        }

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_stops_the_tick_loop() {
        let registry = Arc::new(RwLock::new(SensorRegistry::new(DEFAULT_SENSOR_POSITIONS)));
        let hub = BroadcastHub::new(16);
        let mut rx = hub.subscribe();

        let handle = start(registry, hub, Duration::from_millis(10));
        let _ = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await;
        handle.shutdown().await;

        // Drain anything queued before the stop, then expect silence.
        while rx.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
    }
}
