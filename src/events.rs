//! # Order events
//!
//! In-process publish/subscribe for "order created". Publishing never waits
//! for listeners: each listener runs on its own task and its failures are
//! logged, never propagated to the request that placed the order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderCreated {
    pub order_id: i64,
    pub customer_id: i64,
    pub customer_email: Option<String>,
    pub placed_at: DateTime<Utc>,
}

/// Something that reacts to placed orders.
#[async_trait]
pub trait OrderCreatedListener: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    async fn on_order_created(&self, event: &OrderCreated) -> anyhow::Result<()>;
}

/// Broadcast bus for [`OrderCreated`].
#[derive(Clone)]
pub struct OrderEvents {
    sender: broadcast::Sender<OrderCreated>,
    published: Arc<AtomicU64>,
}

impl OrderEvents {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            published: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Hands the event to every current subscriber and returns how many there were.
    pub fn publish(&self, event: OrderCreated) -> usize {
        self.published.fetch_add(1, Ordering::Relaxed);
        let order_id = event.order_id;
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(order_id, receivers, "order created event published");
                receivers
            }
            Err(_) => {
                warn!(order_id, "order created event dropped (no listeners)");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderCreated> {
        self.sender.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn events_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Runs `listener` on its own task until every sender is gone. Each event
    /// is handled on a child task, so a panicking listener loses only that
    /// event.
    pub fn spawn_listener(&self, listener: Arc<dyn OrderCreatedListener>) -> JoinHandle<()> {
        let mut receiver = self.subscribe();
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        let order_id = event.order_id;
                        let handler = listener.clone();
                        let outcome = tokio::spawn(async move {
                            handler.on_order_created(&event).await
                        })
                        .await;
                        match outcome {
                            Ok(Ok(())) => {}
                            Ok(Err(err)) => warn!(
                                listener = listener.name(),
                                order_id,
                                error = %err,
                                "order created listener failed"
                            ),
                            Err(join_err) => error!(
                                listener = listener.name(),
                                order_id,
                                error = %join_err,
                                "order created listener panicked"
                            ),
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(listener = listener.name(), skipped, "listener lagged behind");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!(listener = listener.name(), "listener stopped");
        })
    }
}

impl Default for OrderEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::sync::mpsc;

    use super::*;

    fn event(order_id: i64) -> OrderCreated {
        OrderCreated {
            order_id,
            customer_id: 1,
            customer_email: None,
            placed_at: Utc::now(),
        }
    }

    struct Recording {
        seen: mpsc::UnboundedSender<i64>,
    }

    #[async_trait]
    impl OrderCreatedListener for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn on_order_created(&self, event: &OrderCreated) -> anyhow::Result<()> {
            self.seen.send(event.order_id)?;
            Ok(())
        }
    }

    struct Failing {
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl OrderCreatedListener for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn on_order_created(&self, _event: &OrderCreated) -> anyhow::Result<()> {
            *self.calls.lock().unwrap() += 1;
            anyhow::bail!("smtp unreachable")
        }
    }

    struct PanicsOnFirst {
        seen: mpsc::UnboundedSender<i64>,
    }

    #[async_trait]
    impl OrderCreatedListener for PanicsOnFirst {
        fn name(&self) -> &'static str {
            "panics_on_first"
        }

        async fn on_order_created(&self, event: &OrderCreated) -> anyhow::Result<()> {
            if event.order_id == 1 {
                panic!("template missing");
            }
            self.seen.send(event.order_id)?;
            Ok(())
        }
    }

    #[tokio::test]
    async fn publish_without_listeners_is_not_an_error() {
        let events = OrderEvents::new();
        assert_eq!(events.publish(event(1)), 0);
        assert_eq!(events.events_published(), 1);
    }

    #[tokio::test]
    async fn every_listener_receives_the_event() {
        let events = OrderEvents::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        events.spawn_listener(Arc::new(Recording { seen: tx_a }));
        events.spawn_listener(Arc::new(Recording { seen: tx_b }));
        assert_eq!(events.listener_count(), 2);

        assert_eq!(events.publish(event(42)), 2);

        assert_eq!(rx_a.recv().await, Some(42));
        assert_eq!(rx_b.recv().await, Some(42));
    }

    #[tokio::test]
    async fn failing_listener_does_not_stop_others_or_itself() {
        let events = OrderEvents::new();
        let failing = Arc::new(Failing {
            calls: Mutex::new(0),
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        events.spawn_listener(failing.clone());
        events.spawn_listener(Arc::new(Recording { seen: tx }));

        events.publish(event(1));
        events.publish(event(2));

        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(2));

        // The failing listener keeps consuming after an error.
        for _ in 0..500 {
            if *failing.calls.lock().unwrap() == 2 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(*failing.calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn listener_survives_its_own_panic() {
        let events = OrderEvents::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (other_tx, mut other_rx) = mpsc::unbounded_channel();
        let listener = events.spawn_listener(Arc::new(PanicsOnFirst { seen: tx }));
        events.spawn_listener(Arc::new(Recording { seen: other_tx }));

        events.publish(event(1));
        events.publish(event(2));

        assert_eq!(rx.recv().await, Some(2));
        assert_eq!(other_rx.recv().await, Some(1));
        assert_eq!(other_rx.recv().await, Some(2));
        assert!(!listener.is_finished());
    }
}
