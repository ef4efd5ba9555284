// ── Polling favorites counter ──
//
// A badge-style total kept fresh by polling. It does not listen to sync
// events, so after a toggle the count can lag by up to one poll
// interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::index::count_favorites;
use crate::model::EntityKind;
use crate::store::StoreAdapter;

/// Background task publishing the total number of favorites.
///
/// The first poll happens immediately. Dropping the counter (or calling
/// [`stop`](Self::stop)) cancels the task.
pub struct FavoritesCounter {
    count: watch::Receiver<Option<usize>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    interval: Duration,
}

impl FavoritesCounter {
    /// Spawn the polling task. Must be called within a Tokio runtime.
    pub fn spawn(
        store: Arc<StoreAdapter>,
        kinds: Vec<EntityKind>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        let (tx, count) = watch::channel(None);
        let task = tokio::spawn(poll_task(store, kinds, interval, tx, cancel.clone()));

        Self {
            count,
            cancel,
            task: Some(task),
            interval,
        }
    }

    /// Latest published total; `None` until the first poll completes.
    pub fn current(&self) -> Option<usize> {
        *self.count.borrow()
    }

    /// Wait until the total differs from the last one seen. Returns
    /// `None` once the counter has stopped.
    pub async fn changed(&mut self) -> Option<usize> {
        self.count.changed().await.ok()?;
        *self.count.borrow_and_update()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<usize>> {
        self.count.clone()
    }

    /// Cancel polling and wait for the task to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for FavoritesCounter {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll_task(
    store: Arc<StoreAdapter>,
    kinds: Vec<EntityKind>,
    interval: Duration,
    tx: watch::Sender<Option<usize>>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let total = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            total = count_favorites(&store, &kinds) => total,
        };
        trace!(total, "favorites counter polled");
        tx.send_if_modified(|current| {
            if *current == Some(total) {
                false
            } else {
                *current = Some(total);
                true
            }
        });
    }

    debug!("favorites counter stopped");
}
