// ── Favorite sync engine ──
//
// Optimistic favorite toggles: every registered holder shows the new
// value before the write is sent, and gets the exact previous value back
// if the write fails or outlives its deadline. Toggles of one record
// queue behind each other in call order; different records never wait
// on each other.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info, warn};

use super::holder::FavoriteHolder;
use super::state::{SyncEvent, ToggleOutcome, ToggleState};
use crate::config::StoreConfig;
use crate::error::CoreError;
use crate::model::{CatalogItem, EntityKind, ItemId, WriteMode};
use crate::store::{FavoritePatch, ItemWrite, StoreAdapter};

const EVENT_CHANNEL_SIZE: usize = 256;

type RecordKey = (EntityKind, ItemId);

/// Handle to the favorite sync engine. Cheaply cloneable.
#[derive(Clone)]
pub struct FavoriteSync {
    inner: Arc<SyncInner>,
}

struct SyncInner {
    store: Arc<StoreAdapter>,
    write_modes: HashMap<EntityKind, WriteMode>,
    write_timeout: Duration,
    holders: Mutex<Vec<Weak<dyn FavoriteHolder>>>,
    /// Per-record lifecycle. Absent means `Idle`. `Settled` entries are
    /// dropped once no open read could still need them.
    states: DashMap<RecordKey, ToggleState>,
    /// Tail of each record's toggle queue: the ticket that last joined
    /// it and the signal that fires when that toggle finishes.
    queue_tails: DashMap<RecordKey, (u64, oneshot::Receiver<()>)>,
    next_ticket: AtomicU64,
    /// Bumped every time a toggle settles.
    epoch: AtomicU64,
    /// Epochs held by reads in progress, with how many reads hold each.
    read_marks: Mutex<BTreeMap<u64, usize>>,
    events: broadcast::Sender<SyncEvent>,
}

impl FavoriteSync {
    pub fn new(store: Arc<StoreAdapter>, config: &StoreConfig) -> Self {
        let write_modes = EntityKind::ALL
            .into_iter()
            .map(|kind| (kind, config.write_mode(kind)))
            .collect();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);

        Self {
            inner: Arc::new(SyncInner {
                store,
                write_modes,
                write_timeout: config.write_timeout,
                holders: Mutex::new(Vec::new()),
                states: DashMap::new(),
                queue_tails: DashMap::new(),
                next_ticket: AtomicU64::new(0),
                epoch: AtomicU64::new(0),
                read_marks: Mutex::new(BTreeMap::new()),
                events,
            }),
        }
    }

    // ── Holder registry ──────────────────────────────────────────────

    /// Start propagating favorite changes to `holder`.
    ///
    /// Only a weak reference is kept: dropping the holder unregisters it.
    pub fn register<H: FavoriteHolder + 'static>(&self, holder: &Arc<H>) {
        let weak: Weak<H> = Arc::downgrade(holder);
        let mut holders = self.holders();
        holders.retain(|h| h.strong_count() > 0);
        holders.push(weak);
    }

    /// Number of live registered holders.
    pub fn holder_count(&self) -> usize {
        self.holders().iter().filter(|h| h.strong_count() > 0).count()
    }

    fn holders(&self) -> MutexGuard<'_, Vec<Weak<dyn FavoriteHolder>>> {
        self.inner
            .holders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn live_holders(&self) -> Vec<Arc<dyn FavoriteHolder>> {
        let mut holders = self.holders();
        holders.retain(|h| h.strong_count() > 0);
        holders.iter().filter_map(Weak::upgrade).collect()
    }

    /// First holder's copy of a record, in registration order.
    fn locate(&self, kind: EntityKind, id: &ItemId) -> Option<CatalogItem> {
        self.live_holders()
            .iter()
            .find_map(|holder| holder.lookup(kind, id))
    }

    fn broadcast(&self, kind: EntityKind, item: &CatalogItem) {
        for holder in self.live_holders() {
            holder.apply_favorite(kind, item);
        }
    }

    // ── Toggle ───────────────────────────────────────────────────────

    /// Flip the favorite flag of a loaded record.
    ///
    /// The toggle joins the record's queue when this is *called*, so two
    /// calls in a row are written in that order even if their futures are
    /// polled out of order. With no toggle of the record ahead in the
    /// queue, every holder shows the new value by the time this returns;
    /// a queued toggle applies its value when its turn comes. The write
    /// runs on its own task and completes even if the returned future is
    /// dropped. Must be called within a Tokio runtime.
    pub fn toggle(
        &self,
        kind: EntityKind,
        id: ItemId,
    ) -> impl Future<Output = Result<ToggleOutcome, CoreError>> + Send + 'static {
        let key = (kind, id.clone());
        let ticket = self.inner.next_ticket.fetch_add(1, Ordering::Relaxed);
        let (done_tx, done_rx) = oneshot::channel();
        let ahead = self.inner.queue_tails.insert(key.clone(), (ticket, done_rx));
        let applied_now = ahead.is_none().then(|| self.apply_optimistic(kind, &id));

        let engine = self.clone();
        let task = tokio::spawn(async move {
            let applied = match applied_now {
                Some(applied) => applied,
                None => {
                    if let Some((_, turn)) = ahead {
                        // A dropped sender means the toggle ahead is gone; proceed.
                        let _ = turn.await;
                    }
                    engine.apply_optimistic(kind, &id)
                }
            };
            let result = match applied {
                Ok(applied) => engine.write_through(kind, &id, applied).await,
                Err(e) => Err(e),
            };
            engine
                .inner
                .queue_tails
                .remove_if(&key, |_, (tail, _)| *tail == ticket);
            let _ = done_tx.send(());
            result
        });

        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(CoreError::Internal(format!("toggle task failed: {e}"))),
            }
        }
    }

    /// Show the flipped value in every holder and mark the record pending.
    fn apply_optimistic(&self, kind: EntityKind, id: &ItemId) -> Result<Applied, CoreError> {
        let Some(current) = self.locate(kind, id) else {
            debug!(%kind, %id, "toggle requested for record no view holds");
            return Err(CoreError::ItemNotFound {
                kind,
                id: id.clone(),
            });
        };

        let previous = current.is_favorite;
        let target = !previous;
        let optimistic = Arc::new(current.with_favorite(target));

        self.inner.states.insert(
            (kind, id.clone()),
            ToggleState::Pending {
                target,
                previous,
                item: Arc::clone(&optimistic),
            },
        );
        self.broadcast(kind, &optimistic);
        self.emit(SyncEvent::Applied {
            kind,
            id: id.clone(),
            is_favorite: target,
            at: Utc::now(),
        });
        debug!(%kind, %id, target, "optimistic favorite applied");

        Ok(Applied {
            previous,
            target,
            optimistic,
        })
    }

    /// Persist an applied toggle, then confirm it or restore the previous
    /// value.
    async fn write_through(
        &self,
        kind: EntityKind,
        id: &ItemId,
        applied: Applied,
    ) -> Result<ToggleOutcome, CoreError> {
        let Applied {
            previous,
            target,
            optimistic,
        } = applied;
        let key = (kind, id.clone());

        match self.persist(kind, id, target).await {
            Ok(_) => {
                self.settle(key, target, false, optimistic);
                info!(%kind, %id, is_favorite = target, "favorite confirmed");
                self.emit(SyncEvent::Confirmed {
                    kind,
                    id: id.clone(),
                    is_favorite: target,
                    at: Utc::now(),
                });
                Ok(ToggleOutcome {
                    kind,
                    id: id.clone(),
                    is_favorite: target,
                })
            }
            Err(reason) => {
                let restored = Arc::new(optimistic.with_favorite(previous));
                self.settle(key, previous, true, Arc::clone(&restored));
                self.broadcast(kind, &restored);
                warn!(%kind, %id, error = %reason, "favorite write failed, rolled back");
                self.emit(SyncEvent::RolledBack {
                    kind,
                    id: id.clone(),
                    is_favorite: previous,
                    reason: reason.to_string(),
                    at: Utc::now(),
                });
                Err(CoreError::ToggleFailed {
                    kind,
                    id: id.clone(),
                    reason: Box::new(reason),
                })
            }
        }
    }

    /// Write `value` to the store under the configured deadline.
    async fn persist(
        &self,
        kind: EntityKind,
        id: &ItemId,
        value: bool,
    ) -> Result<CatalogItem, CoreError> {
        let store = &self.inner.store;
        let mode = self
            .inner
            .write_modes
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_write_mode());

        let write = async {
            match mode {
                WriteMode::Patch => {
                    let patch = ItemWrite::Patch(FavoritePatch { is_favorite: value });
                    store.write(kind, id, &patch).await
                }
                WriteMode::Replace => {
                    let record = store.get(kind, id).await?;
                    let replacement = ItemWrite::Replace(record.with_favorite(value));
                    store.write(kind, id, &replacement).await
                }
            }
        };

        let deadline = self.inner.write_timeout;
        tokio::time::timeout(deadline, write)
            .await
            .unwrap_or_else(|_| {
                Err(CoreError::StaleWriteTimeout {
                    kind,
                    id: id.clone(),
                    timeout: deadline,
                })
            })
    }

    fn settle(&self, key: RecordKey, value: bool, reverted: bool, item: Arc<CatalogItem>) {
        let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.states.insert(
            key,
            ToggleState::Settled {
                value,
                reverted,
                epoch,
                item,
            },
        );
        // The newest settlement stays visible through `state` until the
        // next one.
        self.prune_settled(epoch - 1);
    }

    /// Drop settlements no open read can still ask for: those at or below
    /// both `cap` and the oldest live read mark.
    fn prune_settled(&self, cap: u64) {
        let floor = self
            .read_marks()
            .keys()
            .next()
            .copied()
            .map_or(cap, |oldest| oldest.min(cap));
        self.inner.states.retain(
            |_, state| !matches!(state, ToggleState::Settled { epoch, .. } if *epoch <= floor),
        );
    }

    fn read_marks(&self) -> MutexGuard<'_, BTreeMap<u64, usize>> {
        self.inner
            .read_marks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SyncEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    // ── Observation ──────────────────────────────────────────────────

    /// Subscribe to toggle lifecycle events.
    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.inner.events.subscribe()
    }

    pub fn state(&self, kind: EntityKind, id: &ItemId) -> ToggleState {
        self.inner
            .states
            .get(&(kind, id.clone()))
            .map_or(ToggleState::Idle, |s| s.value().clone())
    }

    /// The value an in-flight toggle is writing, if one is.
    pub fn pending_target(&self, kind: EntityKind, id: &ItemId) -> Option<bool> {
        match self.state(kind, id) {
            ToggleState::Pending { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Settlement counter.
    pub fn epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::SeqCst)
    }

    /// Take a read mark *before* fetching from the store and pass its
    /// epoch to [`overrides_since`](Self::overrides_since) afterwards.
    /// Settlements newer than the mark are kept until it is dropped.
    pub fn begin_read(&self) -> ReadMark {
        let mut marks = self.read_marks();
        let epoch = self.epoch();
        *marks.entry(epoch).or_insert(0) += 1;
        ReadMark {
            sync: self.clone(),
            epoch,
        }
    }

    fn end_read(&self, epoch: u64) {
        {
            let mut marks = self.read_marks();
            if let Some(count) = marks.get_mut(&epoch) {
                *count -= 1;
                if *count == 0 {
                    marks.remove(&epoch);
                }
            }
        }
        self.prune_settled(self.epoch());
    }

    /// Records whose local favorite value must win over store data
    /// fetched after `mark` was taken: every in-flight toggle, and every
    /// toggle that settled since then.
    pub fn overrides_since(
        &self,
        kind: Option<EntityKind>,
        mark: u64,
    ) -> Vec<(EntityKind, Arc<CatalogItem>)> {
        self.inner
            .states
            .iter()
            .filter(|entry| kind.is_none_or(|k| entry.key().0 == k))
            .filter_map(|entry| match entry.value() {
                ToggleState::Pending { item, .. } => Some((entry.key().0, Arc::clone(item))),
                ToggleState::Settled { epoch, item, .. } if *epoch > mark => {
                    Some((entry.key().0, Arc::clone(item)))
                }
                _ => None,
            })
            .collect()
    }
}

/// What an optimistic apply changed, for the write that follows it.
struct Applied {
    previous: bool,
    target: bool,
    optimistic: Arc<CatalogItem>,
}

/// An open read of store data, from [`FavoriteSync::begin_read`].
#[must_use = "dropping the mark ends the read"]
pub struct ReadMark {
    sync: FavoriteSync,
    epoch: u64,
}

impl ReadMark {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl Drop for ReadMark {
    fn drop(&mut self) {
        self.sync.end_read(self.epoch);
    }
}
