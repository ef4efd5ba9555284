// ── Ordered reactive collection ──
//
// Concurrent keyed storage that keeps store order, with push-based
// change notification via `watch` channels.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

/// An ordered, reactive collection of entities keyed by `K`.
///
/// The snapshot vector is the source of truth for order; `positions`
/// maps each key to its slot. Both are only mutated inside
/// `send_modify`, so a reader holding the snapshot borrow always sees
/// them agree. Every mutation bumps a version counter.
pub(crate) struct EntityCollection<K, T>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Key -> index into the snapshot vector.
    positions: DashMap<K, usize>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full ordered snapshot shared with subscribers.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<K, T> EntityCollection<K, T>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            positions: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Replace every entity, keeping the given order. Later duplicates of
    /// a key overwrite earlier ones in place.
    pub(crate) fn replace_all(&self, entries: Vec<(K, T)>) {
        self.snapshot.send_modify(|snap| {
            self.positions.clear();
            let mut values: Vec<Arc<T>> = Vec::with_capacity(entries.len());
            for (key, entity) in entries {
                if let Some(pos) = self.positions.get(&key).map(|p| *p) {
                    if let Some(slot) = values.get_mut(pos) {
                        *slot = Arc::new(entity);
                    }
                } else {
                    self.positions.insert(key, values.len());
                    values.push(Arc::new(entity));
                }
            }
            *snap = Arc::new(values);
        });
        self.bump_version();
    }

    /// Insert or replace an entity. New keys are appended. Returns `true`
    /// if the key was new.
    pub(crate) fn upsert(&self, key: K, entity: T) -> bool {
        let mut is_new = false;
        self.snapshot.send_modify(|snap| {
            let values = Arc::make_mut(snap);
            match self.positions.get(&key).map(|p| *p) {
                Some(pos) => {
                    if let Some(slot) = values.get_mut(pos) {
                        *slot = Arc::new(entity);
                    }
                }
                None => {
                    self.positions.insert(key, values.len());
                    values.push(Arc::new(entity));
                    is_new = true;
                }
            }
        });
        self.bump_version();
        is_new
    }

    /// Mutate an entity in place. Returns the updated entity, or `None`
    /// (without notifying subscribers) if the key is absent.
    pub(crate) fn update<F>(&self, key: &K, mutate: F) -> Option<Arc<T>>
    where
        F: FnOnce(&mut T),
    {
        let mut updated = None;
        self.snapshot.send_if_modified(|snap| {
            let Some(pos) = self.positions.get(key).map(|p| *p) else {
                return false;
            };
            let values = Arc::make_mut(snap);
            let Some(slot) = values.get_mut(pos) else {
                return false;
            };
            mutate(Arc::make_mut(slot));
            updated = Some(Arc::clone(slot));
            true
        });
        if updated.is_some() {
            self.bump_version();
        }
        updated
    }

    /// Remove an entity by key, closing the gap it leaves.
    pub(crate) fn remove(&self, key: &K) -> Option<Arc<T>> {
        let mut removed = None;
        self.snapshot.send_if_modified(|snap| {
            let Some((_, pos)) = self.positions.remove(key) else {
                return false;
            };
            let values = Arc::make_mut(snap);
            if pos >= values.len() {
                return false;
            }
            removed = Some(values.remove(pos));
            for mut entry in self.positions.iter_mut() {
                if *entry.value() > pos {
                    *entry.value_mut() -= 1;
                }
            }
            true
        });
        if removed.is_some() {
            self.bump_version();
        }
        removed
    }

    /// Look up an entity by key.
    pub(crate) fn get(&self, key: &K) -> Option<Arc<T>> {
        let snap = self.snapshot.borrow();
        let pos = *self.positions.get(key)?;
        snap.get(pos).map(Arc::clone)
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.positions.contains_key(key)
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}
