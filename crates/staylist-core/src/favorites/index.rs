// ── Aggregate favorites index ──
//
// Favorited records from every kind, each tagged with where it came
// from. Recomputed from the store on demand; between recomputes it
// follows optimistic toggles as a favorite holder, so a record favorited
// in a catalog view shows up here without waiting for a poll.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{CatalogItem, EntityKind, ItemId, TaggedItem};
use crate::store::collection::EntityCollection;
use crate::store::{ListQuery, StoreAdapter};
use crate::stream::EntityStream;
use crate::sync::{FavoriteHolder, FavoriteSync, ToggleOutcome};
use crate::view::{DetailOverlay, LoadState};

type EntryKey = (EntityKind, ItemId);

struct FavoriteEntries {
    items: EntityCollection<EntryKey, TaggedItem>,
    closed: CancellationToken,
}

impl FavoriteHolder for FavoriteEntries {
    fn lookup(&self, kind: EntityKind, id: &ItemId) -> Option<CatalogItem> {
        if self.closed.is_cancelled() {
            return None;
        }
        self.items
            .get(&(kind, id.clone()))
            .map(|entry| entry.item.clone())
    }

    fn apply_favorite(&self, kind: EntityKind, item: &CatalogItem) {
        if self.closed.is_cancelled() {
            return;
        }
        let key = (kind, item.id.clone());
        if item.is_favorite {
            let updated = self
                .items
                .update(&key, |entry| entry.item.is_favorite = true);
            if updated.is_none() {
                self.items.upsert(key, TaggedItem::new(kind, item.clone()));
            }
        } else {
            self.items.remove(&key);
        }
    }
}

/// Cross-kind favorites list.
pub struct FavoritesIndex {
    entries: Arc<FavoriteEntries>,
    kinds: Vec<EntityKind>,
    store: Arc<StoreAdapter>,
    sync: FavoriteSync,
    load_state: watch::Sender<LoadState>,
    closed: CancellationToken,
}

impl FavoritesIndex {
    pub(crate) fn new(
        store: Arc<StoreAdapter>,
        sync: FavoriteSync,
        kinds: Vec<EntityKind>,
        closed: CancellationToken,
    ) -> Self {
        let entries = Arc::new(FavoriteEntries {
            items: EntityCollection::new(),
            closed: closed.clone(),
        });
        sync.register(&entries);
        let (load_state, _) = watch::channel(LoadState::Idle);

        Self {
            entries,
            kinds,
            store,
            sync,
            load_state,
            closed,
        }
    }

    /// Kinds this index aggregates, in display order.
    pub fn kinds(&self) -> &[EntityKind] {
        &self.kinds
    }

    /// Rebuild the index from the store.
    ///
    /// All kinds are queried concurrently. If any kind fails the whole
    /// recompute fails and the previous contents stay as they were.
    pub async fn recompute(&self) -> LoadState {
        if self.closed.is_cancelled() {
            return LoadState::Closed;
        }
        self.load_state.send_replace(LoadState::Loading);

        let mark = self.sync.begin_read();
        let fetches = self.kinds.iter().map(|&kind| {
            let store = Arc::clone(&self.store);
            async move { (kind, store.list(kind, ListQuery::favorites()).await) }
        });
        let results = tokio::select! {
            biased;
            () = self.closed.cancelled() => return LoadState::Closed,
            results = join_all(fetches) => results,
        };

        let mut entries = Vec::new();
        for (kind, result) in results {
            match result {
                Ok(items) => entries.extend(
                    items
                        .into_iter()
                        .filter(|item| item.is_favorite)
                        .map(|item| ((kind, item.id.clone()), TaggedItem::new(kind, item))),
                ),
                Err(e) => {
                    warn!(%kind, error = %e, "favorites recompute failed");
                    let state = LoadState::Failed {
                        message: format!("{kind}: {e}"),
                    };
                    self.load_state.send_replace(state.clone());
                    return state;
                }
            }
        }

        let count = entries.len();
        self.entries.items.replace_all(entries);
        for (kind, item) in self.sync.overrides_since(None, mark.epoch()) {
            if self.kinds.contains(&kind) {
                self.entries.apply_favorite(kind, &item);
            }
        }
        debug!(count, "favorites index recomputed");

        let state = LoadState::Loaded {
            count: self.entries.items.len(),
            at: Utc::now(),
        };
        self.load_state.send_replace(state.clone());
        state
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state.borrow().clone()
    }

    /// Current entries, grouped in kind order as fetched, with records
    /// favorited since the last recompute appended.
    pub fn snapshot(&self) -> Arc<Vec<Arc<TaggedItem>>> {
        self.entries.items.snapshot()
    }

    pub fn len(&self) -> usize {
        self.entries.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, kind: EntityKind, id: &ItemId) -> bool {
        self.entries.items.contains(&(kind, id.clone()))
    }

    pub fn subscribe(&self) -> EntityStream<TaggedItem> {
        EntityStream::new(self.entries.items.subscribe())
    }

    /// Unfavorite a listed record. It disappears from the index at once
    /// and comes back if the write fails.
    pub fn remove(
        &self,
        kind: EntityKind,
        id: ItemId,
    ) -> impl Future<Output = Result<ToggleOutcome, CoreError>> + Send + 'static {
        self.sync.toggle(kind, id)
    }

    /// Open a listed record as an overlay that follows favorite changes.
    pub fn open_detail(&self, kind: EntityKind, id: &ItemId) -> Option<Arc<DetailOverlay>> {
        let entry = self.entries.items.get(&(kind, id.clone()))?;
        let overlay = Arc::new(DetailOverlay::new(kind, entry.item.clone()));
        self.sync.register(&overlay);
        Some(overlay)
    }

    pub fn close(&self) {
        self.closed.cancel();
        self.load_state.send_replace(LoadState::Closed);
    }
}

impl Drop for FavoritesIndex {
    fn drop(&mut self) {
        self.closed.cancel();
    }
}

/// Sum of favorited records across `kinds`.
///
/// Kinds that fail to load are skipped with a warning, so the total
/// undercounts rather than failing outright.
pub async fn count_favorites(store: &StoreAdapter, kinds: &[EntityKind]) -> usize {
    let counts = join_all(kinds.iter().map(|&kind| async move {
        match store.list(kind, ListQuery::favorites()).await {
            Ok(items) => items.iter().filter(|item| item.is_favorite).count(),
            Err(e) => {
                warn!(%kind, error = %e, "skipping kind in favorites count");
                0
            }
        }
    }))
    .await;
    counts.into_iter().sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn entries() -> FavoriteEntries {
        FavoriteEntries {
            items: EntityCollection::new(),
            closed: CancellationToken::new(),
        }
    }

    #[test]
    fn favoriting_inserts_and_unfavoriting_removes() {
        let entries = entries();
        let item = CatalogItem::new(5u64);

        entries.apply_favorite(EntityKind::Chefs, &item.with_favorite(true));
        assert!(entries.lookup(EntityKind::Chefs, &ItemId::from(5)).is_some());
        assert!(entries.lookup(EntityKind::Popular, &ItemId::from(5)).is_none());

        entries.apply_favorite(EntityKind::Chefs, &item.with_favorite(false));
        assert!(entries.lookup(EntityKind::Chefs, &ItemId::from(5)).is_none());
    }

    #[test]
    fn reinsert_appends_to_the_end() {
        let entries = entries();
        for id in [1u64, 2, 3] {
            entries.apply_favorite(EntityKind::Chefs, &CatalogItem::new(id).with_favorite(true));
        }
        entries.apply_favorite(EntityKind::Chefs, &CatalogItem::new(1u64));
        entries.apply_favorite(EntityKind::Chefs, &CatalogItem::new(1u64).with_favorite(true));

        let order: Vec<String> = entries
            .items
            .snapshot()
            .iter()
            .map(|e| e.item.id.to_string())
            .collect();
        assert_eq!(order, ["2", "3", "1"]);
    }
}
