// ── Per-kind working set ──
//
// The records a catalog view has loaded for one kind, in store order.
// Registered with the sync engine as a favorite holder so optimistic
// changes and rollbacks reach it without a refetch.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::collection::EntityCollection;
use crate::model::{CatalogItem, EntityKind, ItemId};
use crate::sync::FavoriteHolder;

pub(crate) struct WorkingSet {
    kind: EntityKind,
    items: EntityCollection<ItemId, CatalogItem>,
    /// Cancelled when the owning view is torn down; a closed set
    /// neither answers lookups nor accepts favorite changes.
    closed: CancellationToken,
}

impl WorkingSet {
    pub(crate) fn new(kind: EntityKind, closed: CancellationToken) -> Self {
        Self {
            kind,
            items: EntityCollection::new(),
            closed,
        }
    }

    pub(crate) fn replace_all(&self, items: Vec<CatalogItem>) {
        self.items
            .replace_all(items.into_iter().map(|i| (i.id.clone(), i)).collect());
    }

    pub(crate) fn get(&self, id: &ItemId) -> Option<Arc<CatalogItem>> {
        self.items.get(id)
    }

    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<CatalogItem>>> {
        self.items.snapshot()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<CatalogItem>>>> {
        self.items.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn version(&self) -> u64 {
        self.items.version()
    }
}

impl FavoriteHolder for WorkingSet {
    fn lookup(&self, kind: EntityKind, id: &ItemId) -> Option<CatalogItem> {
        if kind != self.kind || self.closed.is_cancelled() {
            return None;
        }
        self.items.get(id).map(|item| (*item).clone())
    }

    fn apply_favorite(&self, kind: EntityKind, item: &CatalogItem) {
        if kind != self.kind || self.closed.is_cancelled() {
            return;
        }
        self.items
            .update(&item.id, |held| held.is_favorite = item.is_favorite);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn set_with(ids: &[u64]) -> WorkingSet {
        let set = WorkingSet::new(EntityKind::Chefs, CancellationToken::new());
        set.replace_all(ids.iter().map(|id| CatalogItem::new(*id)).collect());
        set
    }

    #[test]
    fn applies_only_flag_for_own_kind() {
        let set = set_with(&[1, 2]);
        let mut incoming = CatalogItem::new(1u64).with_favorite(true);
        incoming.title = Some("ignored".into());

        set.apply_favorite(EntityKind::Popular, &incoming);
        assert!(!set.get(&ItemId::from(1)).unwrap().is_favorite);

        set.apply_favorite(EntityKind::Chefs, &incoming);
        let held = set.get(&ItemId::from(1)).unwrap();
        assert!(held.is_favorite);
        assert_eq!(held.title, None);
    }

    #[test]
    fn closed_set_is_inert() {
        let token = CancellationToken::new();
        let set = WorkingSet::new(EntityKind::Chefs, token.clone());
        set.replace_all(vec![CatalogItem::new(1u64)]);
        token.cancel();

        assert!(set.lookup(EntityKind::Chefs, &ItemId::from(1)).is_none());
        set.apply_favorite(EntityKind::Chefs, &CatalogItem::new(1u64).with_favorite(true));
        assert!(!set.get(&ItemId::from(1)).unwrap().is_favorite);
    }
}
