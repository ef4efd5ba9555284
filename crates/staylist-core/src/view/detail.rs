// ── Detail overlay ──
//
// A single record opened on top of a list. It is a favorite holder in
// its own right, so a toggle from the overlay and a toggle from the list
// row always agree. Closing the overlay is dropping it.

use std::sync::Arc;

use tokio::sync::watch;

use crate::model::{CatalogItem, EntityKind, ItemId};
use crate::sync::FavoriteHolder;

pub struct DetailOverlay {
    kind: EntityKind,
    item: watch::Sender<Arc<CatalogItem>>,
}

impl DetailOverlay {
    pub(crate) fn new(kind: EntityKind, item: CatalogItem) -> Self {
        let (tx, _) = watch::channel(Arc::new(item));
        Self { kind, item: tx }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn id(&self) -> ItemId {
        self.item.borrow().id.clone()
    }

    /// The record as currently shown.
    pub fn item(&self) -> Arc<CatalogItem> {
        self.item.borrow().clone()
    }

    /// Watch the shown record for favorite changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<CatalogItem>> {
        self.item.subscribe()
    }
}

impl FavoriteHolder for DetailOverlay {
    fn lookup(&self, kind: EntityKind, id: &ItemId) -> Option<CatalogItem> {
        let shown = self.item.borrow();
        (kind == self.kind && shown.id == *id).then(|| (**shown).clone())
    }

    fn apply_favorite(&self, kind: EntityKind, item: &CatalogItem) {
        if kind != self.kind {
            return;
        }
        self.item.send_if_modified(|shown| {
            if shown.id != item.id || shown.is_favorite == item.is_favorite {
                return false;
            }
            Arc::make_mut(shown).is_favorite = item.is_favorite;
            true
        });
    }
}
