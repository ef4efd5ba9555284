use crate::model::{CatalogItem, EntityKind, ItemId};

/// Anything that holds a copy of catalog records and must reflect
/// favorite changes: catalog working sets, the favorites index, an open
/// detail overlay.
///
/// Implementations apply changes synchronously and must not call back
/// into the sync engine.
pub trait FavoriteHolder: Send + Sync {
    /// The holder's current copy of a record, if it has one.
    fn lookup(&self, kind: EntityKind, id: &ItemId) -> Option<CatalogItem>;

    /// Adopt `item.is_favorite` for the record with `item.id`.
    ///
    /// `item` is a full snapshot so holders that add records on a
    /// `true` transition (the favorites index) have something to add.
    fn apply_favorite(&self, kind: EntityKind, item: &CatalogItem);
}
