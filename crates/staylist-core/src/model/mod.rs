mod id;
mod item;
mod kind;

pub use id::ItemId;
pub use item::{CatalogItem, ItemField, TaggedItem};
pub use kind::{EntityKind, WriteMode};
