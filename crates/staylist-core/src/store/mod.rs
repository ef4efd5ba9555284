mod adapter;
pub(crate) mod collection;
pub(crate) mod working_set;

pub use adapter::{FavoritePatch, ItemWrite, ListQuery, StoreAdapter};
