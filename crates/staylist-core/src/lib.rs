//! Catalog browsing core between `staylist-api` and UI consumers (CLI).
//!
//! This crate owns the domain model and the consistency-sensitive parts of
//! the catalog browser:
//!
//! - **[`AppContext`]**: Process-wide context created at startup. Owns the
//!   [`StoreAdapter`], the [`FavoriteSync`] engine and the shared
//!   [`SearchQuery`], and hands them to every view it constructs.
//!
//! - **[`StoreAdapter`]**: Entity Store Adapter. Typed `get` / `list` /
//!   `write` against the remote collections, with partial (`PATCH`) and
//!   full-replace (`PUT`) writes. Never retries.
//!
//! - **[`FavoriteSync`]**: Optimistic favorite toggles: apply locally to
//!   every registered view, write remotely under a deadline, roll back
//!   exactly on failure. Toggles of one item are serialized; different
//!   items run concurrently.
//!
//! - **[`CatalogView`]**: Working set for one entity kind plus the
//!   search → filter → paginate projection shown to presentation.
//!
//! - **[`FavoritesIndex`] / [`FavoritesCounter`]**: Cross-kind favorites,
//!   recomputed on demand and (for the counter) on a polling interval.

pub mod config;
pub mod context;
pub mod error;
pub mod favorites;
pub mod model;
pub mod store;
pub mod stream;
pub mod sync;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{StoreConfig, TlsVerification};
pub use context::AppContext;
pub use error::CoreError;
pub use favorites::{FavoritesCounter, FavoritesIndex};
pub use store::{FavoritePatch, ItemWrite, ListQuery, StoreAdapter};
pub use stream::EntityStream;
pub use sync::{FavoriteHolder, FavoriteSync, ReadMark, SyncEvent, ToggleOutcome, ToggleState};
pub use view::{
    CatalogView, DetailOverlay, FilterKey, Filters, LoadState, Page, Pagination, SearchQuery,
};

// Re-export model types at the crate root for ergonomics.
pub use model::{CatalogItem, EntityKind, ItemField, ItemId, TaggedItem, WriteMode};
