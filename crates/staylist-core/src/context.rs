// ── Application context ──
//
// Process-wide wiring created once at startup: the store adapter, the
// favorite sync engine and the shared search query. Every view is built
// from here so they all share one engine and one query.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use staylist_api::StoreClient;

use crate::config::StoreConfig;
use crate::error::CoreError;
use crate::favorites::{FavoritesCounter, FavoritesIndex};
use crate::model::EntityKind;
use crate::store::StoreAdapter;
use crate::sync::{FavoriteSync, SyncEvent};
use crate::view::{CatalogView, SearchQuery};

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ContextInner>`. [`shutdown`](Self::shutdown)
/// closes every view and stops every counter created from it.
#[derive(Clone)]
pub struct AppContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    config: StoreConfig,
    store: Arc<StoreAdapter>,
    sync: FavoriteSync,
    search: SearchQuery,
    cancel: CancellationToken,
}

impl AppContext {
    /// Build a context with its own HTTP client.
    pub fn new(config: StoreConfig) -> Result<Self, CoreError> {
        let store = StoreAdapter::new(&config)?;
        Ok(Self::with_store(config, store))
    }

    /// Build a context around an existing client (tests, custom transports).
    pub fn with_client(config: StoreConfig, client: StoreClient) -> Self {
        Self::with_store(config, StoreAdapter::from_client(client))
    }

    fn with_store(config: StoreConfig, store: StoreAdapter) -> Self {
        debug!(url = %store.base_url(), "creating app context");
        let store = Arc::new(store);
        let sync = FavoriteSync::new(Arc::clone(&store), &config);

        Self {
            inner: Arc::new(ContextInner {
                config,
                store,
                sync,
                search: SearchQuery::new(),
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<StoreAdapter> {
        &self.inner.store
    }

    pub fn sync(&self) -> &FavoriteSync {
        &self.inner.sync
    }

    pub fn search(&self) -> &SearchQuery {
        &self.inner.search
    }

    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.inner.sync.events()
    }

    // ── View construction ────────────────────────────────────────────

    /// A new, unloaded catalog view for `kind`.
    pub fn catalog(&self, kind: EntityKind) -> CatalogView {
        CatalogView::new(
            kind,
            Arc::clone(&self.inner.store),
            self.inner.sync.clone(),
            &self.inner.search,
            self.inner.config.items_per_page(kind),
            self.inner.cancel.child_token(),
        )
    }

    /// A new, empty favorites index over every kind.
    pub fn favorites(&self) -> FavoritesIndex {
        FavoritesIndex::new(
            Arc::clone(&self.inner.store),
            self.inner.sync.clone(),
            EntityKind::ALL.to_vec(),
            self.inner.cancel.child_token(),
        )
    }

    /// Start a favorites counter polling at the configured interval.
    pub fn favorites_counter(&self) -> FavoritesCounter {
        self.favorites_counter_every(self.inner.config.poll_interval)
    }

    pub fn favorites_counter_every(&self, interval: Duration) -> FavoritesCounter {
        FavoritesCounter::spawn(
            Arc::clone(&self.inner.store),
            EntityKind::ALL.to_vec(),
            interval,
            self.inner.cancel.child_token(),
        )
    }

    /// Close all views and stop all counters created from this context.
    pub fn shutdown(&self) {
        debug!("shutting down app context");
        self.inner.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }
}
