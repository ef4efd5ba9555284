// ── Catalog view model ──
//
// One browsable list for one entity kind: the loaded working set plus
// the search → filter → paginate projection shown to presentation.
// Loading never touches filters or the current page; filter and query
// changes send the view back to page 1.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use indexmap::IndexSet;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::detail::DetailOverlay;
use super::filter::{FilterKey, Filters};
use super::load_state::LoadState;
use super::pagination::{Page, Pagination};
use super::search::{SearchQuery, matches_search};
use crate::error::CoreError;
use crate::model::{CatalogItem, EntityKind, ItemField, ItemId};
use crate::store::working_set::WorkingSet;
use crate::store::{ListQuery, StoreAdapter};
use crate::stream::EntityStream;
use crate::sync::{FavoriteHolder, FavoriteSync, ToggleOutcome};

/// View model for one catalog list.
///
/// Dropping the view (or calling [`close`](Self::close)) tears it down:
/// loads in flight are discarded and the working set stops following
/// favorite changes. Toggles already started still run to completion.
pub struct CatalogView {
    kind: EntityKind,
    items: Arc<WorkingSet>,
    store: Arc<StoreAdapter>,
    sync: FavoriteSync,
    state: Mutex<ViewState>,
    load_state: watch::Sender<LoadState>,
    closed: CancellationToken,
}

struct ViewState {
    filters: Filters,
    pagination: Pagination,
    search: watch::Receiver<String>,
    query: String,
}

impl ViewState {
    /// Pick up a changed search query, returning to page 1 if it moved.
    fn refresh_query(&mut self) {
        if self.search.has_changed().unwrap_or(false) {
            self.query = self.search.borrow_and_update().clone();
            self.pagination.reset();
        }
    }
}

impl CatalogView {
    pub(crate) fn new(
        kind: EntityKind,
        store: Arc<StoreAdapter>,
        sync: FavoriteSync,
        search: &SearchQuery,
        items_per_page: usize,
        closed: CancellationToken,
    ) -> Self {
        let items = Arc::new(WorkingSet::new(kind, closed.clone()));
        sync.register(&items);

        let mut search = search.subscribe();
        let query = search.borrow_and_update().clone();
        let (load_state, _) = watch::channel(LoadState::Idle);

        Self {
            kind,
            items,
            store,
            sync,
            state: Mutex::new(ViewState {
                filters: Filters::default(),
                pagination: Pagination::new(items_per_page),
                search,
                query,
            }),
            load_state,
            closed,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Fetch the full collection and replace the working set.
    ///
    /// Records with a toggle in flight (or settled while the fetch was
    /// running) keep their local favorite value. A failed fetch leaves
    /// the previous working set in place and is reported as
    /// [`LoadState::Failed`] rather than an error.
    pub async fn load(&self) -> LoadState {
        if self.closed.is_cancelled() {
            return LoadState::Closed;
        }
        self.load_state.send_replace(LoadState::Loading);

        let mark = self.sync.begin_read();
        let fetched = tokio::select! {
            biased;
            () = self.closed.cancelled() => {
                debug!(kind = %self.kind, "view closed during load, discarding result");
                return LoadState::Closed;
            }
            result = self.store.list(self.kind, ListQuery::default()) => result,
        };

        let state = match fetched {
            Ok(items) => {
                let count = items.len();
                self.items.replace_all(items);
                for (kind, item) in self.sync.overrides_since(Some(self.kind), mark.epoch()) {
                    self.items.apply_favorite(kind, &item);
                }
                debug!(kind = %self.kind, count, "working set loaded");
                LoadState::Loaded {
                    count,
                    at: Utc::now(),
                }
            }
            Err(e) => {
                warn!(kind = %self.kind, error = %e, "catalog load failed");
                LoadState::Failed {
                    message: e.to_string(),
                }
            }
        };
        self.load_state.send_replace(state.clone());
        state
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state.borrow().clone()
    }

    pub fn watch_load_state(&self) -> watch::Receiver<LoadState> {
        self.load_state.subscribe()
    }

    // ── Working set access ───────────────────────────────────────────

    /// Every loaded record, in store order, before search and filters.
    pub fn items(&self) -> Arc<Vec<Arc<CatalogItem>>> {
        self.items.snapshot()
    }

    pub fn get(&self, id: &ItemId) -> Option<Arc<CatalogItem>> {
        self.items.get(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Working set version; bumps on every load or favorite change.
    pub fn version(&self) -> u64 {
        self.items.version()
    }

    pub fn subscribe(&self) -> EntityStream<CatalogItem> {
        EntityStream::new(self.items.subscribe())
    }

    /// Distinct non-empty values of `field` across the working set, in
    /// first-seen order.
    pub fn distinct_values(&self, field: ItemField) -> Vec<String> {
        let snapshot = self.items.snapshot();
        let values: IndexSet<&str> = snapshot
            .iter()
            .filter_map(|item| item.field(field))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .collect();
        values.into_iter().map(str::to_owned).collect()
    }

    // ── Projection ───────────────────────────────────────────────────

    fn project(&self, state: &ViewState) -> Vec<Arc<CatalogItem>> {
        self.items
            .snapshot()
            .iter()
            .filter(|item| matches_search(item, &state.query) && state.filters.matches(item))
            .cloned()
            .collect()
    }

    /// The visible page of the searched and filtered list.
    pub fn page(&self) -> Page<Arc<CatalogItem>> {
        let mut state = self.state();
        state.refresh_query();
        let matching = self.project(&state);
        state.pagination.slice(&matching)
    }

    /// Every record passing search and filters, unpaginated.
    pub fn matching(&self) -> Vec<Arc<CatalogItem>> {
        let mut state = self.state();
        state.refresh_query();
        self.project(&state)
    }

    /// Number of records passing search and filters.
    pub fn matching_count(&self) -> usize {
        let mut state = self.state();
        state.refresh_query();
        self.project(&state).len()
    }

    pub fn total_pages(&self) -> usize {
        let mut state = self.state();
        state.refresh_query();
        let total = self.project(&state).len();
        state.pagination.total_pages(total)
    }

    pub fn current_page(&self) -> usize {
        let mut state = self.state();
        state.refresh_query();
        let total = self.project(&state).len();
        state.pagination.effective_page(total)
    }

    pub fn items_per_page(&self) -> usize {
        self.state().pagination.items_per_page()
    }

    /// Jump to `page`. Pages outside `1..=total_pages` are ignored and
    /// return `false`.
    pub fn go_to_page(&self, page: usize) -> bool {
        let mut state = self.state();
        state.refresh_query();
        let total = self.project(&state).len();
        state.pagination.go_to(page, total)
    }

    pub fn next_page(&self) -> bool {
        self.go_to_page(self.current_page() + 1)
    }

    pub fn previous_page(&self) -> bool {
        let current = self.current_page();
        current > 1 && self.go_to_page(current - 1)
    }

    /// The search text this view last picked up.
    pub fn query(&self) -> String {
        let mut state = self.state();
        state.refresh_query();
        state.query.clone()
    }

    // ── Filters ──────────────────────────────────────────────────────

    pub fn filters(&self) -> Filters {
        self.state().filters.clone()
    }

    /// Set one filter from user text and return to page 1. Blank text
    /// clears the filter. Invalid numbers leave the filters unchanged.
    pub fn set_filter(&self, key: FilterKey, raw: &str) -> Result<(), CoreError> {
        let mut state = self.state();
        state.filters.set(key, raw)?;
        state.pagination.reset();
        Ok(())
    }

    pub fn clear_filter(&self, key: FilterKey) {
        let mut state = self.state();
        state.filters.clear(key);
        state.pagination.reset();
    }

    pub fn clear_filters(&self) {
        let mut state = self.state();
        state.filters = Filters::default();
        state.pagination.reset();
    }

    // ── Favorites ────────────────────────────────────────────────────

    /// Toggle a record's favorite flag through the sync engine.
    pub fn toggle_favorite(
        &self,
        id: ItemId,
    ) -> impl Future<Output = Result<ToggleOutcome, CoreError>> + Send + 'static {
        self.sync.toggle(self.kind, id)
    }

    /// Open a loaded record as an overlay that follows favorite changes
    /// until it is dropped.
    pub fn open_detail(&self, id: &ItemId) -> Option<Arc<DetailOverlay>> {
        let item = self.items.get(id)?;
        let overlay = Arc::new(DetailOverlay::new(self.kind, (*item).clone()));
        self.sync.register(&overlay);
        Some(overlay)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Tear the view down. Idempotent.
    pub fn close(&self) {
        if !self.closed.is_cancelled() {
            debug!(kind = %self.kind, "closing catalog view");
            self.closed.cancel();
            self.load_state.send_replace(LoadState::Closed);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

impl Drop for CatalogView {
    fn drop(&mut self) {
        self.closed.cancel();
    }
}
