// ── Shared search query ──
//
// One free-text query is shared by every catalog view. Views watch it
// and go back to page 1 whenever it changes.

use std::sync::Arc;

use tokio::sync::watch;

use crate::model::CatalogItem;

/// Process-wide search text. Cheaply cloneable; all clones share state.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    tx: Arc<watch::Sender<String>>,
}

impl SearchQuery {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(String::new());
        Self { tx: Arc::new(tx) }
    }

    /// Replace the query. Setting the same text again is not a change.
    pub fn set(&self, text: impl Into<String>) {
        let text = text.into();
        self.tx.send_if_modified(|current| {
            if *current == text {
                false
            } else {
                *current = text;
                true
            }
        });
    }

    pub fn clear(&self) {
        self.set(String::new());
    }

    pub fn get(&self) -> String {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self::new()
    }
}

/// Case-insensitive substring match over the searchable fields: title,
/// location, city, category, type and the price as written.
///
/// An empty or blank query matches everything.
pub fn matches_search(item: &CatalogItem, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();

    let text_hit = [
        item.title.as_deref(),
        item.location.as_deref(),
        item.city.as_deref(),
        item.category.as_deref(),
        item.item_type.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&needle));

    text_hit || item.price.is_some_and(|p| p.to_string().contains(&needle))
}
