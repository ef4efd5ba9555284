// ── Client-side pagination ──

use serde::Serialize;

/// Current page over a filtered list. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current_page: usize,
    items_per_page: usize,
}

impl Pagination {
    pub fn new(items_per_page: usize) -> Self {
        Self {
            current_page: 1,
            items_per_page: items_per_page.max(1),
        }
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    /// Requested page, which may exceed the page count after the list
    /// shrinks. See [`effective_page`](Self::effective_page).
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self, total_items: usize) -> usize {
        total_items.div_ceil(self.items_per_page)
    }

    /// Page actually shown for `total_items`: the requested page clamped
    /// into `1..=total_pages`.
    pub fn effective_page(&self, total_items: usize) -> usize {
        self.current_page
            .min(self.total_pages(total_items))
            .max(1)
    }

    /// Move to `page`. Out-of-range requests are ignored and return
    /// `false`.
    pub fn go_to(&mut self, page: usize, total_items: usize) -> bool {
        if page == 0 || page > self.total_pages(total_items) {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Cut the visible page out of `items`.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Page<T> {
        let total_items = items.len();
        let current_page = self.effective_page(total_items);
        let start = (current_page - 1) * self.items_per_page;
        let visible = items
            .iter()
            .skip(start)
            .take(self.items_per_page)
            .cloned()
            .collect();

        Page {
            items: visible,
            current_page,
            total_pages: self.total_pages(total_items),
            total_items,
            items_per_page: self.items_per_page,
        }
    }
}

/// One page of a projection plus the numbers needed to render controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items_per_page: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seven_items_three_per_page() {
        let items: Vec<u32> = (1..=7).collect();
        let mut pagination = Pagination::new(3);
        assert_eq!(pagination.total_pages(items.len()), 3);

        assert!(pagination.go_to(3, items.len()));
        let last = pagination.slice(&items);
        assert_eq!(last.items, vec![7]);
        assert!(!last.has_next());
        assert!(last.has_previous());

        assert!(!pagination.go_to(0, items.len()));
        assert!(!pagination.go_to(4, items.len()));
        assert_eq!(pagination.current_page(), 3);
    }

    #[test]
    fn shrinking_list_clamps_visible_page() {
        let mut pagination = Pagination::new(3);
        assert!(pagination.go_to(3, 7));

        let page = pagination.slice(&[1, 2, 3, 4]);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.items, vec![4]);
    }

    #[test]
    fn empty_list_shows_page_one_of_zero() {
        let pagination = Pagination::new(6);
        let page = pagination.slice::<u32>(&[]);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
        assert!(!page.has_next());
    }

    #[test]
    fn zero_page_size_is_treated_as_one() {
        assert_eq!(Pagination::new(0).items_per_page(), 1);
    }
}
