mod catalog;
mod detail;
mod filter;
mod load_state;
mod pagination;
mod search;

pub use catalog::CatalogView;
pub use detail::DetailOverlay;
pub use filter::{FilterKey, Filters};
pub use load_state::LoadState;
pub use pagination::{Page, Pagination};
pub use search::{SearchQuery, matches_search};
