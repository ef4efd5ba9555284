mod counter;
mod index;

pub use counter::FavoritesCounter;
pub use index::{FavoritesIndex, count_favorites};
