mod engine;
mod holder;
mod state;

pub use engine::{FavoriteSync, ReadMark};
pub use holder::FavoriteHolder;
pub use state::{SyncEvent, ToggleOutcome, ToggleState};
