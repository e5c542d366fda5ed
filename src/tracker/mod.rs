pub mod assign;
pub mod one_euro;

pub use assign::{greedy_match, Track, TrackAssigner, TrackId, TrackState};
pub use one_euro::{FilterBank, OneEuroFilter, OneEuroState};
