pub mod database;
pub mod export;
pub mod models;

pub use models::{Card, Confidence, Deck, DeckSet, DeckStats, ReviewSession};
