pub mod card;
pub mod deck;
pub mod deck_set;
pub mod leitner;
pub mod review_session;
pub mod session_card;

pub use card::Card;
pub use deck::Deck;
pub use deck_set::DeckSet;
pub use leitner::{Confidence, DeckStats, ReviewOutcome};
pub use review_session::ReviewSession;
pub use session_card::SessionCard;
