//! Wrapper for cards inside a review session, tracking whether the card
//! was remembered in the current round.
use super::Card;

#[derive(Clone)]
pub struct SessionCard {
    pub card: Card,
    pub remembered: bool,
}

impl SessionCard {
    pub fn new(card: Card) -> Self {
        Self {
            card,
            remembered: false,
        }
    }
}
