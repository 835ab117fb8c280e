//! Leitner-system spaced repetition scheduler.
//!
//! The whole policy is a fixed level→interval table plus two transition
//! rules:
//! - "forgot" sends a card back to level 0 (due again the same day)
//! - "know" bumps it one level, saturating at 5 (the mastery ceiling)
//!
//! Every function here is pure: the caller owns the card collection, passes
//! cards in and substitutes the returned cards back. Dates are compared at
//! day granularity in local time, so a card's due-ness cannot flip between
//! morning and evening of the same calendar day.

use super::Card;
use chrono::{DateTime, Days, Local, NaiveDate};

/// Mastery ceiling; levels live in 0..=MAX_LEVEL.
pub const MAX_LEVEL: u8 = 5;

/// Review intervals in days, indexed by level.
const INTERVALS: [u64; 6] = [0, 1, 3, 7, 14, 30];

/// The user's self-rated recall confidence. Deliberately two-valued:
/// there is no partial credit in a Leitner box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confidence {
    Forgot,
    Know,
}

/// Result of reviewing a single card. `card` is a fresh value; the input
/// card is left untouched and must be replaced with this one.
#[derive(Clone, Debug)]
pub struct ReviewOutcome {
    pub card: Card,
    pub previous_level: u8,
    pub new_level: u8,
    pub next_review_date: NaiveDate,
}

/// Aggregate view over a deck, recomputed on demand and never stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeckStats {
    pub total_cards: usize,
    pub due_count: usize,
    pub mastered_count: usize,
    /// Mean level rounded half-up to one decimal; 0.0 for an empty deck.
    pub average_level: f64,
}

/// Days until the next review for a card at `level`.
///
/// Panics if `level` is outside 0..=5; levels are clamped at construction
/// and transition time, so an out-of-range value is a caller bug, not a
/// condition to recover from.
pub fn interval_days(level: u8) -> u64 {
    assert!(
        level <= MAX_LEVEL,
        "level {} outside the Leitner range 0..=5",
        level
    );
    INTERVALS[level as usize]
}

/// Level transition rule: forgot resets to 0, know increments saturating
/// at [`MAX_LEVEL`]. Panics on an out-of-range current level.
pub fn next_level(current_level: u8, confidence: Confidence) -> u8 {
    assert!(
        current_level <= MAX_LEVEL,
        "level {} outside the Leitner range 0..=5",
        current_level
    );
    match confidence {
        Confidence::Forgot => 0,
        Confidence::Know => (current_level + 1).min(MAX_LEVEL),
    }
}

/// Earliest day a card at `level` may be shown again, counting from
/// `from`'s calendar day. Time-of-day is dropped, so the result only
/// depends on the date component: level 0 is due the same day.
pub fn next_review_date(level: u8, from: DateTime<Local>) -> NaiveDate {
    from.date_naive() + Days::new(interval_days(level))
}

/// Applies one review to `card` and returns the updated card alongside the
/// level transition. Id, question, answer and creation time carry over;
/// the schedule is re-anchored at `now` (reviewing early or late shifts
/// the schedule to the actual review moment).
pub fn review_card(card: &Card, confidence: Confidence, now: DateTime<Local>) -> ReviewOutcome {
    let previous_level = card.level;
    let new_level = next_level(previous_level, confidence);
    let due = next_review_date(new_level, now);

    let mut updated = card.clone();
    updated.level = new_level;
    updated.next_review_date = due;
    updated.last_review_date = Some(now);
    updated.review_count = card.review_count + 1;

    ReviewOutcome {
        card: updated,
        previous_level,
        new_level,
        next_review_date: due,
    }
}

/// True iff the card's due day is on or before `as_of`'s calendar day.
pub fn is_due(card: &Card, as_of: DateTime<Local>) -> bool {
    card.next_review_date <= as_of.date_naive()
}

/// The due subsequence of `cards`, preserving their relative order.
/// Prioritization, if any, is the presentation layer's business.
pub fn select_due_cards<'a>(cards: &'a [Card], as_of: DateTime<Local>) -> Vec<&'a Card> {
    cards.iter().filter(|card| is_due(card, as_of)).collect()
}

/// Computes deck statistics from scratch.
pub fn deck_stats(cards: &[Card], as_of: DateTime<Local>) -> DeckStats {
    let total_cards = cards.len();
    let due_count = select_due_cards(cards, as_of).len();
    let mastered_count = cards.iter().filter(|c| c.level == MAX_LEVEL).count();

    let average_level = if cards.is_empty() {
        0.0
    } else {
        let level_sum: u32 = cards.iter().map(|c| u32::from(c.level)).sum();
        let mean = f64::from(level_sum) / total_cards as f64;
        (mean * 10.0).round() / 10.0
    };

    DeckStats {
        total_cards,
        due_count,
        mastered_count,
        average_level,
    }
}
