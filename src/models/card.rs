//! Card is a pair <question, answer> plus its Leitner schedule state.
//! Content is immutable once set; only reviews and resets touch the schedule.
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub question: String,
    pub answer: String,
    /// Leitner box, always within 0..=5.
    pub level: u8,
    /// Earliest calendar day (local time) the card may be shown again.
    pub next_review_date: NaiveDate,
    pub last_review_date: Option<DateTime<Local>>,
    pub created_at: DateTime<Local>,
    pub review_count: u32,
}

impl Card {
    /// Creates a card due immediately, using the wall clock.
    pub fn new(question: &str, answer: &str) -> Self {
        Self::new_at(question, answer, Local::now())
    }

    /// Creates a card due on `now`'s calendar day, at level 0.
    pub fn new_at(question: &str, answer: &str, now: DateTime<Local>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            level: 0,
            next_review_date: now.date_naive(),
            last_review_date: None,
            created_at: now,
            review_count: 0,
        }
    }

    /// Restarts the schedule without discarding content: level back to 0,
    /// due on `now`'s day, review history cleared. Id, question, answer
    /// and creation time are preserved.
    pub fn reset(&self, now: DateTime<Local>) -> Self {
        Self {
            id: self.id.clone(),
            question: self.question.clone(),
            answer: self.answer.clone(),
            level: 0,
            next_review_date: now.date_naive(),
            last_review_date: None,
            created_at: self.created_at,
            review_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn some_evening() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 14, 21, 45, 9).unwrap()
    }

    #[test]
    fn test_new_card_is_due_immediately() {
        let now = some_evening();
        let card = Card::new_at("capital of France?", "Paris", now);

        assert_eq!(card.level, 0);
        assert_eq!(card.next_review_date, now.date_naive());
        assert_eq!(card.last_review_date, None);
        assert_eq!(card.review_count, 0);
        assert_eq!(card.created_at, now);
    }

    #[test]
    fn test_new_cards_get_distinct_ids() {
        let a = Card::new("q", "a");
        let b = Card::new("q", "a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_reset_clears_progress_keeps_content() {
        let created = some_evening();
        let mut card = Card::new_at("q", "a", created);
        card.level = 4;
        card.review_count = 9;
        card.next_review_date = created.date_naive() + chrono::Days::new(14);
        card.last_review_date = Some(created);

        let later = Local.with_ymd_and_hms(2025, 4, 2, 8, 0, 0).unwrap();
        let reset = card.reset(later);

        assert_eq!(reset.id, card.id);
        assert_eq!(reset.question, card.question);
        assert_eq!(reset.answer, card.answer);
        assert_eq!(reset.created_at, card.created_at);

        assert_eq!(reset.level, 0);
        assert_eq!(reset.next_review_date, later.date_naive());
        assert_eq!(reset.last_review_date, None);
        assert_eq!(reset.review_count, 0);

        // input untouched
        assert_eq!(card.level, 4);
        assert_eq!(card.review_count, 9);
    }
}
