//! Review session management for spaced repetition practice.
//! Walks the due cards of a deck in rounds; forgotten cards drop to level 0
//! and are due again the same day, so they re-enter a follow-up round.

use super::{Confidence, SessionCard, leitner};
use chrono::Local;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Manages a review session over the cards that are due today.
pub struct ReviewSession {
    pub deck_name: String,
    pub all_cards: Vec<SessionCard>,
    pub current_round_cards: Vec<usize>,
    pub current_index: usize,
    pub show_answer: bool,
    pub conn: Arc<Mutex<Connection>>,
    pub round_number: usize,
    /// (previous box, new box) of the most recent grading, for display.
    pub last_transition: Option<(u8, u8)>,
}

impl ReviewSession {
    /// Creates a new session from the cards that are due for review.
    pub fn new_from_due_cards(
        deck_name: String,
        cards: Vec<super::Card>,
        conn: Arc<Mutex<Connection>>,
    ) -> Self {
        let session_cards: Vec<_> = cards.into_iter().map(SessionCard::new).collect();
        let indices: Vec<usize> = (0..session_cards.len()).collect();

        Self {
            deck_name,
            all_cards: session_cards,
            current_round_cards: indices,
            current_index: 0,
            show_answer: false,
            conn,
            round_number: 1,
            last_transition: None,
        }
    }

    pub fn current_card(&self) -> Option<&SessionCard> {
        self.current_round_cards
            .get(self.current_index)
            .and_then(|&idx| self.all_cards.get(idx))
    }

    pub fn toggle_answer(&mut self) {
        self.show_answer = !self.show_answer;
    }

    pub fn next_card(&mut self) {
        if self.current_index + 1 < self.current_round_cards.len() {
            self.current_index += 1;
            self.show_answer = false;
        } else {
            self.start_next_round();
        }
    }

    /// Starts a new round with the cards that were forgotten this round.
    /// If none remain, the session is complete.
    fn start_next_round(&mut self) {
        let forgotten_indices: Vec<usize> = self
            .current_round_cards
            .iter()
            .copied()
            .filter(|&idx| {
                self.all_cards
                    .get(idx)
                    .map(|sc| !sc.remembered)
                    .unwrap_or(false)
            })
            .collect();

        if !forgotten_indices.is_empty() {
            self.current_round_cards = forgotten_indices;
            self.current_index = 0;
            self.show_answer = false;
            self.round_number += 1;

            // These cards get a fresh attempt in the new round
            for &idx in &self.current_round_cards {
                if let Some(sc) = self.all_cards.get_mut(idx) {
                    sc.remembered = false;
                }
            }
        }
        // Empty forgotten_indices means is_completed() turns true
    }

    /// Grades the current card and persists the rescheduled card.
    /// Each grading is a full review: the scheduler produces a new card
    /// value which replaces the session's copy.
    pub fn grade_current_card(&mut self, confidence: Confidence) {
        if let Some(&actual_idx) = self.current_round_cards.get(self.current_index) {
            if let Some(sc) = self.all_cards.get_mut(actual_idx) {
                sc.remembered = confidence == Confidence::Know;

                let conn = self.conn.lock().unwrap();
                let now = crate::database::db::get_current_date(&conn)
                    .unwrap_or_else(|_| Local::now());

                let outcome = leitner::review_card(&sc.card, confidence, now);

                let _ = crate::database::db::update_card(&outcome.card, &conn);

                self.last_transition = Some((outcome.previous_level, outcome.new_level));
                sc.card = outcome.card;
            }
        }
    }

    pub fn remembered_count(&self) -> usize {
        self.current_round_cards
            .iter()
            .filter(|&&idx| {
                self.all_cards
                    .get(idx)
                    .map(|sc| sc.remembered)
                    .unwrap_or(false)
            })
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.current_round_cards.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.remembered_count()
    }

    /// Returns true when every card in the round was remembered or the
    /// round is empty.
    pub fn is_completed(&self) -> bool {
        self.current_round_cards.is_empty()
            || self.remembered_count() == self.total_count()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} cards due", self.round_number, self.total_count())
        } else {
            format!(
                "Round {} (forgotten cards): {} to retry",
                self.round_number,
                self.total_count()
            )
        }
    }
}
