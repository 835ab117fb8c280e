//! Database operations for the flashcard scheduler
//!
//! Handles SQLite initialization, CRUD for decks and cards, and the
//! persisted simulated clock used to exercise the review schedule.

use crate::models::{Card, Deck, DeckSet};
use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};
use rusqlite::types::Type;
use rusqlite::{Connection, Result, Row, params};

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Opens the application database and creates the schema if needed
pub fn init_database() -> Result<Connection> {
    let conn = Connection::open("leitner.sqlite3")?;
    create_tables(&conn)?;
    Ok(conn)
}

/// Creates tables for decks, cards, and app state
///
/// Card dates are stored as ISO-8601 text so they round-trip exactly:
/// the due date as a plain date, timestamps as RFC 3339.
/// Sets the simulated current date to now if not already initialized.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS decks (
            name TEXT PRIMARY KEY
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS cards (
            id TEXT PRIMARY KEY,
            deck_name TEXT NOT NULL,
            question TEXT NOT NULL,
            answer TEXT NOT NULL,
            level INTEGER NOT NULL DEFAULT 0,
            next_review_date TEXT NOT NULL,
            last_review_date TEXT,
            created_at TEXT NOT NULL,
            review_count INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (deck_name) REFERENCES decks(name),
            UNIQUE(deck_name, question)
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO app_state (key, value) VALUES ('current_date', ?1)",
        params![Local::now().timestamp().to_string()],
    )?;

    Ok(())
}

/// Retrieves the simulated current date from the database
pub fn get_current_date(conn: &Connection) -> Result<DateTime<Local>> {
    let timestamp: String = conn.query_row(
        "SELECT value FROM app_state WHERE key = 'current_date'",
        [],
        |row| row.get(0),
    )?;

    let secs = timestamp.parse::<i64>().unwrap_or(0);
    Ok(Local
        .timestamp_opt(secs, 0)
        .single()
        .unwrap_or_else(Local::now))
}

/// Advances the simulated date by 24 hours (for exercising the schedule)
pub fn advance_day(conn: &Connection) -> Result<()> {
    let next_day = get_current_date(conn)? + Duration::days(1);

    conn.execute(
        "UPDATE app_state SET value = ?1 WHERE key = 'current_date'",
        params![next_day.timestamp().to_string()],
    )?;

    Ok(())
}

/// Creates a new deck in the database
pub fn new_deck(name: &str, conn: &Connection) -> Result<()> {
    conn.execute("INSERT INTO decks (name) VALUES (?1)", params![name])?;
    Ok(())
}

fn card_from_row(row: &Row) -> Result<Card> {
    let next_review_date: String = row.get(4)?;
    let next_review_date = NaiveDate::parse_from_str(&next_review_date, DUE_DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    let last_review_date: Option<String> = row.get(5)?;
    let last_review_date = last_review_date
        .map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Local))
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))
        })
        .transpose()?;

    let created_at: String = row.get(6)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;

    Ok(Card {
        id: row.get(0)?,
        question: row.get(1)?,
        answer: row.get(2)?,
        level: row.get(3)?,
        next_review_date,
        last_review_date,
        created_at,
        review_count: row.get(7)?,
    })
}

/// Adds a card to a deck, due immediately at level 0
///
/// Returns the stored card. If a card with the same question already
/// exists in the deck, the insert is ignored and the existing card is
/// returned unchanged.
pub fn add_card(deck_name: &str, question: &str, answer: &str, conn: &Connection) -> Result<Card> {
    let now = get_current_date(conn)?;
    let card = Card::new_at(question, answer, now);

    conn.execute(
        "INSERT OR IGNORE INTO cards
            (id, deck_name, question, answer, level, next_review_date, last_review_date, created_at, review_count)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7, ?8)",
        params![
            card.id,
            deck_name,
            card.question,
            card.answer,
            card.level,
            card.next_review_date.format(DUE_DATE_FORMAT).to_string(),
            card.created_at.to_rfc3339(),
            card.review_count,
        ],
    )?;

    conn.query_row(
        "SELECT id, question, answer, level, next_review_date, last_review_date, created_at, review_count
         FROM cards WHERE deck_name = ?1 AND question = ?2",
        params![deck_name, question],
        card_from_row,
    )
}

/// Retrieves all cards of a deck, in insertion order
pub fn get_cards_for_deck(deck_name: &str, conn: &Connection) -> Result<Vec<Card>> {
    let mut stmt = conn.prepare(
        "SELECT id, question, answer, level, next_review_date, last_review_date, created_at, review_count
         FROM cards WHERE deck_name = ?1 ORDER BY rowid",
    )?;

    let cards = stmt
        .query_map(params![deck_name], card_from_row)?
        .collect::<Result<Vec<Card>>>()?;

    Ok(cards)
}

/// Writes a card's schedule state back after a review or reset
pub fn update_card(card: &Card, conn: &Connection) -> Result<()> {
    conn.execute(
        "UPDATE cards
         SET level = ?1, next_review_date = ?2, last_review_date = ?3, review_count = ?4
         WHERE id = ?5",
        params![
            card.level,
            card.next_review_date.format(DUE_DATE_FORMAT).to_string(),
            card.last_review_date.map(|dt| dt.to_rfc3339()),
            card.review_count,
            card.id,
        ],
    )?;

    Ok(())
}

/// Deletes a card from its deck
pub fn delete_card(card_id: &str, conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM cards WHERE id = ?1", params![card_id])?;
    Ok(())
}

/// Resets the schedule of every card in a deck, preserving content
///
/// Each card goes back to level 0 and is due on the simulated current day.
/// Returns the reset cards.
pub fn reset_deck(deck_name: &str, conn: &Connection) -> Result<Vec<Card>> {
    let now = get_current_date(conn)?;

    let reset_cards: Vec<Card> = get_cards_for_deck(deck_name, conn)?
        .iter()
        .map(|card| card.reset(now))
        .collect();

    for card in &reset_cards {
        update_card(card, conn)?;
    }

    Ok(reset_cards)
}

/// Retrieves all deck names from the database
pub fn get_all_decks(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM decks")?;
    let decks = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>>>()?;
    Ok(decks)
}

/// Loads all decks with their cards into memory
pub fn load_all_decks(conn: &Connection) -> Result<DeckSet> {
    let deck_names = get_all_decks(conn)?;

    let mut decks = Vec::new();
    for deck_name in deck_names {
        let cards = get_cards_for_deck(&deck_name, conn)?;
        decks.push(Deck {
            name: deck_name,
            cards,
        });
    }

    Ok(DeckSet { decks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, leitner};

    fn open_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn test_card_round_trip_through_storage() {
        let conn = open_test_db();
        new_deck("Geography", &conn).unwrap();

        let stored = add_card("Geography", "capital of Japan?", "Tokyo", &conn).unwrap();
        let loaded = get_cards_for_deck("Geography", &conn).unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, stored.id);
        assert_eq!(loaded[0].question, "capital of Japan?");
        assert_eq!(loaded[0].answer, "Tokyo");
        assert_eq!(loaded[0].level, 0);
        assert_eq!(loaded[0].next_review_date, stored.next_review_date);
        assert_eq!(loaded[0].last_review_date, None);
        assert_eq!(loaded[0].review_count, 0);
    }

    #[test]
    fn test_duplicate_question_is_ignored() {
        let conn = open_test_db();
        new_deck("d", &conn).unwrap();

        let first = add_card("d", "q", "a", &conn).unwrap();
        let second = add_card("d", "q", "different answer", &conn).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.answer, "a");
        assert_eq!(get_cards_for_deck("d", &conn).unwrap().len(), 1);
    }

    #[test]
    fn test_review_persists_schedule() {
        let conn = open_test_db();
        new_deck("d", &conn).unwrap();
        let card = add_card("d", "q", "a", &conn).unwrap();

        let now = get_current_date(&conn).unwrap();
        let outcome = leitner::review_card(&card, Confidence::Know, now);
        update_card(&outcome.card, &conn).unwrap();

        let loaded = &get_cards_for_deck("d", &conn).unwrap()[0];
        assert_eq!(loaded.level, 1);
        assert_eq!(loaded.review_count, 1);
        assert_eq!(loaded.next_review_date, outcome.next_review_date);
        assert!(loaded.last_review_date.is_some());
    }

    #[test]
    fn test_advance_day_moves_simulated_clock() {
        let conn = open_test_db();

        let before = get_current_date(&conn).unwrap();
        advance_day(&conn).unwrap();
        let after = get_current_date(&conn).unwrap();

        assert_eq!(after - before, Duration::days(1));
    }

    #[test]
    fn test_reset_deck_clears_progress() {
        let conn = open_test_db();
        new_deck("d", &conn).unwrap();
        let card = add_card("d", "q", "a", &conn).unwrap();

        let now = get_current_date(&conn).unwrap();
        let reviewed = leitner::review_card(&card, Confidence::Know, now).card;
        update_card(&reviewed, &conn).unwrap();

        let reset = reset_deck("d", &conn).unwrap();
        assert_eq!(reset.len(), 1);
        assert_eq!(reset[0].level, 0);
        assert_eq!(reset[0].review_count, 0);
        assert_eq!(reset[0].last_review_date, None);
        assert_eq!(reset[0].question, "q");
        assert_eq!(reset[0].id, card.id);

        let loaded = &get_cards_for_deck("d", &conn).unwrap()[0];
        assert_eq!(loaded.level, 0);
        assert_eq!(loaded.review_count, 0);
    }

    #[test]
    fn test_delete_card_removes_row() {
        let conn = open_test_db();
        new_deck("d", &conn).unwrap();
        let card = add_card("d", "q", "a", &conn).unwrap();

        delete_card(&card.id, &conn).unwrap();
        assert!(get_cards_for_deck("d", &conn).unwrap().is_empty());
    }

    #[test]
    fn test_load_all_decks_includes_cards() {
        let conn = open_test_db();
        new_deck("one", &conn).unwrap();
        new_deck("two", &conn).unwrap();
        add_card("one", "q1", "a1", &conn).unwrap();
        add_card("two", "q2", "a2", &conn).unwrap();
        add_card("two", "q3", "a3", &conn).unwrap();

        let deck_set = load_all_decks(&conn).unwrap();
        assert_eq!(deck_set.decks.len(), 2);

        let two = deck_set.decks.iter().find(|d| d.name == "two").unwrap();
        assert_eq!(two.cards.len(), 2);
    }
}
