//! JSON import/export module for decks.
//! The full card record is serialized, schedule state included, so an
//! exported deck re-imports with its review progress intact. Dates travel
//! as ISO-8601 strings.

use crate::models::Deck;
use std::fs::File;
use std::io::{Read, Write};

/// Exports a deck to a JSON file at the specified path.
/// Returns an error if file creation or writing fails.
pub fn export_json_to_path(deck: &Deck, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let json_string = serde_json::to_string_pretty(deck)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    Ok(())
}

/// Imports a deck from a JSON file.
/// Returns an error if the file doesn't exist or contains invalid JSON.
pub fn import_json(filename: &str) -> Result<Deck, Box<dyn std::error::Error>> {
    let mut file = File::open(filename)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let deck: Deck = serde_json::from_str(&contents)?;
    Ok(deck)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Card, Deck};
    use chrono::{Local, TimeZone};
    use std::fs;

    fn create_test_deck() -> Deck {
        let now = Local.with_ymd_and_hms(2025, 5, 20, 14, 30, 0).unwrap();
        let mut reviewed = Card::new_at("capital of Poland?", "Warsaw", now);
        reviewed.level = 3;
        reviewed.review_count = 3;
        reviewed.next_review_date = now.date_naive() + chrono::Days::new(7);
        reviewed.last_review_date = Some(now);

        Deck {
            name: "Test Deck".to_string(),
            cards: vec![reviewed, Card::new_at("capital of Peru?", "Lima", now)],
        }
    }

    #[test]
    fn test_export_json_to_path() {
        let deck = create_test_deck();
        let test_file = "test_export.json";

        let result = export_json_to_path(&deck, test_file);
        assert!(result.is_ok());

        assert!(fs::metadata(test_file).is_ok(), "File should exist");

        let _ = fs::remove_file(test_file);
    }

    #[test]
    fn test_export_and_import_roundtrip_keeps_schedule() {
        let original = create_test_deck();
        let test_file = "test_roundtrip.json";

        export_json_to_path(&original, test_file).unwrap();
        let imported = import_json(test_file).unwrap();

        assert_eq!(original.name, imported.name);
        assert_eq!(original.cards.len(), imported.cards.len());

        for (orig, imp) in original.cards.iter().zip(imported.cards.iter()) {
            assert_eq!(orig.id, imp.id);
            assert_eq!(orig.question, imp.question);
            assert_eq!(orig.answer, imp.answer);
            assert_eq!(orig.level, imp.level);
            assert_eq!(orig.next_review_date, imp.next_review_date);
            assert_eq!(orig.last_review_date, imp.last_review_date);
            assert_eq!(orig.created_at, imp.created_at);
            assert_eq!(orig.review_count, imp.review_count);
        }

        let _ = fs::remove_file(test_file);
    }

    #[test]
    fn test_import_nonexistent_file() {
        let result = import_json("nonexistent_file_xyz123.json");
        assert!(result.is_err());
    }

    #[test]
    fn test_import_invalid_json() {
        let test_file = "test_invalid.json";
        fs::write(test_file, "{ this is not valid json }").unwrap();

        let result = import_json(test_file);
        assert!(result.is_err());

        let _ = fs::remove_file(test_file);
    }
}
