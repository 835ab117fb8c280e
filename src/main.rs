mod app;
use leitner_app::*;

use app::MyApp;
use database::db::{add_card, get_all_decks, init_database, load_all_decks, new_deck};

fn main() -> eframe::Result<()> {
    let conn = init_database().expect("Failed to initialize database");

    if get_all_decks(&conn).unwrap_or_default().is_empty() {
        let _ = new_deck("General Knowledge", &conn);

        let _ = add_card(
            "General Knowledge",
            "What is the capital of Australia?",
            "Canberra",
            &conn,
        );
        let _ = add_card(
            "General Knowledge",
            "Which planet is known as the Red Planet?",
            "Mars",
            &conn,
        );
        let _ = add_card(
            "General Knowledge",
            "Who painted the Mona Lisa?",
            "Leonardo da Vinci",
            &conn,
        );

        println!("Sample data created!");
    }

    let deck_set = load_all_decks(&conn).expect("Failed to load decks from database");

    println!("Loaded {} decks from database", deck_set.decks.len());
    for deck in &deck_set.decks {
        println!("  - {} ({} cards)", deck.name, deck.cards.len());
    }
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([500.0, 700.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Leitner Box",
        options,
        Box::new(|_cc| Ok(Box::new(MyApp::new_with_deckset(deck_set, conn)))),
    )
}
