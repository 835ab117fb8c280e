//! Main application UI and state management.
//! Handles deck management, the review screen with its two-valued
//! confidence input, statistics display, and JSON import/export.

use crate::database::db;
use crate::export::json::{export_json_to_path, import_json};
use crate::models::{Confidence, Deck, DeckSet, ReviewSession, leitner};
use chrono::{DateTime, Local};
use eframe::egui;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Application screen states
#[derive(Default)]
enum AppScreen {
    #[default]
    Main,
    Review,
}

/// Main application state
#[derive(Default)]
pub struct MyApp {
    show_confirmation_dialog: bool,
    allowed_to_close: bool,
    all_decks: DeckSet,
    selected_deck_index: Option<usize>,
    current_question: String,
    current_answer: String,
    new_deck_name: String,
    conn: Option<Arc<Mutex<Connection>>>,

    current_screen: AppScreen,
    review_session: Option<ReviewSession>,

    current_date_display: String,

    show_export_dialog: bool,
    show_import_result_dialog: bool,
    import_result_message: String,
}

/// Formats a date-time as YYYY-MM-DD string
fn format_date(time: DateTime<Local>) -> String {
    time.format("%Y-%m-%d").to_string()
}

impl eframe::App for MyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match self.current_screen {
            AppScreen::Main => self.render_main_screen(ctx),
            AppScreen::Review => self.render_review_screen(ctx),
        }

        // Handle window close requests with confirmation dialog
        if ctx.input(|i| i.viewport().close_requested()) {
            if self.allowed_to_close {
                // Allow close
            } else {
                ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
                self.show_confirmation_dialog = true;
            }
        }

        if self.show_confirmation_dialog {
            egui::Window::new("Do you want to quit?")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("No").clicked() {
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = false;
                        }

                        if ui.button("Yes").clicked() {
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = true;
                            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });
                });
        }
        // exporting a deck
        if self.show_export_dialog {
            let mut export_deck_index: Option<usize> = None;
            let mut should_cancel = false;

            egui::Window::new("Export Deck")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label("Select a deck to export:");
                    ui.separator();

                    for (i, deck) in self.all_decks.decks.iter().enumerate() {
                        if ui
                            .button(format!("{} ({} cards)", deck.name, deck.cards.len()))
                            .clicked()
                        {
                            export_deck_index = Some(i);
                        }
                    }

                    ui.separator();

                    if ui.button("Cancel").clicked() {
                        should_cancel = true;
                    }
                });

            if let Some(i) = export_deck_index {
                self.handle_export(i);
            }
            if should_cancel {
                self.show_export_dialog = false;
            }
        }

        if self.show_import_result_dialog {
            egui::Window::new("Import/Export Result")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(&self.import_result_message);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.show_import_result_dialog = false;
                    }
                });
        }
    }
}

impl MyApp {
    /// Creates a new application instance with decks loaded from database
    pub fn new_with_deckset(deckset: DeckSet, conn: Connection) -> Self {
        let current_date = db::get_current_date(&conn)
            .map(format_date)
            .unwrap_or_else(|_| "Unknown".to_string());
        let has_decks = !deckset.decks.is_empty();
        Self {
            all_decks: deckset,
            selected_deck_index: if has_decks { Some(0) } else { None },
            current_question: String::new(),
            current_answer: String::new(),
            new_deck_name: String::new(),
            show_confirmation_dialog: false,
            allowed_to_close: false,
            conn: Some(Arc::new(Mutex::new(conn))),
            current_screen: AppScreen::Main,
            review_session: None,
            current_date_display: current_date,
            show_export_dialog: false,
            show_import_result_dialog: false,
            import_result_message: String::new(),
        }
    }

    /// Reads the simulated current date, falling back to the wall clock
    fn current_date(&self) -> DateTime<Local> {
        self.conn
            .as_ref()
            .and_then(|conn| conn.lock().ok().and_then(|c| db::get_current_date(&c).ok()))
            .unwrap_or_else(Local::now)
    }

    /// Renders the main screen with deck management interface
    fn render_main_screen(&mut self, ctx: &egui::Context) {
        let now = self.current_date();
        self.current_date_display = format_date(now);

        egui::CentralPanel::default().show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label(format!("Today: {}", self.current_date_display));

            if ui.button("Next Day").clicked() {
                if let Some(conn) = &self.conn {
                    let conn = conn.lock().unwrap();
                    let _ = db::advance_day(&conn);
                    if let Ok(current_date) = db::get_current_date(&conn) {
                        self.current_date_display = format_date(current_date);
                    }
                }
            }
        });
        ui.separator();

        // Import/Export buttons
        ui.horizontal(|ui| {
            if ui.button("Export Deck").clicked() {
                self.show_export_dialog = true;
            }
            if ui.button("Import Deck").clicked() {
                self.handle_import();
            }
        });

        ui.separator();

        // Deck creation section
        ui.heading("Create New Deck");
        ui.horizontal(|ui| {
            ui.label("Deck name:");
            ui.text_edit_singleline(&mut self.new_deck_name);
            if ui.button("Create Deck").clicked() {
                if !self.new_deck_name.is_empty() {
                    let created = self
                        .conn
                        .as_ref()
                        .map(|conn| {
                            let conn = conn.lock().unwrap();
                            db::new_deck(&self.new_deck_name, &conn).is_ok()
                        })
                        .unwrap_or(false);

                    if created {
                        self.all_decks.decks.push(Deck {
                            name: self.new_deck_name.clone(),
                            cards: Vec::new(),
                        });
                        self.new_deck_name.clear();
                    }
                }
            }
        });

        ui.separator();

        ui.heading(format!("Decks ({})", self.all_decks.decks.len()));

        // We store actions to execute after UI rendering to avoid borrowing conflicts
        let mut action_select: Option<usize> = None;
        let mut action_study: Option<usize> = None;

        egui::ScrollArea::vertical()
            .id_source("decks_list")
            .max_height(150.0)
            .show(ui, |ui| {
                for (i, deck) in self.all_decks.decks.iter().enumerate() {
                    let is_selected = self.selected_deck_index == Some(i);
                    let stats = leitner::deck_stats(&deck.cards, now);

                    ui.horizontal(|ui| {
                        if ui.selectable_label(
                            is_selected,
                            format!(
                                "{}. {} — {} cards, {} due, {} mastered, avg box {:.1}",
                                i + 1,
                                deck.name,
                                stats.total_cards,
                                stats.due_count,
                                stats.mastered_count,
                                stats.average_level,
                            )
                        ).clicked() {
                            action_select = Some(i);
                        }

                        if ui.button(format!("Study ({})", stats.due_count)).clicked() {
                            action_study = Some(i);
                        }
                    });
                }
            });

        // Execute deferred actions
        if let Some(i) = action_select {
            self.selected_deck_index = Some(i);
        }
        if let Some(i) = action_study {
            self.start_review_session(i);
        }

        ui.separator();

        // Card management for selected deck
        if let Some(deck_index) = self.selected_deck_index {
            let mut action_delete: Option<String> = None;
            let mut action_reset = false;

            if let Some(current_deck) = self.all_decks.decks.get_mut(deck_index) {
                ui.heading(format!("Selected Deck: {}", current_deck.name));

                ui.horizontal(|ui| {
                    ui.label("Question:");
                    ui.text_edit_singleline(&mut self.current_question);
                });

                ui.horizontal(|ui| {
                    ui.label("Answer:");
                    ui.text_edit_singleline(&mut self.current_answer);
                });
                if ui.button("Add Card").clicked() {
                    if !self.current_question.is_empty() && !self.current_answer.is_empty() {
                        if let Some(conn) = &self.conn {
                            let conn = conn.lock().unwrap();
                            if let Ok(card) = db::add_card(
                                &current_deck.name,
                                &self.current_question,
                                &self.current_answer,
                                &conn,
                            ) {
                                // add_card returns the existing card on a
                                // duplicate question; only push new ids
                                if !current_deck.cards.iter().any(|c| c.id == card.id) {
                                    current_deck.cards.push(card);
                                }
                            }
                        }
                        self.current_question.clear();
                        self.current_answer.clear();
                    }
                }

                if ui.button("Reset Schedule").clicked() {
                    action_reset = true;
                }

                ui.separator();

                ui.heading(format!("Cards ({})", current_deck.cards.len()));

                egui::ScrollArea::vertical()
                    .id_source("cards_list")
                    .max_height(200.0)
                    .show(ui, |ui| {
                        for (i, card) in current_deck.cards.iter().enumerate() {
                            ui.group(|ui| {
                                ui.label(format!("{}. Q: {}", i + 1, card.question));
                                ui.label(format!("   A: {}", card.answer));
                                ui.horizontal(|ui| {
                                    ui.label(format!(
                                        "   Box {}/5 · due {} · reviewed {} times",
                                        card.level,
                                        card.next_review_date,
                                        card.review_count,
                                    ));
                                    if ui.small_button("Delete").clicked() {
                                        action_delete = Some(card.id.clone());
                                    }
                                });
                            });
                        }
                    });
            }

            if let Some(card_id) = action_delete {
                self.handle_delete_card(deck_index, &card_id);
            }
            if action_reset {
                self.handle_reset_deck(deck_index);
            }
        } else {
            ui.label("Select a deck to add cards");
        }
    });
    }

    /// Renders the review screen: question first, answer on demand, then
    /// the Forgot/Know confidence choice
    fn render_review_screen(&mut self, ctx: &egui::Context) {
        let mut reload_decks = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(session) = &mut self.review_session {
                ui.heading(format!("Studying: {}", session.deck_name));

                ui.label(session.phase_message());

                ui.label(format!(
                    "Progress: {} / {} remembered ({} remaining)",
                    session.remembered_count(),
                    session.total_count(),
                    session.remaining_count()
                ));

                if let Some((from, to)) = session.last_transition {
                    ui.label(format!("Last card moved from box {} to box {}", from, to));
                }

                ui.add_space(20.0);

                if session.is_completed() {
                    ui.heading("Session complete!");
                    ui.label("Every card due today has been reviewed.");

                    ui.add_space(20.0);

                    if ui.button("Back to Main Screen").clicked() {
                        self.current_screen = AppScreen::Main;
                        self.review_session = None;
                        reload_decks = true;
                    }
                } else if let Some(session_card) = session.current_card() {
                    // Clone values to avoid borrowing issues
                    let show_answer = session.show_answer;
                    let already_graded = session_card.remembered;
                    let question = session_card.card.question.clone();
                    let answer = session_card.card.answer.clone();
                    let level = session_card.card.level;

                    ui.group(|ui| {
                        ui.set_min_height(200.0);
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);

                            ui.heading("Question:");
                            ui.label(&question);
                            ui.label(format!("(box {}/5)", level));

                            ui.add_space(20.0);

                            if show_answer {
                                ui.heading("Answer:");
                                ui.label(&answer);
                            } else {
                                ui.label("(Click 'Show Answer' to reveal)");
                            }

                            ui.add_space(20.0);
                        });
                    });

                    ui.add_space(20.0);

                    // Store actions to execute after UI rendering
                    let mut action_show_answer = false;
                    let mut action_grade: Option<Confidence> = None;
                    let mut action_back = false;

                    if !show_answer {
                        if ui.button("Show Answer").clicked() {
                            action_show_answer = true;
                        }
                    }

                    // Confidence buttons - only show after revealing the answer
                    if show_answer && !already_graded {
                        ui.label("Did you remember it?");
                        ui.horizontal(|ui| {
                            if ui.button("Forgot (back to box 0)").clicked() {
                                action_grade = Some(Confidence::Forgot);
                            }
                            if ui.button("Know (next box)").clicked() {
                                action_grade = Some(Confidence::Know);
                            }
                        });
                    }

                    ui.add_space(20.0);

                    if ui.button("Back to Main Screen").clicked() {
                        action_back = true;
                    }

                    // Execute deferred actions
                    if action_show_answer {
                        session.toggle_answer();
                    }
                    if let Some(confidence) = action_grade {
                        session.grade_current_card(confidence);
                        session.next_card();
                    }
                    if action_back {
                        self.current_screen = AppScreen::Main;
                        self.review_session = None;
                        reload_decks = true;
                    }
                }
            }
        });

        if reload_decks {
            self.reload_decks();
        }
    }

    /// Starts a review session with the cards due on the simulated day
    fn start_review_session(&mut self, deck_index: usize) {
        if let Some(deck) = self.all_decks.decks.get(deck_index) {
            if let Some(conn) = &self.conn {
                let conn_guard = conn.lock().unwrap();

                let cards = db::get_cards_for_deck(&deck.name, &conn_guard).unwrap_or_default();
                let now = db::get_current_date(&conn_guard).unwrap_or_else(|_| Local::now());

                drop(conn_guard);

                let due_cards: Vec<_> = leitner::select_due_cards(&cards, now)
                    .into_iter()
                    .cloned()
                    .collect();

                if !due_cards.is_empty() {
                    self.review_session = Some(ReviewSession::new_from_due_cards(
                        deck.name.clone(),
                        due_cards,
                        Arc::clone(self.conn.as_ref().unwrap()),
                    ));
                    self.current_screen = AppScreen::Review;
                }
            }
        }
    }

    /// Replaces the in-memory decks with the persisted state
    fn reload_decks(&mut self) {
        if let Some(conn) = &self.conn {
            let conn = conn.lock().unwrap();
            if let Ok(deck_set) = db::load_all_decks(&conn) {
                self.all_decks = deck_set;
            }
        }
    }

    /// Deletes a card from the database and the in-memory deck
    fn handle_delete_card(&mut self, deck_index: usize, card_id: &str) {
        if let Some(conn) = &self.conn {
            let conn = conn.lock().unwrap();
            if db::delete_card(card_id, &conn).is_err() {
                return;
            }
        }
        if let Some(deck) = self.all_decks.decks.get_mut(deck_index) {
            deck.cards.retain(|c| c.id != card_id);
        }
    }

    /// Resets the schedule of every card in the deck
    fn handle_reset_deck(&mut self, deck_index: usize) {
        if let Some(deck) = self.all_decks.decks.get_mut(deck_index) {
            if let Some(conn) = &self.conn {
                let conn = conn.lock().unwrap();
                if let Ok(reset_cards) = db::reset_deck(&deck.name, &conn) {
                    deck.cards = reset_cards;
                }
            }
        }
    }

    /// Handles deck export to JSON file
    fn handle_export(&mut self, deck_index: usize) {
        if let Some(deck) = self.all_decks.decks.get(deck_index) {
            // Open file save dialog
            if let Some(path) = rfd::FileDialog::new()
                .set_file_name(format!("{}.json", deck.name))
                .add_filter("JSON files", &["json"])
                .save_file()
            {
                match export_json_to_path(deck, path.to_str().unwrap()) {
                    Ok(_) => {
                        self.import_result_message =
                            format!("Deck '{}' exported successfully!", deck.name);
                        self.show_import_result_dialog = true;
                    }
                    Err(e) => {
                        self.import_result_message = format!("Export failed: {}", e);
                        self.show_import_result_dialog = true;
                    }
                }
            }
        }
        self.show_export_dialog = false;
    }

    /// Handles deck import from JSON file
    fn handle_import(&mut self) {
        // Open file selection dialog
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON files", &["json"])
            .pick_file()
        {
            match import_json(path.to_str().unwrap()) {
                Ok(deck) => {
                    // Check if deck with this name already exists
                    if self.all_decks.decks.iter().any(|d| d.name == deck.name) {
                        self.import_result_message = format!(
                            "Deck '{}' already exists! Please rename it in the JSON file.",
                            deck.name
                        );
                        self.show_import_result_dialog = true;
                        return;
                    }

                    // Add deck to database
                    if let Some(conn) = &self.conn {
                        let conn_guard = conn.lock().unwrap();

                        // Create deck
                        if let Err(e) = db::new_deck(&deck.name, &conn_guard) {
                            self.import_result_message = format!("Failed to create deck: {}", e);
                            self.show_import_result_dialog = true;
                            return;
                        }

                        // Add cards with their exported schedule intact
                        for card in &deck.cards {
                            let stored =
                                db::add_card(&deck.name, &card.question, &card.answer, &conn_guard);
                            let restored = stored.and_then(|stored| {
                                let mut card = card.clone();
                                card.id = stored.id;
                                db::update_card(&card, &conn_guard)
                            });
                            if let Err(e) = restored {
                                self.import_result_message = format!(
                                    "Failed to import card '{}': {}",
                                    card.question, e
                                );
                                self.show_import_result_dialog = true;
                                return;
                            }
                        }

                        drop(conn_guard);
                    }

                    self.import_result_message = format!(
                        "Deck '{}' imported successfully with {} cards!",
                        deck.name,
                        deck.cards.len()
                    );
                    self.show_import_result_dialog = true;

                    // Pull the stored rows so in-memory ids match the database
                    self.reload_decks();
                }
                Err(e) => {
                    self.import_result_message = format!(
                        "Import failed: {}\n\nPlease check if the file has correct structure:\n{{\n  \"name\": \"Deck Name\",\n  \"cards\": [...]\n}}",
                        e
                    );
                    self.show_import_result_dialog = true;
                }
            }
        }
    }
}
