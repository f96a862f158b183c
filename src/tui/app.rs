//! Application state and event loop.
//!
//! All state transitions happen on the loop thread: key events mutate the
//! input, Enter starts a search, and worker outcomes arrive over an mpsc
//! channel. Each submission spawns one worker thread that performs the HTTP
//! call and always sends exactly one terminal message, so the Loading state
//! clears on every outcome. A generation counter ties each outcome to the
//! submission that spawned it; outcomes from superseded submissions are
//! discarded.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;

use crate::client::{CollectionInfo, ResultSet, SearchClient, N_RESULTS};
use crate::error::SearchError;
use crate::tui::input::InputState;
use crate::tui::ui;

/// Messages from background threads
pub enum BgMessage {
    SearchFinished {
        generation: u64,
        outcome: std::result::Result<ResultSet, SearchError>,
    },
    InfoLoaded(CollectionInfo),
}

/// Lifecycle of the most recent search submission.
///
/// Exactly one variant is active at a time, so a stale result can never
/// render next to a fresh error.
#[derive(Debug, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Success(ResultSet),
    Failed(String),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }
}

pub struct App {
    pub input: InputState,
    pub request: RequestState,
    pub status_message: String,

    client: SearchClient,
    generation: u64,
    bg_sender: Sender<BgMessage>,
    bg_receiver: Receiver<BgMessage>,

    pub should_quit: bool,
}

impl App {
    pub fn new(client: SearchClient) -> Self {
        let (tx, rx) = channel();

        let app = Self {
            input: InputState::default(),
            request: RequestState::Idle,
            status_message: "Ready".to_string(),
            client,
            generation: 0,
            bg_sender: tx,
            bg_receiver: rx,
            should_quit: false,
        };

        app.fetch_collection_info();
        app
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> crate::Result<()>
    where
        crate::error::ChromaFindError: From<B::Error>,
    {
        let tick_rate = Duration::from_millis(50);
        let mut last_tick = Instant::now();

        loop {
            terminal.draw(|frame| ui::draw(frame, self))?;

            let timeout = tick_rate.saturating_sub(last_tick.elapsed());
            if event::poll(timeout).unwrap_or(false) {
                if let Ok(Event::Key(key)) = event::read() {
                    self.handle_key(key);
                }
            }

            if last_tick.elapsed() >= tick_rate {
                self.process_messages();
                last_tick = Instant::now();
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }

    /// Non-fatal startup fetch of collection statistics for the status bar
    fn fetch_collection_info(&self) {
        let client = self.client.clone();
        let tx = self.bg_sender.clone();

        thread::spawn(move || {
            if let Ok(info) = client.info() {
                let _ = tx.send(BgMessage::InfoLoaded(info));
            }
        });
    }

    /// Start a search for the current query.
    ///
    /// Ignored while a request is in flight or when the trimmed query is
    /// empty. A new submission fully replaces the previous outcome.
    pub fn submit(&mut self) {
        if self.request.is_loading() {
            return;
        }

        let query = self.input.query.trim().to_string();
        if query.is_empty() {
            return;
        }

        self.request = RequestState::Loading;
        self.generation += 1;
        let generation = self.generation;

        tracing::info!(%query, generation, "submitting search");

        let client = self.client.clone();
        let tx = self.bg_sender.clone();

        thread::spawn(move || {
            let outcome = client.search(&query, N_RESULTS);
            let _ = tx.send(BgMessage::SearchFinished {
                generation,
                outcome,
            });
        });
    }

    /// Drain worker messages and apply them to the state machine
    pub fn process_messages(&mut self) {
        while let Ok(msg) = self.bg_receiver.try_recv() {
            match msg {
                BgMessage::SearchFinished {
                    generation,
                    outcome,
                } => {
                    if generation != self.generation {
                        tracing::debug!(
                            generation,
                            current = self.generation,
                            "discarding stale search outcome"
                        );
                        continue;
                    }

                    self.request = match outcome {
                        Ok(results) => {
                            tracing::debug!(hits = results.len(), "search succeeded");
                            RequestState::Success(results)
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "search failed");
                            RequestState::Failed(err.to_string())
                        }
                    };
                }
                BgMessage::InfoLoaded(info) => {
                    self.status_message = format!(
                        "{} contacts indexed in '{}'",
                        info.document_count, info.collection_name
                    );
                }
            }
        }
    }

    // --- Key handling ---

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Esc => {
                if !self.input.query.is_empty() {
                    self.input.clear();
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.insert(c);
            }
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete(),
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{client_for, dead_url, stub_server};

    fn type_query(app: &mut App, text: &str) {
        for c in text.chars() {
            app.input.insert(c);
        }
    }

    /// Pump the message loop until the request leaves Loading
    fn wait_for_outcome(app: &mut App) {
        for _ in 0..200 {
            app.process_messages();
            if !app.request.is_loading() {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("request never left Loading");
    }

    #[test]
    fn empty_query_submit_is_a_noop() {
        let mut app = App::new(client_for(dead_url()));
        app.submit();
        assert!(matches!(app.request, RequestState::Idle));
        assert_eq!(app.generation, 0);

        type_query(&mut app, "   \t ");
        app.submit();
        assert!(matches!(app.request, RequestState::Idle));
        assert_eq!(app.generation, 0);
    }

    #[test]
    fn successful_search_reaches_success() {
        let base = stub_server(
            r#"{
                "status": "success",
                "results": {
                    "documents": [["note one", "note two"]],
                    "metadatas": [[{"first_name": "A", "last_name": "B", "company": "C", "email": "a@b.c", "phone": "1"},
                                   {"first_name": "D", "last_name": "E", "company": "F", "email": "d@e.f", "phone": "2"}]],
                    "distances": [[0.1, 0.4]]
                }
            }"#,
        );
        let mut app = App::new(client_for(base));
        type_query(&mut app, "acme");
        app.submit();
        assert!(app.request.is_loading());

        wait_for_outcome(&mut app);
        match &app.request {
            RequestState::Success(results) => assert_eq!(results.len(), 2),
            other => panic!("expected success, got {:?}", other),
        }
        // the query survives the search
        assert_eq!(app.input.query, "acme");
    }

    #[test]
    fn service_failure_reaches_failed_with_message() {
        let base = stub_server(r#"{"status": "error", "message": "index rebuilding"}"#);
        let mut app = App::new(client_for(base));
        type_query(&mut app, "acme");
        app.submit();

        wait_for_outcome(&mut app);
        match &app.request {
            RequestState::Failed(message) => assert_eq!(message, "index rebuilding"),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn unreachable_backend_reaches_failed_with_connectivity_message() {
        let mut app = App::new(client_for(dead_url()));
        type_query(&mut app, "acme");
        app.submit();

        wait_for_outcome(&mut app);
        match &app.request {
            RequestState::Failed(message) => {
                assert!(message.contains("Failed to connect to backend"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!app.request.is_loading());
    }

    #[test]
    fn submit_is_gated_while_loading() {
        let mut app = App::new(client_for(dead_url()));
        type_query(&mut app, "acme");
        app.submit();
        assert_eq!(app.generation, 1);

        // second Enter while the first request is still in flight
        app.submit();
        assert_eq!(app.generation, 1);

        wait_for_outcome(&mut app);
    }

    #[test]
    fn stale_outcome_is_discarded() {
        let mut app = App::new(client_for(dead_url()));
        app.generation = 3;

        app.bg_sender
            .send(BgMessage::SearchFinished {
                generation: 2,
                outcome: Err(SearchError::Service("stale".to_string())),
            })
            .expect("send stale outcome");

        app.process_messages();
        assert!(matches!(app.request, RequestState::Idle));
    }

    #[test]
    fn collection_info_updates_status_line() {
        let base = stub_server(
            r#"{"collection_name": "welcome_collection", "document_count": 7, "chroma_version": "0.5.0"}"#,
        );
        let mut app = App::new(client_for(base));

        for _ in 0..200 {
            app.process_messages();
            if app.status_message != "Ready" {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(app.status_message, "7 contacts indexed in 'welcome_collection'");
    }

    #[test]
    fn keystrokes_keep_editing_while_loading() {
        let mut app = App::new(client_for(dead_url()));
        type_query(&mut app, "acme");
        app.submit();
        assert!(app.request.is_loading());

        app.handle_key(KeyEvent::new(KeyCode::Char('!'), KeyModifiers::NONE));
        assert_eq!(app.input.query, "acme!");

        wait_for_outcome(&mut app);
    }
}
