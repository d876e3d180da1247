use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tracing::debug;

use super::theme::Theme;
use crate::api::SearchResultSet;
use crate::search::{
    Applied, ChannelSink, Phase, SearchBackend, SearchEvent, SearchInputController,
};

/// Interactive state around the controller: the suggestion highlight, the
/// last delivered results and the spinner.
pub struct SearchApp<B: SearchBackend> {
    pub controller: SearchInputController<B, ChannelSink>,
    results_rx: mpsc::UnboundedReceiver<SearchResultSet>,
    results: Option<SearchResultSet>,
    selected: Option<usize>,
    spinner_state: usize,
    quit: bool,
    pub(crate) theme: Theme,
}

impl<B: SearchBackend> SearchApp<B> {
    pub fn new(
        controller: SearchInputController<B, ChannelSink>,
        results_rx: mpsc::UnboundedReceiver<SearchResultSet>,
    ) -> Self {
        Self {
            controller,
            results_rx,
            results: None,
            selected: None,
            spinner_state: 0,
            quit: false,
            theme: Theme::default(),
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// `None` until the first successful search.
    pub fn results(&self) -> Option<&SearchResultSet> {
        self.results.as_ref()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn handle_key(&mut self, k: KeyEvent) {
        let ctrl = k.modifiers.contains(KeyModifiers::CONTROL);
        match k.code {
            KeyCode::Char('c') if ctrl => self.quit = true,
            KeyCode::Char('r') if ctrl => {
                debug!("retry requested");
                self.controller.retry();
                self.selected = None;
            }
            KeyCode::Char(c) if !ctrl => {
                let mut text = self.controller.text().to_string();
                text.push(c);
                self.edit(text);
            }
            KeyCode::Backspace => {
                let mut text = self.controller.text().to_string();
                if text.pop().is_some() {
                    self.edit(text);
                }
            }
            KeyCode::Down => self.move_selection(1),
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Enter => {
                let picked = self
                    .selected
                    .and_then(|i| self.controller.suggestions().get(i).cloned());
                match picked {
                    Some(s) => self.controller.select_suggestion(s),
                    None => self.controller.submit_current(),
                };
                self.selected = None;
            }
            KeyCode::Esc => {
                if self.controller.phase().error_message().is_some() {
                    self.controller.dismiss_error();
                } else if self.selected.is_some() {
                    self.selected = None;
                } else {
                    self.quit = true;
                }
            }
            _ => {}
        }
    }

    fn edit(&mut self, text: String) {
        self.selected = None;
        self.controller.set_query_text(text);
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.controller.suggestions().len();
        if len == 0 {
            self.selected = None;
            return;
        }
        let next = match self.selected {
            None if delta > 0 => 0,
            None => len - 1,
            Some(i) => (i as isize + delta).rem_euclid(len as isize) as usize,
        };
        self.selected = Some(next);
    }

    pub fn on_search_event(&mut self, ev: SearchEvent) {
        match self.controller.apply(ev) {
            Applied::Delivered => self.drain_results(),
            Applied::Updated => {
                // a new suggestion list invalidates the highlight
                if self
                    .selected
                    .is_some_and(|i| i >= self.controller.suggestions().len())
                {
                    self.selected = None;
                }
            }
            Applied::Stale | Applied::Ignored => {}
        }
    }

    fn drain_results(&mut self) {
        while let Ok(results) = self.results_rx.try_recv() {
            self.results = Some(results);
        }
    }

    pub fn on_tick(&mut self) {
        if self.controller.phase().is_busy() {
            self.spinner_state = self.spinner_state.wrapping_add(1);
        }
    }

    pub(crate) fn status_line(&self) -> String {
        const FRAMES: [&str; 4] = ["|", "/", "-", "\\"];
        let spin = FRAMES[self.spinner_state % FRAMES.len()];
        match self.controller.phase() {
            Phase::Idle => "ready".to_string(),
            Phase::FetchingSuggestions => format!("{spin} suggesting"),
            Phase::Submitting => format!("{spin} searching"),
            Phase::Error(_) => "error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::search::SearchTiming;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    struct FixedBackend;

    #[async_trait]
    impl SearchBackend for FixedBackend {
        async fn suggestions(&self, query: &str) -> Result<Vec<String>, ApiError> {
            Ok(vec![format!("{query} falls"), format!("{query} cave")])
        }

        async fn search(&self, query: &str) -> Result<SearchResultSet, ApiError> {
            Ok(vec![json!({ "name": query })])
        }
    }

    fn app() -> SearchApp<FixedBackend> {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller =
            SearchInputController::new(Arc::new(FixedBackend), ChannelSink(tx), SearchTiming::default());
        SearchApp::new(controller, rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn settle(app: &mut SearchApp<FixedBackend>) {
        tokio::time::sleep(Duration::from_secs(1)).await;
        while let Some(ev) = app.controller.try_next_event() {
            app.on_search_event(ev);
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn typing_then_arrow_enter_selects_suggestion() {
        let mut app = app();
        for c in "sea".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(app.controller.text(), "sea");
        settle(&mut app).await;
        assert_eq!(app.controller.suggestions(), ["sea falls", "sea cave"]);

        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.selected(), Some(1));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.controller.text(), "sea cave");
        assert!(app.controller.suggestions().is_empty());

        settle(&mut app).await;
        assert_eq!(app.results(), Some(&vec![json!({"name": "sea cave"})]));
        assert_eq!(app.status_line(), "ready");
    }

    #[tokio::test(start_paused = true)]
    async fn backspace_and_escape() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('a')));
        app.handle_key(key(KeyCode::Char('b')));
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.controller.text(), "a");
        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit());
    }

    #[tokio::test(start_paused = true)]
    async fn up_wraps_to_last_suggestion() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('x')));
        settle(&mut app).await;
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.selected(), Some(1));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.selected(), Some(0));
    }

    #[tokio::test]
    async fn ctrl_c_quits() {
        let mut app = app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit());
        assert_eq!(app.controller.text(), "");
    }
}
