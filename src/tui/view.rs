use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use super::app::SearchApp;
use crate::cli::record_label;
use crate::search::SearchBackend;

const PLACEHOLDER: &str = "Search for hidden spots, locations, or categories...";
const MAX_SUGGESTION_ROWS: u16 = 8;

impl<B: SearchBackend> SearchApp<B> {
    pub fn view(&self, f: &mut Frame) {
        let suggestions = self.controller.suggestions();
        let suggestion_rows = (suggestions.len() as u16).min(MAX_SUGGESTION_ROWS);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),                 // header
                Constraint::Length(3),                 // input
                Constraint::Length(suggestion_rows),   // dropdown
                Constraint::Length(1),                 // error line
                Constraint::Min(1),                    // results
                Constraint::Length(1),                 // footer
            ])
            .split(f.area());

        let header = Line::from(vec![
            Span::styled("waydown", self.theme.header_style),
            Span::raw("  "),
            Span::raw(self.status_line()),
        ]);
        f.render_widget(Paragraph::new(header), chunks[0]);

        let text = self.controller.text();
        let input = if text.is_empty() {
            Paragraph::new(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
        } else {
            Paragraph::new(Span::styled(text.to_string(), self.theme.input_style))
        };
        f.render_widget(
            input.block(Block::default().borders(Borders::ALL).title("Search")),
            chunks[1],
        );
        let cursor_x = chunks[1].x + 1 + unicode_width::UnicodeWidthStr::width(text) as u16;
        f.set_cursor_position((cursor_x.min(chunks[1].right().saturating_sub(2)), chunks[1].y + 1));

        if suggestion_rows > 0 {
            let items: Vec<ListItem> = suggestions
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let style = if self.selected() == Some(i) {
                        self.theme.suggestion_selected_style
                    } else {
                        self.theme.suggestion_style
                    };
                    ListItem::new(format!("  {s}")).style(style)
                })
                .collect();
            f.render_widget(List::new(items), chunks[2]);
        }

        if let Some(msg) = self.controller.phase().error_message() {
            let line = Line::from(vec![
                Span::styled(msg.to_string(), self.theme.error_style),
                Span::raw("  (Ctrl-R retry, Esc dismiss)"),
            ]);
            f.render_widget(Paragraph::new(line), chunks[3]);
        }

        let results: Vec<ListItem> = match self.results() {
            None => Vec::new(),
            Some(r) if r.is_empty() => vec![ListItem::new("No spots found.")],
            Some(r) => r
                .iter()
                .map(|rec| ListItem::new(record_label(rec)).style(self.theme.result_style))
                .collect(),
        };
        f.render_widget(
            List::new(results).block(Block::default().borders(Borders::TOP).title("Results")),
            chunks[4],
        );

        let footer = "Enter search · ↑/↓ pick suggestion · Ctrl-R retry · Esc dismiss/quit · Ctrl-C quit";
        f.render_widget(
            Paragraph::new(Span::styled(footer, self.theme.footer_style)),
            chunks[5],
        );
    }
}
