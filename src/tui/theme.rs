use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    pub header_style: Style,
    pub input_style: Style,
    pub suggestion_style: Style,
    pub suggestion_selected_style: Style,
    pub error_style: Style,
    pub result_style: Style,
    pub footer_style: Style,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            header_style: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            input_style: Style::default().fg(Color::White),
            suggestion_style: Style::default().fg(Color::Gray),
            suggestion_selected_style: Style::default().bg(Color::DarkGray).fg(Color::White),
            error_style: Style::default().fg(Color::Red),
            result_style: Style::default().fg(Color::Green),
            footer_style: Style::default().fg(Color::Cyan),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
