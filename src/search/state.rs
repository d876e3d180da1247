use std::fmt;

/// Version stamp of the query text. Advanced on every text change and on
/// every submission; a suggestion response is only applied while the
/// generation it was issued for is still current.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    FetchingSuggestions,
    Submitting,
    Error(String),
}

impl Phase {
    pub fn is_busy(&self) -> bool {
        matches!(self, Phase::FetchingSuggestions | Phase::Submitting)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Phase::Error(msg) => Some(msg.as_str()),
            _ => None,
        }
    }
}

/// Whitespace-only text counts as empty.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// The single mutable unit behind the search box: text, suggestions, phase.
#[derive(Debug, Default)]
pub struct QueryState {
    text: String,
    generation: Generation,
    suggestions: Vec<String>,
    phase: Phase,
}

impl QueryState {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
    }

    /// Records new text and returns the generation it belongs to.
    pub(crate) fn set_text(&mut self, text: impl Into<String>) -> Generation {
        self.text = text.into();
        self.advance()
    }

    /// Invalidates everything issued so far without changing the text.
    pub(crate) fn advance(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.generation
    }

    pub(crate) fn replace_suggestions(&mut self, suggestions: Vec<String>) {
        self.suggestions = suggestions;
    }

    pub(crate) fn clear_suggestions(&mut self) {
        self.suggestions.clear();
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_text_advances_generation() {
        let mut s = QueryState::default();
        let g0 = s.generation();
        let g1 = s.set_text("wa");
        let g2 = s.set_text("wat");
        assert!(g0 < g1 && g1 < g2);
        assert!(s.is_current(g2));
        assert!(!s.is_current(g1));
        assert_eq!(s.text(), "wat");
    }

    #[test]
    fn blank_detection() {
        assert!(is_blank(""));
        assert!(is_blank("   "));
        assert!(is_blank("\t\n"));
        assert!(!is_blank(" a "));
    }

    #[test]
    fn phase_helpers() {
        assert!(Phase::Submitting.is_busy());
        assert!(!Phase::Idle.is_busy());
        assert_eq!(Phase::Error("boom".into()).error_message(), Some("boom"));
        assert_eq!(Phase::Idle.error_message(), None);
    }
}
