use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Decoration placed either side of the application title.
pub const ORNAMENT: &str = "✦ ✧";

/// Header rendering four lines:
///
/// 1. Application title with ornaments.
/// 2. A 60-column `=` separator.
/// 3. `[ exercise | month | view ]`.
/// 4. An empty line.
pub struct Header<'a> {
    pub exercise: &'a str,
    /// Month label, e.g. `"2024-November"`.
    pub month: &'a str,
    pub view: &'a str,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(exercise: &'a str, month: &'a str, view: &'a str, theme: &'a Theme) -> Self {
        Self {
            exercise,
            month,
            view,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);

        vec![
            Line::from(vec![
                Span::styled(ORNAMENT, self.theme.header_accent),
                Span::styled(" REPCOUNT ", self.theme.header),
                Span::styled(ORNAMENT, self.theme.header_accent),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.exercise.to_lowercase(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.month, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.view, self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
