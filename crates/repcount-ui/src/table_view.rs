//! Sets table for one month.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per logged set
//! plus a highlighted totals row at the bottom.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use repcount_core::formatting::format_count;
use repcount_core::models::{ExerciseSet, MonthTable};

use crate::themes::Theme;

const LOCATION_WIDTH: u16 = 16;
const EXERCISE_WIDTH: u16 = 16;

/// One display row of the sets table.
#[derive(Debug, Clone, PartialEq)]
pub struct SetRow {
    pub date: String,
    /// `HH:MM`, empty when the set has no time.
    pub time: String,
    pub location: String,
    pub exercise: String,
    pub count: u32,
}

impl From<&ExerciseSet> for SetRow {
    fn from(set: &ExerciseSet) -> Self {
        Self {
            date: set.date.format("%Y-%m-%d").to_string(),
            time: set
                .time
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_default(),
            location: set.location.clone(),
            exercise: set.exercise.clone(),
            count: set.count,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetTotals {
    pub sets: usize,
    pub days: usize,
    pub count: u64,
}

/// Rows for `table`, restricted to `exercise` when one is given.
pub fn set_rows(table: &MonthTable, exercise: Option<&str>) -> (Vec<SetRow>, SetTotals) {
    let sets: Vec<&ExerciseSet> = match exercise {
        Some(name) => table.for_exercise(name).collect(),
        None => table.sets.iter().collect(),
    };
    let mut days: Vec<_> = sets.iter().map(|s| s.date).collect();
    days.dedup();
    let totals = SetTotals {
        sets: sets.len(),
        days: days.len(),
        count: sets.iter().map(|s| u64::from(s.count)).sum(),
    };
    (sets.into_iter().map(SetRow::from).collect(), totals)
}

/// Cut `text` to at most `width` terminal columns, ending in `…` when cut.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Render the sets table into `area`.
pub fn render_table_view(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: &[SetRow],
    totals: &SetTotals,
    theme: &Theme,
) {
    let header_cells = ["Date", "Time", "Location", "Exercise", "Count"]
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let data_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(vec![
                Cell::from(row.date.clone()),
                Cell::from(row.time.clone()),
                Cell::from(truncate_to_width(&row.location, LOCATION_WIDTH as usize)),
                Cell::from(truncate_to_width(&row.exercise, EXERCISE_WIDTH as usize)),
                Cell::from(format_count(u64::from(row.count))),
            ])
            .style(style)
        })
        .collect();

    let total_row = Row::new(vec![
        Cell::from("TOTAL").style(theme.table_total),
        Cell::from(""),
        Cell::from(format!("{} days", totals.days)),
        Cell::from(format!("{} sets", totals.sets)),
        Cell::from(format_count(totals.count)),
    ])
    .style(theme.table_total);

    let mut all_rows = data_rows;
    all_rows.push(total_row);

    let widths = [
        Constraint::Length(12),
        Constraint::Length(7),
        Constraint::Length(LOCATION_WIDTH),
        Constraint::Length(EXERCISE_WIDTH),
        Constraint::Length(8),
    ];

    let table = Table::new(all_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" {} ", title)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Placeholder when the month has no sets to list.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No sets found", theme.warning)),
        Line::from(""),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(" Sets ")),
        area,
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use repcount_core::models::MonthLabel;

    fn table() -> MonthTable {
        let set = |day: u32, time: Option<(u32, u32)>, exercise: &str, count: u32| ExerciseSet {
            location: "home".to_string(),
            exercise: exercise.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 11, day).unwrap(),
            time: time.and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0)),
            count,
        };
        MonthTable::new(
            MonthLabel::new(2024, 11).unwrap(),
            vec![
                set(1, Some((7, 5)), "pushups", 20),
                set(1, Some((7, 30)), "dips", 8),
                set(1, None, "pushups", 10),
                set(3, Some((18, 0)), "pushups", 25),
            ],
        )
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_set_rows_filters_exercise() {
        let (rows, totals) = set_rows(&table(), Some("pushups"));
        assert_eq!(rows.len(), 3);
        assert_eq!(totals.sets, 3);
        assert_eq!(totals.days, 2);
        assert_eq!(totals.count, 55);
        assert_eq!(rows[0].time, "07:05");
        assert_eq!(rows[1].time, "");
    }

    #[test]
    fn test_set_rows_all_exercises() {
        let (rows, totals) = set_rows(&table(), None);
        assert_eq!(rows.len(), 4);
        assert_eq!(totals.count, 63);
        assert_eq!(rows[1].exercise, "dips");
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("home", 16), "home");
        assert_eq!(truncate_to_width("the climbing gym", 16), "the climbing gym");
        assert_eq!(truncate_to_width("outdoor calisthenics park", 10), "outdoor c…");
        assert!(truncate_to_width("公園のジムで練習", 6).width() <= 6);
    }

    #[test]
    fn test_render_table_view_does_not_panic() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let (rows, totals) = set_rows(&table(), Some("pushups"));

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_table_view(frame, area, "Pushups 2024-November", &rows, &totals, &theme);
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Pushups 2024-November"));
        assert!(text.contains("2024-11-03"));
        assert!(text.contains("TOTAL"));
        assert!(text.contains("3 sets"));
    }

    #[test]
    fn test_render_table_view_empty_rows() {
        let backend = TestBackend::new(80, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::light();
        let totals = SetTotals {
            sets: 0,
            days: 0,
            count: 0,
        };

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_table_view(frame, area, "Sets", &[], &totals, &theme);
            })
            .unwrap();
        assert!(buffer_text(&terminal).contains("TOTAL"));
    }

    #[test]
    fn test_render_no_data_does_not_panic() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_no_data(frame, area, &theme);
            })
            .unwrap();
        assert!(buffer_text(&terminal).contains("No sets found"));
    }
}
