//! Statistics and projection screen.
//!
//! Renders the same blocks as the plain-text reports, with the goal and
//! month progress bars under the projection.

use chrono::Datelike;
use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use repcount_core::models::{MonthLabel, ProjectionResult, StatSummary};
use repcount_core::report;

use crate::components::header::Header;
use crate::components::progress_bar::{GoalProgressBar, MonthProgressBar};
use crate::themes::Theme;

/// Everything the report screen shows.
pub struct ReportViewData {
    pub exercise: String,
    pub month: MonthLabel,
    pub view: String,
    pub summary: Option<StatSummary>,
    pub projection: Option<ProjectionResult>,
    /// Rows skipped while cleaning the sheet.
    pub skipped_rows: usize,
}

/// Style one report line: headers and rules stand out, `label: value` pairs
/// split into two spans.
fn styled_report_line<'a>(line: String, index: usize, theme: &Theme) -> Line<'a> {
    match index {
        0 => Line::from(Span::styled(line, theme.bold)),
        1 => Line::from(Span::styled(line, theme.separator)),
        _ => match line.split_once(": ") {
            Some((label, value)) => Line::from(vec![
                Span::styled(format!("{}: ", label), theme.label),
                Span::styled(value.to_string(), theme.value),
            ]),
            None => Line::from(Span::styled(line, theme.label)),
        },
    }
}

/// Build all lines of the report screen.
pub fn report_lines<'a>(
    data: &'a ReportViewData,
    month_name: &'a str,
    theme: &'a Theme,
) -> Vec<Line<'a>> {
    let mut lines = Header::new(&data.exercise, month_name, &data.view, theme).to_lines();

    if let Some(summary) = &data.summary {
        lines.extend(
            report::statistics_lines(summary, data.month)
                .into_iter()
                .enumerate()
                .map(|(i, l)| styled_report_line(l, i, theme)),
        );
        lines.push(Line::from(""));
    }

    if let Some(projection) = &data.projection {
        lines.extend(
            report::projection_lines(projection)
                .into_iter()
                .enumerate()
                .map(|(i, l)| styled_report_line(l, i, theme)),
        );
        lines.push(Line::from(""));

        let month_bar = MonthProgressBar::new(
            projection.as_of.day(),
            projection.month.days_in_month(),
            theme,
        );
        let goal_bar = GoalProgressBar::new(
            projection.current_total,
            projection.goal,
            month_bar.percentage(),
            theme,
        );
        lines.push(Line::from(Span::styled("Goal:", theme.label)));
        lines.push(goal_bar.to_line());
        lines.push(Line::from(Span::styled("Month:", theme.label)));
        lines.push(month_bar.to_line());
        lines.push(Line::from(""));
    }

    if data.skipped_rows > 0 {
        lines.push(Line::from(Span::styled(
            format!(
                "{} row(s) skipped while reading the sheet; see the log for details",
                data.skipped_rows
            ),
            theme.warning,
        )));
    }
    lines.push(Line::from(Span::styled("Press 'q' to exit", theme.dim)));
    lines
}

/// Render the report screen into `area`.
pub fn render_report_view(frame: &mut Frame, area: Rect, data: &ReportViewData, theme: &Theme) {
    let month_name = data.month.to_string();
    let lines = report_lines(data, &month_name, theme);
    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" repcount "))
        .wrap(Wrap { trim: false })
        .style(theme.text);
    frame.render_widget(paragraph, area);
}

/// Placeholder shown when the month has no sets of the exercise.
pub fn render_no_data(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Check the exercise name and month, or log a set first.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text))
            .block(Block::default().borders(Borders::ALL).title(" repcount ")),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use repcount_core::calculations::{ProjectionCalculator, StatisticsCalculator};
    use repcount_core::models::{DateRange, ExerciseSet, MonthTable};

    fn table() -> MonthTable {
        let set = |day: u32, count: u32| ExerciseSet {
            location: "home".to_string(),
            exercise: "pushups".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 11, day).unwrap(),
            time: None,
            count,
        };
        MonthTable::new(
            MonthLabel::new(2024, 11).unwrap(),
            vec![set(1, 20), set(1, 10), set(3, 25)],
        )
    }

    fn data(with_projection: bool) -> ReportViewData {
        let t = table();
        let as_of = NaiveDate::from_ymd_opt(2024, 11, 10).unwrap();
        ReportViewData {
            exercise: "pushups".to_string(),
            month: t.month,
            view: "stats".to_string(),
            summary: Some(StatisticsCalculator::statistics(
                &t,
                "pushups",
                DateRange::month(t.month),
            )),
            projection: with_projection
                .then(|| ProjectionCalculator::project(&t, "pushups", 300, as_of).unwrap()),
            skipped_rows: 2,
        }
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
    fn test_report_lines_include_both_blocks() {
        let theme = Theme::dark();
        let d = data(true);
        let lines = report_lines(&d, "2024-November", &theme);
        let text: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert!(text.iter().any(|l| l == "PUSHUPS FOR 11/2024"));
        assert!(text.iter().any(|l| l == "So far this month: 55"));
        assert!(text.iter().any(|l| l.contains("day 10 of 30")));
        assert!(text.iter().any(|l| l.contains("2 row(s) skipped")));
    }

    #[test]
    fn test_styled_report_line_splits_label_and_value() {
        let theme = Theme::dark();
        let line = styled_report_line("Total: 55".to_string(), 2, &theme);
        assert_eq!(line.spans.len(), 2);
        assert_eq!(line.spans[0].content, "Total: ");
        assert_eq!(line.spans[1].content, "55");
    }

    #[test]
    fn test_render_report_view_draws_statistics() {
        let backend = TestBackend::new(100, 50);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let d = data(true);

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_report_view(frame, area, &d, &theme);
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("REPCOUNT"));
        assert!(text.contains("Total: 55"));
        assert!(text.contains("To reach 300 by 11/30:"));
    }

    #[test]
    fn test_render_report_view_without_projection() {
        let backend = TestBackend::new(80, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::light();
        let d = data(false);

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_report_view(frame, area, &d, &theme);
            })
            .unwrap();
        assert!(!buffer_text(&terminal).contains("To reach"));
    }

    #[test]
    fn test_render_no_data_does_not_panic() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_no_data(frame, area, "No pushups sets recorded", &theme);
            })
            .unwrap();
        assert!(buffer_text(&terminal).contains("No pushups sets recorded"));
    }
}
