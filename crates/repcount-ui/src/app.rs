//! Application state and TUI event loop for repcount.
//!
//! [`App`] owns the theme and view mode. Every view is static: it draws the
//! data it was given on each tick until the user quits.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};

use repcount_core::chart::{ChartRenderer, CumulativeSeries, StackedBarChart};
use repcount_core::error::Result;

use crate::chart_view;
use crate::report_view::{self, ReportViewData};
use crate::table_view::{self, SetRow, SetTotals};
use crate::themes::Theme;

// ── ViewMode ──────────────────────────────────────────────────────────────────

/// Which view the TUI is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Statistics and projection report.
    Report,
    /// Cleaned sets of the month.
    Sets,
    /// Per-day stacked bar chart.
    Chart,
    /// Running totals across months.
    Cumulative,
}

impl ViewMode {
    pub fn name(&self) -> &'static str {
        match self {
            ViewMode::Report => "report",
            ViewMode::Sets => "sets",
            ViewMode::Chart => "chart",
            ViewMode::Cumulative => "cumulative",
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the repcount TUI.
pub struct App {
    pub theme: Theme,
    pub view_mode: ViewMode,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    pub fn new(theme_name: &str, view_mode: ViewMode) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            view_mode,
            should_quit: false,
        }
    }

    /// Update state for one key press. Quits on `q`, `Q`, `Esc` or `Ctrl+C`.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    // ── Public event loops ────────────────────────────────────────────────────

    /// Show the statistics / projection report.
    pub fn run_report(&mut self, data: &ReportViewData) -> io::Result<()> {
        self.view_mode = ViewMode::Report;
        self.run_static(|app, frame| {
            let area = frame.area();
            if data.summary.is_none() && data.projection.is_none() {
                report_view::render_no_data(frame, area, "Nothing to report", &app.theme);
            } else {
                report_view::render_report_view(frame, area, data, &app.theme);
            }
        })
    }

    /// Show the sets table.
    pub fn run_table(
        &mut self,
        title: &str,
        rows: &[SetRow],
        totals: &SetTotals,
    ) -> io::Result<()> {
        self.view_mode = ViewMode::Sets;
        self.run_static(|app, frame| {
            let area = frame.area();
            if rows.is_empty() {
                table_view::render_no_data(frame, area, &app.theme);
            } else {
                table_view::render_table_view(frame, area, title, rows, totals, &app.theme);
            }
        })
    }

    /// Show the per-day stacked bar chart.
    pub fn run_chart(&mut self, chart: &StackedBarChart) -> io::Result<()> {
        self.view_mode = ViewMode::Chart;
        self.run_static(|app, frame| {
            let area = frame.area();
            chart_view::render_stacked_chart(frame, area, chart, &app.theme);
        })
    }

    /// Show the cumulative chart.
    pub fn run_cumulative(&mut self, title: &str, series: &[CumulativeSeries]) -> io::Result<()> {
        self.view_mode = ViewMode::Cumulative;
        self.run_static(|app, frame| {
            let area = frame.area();
            chart_view::render_cumulative_chart(frame, area, title, series, &app.theme);
        })
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    /// Enter the alternate screen, redraw with `draw` every 250 ms until the
    /// user quits, then restore the terminal.
    fn run_static<F>(&mut self, draw: F) -> io::Result<()>
    where
        F: Fn(&App, &mut Frame),
    {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);
        self.should_quit = false;

        let result = loop {
            if let Err(e) = terminal.draw(|frame| draw(self, frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => self.handle_key(key),
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }
}

/// Interactive terminal chart output.
impl ChartRenderer for App {
    fn render_stacked_bar(&mut self, chart: &StackedBarChart) -> Result<()> {
        Ok(self.run_chart(chart)?)
    }

    fn render_cumulative(&mut self, title: &str, series: &[CumulativeSeries]) -> Result<()> {
        Ok(self.run_cumulative(title, series)?)
    }
}

/// The terminal implementation of [`ChartRenderer`].
pub type TerminalChartRenderer = App;

// ── Tests ─────────────────────────────────────────────────────────────────────
