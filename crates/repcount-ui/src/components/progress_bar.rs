use crate::themes::Theme;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use repcount_core::formatting::{format_count, percentage};

/// Configuration controlling visual appearance of a progress bar.
pub struct ProgressBarConfig {
    /// Width in terminal columns of the bar portion (excluding label).
    pub width: u16,
    pub filled_char: char,
    pub empty_char: char,
}

impl Default for ProgressBarConfig {
    fn default() -> Self {
        Self {
            width: 50,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
        }
    }
}

/// Filled, empty and label spans for a bar at `pct` percent.
fn bar_spans<'a>(
    pct: f64,
    config: &ProgressBarConfig,
    fill: Style,
    theme: &Theme,
    label: String,
) -> Line<'a> {
    let filled = ((pct.clamp(0.0, 100.0) / 100.0) * f64::from(config.width)) as u16;
    let empty = config.width.saturating_sub(filled);

    let filled_str: String = config.filled_char.to_string().repeat(filled as usize);
    let empty_str: String = config.empty_char.to_string().repeat(empty as usize);

    Line::from(vec![
        Span::styled(filled_str, fill),
        Span::styled(empty_str, theme.progress_empty),
        Span::styled(label, theme.progress_label),
    ])
}

// ── GoalProgressBar ──────────────────────────────────────────────────────────

/// Month-to-date total relative to the monthly goal.
///
/// The fill colour compares goal progress with how much of the month has
/// passed, so a half-full bar on day 20 of 30 reads as behind pace.
pub struct GoalProgressBar<'a> {
    /// Percentage of the goal reached, clamped to `[0.0, 100.0]`.
    pub percentage: f64,
    pub current: u64,
    pub goal: u64,
    /// Percentage of the month already elapsed.
    pub elapsed_percentage: f64,
    pub theme: &'a Theme,
    pub config: ProgressBarConfig,
}

impl<'a> GoalProgressBar<'a> {
    pub fn new(current: u64, goal: u64, elapsed_percentage: f64, theme: &'a Theme) -> Self {
        let percentage = percentage(current as f64, goal as f64).min(100.0);
        Self {
            percentage,
            current,
            goal,
            elapsed_percentage,
            theme,
            config: ProgressBarConfig::default(),
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let fill = self
            .theme
            .pace_style(self.percentage, self.elapsed_percentage);
        let label = format!(
            " {:.1}% ({}/{})",
            self.percentage,
            format_count(self.current),
            format_count(self.goal),
        );
        bar_spans(self.percentage, &self.config, fill, self.theme, label)
    }
}

// ── MonthProgressBar ─────────────────────────────────────────────────────────

/// Days of the month already done, counting the as-of day.
pub struct MonthProgressBar<'a> {
    pub day: u32,
    pub days_in_month: u32,
    pub theme: &'a Theme,
    pub config: ProgressBarConfig,
}

impl<'a> MonthProgressBar<'a> {
    pub fn new(day: u32, days_in_month: u32, theme: &'a Theme) -> Self {
        Self {
            day,
            days_in_month,
            theme,
            config: ProgressBarConfig::default(),
        }
    }

    pub fn percentage(&self) -> f64 {
        percentage(f64::from(self.day), f64::from(self.days_in_month)).min(100.0)
    }

    pub fn to_line(&self) -> Line<'a> {
        let remaining = self.days_in_month.saturating_sub(self.day);
        let label = format!(
            " day {} of {} ({} left)",
            self.day, self.days_in_month, remaining
        );
        bar_spans(
            self.percentage(),
            &self.config,
            self.theme.info,
            self.theme,
            label,
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
