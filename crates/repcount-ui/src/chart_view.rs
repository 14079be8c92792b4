//! Terminal charts: per-day stacked bars and cumulative monthly totals.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use repcount_core::chart::{CumulativeSeries, StackedBarChart};
use repcount_core::formatting::format_count;

use crate::themes::Theme;

const BAR_SYMBOL: &str = "█";
const AXIS_SYMBOL: &str = "│";

/// Rows of a `height`-row plot filled by `value` when `max` fills all of it.
pub fn scaled_height(value: u64, max: u64, height: u16) -> u16 {
    if max == 0 {
        return 0;
    }
    ((value as f64 / max as f64) * f64::from(height)).round() as u16
}

/// Column width of each day slot and the bar drawn inside it.
///
/// Slots keep a one-column gap between bars when there is room for it.
pub fn slot_width(days: usize, plot_width: u16) -> (u16, u16) {
    if days == 0 {
        return (0, 0);
    }
    let slot = (plot_width as usize / days).max(1) as u16;
    let bar = if slot >= 2 { slot - 1 } else { 1 };
    (slot, bar)
}

/// Stacked bar widget: one slot per day, one coloured segment per set.
pub struct StackedBars<'a> {
    chart: &'a StackedBarChart,
    theme: &'a Theme,
}

impl<'a> StackedBars<'a> {
    pub fn new(chart: &'a StackedBarChart, theme: &'a Theme) -> Self {
        Self { chart, theme }
    }
}

impl Widget for StackedBars<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.table_border)
            .title(Span::styled(
                format!(" {} ", self.chart.title),
                self.theme.chart_title,
            ));
        let inner = block.inner(area);
        block.render(area, buf);

        let max = self.chart.max_total();
        let max_label = format_count(max);
        let label_width = max_label.width() as u16;
        if inner.height < 3 || inner.width <= label_width + 2 {
            return;
        }

        // Y axis: labels on the left, axis line, bars to its right.
        let plot = Rect {
            x: inner.x + label_width + 1,
            y: inner.y,
            width: inner.width - label_width - 1,
            height: inner.height - 1,
        };
        let days = self.chart.bars.len();
        if usize::from(plot.width) < days {
            let needed = days as u16 + label_width + 3;
            let message = format!("Too narrow for {} days: widen to {} columns", days, needed);
            buf.set_stringn(
                inner.x,
                inner.y,
                message,
                usize::from(inner.width),
                self.theme.warning,
            );
            return;
        }
        for y in plot.y..plot.bottom() {
            buf.set_string(plot.x - 1, y, AXIS_SYMBOL, self.theme.chart_axis);
        }
        buf.set_string(inner.x, plot.y, &max_label, self.theme.chart_axis);
        let zero = "0";
        buf.set_string(
            inner.x + label_width - 1,
            plot.bottom() - 1,
            zero,
            self.theme.chart_axis,
        );

        let (slot, bar) = slot_width(days, plot.width);
        let mut next_label_x = plot.x;
        for (i, day) in self.chart.bars.iter().enumerate() {
            let x = plot.x + slot * i as u16;

            let mut running = 0u64;
            let mut drawn = 0u16;
            for (s, count) in day.segments.iter().enumerate() {
                running += u64::from(*count);
                let top = scaled_height(running, max, plot.height);
                let style = Style::default().fg(self.theme.palette_color(s));
                for row in drawn..top {
                    let y = plot.bottom() - 1 - row;
                    for dx in 0..bar {
                        buf.set_string(x + dx, y, BAR_SYMBOL, style);
                    }
                }
                drawn = drawn.max(top);
            }

            // X axis: day 1 and every fifth day, where the label fits.
            let n = day.day();
            if (n == 1 || n % 5 == 0) && x >= next_label_x {
                let label = n.to_string();
                if x + label.len() as u16 <= plot.right() {
                    buf.set_string(x, plot.bottom(), &label, self.theme.chart_axis);
                    next_label_x = x + label.len() as u16 + 1;
                }
            }
        }
    }
}

/// Render the stacked bar chart into `area`.
pub fn render_stacked_chart(frame: &mut Frame, area: Rect, chart: &StackedBarChart, theme: &Theme) {
    frame.render_widget(StackedBars::new(chart, theme), area);
}

/// `(day, total)` points of every series as chart coordinates.
pub fn series_points(series: &[CumulativeSeries]) -> Vec<Vec<(f64, f64)>> {
    series
        .iter()
        .map(|s| {
            s.points
                .iter()
                .map(|(day, total)| (f64::from(*day), *total as f64))
                .collect()
        })
        .collect()
}

/// Render one line per month of running totals into `area`.
pub fn render_cumulative_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    series: &[CumulativeSeries],
    theme: &Theme,
) {
    let points = series_points(series);
    let datasets: Vec<Dataset> = series
        .iter()
        .zip(points.iter())
        .enumerate()
        .map(|(i, (s, data))| {
            Dataset::default()
                .name(s.month.to_string())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme.palette_color(i)))
                .data(data)
        })
        .collect();

    let y_max = series
        .iter()
        .map(CumulativeSeries::final_total)
        .max()
        .unwrap_or(0)
        .max(1);
    let x_max = series
        .iter()
        .map(|s| s.month.days_in_month())
        .max()
        .unwrap_or(31);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(Span::styled(format!(" {} ", title), theme.chart_title)),
        )
        .x_axis(
            Axis::default()
                .title("Day")
                .style(theme.chart_axis)
                .bounds([1.0, f64::from(x_max)])
                .labels(vec![
                    "1".to_string(),
                    (x_max / 2 + 1).to_string(),
                    x_max.to_string(),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("Total")
                .style(theme.chart_axis)
                .bounds([0.0, y_max as f64])
                .labels(vec![
                    "0".to_string(),
                    format_count(y_max / 2),
                    format_count(y_max),
                ]),
        )
        .style(theme.text);

    frame.render_widget(chart, area);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
