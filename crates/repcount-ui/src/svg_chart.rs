//! SVG output for the month charts, drawn with plotters.

use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::info;

use repcount_core::chart::{ChartRenderer, CumulativeSeries, StackedBarChart};
use repcount_core::error::{RepError, Result};

const SIZE: (u32, u32) = (1280, 720);
const BAR_HALF_WIDTH: f64 = 0.4;

/// Writes each chart it is asked to render to one SVG file.
pub struct SvgChartRenderer {
    path: PathBuf,
}

impl SvgChartRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn render_stacked_bar(&mut self, chart: &StackedBarChart) -> Result<()> {
        let root = SVGBackend::new(&self.path, SIZE).into_drawing_area();
        draw_stacked_bar(root, chart).map_err(|e| RepError::Chart(e.to_string()))?;
        info!("Wrote {} to {}", chart.title, self.path.display());
        Ok(())
    }

    fn render_cumulative(&mut self, title: &str, series: &[CumulativeSeries]) -> Result<()> {
        let root = SVGBackend::new(&self.path, SIZE).into_drawing_area();
        draw_cumulative(root, title, series).map_err(|e| RepError::Chart(e.to_string()))?;
        info!("Wrote {} to {}", title, self.path.display());
        Ok(())
    }
}

fn draw_stacked_bar<DB: DrawingBackend>(
    area: DrawingArea<DB, Shift>,
    chart: &StackedBarChart,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    area.fill(&WHITE)?;

    let days = chart.bars.len() as f64;
    let y_max = (chart.max_total() as f64 * 1.1).max(1.0);

    let mut ctx = ChartBuilder::on(&area)
        .caption(&chart.title, ("sans-serif", 28))
        .margin(25)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(0.5..(days + 0.5), 0.0..y_max)?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(chart.bars.len())
        .x_label_formatter(&|v| format!("{:.0}", v))
        .y_label_formatter(&|v| format!("{:.0}", v))
        .x_desc("Day")
        .y_desc(chart.exercise.as_str())
        .draw()?;

    for bar in &chart.bars {
        let x = f64::from(bar.day());
        let mut bottom = 0.0;
        for (i, count) in bar.segments.iter().enumerate() {
            let top = bottom + f64::from(*count);
            let style = Palette99::pick(i).filled();
            ctx.draw_series(std::iter::once(Rectangle::new(
                [(x - BAR_HALF_WIDTH, bottom), (x + BAR_HALF_WIDTH, top)],
                style,
            )))?;
            ctx.draw_series(std::iter::once(Rectangle::new(
                [(x - BAR_HALF_WIDTH, bottom), (x + BAR_HALF_WIDTH, top)],
                WHITE.stroke_width(1),
            )))?;
            bottom = top;
        }
    }

    area.present()?;
    Ok(())
}

fn draw_cumulative<DB: DrawingBackend>(
    area: DrawingArea<DB, Shift>,
    title: &str,
    series: &[CumulativeSeries],
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    area.fill(&WHITE)?;

    let x_max = series
        .iter()
        .map(|s| s.month.days_in_month())
        .max()
        .unwrap_or(31);
    let y_max = series
        .iter()
        .map(CumulativeSeries::final_total)
        .max()
        .unwrap_or(0)
        .max(1) as f64
        * 1.05;

    let mut ctx = ChartBuilder::on(&area)
        .caption(title, ("sans-serif", 28))
        .margin(25)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(1.0..f64::from(x_max), 0.0..y_max)?;

    ctx.configure_mesh()
        .x_label_formatter(&|v| format!("{:.0}", v))
        .y_label_formatter(&|v| format!("{:.0}", v))
        .x_desc("Day")
        .y_desc("Total")
        .draw()?;

    for (i, s) in series.iter().enumerate() {
        let style = Palette99::pick(i).stroke_width(2);
        let points: Vec<(f64, f64)> = s
            .points
            .iter()
            .map(|(day, total)| (f64::from(*day), *total as f64))
            .collect();

        ctx.draw_series(LineSeries::new(points.iter().copied(), style))?
            .label(s.month.to_string())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], style));
        ctx.draw_series(
            points
                .iter()
                .map(|p| Circle::new(*p, 3, Palette99::pick(i).filled())),
        )?;
    }

    if !series.is_empty() {
        ctx.configure_series_labels()
            .background_style(&WHITE.mix(0.7))
            .border_style(&BLACK.mix(0.3))
            .position(SeriesLabelPosition::UpperLeft)
            .draw()?;
    }

    area.present()?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
