mod bootstrap;
mod commands;

use std::io::{self, Write};

use anyhow::Result;
use chrono::Local;
use tracing::info;

use commands::OutputMode;
use repcount_core::settings::Settings;
use repcount_ui::app::{App, ViewMode};
use repcount_ui::report_view::ReportViewData;
use repcount_ui::svg_chart::SvgChartRenderer;
use repcount_ui::table_view::set_rows;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();
    let mode = OutputMode::from_settings(&settings);
    let is_chart = matches!(settings.view.as_str(), "chart" | "cumulative");
    let uses_terminal = mode == OutputMode::Tui
        && settings.view != "sheets"
        && !(is_chart && settings.output.is_some());

    bootstrap::ensure_directories()?;
    // Log lines would corrupt the alternate screen, so the TUI logs to a file.
    let log_file = settings
        .log_file
        .clone()
        .or_else(|| uses_terminal.then(bootstrap::default_log_file));
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;

    info!("repcount v{} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "View: {}, Month: {}, Theme: {}",
        settings.view, settings.month, settings.theme
    );

    let today = Local::now().date_naive();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match settings.view.as_str() {
        "sheets" => {
            let labels = commands::sheets(&settings)?;
            commands::write_sheets(&mut out, &labels, mode)?;
        }

        "stats" => {
            let (analysis, summary) = commands::statistics(&settings, today)?;
            if uses_terminal {
                let data = ReportViewData {
                    exercise: summary.exercise.clone(),
                    month: analysis.table.month,
                    view: settings.view.clone(),
                    summary: Some(summary),
                    projection: None,
                    skipped_rows: analysis.metadata.rows_skipped,
                };
                App::new(&settings.theme, ViewMode::Report).run_report(&data)?;
            } else {
                commands::write_statistics(&mut out, &summary, analysis.table.month, mode)?;
            }
        }

        "projection" => {
            let (analysis, result) = commands::projection(&settings, today)?;
            if uses_terminal {
                let data = ReportViewData {
                    exercise: result.exercise.clone(),
                    month: analysis.table.month,
                    view: settings.view.clone(),
                    summary: None,
                    projection: Some(result),
                    skipped_rows: analysis.metadata.rows_skipped,
                };
                App::new(&settings.theme, ViewMode::Report).run_report(&data)?;
            } else {
                commands::write_projection(&mut out, &result, mode)?;
            }
        }

        "chart" | "cumulative" => {
            if let Some(path) = &settings.output {
                let mut renderer = SvgChartRenderer::new(path);
                commands::render_chart(&settings, &mut renderer)?;
                writeln!(out, "Chart written to {}", renderer.path().display())?;
            } else if uses_terminal {
                let view_mode = if settings.view == "chart" {
                    ViewMode::Chart
                } else {
                    ViewMode::Cumulative
                };
                let mut app = App::new(&settings.theme, view_mode);
                commands::render_chart(&settings, &mut app)?;
            } else if settings.view == "chart" {
                let chart = commands::stacked_chart(&settings)?;
                commands::write_stacked_chart(&mut out, &chart, mode)?;
            } else {
                let (title, series) = commands::cumulative(&settings)?;
                commands::write_cumulative(&mut out, &title, &series, mode)?;
            }
        }

        "sets" => {
            let analysis = commands::month_sets(&settings)?;
            let exercise = settings.exercise.as_deref();
            if uses_terminal {
                let (rows, totals) = set_rows(&analysis.table, exercise);
                let title = match exercise {
                    Some(name) => format!("{} sets, {}", name, analysis.table.month),
                    None => format!("Sets, {}", analysis.table.month),
                };
                App::new(&settings.theme, ViewMode::Sets).run_table(&title, &rows, &totals)?;
            } else {
                commands::write_sets(&mut out, &analysis, exercise, mode)?;
            }
        }

        unknown => anyhow::bail!("Unknown view mode: {}", unknown),
    }

    Ok(())
}
