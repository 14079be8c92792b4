use chrono::{Local, NaiveDate};
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{RepError, Result};
use crate::models::MonthLabel;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Monthly statistics, goal projections and charts for a calisthenics log
#[derive(Parser, Debug, Clone)]
#[command(
    name = "repcount",
    about = "Monthly statistics, goal projections and charts for a calisthenics log",
    version
)]
pub struct Settings {
    /// Spreadsheet holding one sheet per month (.xlsx, .ods, .csv or a folder of CSVs)
    #[arg(long, env = "REPCOUNT_FILE")]
    pub file: Option<PathBuf>,

    /// View mode
    #[arg(long, default_value = "stats", value_parser = ["stats", "projection", "chart", "cumulative", "sets", "sheets"])]
    pub view: String,

    /// Exercise name, matched exactly against the exercise column
    #[arg(long)]
    pub exercise: Option<String>,

    /// Month sheet to analyse, e.g. 2024-November or 2024-11
    #[arg(long, default_value = "auto")]
    pub month: String,

    /// First month of the cumulative view
    #[arg(long)]
    pub from_month: Option<String>,

    /// Last month of the cumulative view
    #[arg(long)]
    pub to_month: Option<String>,

    /// First day of the statistics range (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the statistics range (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Day the projection is computed for (defaults to today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Monthly goal for the projection view
    #[arg(long)]
    pub goal: Option<u64>,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Write charts to this SVG file instead of showing them in the terminal
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Print plain text instead of starting the terminal UI
    #[arg(long)]
    pub plain: bool,

    /// Print JSON instead of starting the terminal UI
    #[arg(long, conflicts_with = "plain")]
    pub json: bool,

    /// Abort on the first malformed row instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.repcount/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".repcount").join("last_used.json")
    }

    /// Load persisted params from the default path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "ignoring unreadable last-used params"
                );
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Write params to `path` through a temp file and rename.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    pub fn clear() -> Result<()> {
        Self::clear_at(&Self::config_path())
    }

    /// Delete the config file at `path` if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Self::load_with_last_used`] with an explicit argument list
    /// and config path.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!(error = %e, "could not clear last-used params");
            }
            return Self::resolve_auto_values(settings, Local::now().date_naive());
        }

        let last = LastUsedParams::load_from(config_path);

        // Options filled from the environment count as explicit.
        if settings.file.is_none() {
            settings.file = last.file;
        }
        if settings.exercise.is_none() {
            settings.exercise = last.exercise;
        }
        if settings.goal.is_none() {
            settings.goal = last.goal;
        }
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }

        settings = Self::resolve_auto_values(settings, Local::now().date_naive());

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!(error = %e, "could not persist last-used params");
        }

        settings
    }

    /// Resolve `"auto"` sentinel values and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings, today: NaiveDate) -> Settings {
        if settings.month.eq_ignore_ascii_case("auto") {
            settings.month = MonthLabel::of(today).to_string();
        }

        // --debug overrides log level.
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }

    /// The `--month` value as a label; `"auto"` is the current month.
    pub fn month_label(&self) -> Result<MonthLabel> {
        if self.month.eq_ignore_ascii_case("auto") {
            return Ok(MonthLabel::of(Local::now().date_naive()));
        }
        self.month.parse()
    }

    /// Inclusive month span for the cumulative view. Either bound falls back
    /// to `--month` when omitted.
    pub fn month_span(&self) -> Result<(MonthLabel, MonthLabel)> {
        let from = match &self.from_month {
            Some(s) => s.parse()?,
            None => self.month_label()?,
        };
        let to = match &self.to_month {
            Some(s) => s.parse()?,
            None => self.month_label()?,
        };
        if from > to {
            return Err(RepError::InvalidRange(format!(
                "from-month {} is after to-month {}",
                from, to
            )));
        }
        Ok((from, to))
    }

    /// The spreadsheet path, or a configuration error naming both ways to set it.
    pub fn require_file(&self) -> Result<PathBuf> {
        self.file.clone().ok_or_else(|| {
            RepError::Config("no spreadsheet given; pass --file or set REPCOUNT_FILE".to_string())
        })
    }

    pub fn require_exercise(&self) -> Result<String> {
        self.exercise
            .clone()
            .ok_or_else(|| RepError::Config("no exercise given; pass --exercise".to_string()))
    }

    pub fn require_goal(&self) -> Result<u64> {
        self.goal
            .ok_or_else(|| RepError::Config("no goal given; pass --goal".to_string()))
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            file: s.file.clone(),
            view: Some(s.view.clone()),
            exercise: s.exercise.clone(),
            goal: s.goal,
            theme: Some(s.theme.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    fn args(list: &[&str]) -> Vec<std::ffi::OsString> {
        list.iter().map(|s| (*s).into()).collect()
    }

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            file: Some(PathBuf::from("/data/log.xlsx")),
            view: Some("projection".to_string()),
            exercise: Some("pushups".to_string()),
            goal: Some(3000),
            theme: Some("dark".to_string()),
        };

        params.save_to(&path).expect("save");
        assert_eq!(LastUsedParams::load_from(&path), params);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);

        let params = LastUsedParams {
            theme: Some("light".to_string()),
            ..Default::default()
        };
        params.save_to(&path).expect("save");
        assert!(path.exists());

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists());
        // Clearing twice is fine.
        LastUsedParams::clear_at(&path).expect("clear again");
    }

    #[test]
    fn test_last_used_params_default_when_missing_or_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        assert_eq!(LastUsedParams::load_from(&path), LastUsedParams::default());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(LastUsedParams::load_from(&path), LastUsedParams::default());
    }

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["repcount"]);

        assert_eq!(settings.view, "stats");
        assert_eq!(settings.month, "auto");
        assert_eq!(settings.theme, "auto");
        assert!(settings.exercise.is_none());
        assert!(settings.goal.is_none());
        assert!(settings.output.is_none());
        assert!(!settings.plain);
        assert!(!settings.json);
        assert!(!settings.strict);
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    #[test]
    fn test_settings_cli_dates_and_goal() {
        let settings = Settings::parse_from([
            "repcount",
            "--start",
            "2024-11-03",
            "--as-of",
            "2024-11-17",
            "--goal",
            "3000",
        ]);
        assert_eq!(settings.start, NaiveDate::from_ymd_opt(2024, 11, 3));
        assert_eq!(settings.as_of, NaiveDate::from_ymd_opt(2024, 11, 17));
        assert_eq!(settings.goal, Some(3000));
    }

    #[test]
    fn test_settings_rejects_unknown_view() {
        assert!(Settings::try_parse_from(["repcount", "--view", "weekly"]).is_err());
    }

    #[test]
    fn test_settings_plain_conflicts_with_json() {
        assert!(Settings::try_parse_from(["repcount", "--plain", "--json"]).is_err());
    }

    #[test]
    fn test_resolve_auto_month() {
        let settings = Settings::parse_from(["repcount"]);
        let today = NaiveDate::from_ymd_opt(2024, 11, 17).unwrap();
        let resolved = Settings::resolve_auto_values(settings, today);
        assert_eq!(resolved.month, "2024-November");
        assert_eq!(resolved.month_label().unwrap(), MonthLabel::new(2024, 11).unwrap());
    }

    #[test]
    fn test_month_span() {
        let settings = Settings::parse_from([
            "repcount",
            "--month",
            "2024-12",
            "--from-month",
            "2024-October",
        ]);
        let (from, to) = settings.month_span().unwrap();
        assert_eq!(from, MonthLabel::new(2024, 10).unwrap());
        assert_eq!(to, MonthLabel::new(2024, 12).unwrap());

        let inverted = Settings::parse_from([
            "repcount",
            "--from-month",
            "2025-01",
            "--to-month",
            "2024-11",
            "--month",
            "2024-11",
        ]);
        assert!(matches!(inverted.month_span(), Err(RepError::InvalidRange(_))));
    }

    #[test]
    fn test_month_span_with_unresolved_auto_month() {
        let settings = Settings::parse_from([
            "repcount",
            "--from-month",
            "2024-10",
            "--to-month",
            "2024-11",
        ]);
        assert_eq!(settings.month, "auto");
        let (from, to) = settings.month_span().unwrap();
        assert_eq!(from, MonthLabel::new(2024, 10).unwrap());
        assert_eq!(to, MonthLabel::new(2024, 11).unwrap());

        let current = MonthLabel::of(Local::now().date_naive());
        assert_eq!(settings.month_label().unwrap(), current);
        let open_ended = Settings::parse_from(["repcount", "--from-month", "2024-10"]);
        assert_eq!(open_ended.month_span().unwrap().1, current);
    }

    #[test]
    fn test_require_helpers() {
        let settings = Settings::parse_from(["repcount"]);
        assert!(matches!(settings.require_goal(), Err(RepError::Config(_))));
        assert!(matches!(settings.require_exercise(), Err(RepError::Config(_))));
    }

    #[test]
    fn test_load_with_last_used_merges_persisted_values() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        LastUsedParams {
            exercise: Some("pullups".to_string()),
            goal: Some(600),
            theme: Some("dark".to_string()),
            view: Some("chart".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(args(&["repcount"]), &config_path);
        assert_eq!(settings.theme, "dark");
        assert_eq!(settings.view, "chart");
        assert_eq!(settings.exercise.as_deref(), Some("pullups"));
        assert_eq!(settings.goal, Some(600));
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        LastUsedParams {
            exercise: Some("pullups".to_string()),
            theme: Some("dark".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            args(&["repcount", "--theme", "light", "--exercise", "pushups"]),
            &config_path,
        );
        assert_eq!(settings.theme, "light");
        assert_eq!(settings.exercise.as_deref(), Some("pushups"));
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        LastUsedParams {
            theme: Some("classic".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        Settings::load_with_last_used_impl(args(&["repcount", "--clear"]), &config_path);
        assert!(!config_path.exists());
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let settings =
            Settings::load_with_last_used_impl(args(&["repcount", "--debug"]), &config_path);
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_load_with_last_used_persists_after_run() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(
            args(&["repcount", "--goal", "1500", "--exercise", "squats"]),
            &config_path,
        );

        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.goal, Some(1500));
        assert_eq!(loaded.exercise.as_deref(), Some("squats"));
        assert_eq!(loaded.view.as_deref(), Some("stats"));
    }
}
