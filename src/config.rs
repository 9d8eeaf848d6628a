// Runtime settings for a dashboard build.
//
// The config is an explicit value handed to `build_dashboard` and the CLI;
// nothing reads it from global state.
use crate::charts::{DEFAULT_LABEL_MAX_LEN, DEFAULT_TOP_N, DEFAULT_TREND_MONTHS};
use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the backend exports (`schools.json`, ...).
    pub data_dir: PathBuf,
    /// Where report CSVs and the JSON summary are written.
    pub output_dir: PathBuf,
    pub top_n: usize,
    pub trend_months: usize,
    pub label_max_len: usize,
    /// Shown in the priority matrix caption. Does not affect bucketing.
    pub priority_threshold: Option<f64>,
    pub recent_activity: usize,
    pub preview_rows: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("."),
            top_n: DEFAULT_TOP_N,
            trend_months: DEFAULT_TREND_MONTHS,
            label_max_len: DEFAULT_LABEL_MAX_LEN,
            priority_threshold: Some(70.0),
            recent_activity: 5,
            preview_rows: 3,
        }
    }
}

impl AppConfig {
    /// Read a JSON config file. Keys that are absent keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let cfg: AppConfig = serde_json::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(ReportError::Config("top_n must be at least 1".into()));
        }
        if self.trend_months == 0 {
            return Err(ReportError::Config("trend_months must be at least 1".into()));
        }
        if self.label_max_len == 0 {
            return Err(ReportError::Config("label_max_len must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"data_dir": "exports", "top_n": 5}}"#).unwrap();
        let cfg = AppConfig::from_file(f.path()).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("exports"));
        assert_eq!(cfg.top_n, 5);
        assert_eq!(cfg.trend_months, 12);
        assert_eq!(cfg.label_max_len, 14);
    }

    #[test]
    fn zero_limits_are_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"trend_months": 0}}"#).unwrap();
        let err = AppConfig::from_file(f.path()).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AppConfig::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ReportError::Io(_)));
    }
}
