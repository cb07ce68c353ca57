// src/config.rs

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;
use url::Url;

pub const DEFAULT_SOURCE_URL: &str = "https://docs.google.com/spreadsheets/d/1YfG_YoJbRCMVEbLuzcxq-d_Gxv1c1i59iN4tWQCcloo/export?format=csv&gid=1769997494";
pub const DEFAULT_QUOTA: usize = 50;
const DEFAULT_CONFIG_FILE: &str = "regsheet.yaml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source_url: String,
    pub refresh_interval_secs: u64,
    pub request_timeout_secs: u64,
    /// Display-only capacity; never used to reject registrants.
    pub quota: usize,
    /// Where each snapshot is written as JSON, if anywhere.
    pub status_file: Option<PathBuf>,
    pub report: ReportSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSettings {
    pub dir: PathBuf,
    pub file_prefix: String,
    pub title: String,
    pub subtitle: Vec<String>,
    /// Table rows on page one, which also carries the title block.
    pub first_page_rows: usize,
    pub rows_per_page: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            refresh_interval_secs: 30,
            request_timeout_secs: 15,
            quota: DEFAULT_QUOTA,
            status_file: None,
            report: ReportSettings::default(),
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("reports"),
            file_prefix: "Daftar_Pendaftar_Bakti_Khitan".to_string(),
            title: "Daftar Pendaftar Bakti Amal Khitan".to_string(),
            subtitle: vec![
                "Masjid Al Hidayah - Periode ke-8".to_string(),
                "Tahun 1447 H / 2025 M".to_string(),
            ],
            first_page_rows: 18,
            rows_per_page: 24,
        }
    }
}

impl Config {
    /// Defaults, then the YAML file named by `REGSHEET_CONFIG` (or `regsheet.yaml`
    /// when present), then `REGSHEET_*` environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match env::var_os("REGSHEET_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        let config: Config =
            serde_yaml::from_str(&text).with_context(|| format!("parsing config {:?}", path))?;
        info!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = var("REGSHEET_SOURCE_URL") {
            self.source_url = url;
        }
        if let Some(secs) = var("REGSHEET_REFRESH_SECS") {
            self.refresh_interval_secs = secs
                .parse()
                .with_context(|| format!("REGSHEET_REFRESH_SECS={secs:?}"))?;
        }
        if let Some(quota) = var("REGSHEET_QUOTA") {
            self.quota = quota
                .parse()
                .with_context(|| format!("REGSHEET_QUOTA={quota:?}"))?;
        }
        if let Some(dir) = var("REGSHEET_REPORT_DIR") {
            self.report.dir = PathBuf::from(dir);
        }
        if let Some(file) = var("REGSHEET_STATUS_FILE") {
            self.status_file = Some(PathBuf::from(file));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.source_url()?;
        if self.refresh_interval_secs == 0 {
            bail!("refresh_interval_secs must be at least 1");
        }
        if self.report.first_page_rows == 0 || self.report.rows_per_page == 0 {
            bail!("report page capacities must be at least 1 row");
        }
        Ok(())
    }

    pub fn source_url(&self) -> Result<Url> {
        Url::parse(&self.source_url).with_context(|| format!("invalid source_url {:?}", self.source_url))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() -> Result<()> {
        let config = Config::default();
        config.validate()?;
        assert_eq!(config.quota, DEFAULT_QUOTA);
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
        Ok(())
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(
            tmp,
            "source_url: http://localhost:8080/sheet.csv\nquota: 40\nreport:\n  rows_per_page: 10\n"
        )?;
        let config = Config::from_file(tmp.path())?;
        assert_eq!(config.quota, 40);
        assert_eq!(config.report.rows_per_page, 10);
        assert_eq!(config.report.first_page_rows, 18);
        assert_eq!(config.refresh_interval_secs, 30);
        assert_eq!(config.source_url()?.port(), Some(8080));
        Ok(())
    }

    #[test]
    fn unknown_keys_are_rejected() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(tmp, "qouta: 40")?;
        assert!(Config::from_file(tmp.path()).is_err());
        Ok(())
    }

    #[test]
    fn env_overrides_win() -> Result<()> {
        let vars: HashMap<&str, &str> = [
            ("REGSHEET_QUOTA", "75"),
            ("REGSHEET_REFRESH_SECS", "5"),
            ("REGSHEET_STATUS_FILE", "/tmp/status.json"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()))?;
        assert_eq!(config.quota, 75);
        assert_eq!(config.refresh_interval_secs, 5);
        assert_eq!(config.status_file, Some(PathBuf::from("/tmp/status.json")));
        Ok(())
    }

    #[test]
    fn bad_values_fail_validation() {
        let mut config = Config::default();
        assert!(config
            .apply_overrides(|k| (k == "REGSHEET_QUOTA").then(|| "lots".to_string()))
            .is_err());

        config.refresh_interval_secs = 0;
        assert!(config.validate().is_err());

        let config = Config {
            source_url: "not a url".into(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
