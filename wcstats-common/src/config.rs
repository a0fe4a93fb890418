use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::WcStatsError;

/// Directory under the platform config root that holds `config.toml`.
pub const APP_DIR: &str = "wcstats";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub tournament: String,
    pub delimiter: char,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { tournament: "FIFA World Cup".into(), delimiter: ',' }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub theme: String,
    pub float_precision: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { theme: "dark".into(), float_precision: 3 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = WcStatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(WcStatsError::Config(format!("unknown export format '{s}' (use json or csv)"))),
        }
    }
}

/// Where `wcstats export` writes when no `--output` is given.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: ExportFormat,
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { format: ExportFormat::default(), output_dir: PathBuf::from(".") }
    }
}

impl ExportConfig {
    /// `<output_dir>/teams.<ext>` for the given format.
    pub fn default_output(&self, format: ExportFormat) -> PathBuf {
        self.output_dir.join(format!("teams.{}", format.extension()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub display: DisplayConfig,
    pub export: ExportConfig,
}

impl Config {
    /// `<config dir>/wcstats/config.toml`, or a relative `wcstats/config.toml`
    /// when the platform has no config directory.
    pub fn default_path() -> PathBuf {
        let root = dirs::config_dir().unwrap_or_default();
        root.join(APP_DIR).join("config.toml")
    }

    /// Loads from `path`, or the default location when `None`. A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let path = path.map_or_else(Self::default_path, Path::to_path_buf);
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| WcStatsError::Config(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| WcStatsError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
