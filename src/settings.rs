use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{PlanfeedError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Workbook used when the command line does not name one.
    #[serde(default)]
    pub workbook: String,
    /// Extra rules file applied in front of the built-in table.
    #[serde(default)]
    pub rules_file: String,
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("planfeed")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| PlanfeedError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

/// The workbook for this invocation: explicit argument first, then the
/// saved default.
pub fn resolve_workbook(arg: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = arg {
        return Ok(PathBuf::from(shellexpand_path(path)));
    }
    let settings = load_settings();
    if !settings.workbook.is_empty() {
        return Ok(PathBuf::from(shellexpand_path(&settings.workbook)));
    }
    Err(PlanfeedError::Settings(
        "no workbook given and none saved; pass a path or run `planfeed init --workbook PATH`"
            .to_string(),
    ))
}
