// Application settings
// Loaded from ~/.config/rewardgrid/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::theme::ThemeName;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Theme
    #[serde(rename = "theme.name")]
    pub theme: ThemeName,

    /// CSS hex color for the chart title, used only by the colorful theme
    #[serde(rename = "theme.titleColor", skip_serializing_if = "Option::is_none")]
    pub title_color: Option<String>,

    // File
    /// Suggested name in the save dialog (".chart" is appended)
    #[serde(rename = "file.defaultName")]
    pub default_file_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: ThemeName::Original,
            title_color: None,
            default_file_name: "chart".to_string(),
        }
    }
}

impl Settings {
    /// Settings file inside a config directory
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join("settings.json")
    }

    /// Load settings from `dir`, falling back to defaults when absent or unreadable
    pub fn load_in(dir: &Path) -> Self {
        let path = Self::path_in(dir);
        if !path.exists() {
            return Self::default();
        }
        Self::load_from(&path)
    }

    /// Load settings from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => {
                // Strip comments (lines starting with //)
                let cleaned: String = contents
                    .lines()
                    .filter(|line| !line.trim().starts_with("//"))
                    .collect::<Vec<_>>()
                    .join("\n");

                match serde_json::from_str(&cleaned) {
                    Ok(settings) => settings,
                    Err(e) => {
                        log::warn!("error parsing {}: {}; using defaults", path.display(), e);
                        Self::default()
                    }
                }
            }
            Err(e) => {
                log::warn!("error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.theme, ThemeName::Original);
        assert_eq!(s.default_file_name, "chart");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            theme: ThemeName::Colorful,
            title_color: Some("#FF3B3B".to_string()),
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_comments_and_partial_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            "{\n  // pick a look\n  \"theme.name\": \"colorful\"\n}\n",
        )
        .unwrap();
        let s = Settings::load_from(&path);
        assert_eq!(s.theme, ThemeName::Colorful);
        assert_eq!(s.default_file_name, "chart");
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_load_in_missing_dir_is_default() {
        let dir = tempdir().unwrap();
        let settings = Settings::load_in(&dir.path().join("absent"));
        assert_eq!(settings, Settings::default());
        assert!(!Settings::path_in(&dir.path().join("absent")).exists());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let dir = tempdir().unwrap();
        fs::write(
            Settings::path_in(dir.path()),
            r#"{"show.exitOnClearStars": false, "file.defaultName": "homeroom"}"#,
        )
        .unwrap();
        assert_eq!(Settings::load_in(dir.path()).default_file_name, "homeroom");
    }
}
