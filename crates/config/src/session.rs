use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// State carried between runs: which chart was open, so Save can overwrite it.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Session {
    pub version: u32,
    pub current_file: Option<PathBuf>,
}

impl Session {
    /// Session file inside a config directory
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join("session.json")
    }

    pub fn load_from(path: &Path) -> Option<Self> {
        fs::read_to_string(path).ok()
            .and_then(|s| serde_json::from_str(&s).ok())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Remember `path` as the open chart.
    pub fn note_opened(&mut self, path: PathBuf) {
        self.current_file = Some(path);
    }

    /// The chart to reopen, if it is still on disk.
    pub fn current_chart(&self) -> Option<&Path> {
        self.current_file.as_deref().filter(|p| p.is_file())
    }
}
