// Byte-level persistence collaborators
//
// The engine never cares where bytes land. A source hands bytes in, a sink
// takes them out; `FileStore` does both against the filesystem, trying to
// overwrite the file a chart was opened from before falling back to a new
// file named from a hint.

use std::fs;
use std::path::{Path, PathBuf};

use rewardgrid_engine::chart::Chart;

use crate::error::StoreError;
use crate::native;
use crate::CHART_EXTENSION;

/// How a save reached its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveMethod {
    /// The previously opened file was overwritten in place.
    Overwrite(PathBuf),
    /// A new file was written.
    NewFile(PathBuf),
    /// Bytes were handed to a non-file destination.
    Delivered,
}

pub trait ChartSource {
    fn read_bytes(&mut self) -> Result<Vec<u8>, StoreError>;
}

pub trait ChartSink {
    fn write_bytes(&mut self, bytes: &[u8], destination_hint: &str) -> Result<SaveMethod, StoreError>;
}

/// Turn a user-typed name into a safe `.chart` file name.
pub fn export_file_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let base = if trimmed.is_empty() { "chart" } else { trimmed };
    let mut name: String = base
        .chars()
        .map(|c| match c {
            '\\' | '/' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>' => '-',
            other => other,
        })
        .collect();
    let suffix = format!(".{}", CHART_EXTENSION);
    if !name.to_lowercase().ends_with(&suffix) {
        name.push_str(&suffix);
    }
    name
}

/// Filesystem source and sink.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// File the chart was opened from, overwritten on save when possible.
    existing: Option<PathBuf>,
    /// Directory for new files.
    dir: PathBuf,
}

impl FileStore {
    /// Store that only creates new files in `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { existing: None, dir: dir.into() }
    }

    /// Store bound to an existing chart file.
    pub fn for_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { existing: Some(path), dir }
    }

    pub fn path(&self) -> Option<&Path> {
        self.existing.as_deref()
    }
}

impl ChartSource for FileStore {
    fn read_bytes(&mut self) -> Result<Vec<u8>, StoreError> {
        let path = self
            .existing
            .as_ref()
            .ok_or_else(|| StoreError::Read("no file selected".to_string()))?;
        fs::read(path).map_err(|e| StoreError::Read(format!("{}: {}", path.display(), e)))
    }
}

impl ChartSink for FileStore {
    fn write_bytes(&mut self, bytes: &[u8], destination_hint: &str) -> Result<SaveMethod, StoreError> {
        if let Some(path) = &self.existing {
            match fs::write(path, bytes) {
                Ok(()) => return Ok(SaveMethod::Overwrite(path.clone())),
                Err(e) => log::warn!("overwrite of {} failed: {}", path.display(), e),
            }
        }

        let path = self.dir.join(export_file_name(destination_hint));
        fs::write(&path, bytes).map_err(|e| StoreError::Write(format!("{}: {}", path.display(), e)))?;
        self.existing = Some(path.clone());
        Ok(SaveMethod::NewFile(path))
    }
}

/// In-memory source and sink.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bytes: Option<Vec<u8>>,
    writes: Vec<(String, Vec<u8>)>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: Some(bytes.into()), ..Self::default() }
    }

    /// Every write fails, for exercising error paths.
    pub fn failing() -> Self {
        Self { fail_writes: true, ..Self::default() }
    }

    /// (hint, bytes) of every successful write, oldest first.
    pub fn writes(&self) -> &[(String, Vec<u8>)] {
        &self.writes
    }
}

impl ChartSource for MemoryStore {
    fn read_bytes(&mut self) -> Result<Vec<u8>, StoreError> {
        self.bytes
            .clone()
            .ok_or_else(|| StoreError::Read("nothing stored".to_string()))
    }
}

impl ChartSink for MemoryStore {
    fn write_bytes(&mut self, bytes: &[u8], destination_hint: &str) -> Result<SaveMethod, StoreError> {
        if self.fail_writes {
            return Err(StoreError::Write("destination unavailable".to_string()));
        }
        self.bytes = Some(bytes.to_vec());
        self.writes.push((destination_hint.to_string(), bytes.to_vec()));
        Ok(SaveMethod::Delivered)
    }
}

/// Serialize `chart` into `sink`. Marks the chart clean on success.
pub fn save_chart(
    chart: &mut Chart,
    sink: &mut dyn ChartSink,
    destination_hint: &str,
) -> Result<SaveMethod, StoreError> {
    let bytes = native::to_bytes(&native::serialize(chart))?;
    let method = sink.write_bytes(&bytes, destination_hint)?;
    chart.mark_clean();
    log::debug!("saved chart {:?} via {:?}", chart.title(), method);
    Ok(method)
}

/// Replace `chart` with the chart read from `source`. Untouched on error.
pub fn open_chart(source: &mut dyn ChartSource, chart: &mut Chart) -> Result<(), StoreError> {
    let bytes = source.read_bytes()?;
    native::load_into(chart, &bytes)?;
    Ok(())
}
