//! Export hooks for the "Save" action.

use crate::editor::TableSnapshot;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;

/// Export errors. Only ever logged, the caller of `export` never sees them.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
}

/// Receives a snapshot of the table when the user saves.
///
/// Exporting is fire-and-forget: implementations handle their own failures.
#[cfg(not(target_arch = "wasm32"))]
pub trait ExportSink: Send + Sync {
    fn export(&self, snapshot: &TableSnapshot);
}

/// Receives a snapshot of the table (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait ExportSink {
    fn export(&self, snapshot: &TableSnapshot);
}

/// Writes the snapshot JSON to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogExporter;

impl ExportSink for LogExporter {
    fn export(&self, snapshot: &TableSnapshot) {
        match snapshot.to_json() {
            Ok(json) => log::info!("Saved table with {} ball(s):\n{}", snapshot.balls.len(), json),
            Err(e) => log::warn!("Failed to serialize table: {}", e),
        }
    }
}

/// Writes each export as pretty JSON to a fixed file, replacing the previous one.
#[derive(Debug, Clone)]
pub struct JsonFileExporter {
    path: PathBuf,
}

impl JsonFileExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, snapshot: &TableSnapshot) -> Result<(), ExportError> {
        let json = snapshot
            .to_json()
            .map_err(|e| ExportError::Serialization(e.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ExportError::Io(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        fs::write(&self.path, json)
            .map_err(|e| ExportError::Io(format!("Failed to write {}: {}", self.path.display(), e)))
    }
}

impl ExportSink for JsonFileExporter {
    fn export(&self, snapshot: &TableSnapshot) {
        match self.write(snapshot) {
            Ok(()) => log::info!("Exported table to {}", self.path.display()),
            Err(e) => log::warn!("Export failed: {}", e),
        }
    }
}

/// Keeps every exported snapshot in memory, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryExporter {
    snapshots: RwLock<Vec<TableSnapshot>>,
}

impl MemoryExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All snapshots exported so far, oldest first.
    pub fn snapshots(&self) -> Vec<TableSnapshot> {
        match self.snapshots.read() {
            Ok(snapshots) => snapshots.clone(),
            Err(e) => {
                log::warn!("Lock error: {}", e);
                Vec::new()
            }
        }
    }

    pub fn last(&self) -> Option<TableSnapshot> {
        self.snapshots.read().ok().and_then(|s| s.last().cloned())
    }

    pub fn len(&self) -> usize {
        self.snapshots.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ExportSink for MemoryExporter {
    fn export(&self, snapshot: &TableSnapshot) {
        match self.snapshots.write() {
            Ok(mut snapshots) => snapshots.push(snapshot.clone()),
            Err(e) => log::warn!("Lock error: {}", e),
        }
    }
}

impl<T: ExportSink + ?Sized> ExportSink for std::sync::Arc<T> {
    fn export(&self, snapshot: &TableSnapshot) {
        (**self).export(snapshot)
    }
}
