//! Destinations for finished report files.

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::{info, warn};

/// Receives the bytes of a finished report under its filename.
#[async_trait]
pub trait SaveSink: Send + Sync {
    /// Stores `bytes` as `filename`; returns where the file ended up when it has a path.
    async fn save(&self, filename: &str, bytes: Vec<u8>) -> io::Result<Option<PathBuf>>;
}

/// Writes reports into a directory, replacing files with the same name.
///
/// The bytes land in `<filename>.part` first and are renamed into place, so a
/// failed write never leaves a truncated report under the final name.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    directory: PathBuf,
}

impl DirectorySink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

#[async_trait]
impl SaveSink for DirectorySink {
    async fn save(&self, filename: &str, bytes: Vec<u8>) -> io::Result<Option<PathBuf>> {
        tokio::fs::create_dir_all(&self.directory).await?;
        let path = self.directory.join(filename);
        let partial = self.directory.join(format!("{filename}.part"));
        let stored = match tokio::fs::write(&partial, &bytes).await {
            Ok(()) => tokio::fs::rename(&partial, &path).await,
            Err(err) => Err(err),
        };
        if let Err(err) = stored {
            warn!("discarding unfinished {}: {}", partial.display(), err);
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(err);
        }
        info!("saved {} ({} bytes)", path.display(), bytes.len());
        Ok(Some(path))
    }
}

/// Keeps saved reports in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    files: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every saved file in save order.
    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        self.files
            .lock()
            .map(|files| files.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SaveSink for MemorySink {
    async fn save(&self, filename: &str, bytes: Vec<u8>) -> io::Result<Option<PathBuf>> {
        let mut files = self
            .files
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory sink lock poisoned"))?;
        files.push((filename.to_owned(), bytes));
        Ok(None)
    }
}
