use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;
use tempfile::NamedTempFile;

use crate::domain::{ClientError, ClientResult, UploadedFile};

/// Destination for generated artifacts.
pub trait ArtifactSink {
    fn save(&self, filename: &str, bytes: &[u8]) -> ClientResult<PathBuf>;
}

/// Saves artifacts into a directory.
///
/// Bytes go to a temporary file next to the target first; the temporary is
/// removed on every failure path and renamed into place on success.
pub struct DownloadDirectory {
    dir: PathBuf,
}

impl DownloadDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactSink for DownloadDirectory {
    fn save(&self, filename: &str, bytes: &[u8]) -> ClientResult<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| ClientError::Io(e.to_string()))?;

        let mut staging = NamedTempFile::new_in(&self.dir).map_err(|e| ClientError::Io(e.to_string()))?;
        staging.write_all(bytes).map_err(|e| ClientError::Io(e.to_string()))?;
        staging.flush().map_err(|e| ClientError::Io(e.to_string()))?;

        let target = self.dir.join(filename);
        staging
            .persist(&target)
            .map_err(|e| ClientError::Io(e.error.to_string()))?;

        info!("Saved {} ({} bytes)", target.display(), bytes.len());
        Ok(target)
    }
}

pub struct FileRepository;

impl FileRepository {
    /// Reads a PDF chosen for upload.
    pub fn load_document(path: &Path) -> ClientResult<UploadedFile> {
        let bytes = fs::read(path).map_err(|e| ClientError::Io(format!("{}: {}", path.display(), e)))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.pdf".to_string());
        Ok(UploadedFile::new(&name, bytes))
    }
}
