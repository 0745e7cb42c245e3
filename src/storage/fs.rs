//! Filesystem-backed file handle.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{AutosaveError, Result};
use crate::storage::FileHandle;

/// File handle that references a path on the local filesystem.
///
/// Unlike a plain output path, the handle expects the file to exist already:
/// a probe fails once the file has been moved, deleted, replaced by a
/// directory or made read-only, which sends the autosave into the
/// reconnection flow instead of silently recreating the file elsewhere.
///
/// Writes go to a hidden sibling file that is then renamed over the target,
/// so a write that fails partway leaves the previous content in place.
///
/// # Example
///
/// ```rust,no_run
/// use budget_autosave::FsHandle;
///
/// let handle = FsHandle::new("/home/me/budgets/2024.json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsHandle {
    path: PathBuf,
}

impl FsHandle {
    /// Create a new `FsHandle` for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // `.<name>.autosave-tmp` next to the target, on the same filesystem.
    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(".");
        name.push(self.path.file_name().unwrap_or_default());
        name.push(".autosave-tmp");
        self.path.with_file_name(name)
    }

    /// Read the whole file.
    pub async fn read(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|e| AutosaveError::Probe(Box::new(e)))
    }
}

impl FileHandle for FsHandle {
    async fn probe(&self) -> Result<()> {
        let meta = tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| AutosaveError::Probe(Box::new(e)))?;

        if !meta.is_file() {
            return Err(AutosaveError::Probe(Box::new(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", self.path.display()),
            ))));
        }
        if meta.permissions().readonly() {
            return Err(AutosaveError::Probe(Box::new(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is read-only", self.path.display()),
            ))));
        }
        Ok(())
    }

    async fn write(&self, content: &[u8]) -> Result<()> {
        let tmp = self.temp_path();
        let staged = match tokio::fs::write(&tmp, content).await {
            Ok(()) => tokio::fs::rename(&tmp, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = staged {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                tracing::debug!("Could not remove {}: {cleanup}", tmp.display());
            }
            return Err(AutosaveError::Write(Box::new(e)));
        }

        tracing::debug!("Wrote {} bytes to {}", content.len(), self.path.display());
        Ok(())
    }

    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn probe_existing_file_succeeds() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("budget.json");
        tokio::fs::write(&path, b"{}").await.unwrap();

        let handle = FsHandle::new(&path);
        assert!(handle.probe().await.is_ok());
    }

    #[tokio::test]
    async fn probe_missing_file_fails() {
        let tmp = TempDir::new().unwrap();
        let handle = FsHandle::new(tmp.path().join("moved-away.json"));

        let err = handle.probe().await.unwrap_err();
        assert!(matches!(err, AutosaveError::Probe(_)));
    }

    #[tokio::test]
    async fn probe_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let handle = FsHandle::new(tmp.path());
        assert!(handle.probe().await.is_err());
    }

    #[tokio::test]
    async fn probe_read_only_file_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("locked.json");
        tokio::fs::write(&path, b"{}").await.unwrap();

        let mut perms = tokio::fs::metadata(&path).await.unwrap().permissions();
        perms.set_readonly(true);
        tokio::fs::set_permissions(&path, perms).await.unwrap();

        let handle = FsHandle::new(&path);
        assert!(handle.probe().await.is_err());
    }

    #[tokio::test]
    async fn write_then_read_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("budget.json");
        tokio::fs::write(&path, b"old").await.unwrap();

        let handle = FsHandle::new(&path);
        handle.write(br#"{"items":[]}"#).await.unwrap();

        assert_eq!(handle.read().await.unwrap(), br#"{"items":[]}"#);
    }

    #[tokio::test]
    async fn write_leaves_no_temp_file_behind() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("budget.json");
        tokio::fs::write(&path, b"old").await.unwrap();

        FsHandle::new(&path).write(b"new").await.unwrap();

        let mut entries = tokio::fs::read_dir(tmp.path()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, ["budget.json"]);
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("budget.json");
        tokio::fs::write(&path, b"previous").await.unwrap();
        let handle = FsHandle::new(&path);

        // A directory squatting on the staging path makes the write fail.
        tokio::fs::create_dir(handle.temp_path()).await.unwrap();

        let err = handle.write(b"replacement").await.unwrap_err();
        assert!(matches!(err, AutosaveError::Write(_)));
        assert_eq!(handle.read().await.unwrap(), b"previous");
    }

    #[test]
    fn temp_path_is_hidden_sibling() {
        let handle = FsHandle::new("/home/me/budgets/2024.json");
        assert_eq!(
            handle.temp_path(),
            Path::new("/home/me/budgets/.2024.json.autosave-tmp")
        );
    }

    #[test]
    fn name_is_file_name() {
        let handle = FsHandle::new("/home/me/budgets/2024.json");
        assert_eq!(handle.name(), "2024.json");
    }
}
