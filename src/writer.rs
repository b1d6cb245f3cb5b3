use crate::{
    error::{Error, Result},
    gate::Gate,
};
use serde::Serialize;
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::trace;

/// Writes generated files while holding a slot of the shared [`Gate`].
///
/// This is the only place output directories are created; callers hand over
/// a full path and never pre-create parents.
#[derive(Debug, Clone)]
pub struct Writer {
    gate: Arc<Gate>,
}

impl Writer {
    /// Creates a writer bounded by `gate`.
    #[must_use]
    pub const fn new(gate: Arc<Gate>) -> Self {
        Self { gate }
    }

    /// The gate this writer acquires before touching the filesystem.
    #[must_use]
    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    /// Writes `contents` to `path`, creating the parent directory if needed.
    ///
    /// The gate slot is released on every exit path, including failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// file cannot be written.
    pub async fn write(&self, path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
        let _permit = self.gate.acquire().await;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io(parent, e))?;
        }

        write_file_atomic(path, contents.as_ref()).await?;
        trace!("Wrote {}", path.display());
        Ok(())
    }

    /// Writes `value` as two-space indented JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.write(path, json).await
    }
}

/// Writes through a sibling temporary file and renames it into place, so
/// readers never observe a half-written module.
async fn write_file_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = temp_path_for(path);

    tokio::fs::write(&temp_path, contents)
        .await
        .map_err(|e| Error::io(&temp_path, e))?;

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(Error::io(path, e));
    }

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(OsString::new, ToOwned::to_owned);
    name.push(".tmp");
    path.with_file_name(name)
}
