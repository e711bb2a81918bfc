use crate::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// A uniquely named PNG file that exists for as long as this value lives.
///
/// The recognizer only accepts file paths, so each request writes its image
/// here; dropping the guard removes the file on every exit path.
#[derive(Debug)]
pub struct ScratchImage {
    file: Option<NamedTempFile>,
    path: PathBuf,
}

impl ScratchImage {
    /// Writes `png` to a fresh file in `dir` (system temp dir when `None`).
    pub fn write(png: &[u8], dir: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("molstruct-").suffix(".png");

        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(png)?;
        file.flush()?;

        let path = file.path().to_path_buf();
        debug!("Wrote scratch image to {}", path.display());

        Ok(Self {
            file: Some(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchImage {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            match file.close() {
                Ok(()) => debug!("Removed scratch image {}", self.path.display()),
                Err(e) => warn!(
                    "Failed to remove scratch image {}: {}",
                    self.path.display(),
                    e
                ),
            }
        }
    }
}
