//! The on-device signal file: a bracketed, comma-separated list of numbers
//! with no whitespace, e.g. `[15.2,9.873,21.0]`.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignalFileError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed signal data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Value {index} is not a finite number")]
    NonFinite { index: usize },
}

/// Encodes samples; integral values keep a trailing `.0`.
pub fn encode(samples: &[f64]) -> Result<String, SignalFileError> {
    let mut out = String::with_capacity(samples.len() * 10 + 2);
    out.push('[');
    for (index, v) in samples.iter().enumerate() {
        if !v.is_finite() {
            return Err(SignalFileError::NonFinite { index });
        }
        if index > 0 {
            out.push(',');
        }
        out.push_str(&format!("{v:?}"));
    }
    out.push(']');
    Ok(out)
}

/// Decodes any JSON array of numbers.
pub fn decode(text: &str) -> Result<Vec<f64>, SignalFileError> {
    Ok(serde_json::from_str(text.trim())?)
}

pub fn write_file(path: impl AsRef<Path>, samples: &[f64]) -> Result<usize, SignalFileError> {
    let path = path.as_ref();
    let content = encode(samples)?;
    std::fs::write(path, &content).map_err(|source| SignalFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content.len())
}

pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<f64>, SignalFileError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| SignalFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&text)
}

/// A signal file written next to the tool for upload.
///
/// Removed when dropped unless `keep` is set, so the file goes away on every
/// exit path, including a cancelled upload.
#[derive(Debug)]
pub struct LocalSignalFile {
    path: PathBuf,
    keep: bool,
}

impl LocalSignalFile {
    /// Writes `samples` to `path` and returns the guard with the byte count.
    pub fn create(
        path: impl Into<PathBuf>,
        samples: &[f64],
        keep: bool,
    ) -> Result<(Self, usize), SignalFileError> {
        let path = path.into();
        let bytes = write_file(&path, samples)?;
        Ok((Self { path, keep }, bytes))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LocalSignalFile {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Could not remove {}: {e}", self.path.display()),
        }
    }
}
