//! Envelope persistence for one-shot `fetch` runs.

use crate::envelope::Envelope;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize envelope: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Writes the envelope as pretty-printed JSON, replacing any previous file.
///
/// Uses write-to-temp-then-rename so a reader polling the file never sees a
/// half-written envelope.
pub fn write_envelope(path: &Path, envelope: &Envelope) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(envelope)?;

    // Randomized temp name so a pre-created symlink cannot be targeted.
    use std::time::{SystemTime, UNIX_EPOCH};
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("tmp.{:016x}", random_suffix));

    let io_err = |p: &Path| {
        let p = p.display().to_string();
        move |source: std::io::Error| OutputError::Io { path: p, source }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err(parent))?;
    }

    let mut temp_file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true) // Fails atomically if file exists (prevents symlink race)
        .open(&temp_path)
        .map_err(io_err(&temp_path))?;

    let written = temp_file
        .write_all(json.as_bytes())
        .and_then(|_| temp_file.sync_all());
    drop(temp_file);
    if let Err(e) = written {
        let _ = std::fs::remove_file(&temp_path);
        return Err(io_err(&temp_path)(e));
    }

    // On Windows, rename fails if destination exists, so remove it first
    #[cfg(windows)]
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(io_err(path)(e));
        }
    }

    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(io_err(path)(e));
    }

    tracing::debug!(path = %path.display(), bytes = json.len(), "Envelope written");
    Ok(())
}
