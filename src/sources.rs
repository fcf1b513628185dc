//! Source file discovery and loading.
//!
//! Payloads live as files in an input directory: `.json` files holding
//! vendor API responses (including GraphQL envelopes) and `.txt` files
//! holding text extracted from menu PDFs. Files are processed in ascending
//! filename order; with date-stamped filenames that puts later-saved
//! corrections last, which is what makes the merge's last-write-wins rule
//! deterministic.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{MenucalError, Result};
use crate::extract::RawPayload;

/// One discovered source file with its parsed payload.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Filename without the directory, used in logs and the run report.
    pub name: String,
    pub payload: RawPayload,
}

/// List the payload files in `dir`, sorted by filename.
///
/// Only `.json` and `.txt` files are considered; anything else in the
/// directory is ignored with a log line.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") | Some("txt") => paths.push(path),
            _ => {
                debug!(path = %path.display(), "Ignoring non-payload file");
            }
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!(dir = %dir.display(), count = paths.len(), "Discovered source files");
    Ok(paths)
}

/// Read one source file into a payload.
///
/// `.txt` files become text payloads as-is. `.json` files must parse; a
/// malformed JSON file is a hard error rather than a silent skip, since it
/// usually means a truncated fetch worth noticing.
pub fn load(path: &Path) -> Result<SourceFile> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let content = fs::read_to_string(path)?;

    let payload = if path.extension().and_then(|e| e.to_str()) == Some("txt") {
        RawPayload::Text(content)
    } else {
        match serde_json::from_str(&content) {
            Ok(value) => RawPayload::Json(value),
            Err(err) => {
                warn!(file = %name, error = %err, "Source file is not valid JSON");
                return Err(MenucalError::Json(err));
            }
        }
    };

    debug!(file = %name, "Loaded source file");
    Ok(SourceFile {
        path: path.to_path_buf(),
        name,
        payload,
    })
}
