//! Numbered output files.
//!
//! Patched content never replaces the original. It is written to a sibling
//! named by inserting a zero-padded sequence number before the extension
//! (`program.py` -> `program.001.py`), taking the first number not already
//! in use so that repeated runs never overwrite earlier output.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_SEQUENCE_WIDTH: usize = 3;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to stage output in {}: {source}", .dir.display())]
    Stage {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The sibling of `original` carrying `sequence`, e.g. `notes.007.txt`.
pub fn numbered_path(original: &Path, sequence: usize, width: usize) -> PathBuf {
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match original.extension() {
        Some(ext) => format!("{stem}.{sequence:0width$}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{sequence:0width$}"),
    };
    original.with_file_name(name)
}

/// The first numbered sibling of `original` that does not exist yet.
///
/// Only a snapshot: [`write_numbered`] re-checks when it claims the name.
pub fn next_numbered_path(original: &Path, width: usize) -> PathBuf {
    let mut sequence = 1;
    loop {
        let candidate = numbered_path(original, sequence, width);
        if !candidate.exists() {
            return candidate;
        }
        sequence += 1;
    }
}

/// Write `content` to the first free numbered sibling of `original`.
///
/// The content is staged in a temporary file in the same directory, synced,
/// then moved into place without clobbering. If another writer claims the
/// chosen name first, the next number is tried.
pub fn write_numbered(original: &Path, content: &str, width: usize) -> Result<PathBuf, OutputError> {
    let dir = match original.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let stage_err = |source| OutputError::Stage {
        dir: dir.to_path_buf(),
        source,
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(stage_err)?;
    temp.write_all(content.as_bytes()).map_err(stage_err)?;
    temp.as_file().sync_all().map_err(stage_err)?;

    let mut sequence = 1;
    loop {
        let candidate = numbered_path(original, sequence, width);
        if candidate.exists() {
            sequence += 1;
            continue;
        }
        match temp.persist_noclobber(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                temp = err.file;
                sequence += 1;
            }
            Err(err) => {
                return Err(OutputError::Write {
                    path: candidate,
                    source: err.error,
                })
            }
        }
    }
}
