//! End-to-end tests of the library: parse a patch, run it against a
//! temporary base directory and inspect the numbered outputs.

mod output_allocation;
mod scenarios;

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use udiff_patcher::{LineEnding, RunOptions};

/// Create `files` (name, content) in a fresh temporary directory.
pub fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

/// Run options with a fixed fallback so results do not depend on the host.
pub fn options(base: &Path, fallback: LineEnding) -> RunOptions {
    RunOptions {
        fallback_line_ending: fallback,
        ..RunOptions::new(base)
    }
}

pub fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path).unwrap()
}
