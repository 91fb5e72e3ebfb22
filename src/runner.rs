//! Per-file orchestration.
//!
//! Each [`FilePatch`] is read, patched and written independently. A failure
//! for one file is recorded in its [`FileReport`] and never stops the files
//! after it. Nothing is written for a file whose patch did not apply.

use crate::apply::{ApplyError, ApplyOptions, ContextMismatch, HunkApplicator};
use crate::line_ending::LineEnding;
use crate::output::{self, OutputError, DEFAULT_SEQUENCE_WIDTH};
use crate::patch::FilePatch;
use serde::Serialize;
use serde_json::json;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info_span};

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory patch paths are resolved against
    pub base_dir: PathBuf,
    /// Compute everything but write nothing
    pub dry_run: bool,
    pub apply: ApplyOptions,
    /// Line ending for originals that contain no terminator
    pub fallback_line_ending: LineEnding,
    pub sequence_width: usize,
}

impl RunOptions {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            dry_run: false,
            apply: ApplyOptions::default(),
            fallback_line_ending: LineEnding::platform(),
            sequence_width: DEFAULT_SEQUENCE_WIDTH,
        }
    }
}

/// A successfully patched file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchedFile {
    /// Numbered output path (allocated but not written in a dry run)
    pub output: PathBuf,
    pub line_ending: LineEnding,
    pub patch_line_ending: LineEnding,
    pub original_lines: usize,
    pub patched_lines: usize,
    pub mismatches: Vec<ContextMismatch>,
    #[serde(skip)]
    pub before: String,
    #[serde(skip)]
    pub after: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
#[must_use = "FileOutcome should be reported"]
pub enum FileOutcome {
    /// Output was written
    Patched(PatchedFile),
    /// Dry run: output would have been written
    Previewed(PatchedFile),
}

impl FileOutcome {
    pub fn file(&self) -> &PatchedFile {
        match self {
            FileOutcome::Patched(file) | FileOutcome::Previewed(file) => file,
        }
    }
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("original file not found: {}", .path.display())]
    MissingOriginal { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to apply patch to {}: {source}", .path.display())]
    Apply {
        path: PathBuf,
        #[source]
        source: ApplyError,
    },

    #[error("could not write output for {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: OutputError,
    },
}

impl RunError {
    /// Missing originals are skipped, everything else counts as an error.
    pub fn is_skip(&self) -> bool {
        matches!(self, RunError::MissingOriginal { .. })
    }
}

/// What happened to one file patch.
#[derive(Debug)]
pub struct FileReport {
    /// Resolved path of the original file
    pub original: PathBuf,
    pub outcome: Result<FileOutcome, RunError>,
}

impl FileReport {
    pub fn to_json(&self) -> serde_json::Value {
        match &self.outcome {
            Ok(outcome) => {
                let mut value = json!(outcome);
                value["original"] = json!(self.original);
                value
            }
            Err(err) => json!({
                "status": if err.is_skip() { "skipped" } else { "error" },
                "original": self.original,
                "error": err.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub processed: usize,
    pub patched: usize,
    pub previewed: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl RunSummary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            summary.record(report);
        }
        summary
    }

    pub fn record(&mut self, report: &FileReport) {
        self.processed += 1;
        match &report.outcome {
            Ok(FileOutcome::Patched(_)) => self.patched += 1,
            Ok(FileOutcome::Previewed(_)) => self.previewed += 1,
            Err(err) if err.is_skip() => self.skipped += 1,
            Err(_) => self.errors += 1,
        }
    }

    pub fn merge(&mut self, other: &RunSummary) {
        self.processed += other.processed;
        self.patched += other.patched;
        self.previewed += other.previewed;
        self.skipped += other.skipped;
        self.errors += other.errors;
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed, {} patched, {} previewed, {} skipped, {} errors",
            self.processed, self.patched, self.previewed, self.skipped, self.errors
        )
    }
}

/// Apply every file patch in order.
pub fn run_patches(patches: &[FilePatch], options: &RunOptions) -> Vec<FileReport> {
    patches
        .iter()
        .map(|patch| run_file_patch(patch, options))
        .collect()
}

/// Apply one file patch: load the original, patch it, write a numbered copy.
///
/// A patch whose old path is `/dev/null` creates a file: the original is
/// taken as empty and output goes beside the target path.
pub fn run_file_patch(patch: &FilePatch, options: &RunOptions) -> FileReport {
    let relative = patch.source_path().unwrap_or_else(|| patch.target_path());
    let original = options.base_dir.join(relative);
    let _span = info_span!("file", path = %original.display()).entered();

    let outcome = process(patch, &original, options);
    FileReport { original, outcome }
}

fn process(
    patch: &FilePatch,
    original: &Path,
    options: &RunOptions,
) -> Result<FileOutcome, RunError> {
    let before = if patch.is_creation() {
        String::new()
    } else {
        load_original(original)?
    };

    let patched = HunkApplicator::new(options.apply)
        .apply_to_text(&before, &patch.hunks, options.fallback_line_ending)
        .map_err(|source| RunError::Apply {
            path: original.to_path_buf(),
            source,
        })?;

    debug!(
        original_lines = patched.original_lines,
        patched_lines = patched.patched_lines,
        source_line_ending = patched.line_ending.name(),
        patch_line_ending = patch.patch_line_ending.name(),
        hunks = patch.hunks.len(),
        "patched in memory"
    );
    if patched.line_ending != patch.patch_line_ending {
        debug!("patch and source line endings differ, output follows the source");
    }

    let output = if options.dry_run {
        output::next_numbered_path(original, options.sequence_width)
    } else {
        output::write_numbered(original, &patched.content, options.sequence_width).map_err(
            |source| RunError::Write {
                path: original.to_path_buf(),
                source,
            },
        )?
    };

    let file = PatchedFile {
        output,
        line_ending: patched.line_ending,
        patch_line_ending: patch.patch_line_ending,
        original_lines: patched.original_lines,
        patched_lines: patched.patched_lines,
        mismatches: patched.mismatches,
        before,
        after: patched.content,
    };

    Ok(if options.dry_run {
        FileOutcome::Previewed(file)
    } else {
        FileOutcome::Patched(file)
    })
}

/// Read an original file, mapping absence to [`RunError::MissingOriginal`].
pub fn load_original(path: &Path) -> Result<String, RunError> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => RunError::MissingOriginal {
            path: path.to_path_buf(),
        },
        _ => RunError::Read {
            path: path.to_path_buf(),
            source,
        },
    })
}
