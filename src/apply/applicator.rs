//! Hunk application against an in-memory line sequence.
//!
//! Hunks are applied strictly in patch order. Each hunk's 1-based
//! `old_start` is translated into an index into the sequence being built by
//! adding the net line delta of every hunk applied before it. Lines copied
//! from the patch are re-terminated with the target line ending, so output
//! is uniform no matter which convention the patch text used.

use crate::apply::errors::ApplyError;
use crate::line_ending::{self, LineEnding};
use crate::patch::types::Hunk;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// What to do when a check fails: log and continue, or reject the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    #[default]
    Warn,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyOptions {
    /// Context/deletion lines that differ from the file being patched
    pub context: Policy,
    /// Header counts that disagree with the hunk body
    pub counts: Policy,
}

impl ApplyOptions {
    /// Reject on any mismatch.
    pub fn strict() -> Self {
        Self {
            context: Policy::Fail,
            counts: Policy::Fail,
        }
    }
}

/// A line the hunk expected to find but which reads differently in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextMismatch {
    /// Zero-based position of the hunk in the file patch
    pub hunk: usize,
    pub header: String,
    /// 1-based line number in the sequence being patched
    pub line: usize,
    pub expected: String,
    pub found: String,
}

/// Patched lines plus the mismatches tolerated while producing them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "AppliedHunks holds the patched lines"]
pub struct AppliedHunks {
    pub lines: Vec<String>,
    pub mismatches: Vec<ContextMismatch>,
}

/// Result of patching a whole file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "PatchedText holds the patched content"]
pub struct PatchedText {
    pub content: String,
    /// Style detected in the original and used for every output line
    pub line_ending: LineEnding,
    pub original_lines: usize,
    pub patched_lines: usize,
    pub mismatches: Vec<ContextMismatch>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HunkApplicator {
    options: ApplyOptions,
}

impl HunkApplicator {
    pub fn new(options: ApplyOptions) -> Self {
        Self { options }
    }

    /// Apply `hunks` in order to `original`, producing a new line sequence.
    ///
    /// `original` is never modified. Every line taken from the patch ends
    /// with `line_ending`.
    pub fn apply(
        &self,
        original: &[String],
        hunks: &[Hunk],
        line_ending: LineEnding,
    ) -> Result<AppliedHunks, ApplyError> {
        let mut patched = original.to_vec();
        let mut mismatches = Vec::new();
        let mut offset: isize = 0;

        for (hunk_idx, hunk) in hunks.iter().enumerate() {
            let header = &hunk.header;
            let old_count = header.old_count;
            // Starts beyond isize::MAX saturate and fail the range check below.
            let index = isize::try_from(header.old_start.saturating_sub(1))
                .map_or(isize::MAX, |start| start.saturating_add(offset));

            debug!(
                hunk = hunk_idx,
                header = %header,
                old_start = header.old_start,
                old_count,
                new_start = header.new_start,
                new_count = header.new_count,
                index,
                offset,
                line_ending = line_ending.name(),
                "applying hunk"
            );
            if header.old_start == 0 {
                debug!(hunk = hunk_idx, "old_start is 0, inserting before the first line");
            }

            self.check_counts(hunk)?;

            let file_len = patched.len();
            let range = usize::try_from(index).ok().and_then(|start| {
                let end = start.checked_add(old_count)?;
                (end <= file_len).then_some((start, end))
            });
            let Some((start, end)) = range else {
                return Err(ApplyError::OutOfRange {
                    header: header.to_string(),
                    index,
                    old_count,
                    file_len,
                });
            };

            for (i, (expected, actual)) in hunk.old_lines().zip(&patched[start..end]).enumerate() {
                let found = line_ending::strip_terminator(actual);
                if expected.text == found {
                    continue;
                }
                let mismatch = ContextMismatch {
                    hunk: hunk_idx,
                    header: header.to_string(),
                    line: start + i + 1,
                    expected: expected.text.clone(),
                    found: found.to_string(),
                };
                match self.options.context {
                    Policy::Fail => {
                        return Err(ApplyError::ContextMismatch {
                            header: mismatch.header,
                            line: mismatch.line,
                            expected: mismatch.expected,
                            found: mismatch.found,
                        });
                    }
                    Policy::Warn => {
                        warn!(
                            header = %header,
                            line = mismatch.line,
                            expected = %mismatch.expected,
                            found = %mismatch.found,
                            "context mismatch"
                        );
                        mismatches.push(mismatch);
                    }
                }
            }

            for line in &hunk.lines {
                debug!(role = ?line.kind, text = %line.text, "hunk line");
            }
            let replacement: Vec<String> = hunk
                .new_lines()
                .map(|line| format!("{}{}", line.text, line_ending.as_str()))
                .collect();

            // An unterminated last line stops being last once content follows it.
            if start > 0 && start == file_len && !replacement.is_empty() {
                let last = &mut patched[start - 1];
                if line_ending::strip_terminator(last).len() == last.len() {
                    last.push_str(line_ending.as_str());
                }
            }

            debug!(
                hunk = hunk_idx,
                index = start,
                removed = old_count,
                inserted = replacement.len(),
                "replacing lines"
            );
            let inserted = replacement.len();
            patched.splice(start..end, replacement);
            offset += inserted as isize - old_count as isize;
        }

        Ok(AppliedHunks {
            lines: patched,
            mismatches,
        })
    }

    /// Detect the line ending of `original`, apply `hunks`, and join the result.
    ///
    /// `fallback` is used when `original` contains no terminator.
    pub fn apply_to_text(
        &self,
        original: &str,
        hunks: &[Hunk],
        fallback: LineEnding,
    ) -> Result<PatchedText, ApplyError> {
        let line_ending = line_ending::detect(original, fallback);
        let original_lines = line_ending::split_lines(original, line_ending);
        let applied = self.apply(&original_lines, hunks, line_ending)?;

        Ok(PatchedText {
            content: applied.lines.concat(),
            line_ending,
            original_lines: original_lines.len(),
            patched_lines: applied.lines.len(),
            mismatches: applied.mismatches,
        })
    }

    fn check_counts(&self, hunk: &Hunk) -> Result<(), ApplyError> {
        if hunk.counts_match() {
            return Ok(());
        }
        let header = &hunk.header;
        let body_old = hunk.old_lines().count();
        let body_new = hunk.new_lines().count();
        match self.options.counts {
            Policy::Fail => Err(ApplyError::CountMismatch {
                header: header.to_string(),
                old_count: header.old_count,
                new_count: header.new_count,
                body_old,
                body_new,
            }),
            Policy::Warn => {
                warn!(header = %header, body_old, body_new, "hunk body disagrees with header counts");
                Ok(())
            }
        }
    }
}

/// Apply `hunks` leniently, returning only the patched lines.
pub fn apply_hunks(
    original: &[String],
    hunks: &[Hunk],
    line_ending: LineEnding,
) -> Result<Vec<String>, ApplyError> {
    HunkApplicator::default()
        .apply(original, hunks, line_ending)
        .map(|applied| applied.lines)
}
