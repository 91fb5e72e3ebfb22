use crate::line_ending::{self, LineEnding};
use crate::patch::errors::ParseError;
use crate::patch::types::{FilePatch, Hunk, HunkHeader, LineKind, PatchLine};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing::{debug, trace};

pub const OLD_FILE_PREFIX: &str = "--- ";
pub const NEW_FILE_PREFIX: &str = "+++ ";
pub const HUNK_HEADER_PREFIX: &str = "@@";

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@(.*)$")
        .expect("hunk header pattern is a valid regex")
});

/// Lines that may appear between or after hunks without being part of one.
const METADATA_PREFIXES: &[&str] = &[
    "\\",
    "diff ",
    "index ",
    "new file mode",
    "deleted file mode",
    "old mode",
    "new mode",
    "similarity index",
    "dissimilarity index",
    "rename from",
    "rename to",
    "copy from",
    "copy to",
    "Binary files",
];

/// Parse unified diff text with the default (lenient) policy.
///
/// Input without any `--- ` header yields an empty list.
pub fn parse(text: &str) -> Result<Vec<FilePatch>, ParseError> {
    PatchParser::new().parse(text)
}

/// Unified diff parser.
///
/// In lenient mode (the default) lines inside a hunk that carry no
/// recognized prefix are skipped. In strict mode they are rejected, except
/// blank separator lines, `\ No newline at end of file` markers and git
/// extended header lines.
#[derive(Debug, Clone, Copy)]
pub struct PatchParser {
    strict: bool,
    fallback_line_ending: LineEnding,
}

impl Default for PatchParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PatchParser {
    pub fn new() -> Self {
        Self {
            strict: false,
            fallback_line_ending: LineEnding::platform(),
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Style reported for patch text that contains no terminator at all.
    pub fn fallback_line_ending(mut self, ending: LineEnding) -> Self {
        self.fallback_line_ending = ending;
        self
    }

    pub fn parse(&self, text: &str) -> Result<Vec<FilePatch>, ParseError> {
        let patch_line_ending = line_ending::detect(text, self.fallback_line_ending);
        let normalized = line_ending::normalize(text, LineEnding::Lf);

        let mut patches = Vec::new();
        let mut current: Option<FilePatch> = None;

        for (idx, line) in normalized.lines().enumerate() {
            let line_no = idx + 1;

            if let Some(rest) = line.strip_prefix(OLD_FILE_PREFIX) {
                if let Some(done) = current.take() {
                    patches.push(done);
                }
                let old_path = strip_path_prefix(rest);
                debug!(line = line_no, path = %old_path.display(), "file patch");
                current = Some(FilePatch::new(old_path, patch_line_ending));
                continue;
            }

            let Some(file) = current.as_mut() else {
                trace!(line = line_no, "skipping preamble line");
                continue;
            };

            if file.hunks.is_empty() {
                if let Some(rest) = line.strip_prefix(NEW_FILE_PREFIX) {
                    file.new_path = Some(strip_path_prefix(rest));
                    continue;
                }
            }

            if line.starts_with(HUNK_HEADER_PREFIX) {
                let header =
                    parse_hunk_header(line).ok_or_else(|| ParseError::MalformedHunkHeader {
                        line: line_no,
                        header: line.to_string(),
                    })?;
                file.hunks.push(Hunk::new(header));
                continue;
            }

            let Some(hunk) = file.hunks.last_mut() else {
                trace!(line = line_no, "skipping file header line");
                continue;
            };

            match line.chars().next().and_then(LineKind::from_prefix) {
                Some(kind) => hunk.lines.push(PatchLine::new(kind, &line[1..])),
                None if self.strict && !is_metadata(line) => {
                    return Err(ParseError::UnexpectedLine {
                        line: line_no,
                        content: line.to_string(),
                    });
                }
                None => trace!(line = line_no, content = line, "ignoring unprefixed line"),
            }
        }

        if let Some(done) = current {
            patches.push(done);
        }

        Ok(patches)
    }
}

fn is_metadata(line: &str) -> bool {
    line.trim().is_empty() || METADATA_PREFIXES.iter().any(|p| line.starts_with(p))
}

/// Parse `@@ -<old>[,<count>] +<new>[,<count>] @@[ section]`.
///
/// Omitted counts default to 1. Returns `None` when the line does not follow
/// the grammar or a number does not fit in `usize`.
pub fn parse_hunk_header(line: &str) -> Option<HunkHeader> {
    let caps = HUNK_HEADER.captures(line)?;
    let number = |idx: usize| -> Option<usize> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(1),
        }
    };

    let section = caps
        .get(5)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Some(HunkHeader {
        old_start: number(1)?,
        old_count: number(2)?,
        new_start: number(3)?,
        new_count: number(4)?,
        section,
    })
}

/// Turn a `--- `/`+++ ` header label into a path.
///
/// A tab-separated timestamp (as written by `diff -u`) is dropped, then a
/// leading git-style `a/` or `b/` segment is removed. Anything else passes
/// through unchanged.
pub fn strip_path_prefix(label: &str) -> PathBuf {
    let label = label.split('\t').next().unwrap_or(label).trim();
    let stripped = label
        .strip_prefix("a/")
        .or_else(|| label.strip_prefix("b/"))
        .unwrap_or(label);
    PathBuf::from(stripped)
}
