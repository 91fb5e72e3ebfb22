use crate::line_ending::LineEnding;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Path used by diff tools for the missing side of a created or deleted file.
pub const DEV_NULL: &str = "/dev/null";

/// Role of a line inside a hunk body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Unchanged, present in both the old and the new file
    Context,
    /// Present only in the new file
    Addition,
    /// Present only in the old file
    Deletion,
}

impl LineKind {
    /// The unified diff prefix character for this role.
    pub const fn prefix(self) -> char {
        match self {
            LineKind::Context => ' ',
            LineKind::Addition => '+',
            LineKind::Deletion => '-',
        }
    }

    pub fn from_prefix(c: char) -> Option<Self> {
        match c {
            ' ' => Some(LineKind::Context),
            '+' => Some(LineKind::Addition),
            '-' => Some(LineKind::Deletion),
            _ => None,
        }
    }
}

/// A single hunk body line. `text` never carries a terminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchLine {
    pub kind: LineKind,
    pub text: String,
}

impl PatchLine {
    pub fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn context(text: impl Into<String>) -> Self {
        Self::new(LineKind::Context, text)
    }

    pub fn addition(text: impl Into<String>) -> Self {
        Self::new(LineKind::Addition, text)
    }

    pub fn deletion(text: impl Into<String>) -> Self {
        Self::new(LineKind::Deletion, text)
    }

    /// Whether this line exists in the old file (context or deletion).
    pub fn in_old(&self) -> bool {
        matches!(self.kind, LineKind::Context | LineKind::Deletion)
    }

    /// Whether this line exists in the new file (context or addition).
    pub fn in_new(&self) -> bool {
        matches!(self.kind, LineKind::Context | LineKind::Addition)
    }
}

impl fmt::Display for PatchLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.text)
    }
}

/// The numbers from an `@@ -old_start,old_count +new_start,new_count @@` line.
///
/// Line numbers are 1-based. An `old_start` of 0 means "before the first
/// line" and is what diff tools emit for an originally empty file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HunkHeader {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    /// Text after the closing `@@`, e.g. an enclosing function signature.
    pub section: Option<String>,
}

impl HunkHeader {
    pub fn new(old_start: usize, old_count: usize, new_start: usize, new_count: usize) -> Self {
        Self {
            old_start,
            old_count,
            new_start,
            new_count,
            section: None,
        }
    }
}

impl fmt::Display for HunkHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_count, self.new_start, self.new_count
        )?;
        if let Some(section) = &self.section {
            write!(f, " {section}")?;
        }
        Ok(())
    }
}

/// One contiguous change region of a file patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hunk {
    pub header: HunkHeader,
    pub lines: Vec<PatchLine>,
}

impl Hunk {
    pub fn new(header: HunkHeader) -> Self {
        Self {
            header,
            lines: Vec::new(),
        }
    }

    pub fn with_lines(header: HunkHeader, lines: Vec<PatchLine>) -> Self {
        Self { header, lines }
    }

    /// Lines the hunk expects to find in the old file, in order.
    pub fn old_lines(&self) -> impl Iterator<Item = &PatchLine> {
        self.lines.iter().filter(|line| line.in_old())
    }

    /// Lines the hunk produces in the new file, in order.
    pub fn new_lines(&self) -> impl Iterator<Item = &PatchLine> {
        self.lines.iter().filter(|line| line.in_new())
    }

    pub fn additions(&self) -> usize {
        self.count(LineKind::Addition)
    }

    pub fn deletions(&self) -> usize {
        self.count(LineKind::Deletion)
    }

    /// Whether the body agrees with the counts stated in the header.
    pub fn counts_match(&self) -> bool {
        self.old_lines().count() == self.header.old_count
            && self.new_lines().count() == self.header.new_count
    }

    fn count(&self, kind: LineKind) -> usize {
        self.lines.iter().filter(|line| line.kind == kind).count()
    }
}

/// All hunks for one file, with prefix-stripped paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePatch {
    /// Path from the `--- ` header
    pub old_path: PathBuf,
    /// Path from the `+++ ` header, if one was present
    pub new_path: Option<PathBuf>,
    /// Hunks in patch order
    pub hunks: Vec<Hunk>,
    /// Terminator style that dominated the raw patch text
    pub patch_line_ending: LineEnding,
}

impl FilePatch {
    pub fn new(old_path: impl Into<PathBuf>, patch_line_ending: LineEnding) -> Self {
        Self {
            old_path: old_path.into(),
            new_path: None,
            hunks: Vec::new(),
            patch_line_ending,
        }
    }

    /// Path of the original file to read. `None` when the patch creates the file.
    pub fn source_path(&self) -> Option<&Path> {
        if self.is_creation() {
            None
        } else {
            Some(&self.old_path)
        }
    }

    /// Path the patch describes as its result, falling back to the old path.
    pub fn target_path(&self) -> &Path {
        self.new_path.as_deref().unwrap_or(&self.old_path)
    }

    pub fn is_creation(&self) -> bool {
        self.old_path == Path::new(DEV_NULL)
    }

    pub fn is_deletion(&self) -> bool {
        self.new_path.as_deref() == Some(Path::new(DEV_NULL))
    }
}
