//! udiff-patcher: apply unified diffs without touching the originals.
//!
//! A patch is parsed once into [`FilePatch`] records. Each record is applied
//! to the text of its original file and the result is written to a numbered
//! sibling (`notes.txt` -> `notes.001.txt`).
//!
//! # Line endings
//!
//! The output of every file uses the terminator convention detected in that
//! file, whatever convention the patch itself was written with. Lines taken
//! from the patch, including added lines, are re-terminated accordingly.
//!
//! # Example
//!
//! ```
//! use udiff_patcher::{parse, HunkApplicator, LineEnding};
//!
//! let patches = parse("--- a/f.txt\n+++ b/f.txt\n@@ -1,2 +1,2 @@\n a\n-b\n+c\n").unwrap();
//! let patched = HunkApplicator::default()
//!     .apply_to_text("a\r\nb\r\n", &patches[0].hunks, LineEnding::platform())
//!     .unwrap();
//!
//! assert_eq!(patched.content, "a\r\nc\r\n");
//! ```

pub mod apply;
pub mod config;
pub mod line_ending;
pub mod output;
pub mod patch;
pub mod runner;

// Re-exports
pub use apply::{
    apply_hunks, AppliedHunks, ApplyError, ApplyOptions, ContextMismatch, HunkApplicator,
    PatchedText, Policy,
};
pub use config::{ConfigError, DefaultLineEnding, PatcherConfig};
pub use line_ending::{detect, LineEnding};
pub use output::{next_numbered_path, write_numbered, OutputError};
pub use patch::{parse, FilePatch, Hunk, HunkHeader, LineKind, ParseError, PatchLine, PatchParser};
pub use runner::{
    run_file_patch, run_patches, FileOutcome, FileReport, PatchedFile, RunError, RunOptions,
    RunSummary,
};
