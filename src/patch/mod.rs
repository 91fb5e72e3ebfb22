//! Unified diff parsing.
//!
//! Turns patch text into [`FilePatch`] records, one per `--- ` header, each
//! owning its hunks in patch order.

pub mod errors;
pub mod parser;
pub mod types;

pub use errors::ParseError;
pub use parser::{parse, parse_hunk_header, strip_path_prefix, PatchParser};
pub use types::{FilePatch, Hunk, HunkHeader, LineKind, PatchLine, DEV_NULL};
