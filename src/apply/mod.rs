pub mod applicator;
pub mod errors;

pub use applicator::{
    apply_hunks, AppliedHunks, ApplyOptions, ContextMismatch, HunkApplicator, PatchedText, Policy,
};
pub use errors::ApplyError;
