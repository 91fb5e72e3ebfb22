use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error(
        "hunk {header} cannot be applied at index {index} \
         (replacing {old_count} lines, file has {file_len} lines)"
    )]
    OutOfRange {
        header: String,
        index: isize,
        old_count: usize,
        file_len: usize,
    },

    #[error("context mismatch for hunk {header} at line {line}: expected {expected:?}, found {found:?}")]
    ContextMismatch {
        header: String,
        line: usize,
        expected: String,
        found: String,
    },

    #[error(
        "hunk {header} body has {body_old} old and {body_new} new lines, \
         header says {old_count} and {new_count}"
    )]
    CountMismatch {
        header: String,
        old_count: usize,
        new_count: usize,
        body_old: usize,
        body_new: usize,
    },
}
