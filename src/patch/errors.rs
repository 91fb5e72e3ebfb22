use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed hunk header at line {line}: {header:?}")]
    MalformedHunkHeader { line: usize, header: String },

    #[error("unexpected line {line} inside hunk: {content:?}")]
    UnexpectedLine { line: usize, content: String },
}
