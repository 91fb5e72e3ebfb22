//! Line terminator detection and normalization.
//!
//! Patched output always follows the terminator convention of the file being
//! patched, never the convention of the patch text. Detection is a majority
//! vote over the terminators found in the content.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A line terminator convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// Windows style `\r\n`
    Crlf,
    /// Unix style `\n`
    Lf,
    /// Classic Mac style `\r`
    Cr,
}

impl LineEnding {
    /// The terminator native to the platform this binary was built for.
    pub const fn platform() -> Self {
        if cfg!(windows) {
            LineEnding::Crlf
        } else {
            LineEnding::Lf
        }
    }

    /// The terminator characters.
    pub const fn as_str(self) -> &'static str {
        match self {
            LineEnding::Crlf => "\r\n",
            LineEnding::Lf => "\n",
            LineEnding::Cr => "\r",
        }
    }

    /// Short upper-case name used in reports.
    pub const fn name(self) -> &'static str {
        match self {
            LineEnding::Crlf => "CRLF",
            LineEnding::Lf => "LF",
            LineEnding::Cr => "CR",
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_str().escape_default())
    }
}

/// Terminator tallies for a piece of text.
///
/// `lf` and `cr` exclude the characters already counted as part of a `\r\n`
/// pair, so every terminator is counted exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LineEndingCounts {
    pub crlf: usize,
    pub lf: usize,
    pub cr: usize,
}

impl LineEndingCounts {
    pub fn of(content: &str) -> Self {
        let crlf = content.matches("\r\n").count();
        let lf = content.bytes().filter(|&b| b == b'\n').count() - crlf;
        let cr = content.bytes().filter(|&b| b == b'\r').count() - crlf;
        Self { crlf, lf, cr }
    }

    pub fn total(&self) -> usize {
        self.crlf + self.lf + self.cr
    }

    /// The most frequent terminator. Ties prefer CRLF, then LF, then CR.
    ///
    /// Returns `None` when no terminator was seen at all.
    pub fn dominant(&self) -> Option<LineEnding> {
        if self.total() == 0 {
            None
        } else if self.crlf >= self.lf && self.crlf >= self.cr {
            Some(LineEnding::Crlf)
        } else if self.lf >= self.cr {
            Some(LineEnding::Lf)
        } else {
            Some(LineEnding::Cr)
        }
    }
}

/// Detect the dominant line ending of `content`.
///
/// Content without any terminator (including empty content) yields
/// `fallback`, normally [`LineEnding::platform()`].
pub fn detect(content: &str, fallback: LineEnding) -> LineEnding {
    LineEndingCounts::of(content).dominant().unwrap_or(fallback)
}

/// Rewrite every terminator in `content` (`\r\n`, lone `\n`, lone `\r`) as
/// `target`.
pub fn normalize(content: &str, target: LineEnding) -> String {
    let unified = content.replace("\r\n", "\n").replace('\r', "\n");
    match target {
        LineEnding::Lf => unified,
        other => unified.replace('\n', other.as_str()),
    }
}

/// Split `content` into lines, each terminated with `ending`.
///
/// Mixed terminators are unified to `ending`. A final line without a
/// terminator stays unterminated.
pub fn split_lines(content: &str, ending: LineEnding) -> Vec<String> {
    let unified = normalize(content, LineEnding::Lf);
    unified
        .split_inclusive('\n')
        .map(|line| match line.strip_suffix('\n') {
            Some(body) => format!("{body}{}", ending.as_str()),
            None => line.to_string(),
        })
        .collect()
}

/// The line without its trailing terminator, whatever its style.
pub fn strip_terminator(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .or_else(|| line.strip_suffix('\r'))
        .unwrap_or(line)
}
