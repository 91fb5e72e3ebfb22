use crate::apply::{ApplyOptions, Policy};
use crate::line_ending::LineEnding;
use crate::output::DEFAULT_SEQUENCE_WIDTH;
use crate::patch::PatchParser;
use serde::Deserialize;
use std::fmt;

/// Widest zero padding accepted for numbered outputs.
pub const MAX_SEQUENCE_WIDTH: usize = 9;

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PatcherConfig {
    pub parse: ParseSettings,
    pub apply: ApplySettings,
    pub output: OutputSettings,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ParseSettings {
    /// Reject unprefixed lines inside hunks instead of skipping them
    pub strict: bool,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ApplySettings {
    pub context: Policy,
    pub count_check: Policy,
    pub default_line_ending: DefaultLineEnding,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    pub sequence_width: usize,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            sequence_width: DEFAULT_SEQUENCE_WIDTH,
        }
    }
}

/// Line ending used for files that contain no terminator at all.
#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DefaultLineEnding {
    #[default]
    Platform,
    Lf,
    Crlf,
    Cr,
}

impl DefaultLineEnding {
    pub fn resolve(self) -> LineEnding {
        match self {
            DefaultLineEnding::Platform => LineEnding::platform(),
            DefaultLineEnding::Lf => LineEnding::Lf,
            DefaultLineEnding::Crlf => LineEnding::Crlf,
            DefaultLineEnding::Cr => LineEnding::Cr,
        }
    }
}

impl PatcherConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        let width = self.output.sequence_width;
        if width == 0 || width > MAX_SEQUENCE_WIDTH {
            issues.push(ValidationIssue::OutOfRange {
                field: "output.sequence_width",
                value: width,
                min: 1,
                max: MAX_SEQUENCE_WIDTH,
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    pub fn apply_options(&self) -> ApplyOptions {
        ApplyOptions {
            context: self.apply.context,
            counts: self.apply.count_check,
        }
    }

    pub fn parser(&self) -> PatchParser {
        PatchParser::new()
            .strict(self.parse.strict)
            .fallback_line_ending(self.apply.default_line_ending.resolve())
    }

    /// Turn on every strict check.
    pub fn make_strict(&mut self) {
        self.parse.strict = true;
        self.apply.context = Policy::Fail;
        self.apply.count_check = Policy::Fail;
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    OutOfRange {
        field: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "'{field}' is {value}, expected {min}..={max}"),
        }
    }
}
