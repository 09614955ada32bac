//! Text encoding schema for genes, genomes, checkpoints and the progress log.
//!
//! The durable formats are plain text so that checkpoints and progress logs
//! can be inspected and consumed by external tools:
//!
//! ```text
//! gene:        x,y,r,g,b;
//! genome:      x,y,r,g,b;x,y,r,g,b;...
//! checkpoint:  Generation: <n>\n<genome>\n<genome>\n...
//! progress:    <generation> <mean fitness> <best fitness> <best genome>\n
//! ```
//!
//! Gene records are versioned by their field list. A decoder picks the
//! version from the record's arity, so new fields can be appended in a
//! later version without breaking resume of older checkpoints.

/// Separator between fields of one gene record.
pub const FIELD_DELIMITER: char = ',';

/// Terminator written after every gene record.
pub const GENE_TERMINATOR: char = ';';

/// Prefix of the first checkpoint line.
pub const CHECKPOINT_HEADER: &str = "Generation:";

/// Separator between progress record columns.
pub const PROGRESS_DELIMITER: char = ' ';

/// Known gene record layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingVersion {
    /// Position and opaque RGB color: `x,y,r,g,b`.
    #[default]
    V1,
}

impl EncodingVersion {
    /// Version written by this build.
    pub const CURRENT: Self = Self::V1;

    /// Field names in record order.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            EncodingVersion::V1 => &["x", "y", "r", "g", "b"],
        }
    }

    /// Number of fields in one record.
    pub fn arity(self) -> usize {
        self.fields().len()
    }

    /// Resolve the version of a record from its field count.
    pub fn from_arity(arity: usize) -> Option<Self> {
        match arity {
            5 => Some(EncodingVersion::V1),
            _ => None,
        }
    }
}

/// Errors raised while decoding any of the text formats.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("gene record `{record}` has {found} fields, expected {expected}")]
    Arity {
        record: String,
        found: usize,
        expected: usize,
    },
    #[error("gene field `{field}` has invalid value `{value}`")]
    InvalidField { field: &'static str, value: String },
    #[error("empty gene record at position {index}")]
    EmptyRecord { index: usize },
    #[error("expected `Generation: <n>` header, found `{line}`")]
    Header { line: String },
    #[error("progress record column `{column}` has invalid value `{value}`")]
    ProgressColumn { column: &'static str, value: String },
    #[error("progress record `{line}` has {found} columns, expected 4")]
    ProgressArity { line: String, found: usize },
    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    /// Attach a 1-based line number to this error.
    pub fn at_line(self, line: usize) -> Self {
        ParseError::Line {
            line,
            source: Box::new(self),
        }
    }
}
