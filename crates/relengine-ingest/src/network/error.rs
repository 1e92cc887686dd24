// Network parser errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParserError>;

/// Fatal errors raised by the network parser
///
/// Both kinds abort the current call. The display text is what callers
/// (and tests) match on, so the wording is fixed.
#[derive(Error, Debug)]
pub enum ParserError {
    /// Manifest missing or invalid, or a listed file is unusable
    #[error("{0}")]
    Configuration(String),

    /// A data file broke its structural or vocabulary rules
    #[error("{file} line {line}: {issue}")]
    Format {
        file: String,
        line: u64,
        issue: FormatIssue,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParserError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn format(file: impl Into<String>, line: u64, issue: FormatIssue) -> Self {
        Self::Format {
            file: file.into(),
            line,
            issue,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}

/// What was wrong with a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatIssue {
    ColumnCount { expected: usize, found: usize },
    InvalidType { field: TypeField, value: String },
    EmptyValue { column: usize },
    Malformed(String),
}

impl std::fmt::Display for FormatIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatIssue::ColumnCount { expected, found } => {
                write!(f, "expected {} cols, found {}", expected, found)
            },
            FormatIssue::InvalidType { field, value } => {
                write!(f, "invalid {} type: {}", field, value)
            },
            FormatIssue::EmptyValue { column } => {
                write!(f, "empty node identifier in column {}", column)
            },
            FormatIssue::Malformed(reason) => write!(f, "malformed record: {}", reason),
        }
    }
}

/// Which kind of type column a vocabulary guards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeField {
    Edge,
    Node,
}

impl std::fmt::Display for TypeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeField::Edge => write!(f, "edge"),
            TypeField::Node => write!(f, "node"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_messages() {
        let err = ParserError::format(
            "edges.tsv",
            6,
            FormatIssue::ColumnCount {
                expected: 5,
                found: 3,
            },
        );
        assert_eq!(err.to_string(), "edges.tsv line 6: expected 5 cols, found 3");
        assert!(err.is_format());

        let err = ParserError::format(
            "nodes.csv",
            5,
            FormatIssue::InvalidType {
                field: TypeField::Node,
                value: "Monkey".to_string(),
            },
        );
        assert_eq!(err.to_string(), "nodes.csv line 5: invalid node type: Monkey");
    }

    #[test]
    fn test_configuration_message_is_verbatim() {
        let err = ParserError::configuration("/data/edges.tsv: not a file");
        assert_eq!(err.to_string(), "/data/edges.tsv: not a file");
        assert!(err.is_configuration());
    }
}
