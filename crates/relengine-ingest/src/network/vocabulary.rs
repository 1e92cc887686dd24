// Type column checks

use super::error::{FormatIssue, ParserError, Result, TypeField};
use super::manifest::FileDescriptor;
use super::rows::Row;
use std::collections::HashSet;

/// Closed set of permitted values for a file's type column
///
/// A descriptor with a type column but no vocabulary reads the column
/// without restricting it.
#[derive(Debug, Clone)]
pub struct TypeVocabulary<'a> {
    column: usize,
    field: TypeField,
    allowed: Option<HashSet<&'a str>>,
}

impl<'a> TypeVocabulary<'a> {
    /// Vocabulary configured for a descriptor, if it has a type column
    pub fn for_descriptor(descriptor: &'a FileDescriptor) -> Option<Self> {
        let column = descriptor.type_column?;
        let allowed = descriptor
            .vocabulary
            .as_ref()
            .map(|values| values.iter().map(String::as_str).collect());

        Some(Self {
            column,
            field: descriptor.role.type_field(),
            allowed,
        })
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn permits(&self, value: &str) -> bool {
        self.allowed
            .as_ref()
            .is_none_or(|allowed| allowed.contains(value))
    }

    /// Type value of `row`, or a format error naming the offending value
    pub fn check<'r>(&self, file: &str, row: &'r Row) -> Result<&'r str> {
        let value = row.get(self.column);
        if self.permits(value) {
            Ok(value)
        } else {
            Err(ParserError::format(
                file,
                row.line,
                FormatIssue::InvalidType {
                    field: self.field,
                    value: value.to_string(),
                },
            ))
        }
    }
}
