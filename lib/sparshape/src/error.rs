//! Error types for schema parsing and shape validation.
//!
//! Structural failures (lexing, parsing, unknown shape lookups) are surfaced
//! through the types below. Anything wrong with a candidate record relative
//! to a valid schema is never an error: it becomes a
//! [`Violation`](crate::Violation) inside a
//! [`ValidationReport`](crate::ValidationReport).

use std::fmt;

/// A position in a text i.e. a `line` number starting from 0, a `column`
/// number starting from 0 (in number of code points) and a global `offset`
/// starting from 0 (in number of bytes).
#[derive(Eq, PartialEq, Debug, Copy, Clone, Default)]
pub struct TextPosition {
    /// Line number, starting from 0.
    pub line: u64,
    /// Column number in code points, starting from 0.
    pub column: u64,
    /// Byte offset from the start of the input, starting from 0.
    pub offset: u64,
}

/// An error in the lexical structure of a schema text.
///
/// It is composed of a message and the position of the offending byte.
#[derive(Debug, thiserror::Error)]
pub struct SchemaSyntaxError {
    position: TextPosition,
    message: String,
}

impl SchemaSyntaxError {
    pub(crate) fn new(position: TextPosition, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }

    /// The position of the error inside of the input.
    #[inline]
    pub fn position(&self) -> TextPosition {
        self.position
    }

    /// The error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SchemaSyntaxError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Syntax error at line {} column {}: {}",
            self.position.line + 1,
            self.position.column + 1,
            self.message
        )
    }
}

/// An error raised while parsing a schema document.
///
/// It is either a lexical error ([`SchemaSyntaxError`]) or a grammar-level
/// failure carrying the line of the offending token.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct SchemaParseError {
    #[from]
    kind: SchemaParseErrorKind,
}

#[derive(Debug, thiserror::Error)]
enum SchemaParseErrorKind {
    #[error(transparent)]
    Syntax(#[from] SchemaSyntaxError),
    #[error("Parse error at line {}: {message}", .line + 1)]
    Grammar { line: u64, message: String },
}

impl SchemaParseError {
    pub(crate) fn grammar(line: u64, message: impl Into<String>) -> Self {
        SchemaParseErrorKind::Grammar {
            line,
            message: message.into(),
        }
        .into()
    }

    /// The line of the error, starting from 0.
    #[inline]
    pub fn line(&self) -> u64 {
        match &self.kind {
            SchemaParseErrorKind::Syntax(e) => e.position().line,
            SchemaParseErrorKind::Grammar { line, .. } => *line,
        }
    }

    /// The error message, without position information.
    #[inline]
    pub fn message(&self) -> &str {
        match &self.kind {
            SchemaParseErrorKind::Syntax(e) => e.message(),
            SchemaParseErrorKind::Grammar { message, .. } => message,
        }
    }
}

impl From<SchemaSyntaxError> for SchemaParseError {
    #[inline]
    fn from(error: SchemaSyntaxError) -> Self {
        SchemaParseErrorKind::Syntax(error).into()
    }
}

/// An error raised when starting a validation, before any constraint is
/// evaluated.
///
/// Data-level problems never surface here: they are encoded as violations in
/// the returned report.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShapeValidationError {
    /// The requested shape identifier is not defined in the schema.
    #[error("Shape not found in schema: {label}")]
    UnknownShape {
        /// The shape identifier that was looked up.
        label: String,
    },
}

impl ShapeValidationError {
    /// Creates an unknown shape error.
    pub fn unknown_shape(label: impl Into<String>) -> Self {
        Self::UnknownShape {
            label: label.into(),
        }
    }
}

/// Main error type, the union of parsing and validation failures.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShapeError {
    /// Error while parsing a schema document.
    #[error(transparent)]
    Parse(#[from] SchemaParseError),

    /// Error while starting a validation.
    #[error(transparent)]
    Validation(#[from] ShapeValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let error = SchemaSyntaxError::new(
            TextPosition {
                line: 2,
                column: 4,
                offset: 20,
            },
            "unterminated string",
        );
        assert_eq!(
            error.to_string(),
            "Syntax error at line 3 column 5: unterminated string"
        );
    }

    #[test]
    fn test_grammar_error_carries_line() {
        let error = SchemaParseError::grammar(4, "expected '{'");
        assert_eq!(error.line(), 4);
        assert_eq!(error.message(), "expected '{'");
        assert_eq!(error.to_string(), "Parse error at line 5: expected '{'");
    }

    #[test]
    fn test_syntax_error_converts_to_parse_error() {
        let syntax = SchemaSyntaxError::new(
            TextPosition {
                line: 1,
                column: 0,
                offset: 10,
            },
            "invalid character '^'",
        );
        let parse: SchemaParseError = syntax.into();
        assert_eq!(parse.line(), 1);
        assert_eq!(parse.message(), "invalid character '^'");
    }
}
