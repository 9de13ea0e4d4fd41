//! Error types for pattern compilation and matching
//!
//! Compilation reports the offending pattern, the byte offset of the
//! problem and its kind. Matching itself fails silently; only the
//! top-level [`PatternMatcher::parse`](super::matcher::PatternMatcher::parse)
//! entry point turns a failure into a [`MatchError`].
//!
//! # Example Output
//!
//! ```text
//! Unclosed choice group at index 4 in pattern 'say (hello'
//! say (hello
//!     ^
//! ```

use std::fmt;

/// The kind of bracketed group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// `[...]`
    Optional,
    /// `(...)`
    Choice,
    /// `<...>`
    Regex,
    /// `%...%`
    Variable,
}

impl GroupKind {
    /// The opening delimiter
    pub fn opening(self) -> char {
        match self {
            GroupKind::Optional => '[',
            GroupKind::Choice => '(',
            GroupKind::Regex => '<',
            GroupKind::Variable => '%',
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKind::Optional => write!(f, "optional group"),
            GroupKind::Choice => write!(f, "choice group"),
            GroupKind::Regex => write!(f, "regex group"),
            GroupKind::Variable => write!(f, "variable declaration"),
        }
    }
}

/// What went wrong while compiling a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileErrorKind {
    /// A group has no matching closer
    UnclosedGroup {
        /// Which group
        group: GroupKind,
    },

    /// A closing bracket without an opener
    UnmatchedClosing {
        /// The bracket found
        found: char,
    },

    /// The body of a regex group does not compile
    InvalidRegex {
        /// The regex source
        regex: String,
        /// The regex error message
        message: String,
    },

    /// The body of a `%...%` declaration does not follow the grammar
    MalformedVariable {
        /// The text between the percent signs
        text: String,
    },

    /// A type name the resolver does not know
    UnknownType {
        /// The unknown name
        name: String,
    },

    /// The pattern ends with an unescaped backslash
    TrailingBackslash,

    /// A parse mark that does not fit a `u32`
    InvalidParseMark {
        /// The mark digits
        mark: String,
    },
}

impl fmt::Display for CompileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileErrorKind::UnclosedGroup { group } => write!(f, "Unclosed {}", group),
            CompileErrorKind::UnmatchedClosing { found } => {
                write!(f, "Unmatched closing bracket '{}'", found)
            }
            CompileErrorKind::InvalidRegex { regex, message } => {
                write!(f, "Invalid regex '{}': {}", regex, message)
            }
            CompileErrorKind::MalformedVariable { text } => {
                write!(f, "Invalid variable declaration '{}'", text)
            }
            CompileErrorKind::UnknownType { name } => write!(f, "Unknown type '{}'", name),
            CompileErrorKind::TrailingBackslash => {
                write!(f, "Backslash at the end of the pattern")
            }
            CompileErrorKind::InvalidParseMark { mark } => {
                write!(f, "Parse mark '{}' is out of range", mark)
            }
        }
    }
}

/// A pattern compilation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// The full pattern being compiled
    pub pattern: String,
    /// Byte offset of the problem in `pattern`
    pub position: usize,
    /// What went wrong
    pub kind: CompileErrorKind,
}

impl CompileError {
    /// Create a new error
    pub fn new(pattern: impl Into<String>, position: usize, kind: CompileErrorKind) -> Self {
        Self {
            pattern: pattern.into(),
            position,
            kind,
        }
    }

    /// Column of the error (1-based, in chars)
    pub fn column(&self) -> usize {
        let end = self.position.min(self.pattern.len());
        self.pattern
            .char_indices()
            .take_while(|(offset, _)| *offset < end)
            .count()
            + 1
    }

    /// Render the error with the pattern and a caret under the position
    pub fn format_with_source(&self) -> String {
        let mut output = String::new();
        output.push_str(&self.to_string());
        output.push('\n');
        output.push_str(&self.pattern);
        output.push('\n');
        for _ in 1..self.column() {
            output.push(' ');
        }
        output.push_str("^\n");
        output
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at index {} in pattern '{}'",
            self.kind, self.position, self.pattern
        )
    }
}

impl std::error::Error for CompileError {}

/// Why a top-level match attempt produced no result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// The pattern does not match the input
    NoMatch,

    /// The pattern matched a prefix only
    Incomplete {
        /// Bytes consumed by the match
        consumed: usize,
        /// Length of the input
        len: usize,
    },

    /// Input exceeds the configured maximum size
    InputTooLarge {
        /// Size of the input in bytes
        input_size: usize,
        /// Maximum allowed size
        max_size: usize,
    },

    /// Nesting depth limit exceeded
    RecursionLimitExceeded {
        /// Maximum allowed depth
        max_depth: usize,
    },

    /// Step limit exceeded
    StepLimitExceeded {
        /// Maximum allowed steps
        max_steps: usize,
    },
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::NoMatch => write!(f, "No match"),
            MatchError::Incomplete { consumed, len } => {
                write!(f, "Match incomplete: consumed {} of {} bytes", consumed, len)
            }
            MatchError::InputTooLarge {
                input_size,
                max_size,
            } => write!(
                f,
                "Input too large: {} bytes exceeds limit of {} bytes",
                input_size, max_size
            ),
            MatchError::RecursionLimitExceeded { max_depth } => {
                write!(f, "Recursion limit exceeded: depth limit is {}", max_depth)
            }
            MatchError::StepLimitExceeded { max_steps } => {
                write!(f, "Step limit exceeded: limit is {} steps", max_steps)
            }
        }
    }
}

impl std::error::Error for MatchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_error_display() {
        let error = CompileError::new(
            "say (hello",
            4,
            CompileErrorKind::UnclosedGroup {
                group: GroupKind::Choice,
            },
        );
        assert_eq!(
            error.to_string(),
            "Unclosed choice group at index 4 in pattern 'say (hello'"
        );
    }

    #[test]
    fn test_format_with_source_caret() {
        let error = CompileError::new("a ]", 2, CompileErrorKind::UnmatchedClosing { found: ']' });
        let formatted = error.format_with_source();
        let lines: Vec<&str> = formatted.lines().collect();
        assert_eq!(lines[1], "a ]");
        assert_eq!(lines[2], "  ^");
    }

    #[test]
    fn test_column_counts_chars() {
        let error = CompileError::new("é(", 2, CompileErrorKind::TrailingBackslash);
        assert_eq!(error.column(), 2);
    }

    #[test]
    fn test_match_error_display() {
        let error = MatchError::Incomplete {
            consumed: 3,
            len: 5,
        };
        assert_eq!(error.to_string(), "Match incomplete: consumed 3 of 5 bytes");
        assert_eq!(MatchError::NoMatch.to_string(), "No match");
    }
}
