//! Boundary lookahead for variable slots
//!
//! A variable slot does not know how much input it covers. Before
//! resolving, the matcher asks what could come next in the pattern and
//! tries to end the slot right before each candidate in turn.

use super::ast::PatternNode;
use super::regex_cache;
use regex::Regex;
use std::fmt;

/// Regex standing in for a following variable slot: any non-empty text
pub const ANY_TEXT: &str = ".+";

/// A place where a variable slot may end
#[derive(Clone)]
pub enum Boundary<'p> {
    /// Literal text as written in the pattern, found case-insensitively
    Literal(&'p str),
    /// Any match of the regex
    Regex(Regex),
    /// The end of the input
    EndOfLine,
}

impl Boundary<'_> {
    /// Whether this is the end-of-line candidate
    pub fn is_end_of_line(&self) -> bool {
        matches!(self, Boundary::EndOfLine)
    }
}

impl fmt::Debug for Boundary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Boundary::Regex(regex) => f.debug_tuple("Regex").field(&regex.as_str()).finish(),
            Boundary::EndOfLine => f.write_str("EndOfLine"),
        }
    }
}

impl PartialEq for Boundary<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Boundary::Literal(a), Boundary::Literal(b)) => a == b,
            (Boundary::Regex(a), Boundary::Regex(b)) => a.as_str() == b.as_str(),
            (Boundary::EndOfLine, Boundary::EndOfLine) => true,
            _ => false,
        }
    }
}

/// Candidate boundaries for a slot followed by `remainder`
///
/// Walks the remainder left to right:
/// - blank literals are skipped
/// - a literal or a regex is the last candidate
/// - a variable slot ends the walk with an [`ANY_TEXT`] regex
/// - an optional group adds its own candidates and the walk goes on
/// - a choice adds the candidates of every branch; the walk ends unless
///   some branch can match nothing
///
/// If the walk reaches the end, [`Boundary::EndOfLine`] is the last
/// candidate.
///
/// # Example
///
/// ```
/// use syntax_pattern::engine::compiler::compile;
/// use syntax_pattern::engine::lookahead::{possible_next_boundaries, Boundary};
/// use syntax_pattern::engine::types::TypeRegistry;
///
/// let node = compile("[!] or %number%", &TypeRegistry::with_defaults()).unwrap();
/// let boundaries = possible_next_boundaries(&node.flatten());
/// assert_eq!(boundaries[0], Boundary::Literal("!"));
/// assert_eq!(boundaries[1], Boundary::Literal(" or "));
/// assert_eq!(boundaries.len(), 2);
/// ```
pub fn possible_next_boundaries<'p>(remainder: &[&'p PatternNode]) -> Vec<Boundary<'p>> {
    let mut boundaries = Vec::new();
    if !collect(remainder.iter().copied(), &mut boundaries) {
        boundaries.push(Boundary::EndOfLine);
    }
    boundaries
}

/// Append candidates; `true` if some node is certain to consume input
fn collect<'p>(
    nodes: impl Iterator<Item = &'p PatternNode>,
    out: &mut Vec<Boundary<'p>>,
) -> bool {
    for node in nodes {
        match node {
            PatternNode::Literal(text) => {
                if text.trim().is_empty() {
                    continue;
                }
                out.push(Boundary::Literal(text));
                return true;
            }
            PatternNode::Regex(regex) => {
                out.push(Boundary::Regex(regex.regex().clone()));
                return true;
            }
            PatternNode::Variable(_) => {
                let any = regex_cache::get_or_compile(ANY_TEXT).expect("ANY_TEXT is a valid regex");
                out.push(Boundary::Regex(any));
                return true;
            }
            PatternNode::Sequence(children) => {
                if collect(children.iter(), out) {
                    return true;
                }
            }
            PatternNode::Optional(inner) => {
                collect(std::iter::once(inner.as_ref()), out);
            }
            PatternNode::Choice(branches) => {
                let mut every_branch_ends = true;
                for branch in branches {
                    every_branch_ends &= collect(std::iter::once(&branch.node), out);
                }
                if every_branch_ends {
                    return true;
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compiler::compile;
    use crate::engine::types::TypeRegistry;

    fn boundaries_of(pattern: &str) -> Vec<String> {
        let node = compile(pattern, &TypeRegistry::with_defaults()).unwrap();
        possible_next_boundaries(&node.flatten())
            .into_iter()
            .map(|b| match b {
                Boundary::Literal(text) => text.to_string(),
                Boundary::Regex(regex) => format!("<{}>", regex.as_str()),
                Boundary::EndOfLine => "$".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_optional_choices_then_literal() {
        assert_eq!(
            boundaries_of("[(this|that)] [(may be|is)] good"),
            vec!["this", "that", "may be", "is", " good"]
        );
    }

    #[test]
    fn test_nothing_follows() {
        assert_eq!(boundaries_of(" "), vec!["$"]);
        assert_eq!(possible_next_boundaries(&[]), vec![Boundary::EndOfLine]);
    }

    #[test]
    fn test_trailing_optional_keeps_end_of_line() {
        assert_eq!(boundaries_of(" [!]"), vec!["!", "$"]);
    }

    #[test]
    fn test_regex_and_variable() {
        assert_eq!(boundaries_of(" <\\d+> x"), vec!["<\\d+>"]);
        assert_eq!(boundaries_of(" %number%"), vec!["<.+>"]);
    }

    #[test]
    fn test_choice_with_empty_branch_continues() {
        assert_eq!(boundaries_of("(a|) b"), vec!["a", " b"]);
        assert_eq!(boundaries_of("(a|b) c"), vec!["a", "b"]);
    }
}
