//! Pattern AST
//!
//! A compiled pattern is a tree of [`PatternNode`]s. The variant set is
//! closed; matching dispatches on it exhaustively.
//!
//! `Display` re-serializes a node to the pattern mini-grammar. Compiling the
//! serialized text yields a structurally equal tree.

use super::scanner::PARSE_MARK_SEPARATOR;
use super::types::TypeRef;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Characters that have a meaning in the pattern grammar and must be
/// escaped inside literal text
pub const SPECIAL_CHARS: &[char] = &[
    '\\', '[', ']', '(', ')', '<', '>', '%', '|', PARSE_MARK_SEPARATOR,
];

/// A node of a compiled pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PatternNode {
    /// Text matched case-insensitively, tolerating leading spaces
    Literal(String),

    /// Children matched one after another
    Sequence(Vec<PatternNode>),

    /// Zero or one occurrence of the inner node; never fails
    Optional(Box<PatternNode>),

    /// First matching branch wins
    Choice(Vec<ChoiceBranch>),

    /// A regex searched from the current position
    Regex(PatternRegex),

    /// A typed hole filled by the expression resolver
    Variable(VariableSlot),
}

/// A branch of a choice group, with its parse mark (0 = no mark)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceBranch {
    /// The branch content
    pub node: PatternNode,
    /// Value XORed into the parse mark when this branch matches
    pub mark: u32,
}

impl ChoiceBranch {
    /// Create a branch
    pub fn new(node: PatternNode, mark: u32) -> Self {
        Self { node, mark }
    }
}

/// What kind of values a variable slot accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Acceptance {
    /// Literals and expressions (`%type%`)
    Both,
    /// Only expressions (`%~type%`)
    ExpressionsOnly,
    /// Only literals (`%*type%`)
    LiteralsOnly,
}

impl Acceptance {
    /// The sigil written before the type list, if any
    pub fn sigil(self) -> Option<char> {
        match self {
            Acceptance::Both => None,
            Acceptance::ExpressionsOnly => Some('~'),
            Acceptance::LiteralsOnly => Some('*'),
        }
    }

    /// Parse a sigil character
    pub fn from_sigil(c: char) -> Option<Self> {
        match c {
            '~' => Some(Acceptance::ExpressionsOnly),
            '*' => Some(Acceptance::LiteralsOnly),
            _ => None,
        }
    }

    /// Whether literal values are allowed
    pub fn allows_literals(self) -> bool {
        self != Acceptance::ExpressionsOnly
    }

    /// Whether computed expressions are allowed
    pub fn allows_expressions(self) -> bool {
        self != Acceptance::LiteralsOnly
    }
}

/// A variable slot (`%type%`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSlot {
    /// Candidate types, in declaration order (never empty)
    pub types: Vec<TypeRef>,
    /// Accepted value kind
    pub acceptance: Acceptance,
    /// Declared with `-`: the slot may resolve to nothing downstream
    pub nullable: bool,
}

/// A compiled regex that compares and serializes by its source text
#[derive(Clone)]
pub struct PatternRegex {
    regex: Regex,
}

impl PatternRegex {
    /// Compile a regex
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(|regex| Self { regex })
    }

    /// Wrap an already compiled regex
    pub fn from_regex(regex: Regex) -> Self {
        Self { regex }
    }

    /// The regex source, as written between `<` and `>`
    #[inline]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// The compiled regex
    #[inline]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl PartialEq for PatternRegex {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Debug for PatternRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PatternRegex").field(&self.as_str()).finish()
    }
}

impl Serialize for PatternRegex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PatternRegex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        PatternRegex::new(&source).map_err(serde::de::Error::custom)
    }
}

impl PatternNode {
    /// Create a literal node
    pub fn literal(text: impl Into<String>) -> Self {
        PatternNode::Literal(text.into())
    }

    /// Create an optional node
    pub fn optional(inner: PatternNode) -> Self {
        PatternNode::Optional(Box::new(inner))
    }

    /// Create a choice from `(node, mark)` pairs
    pub fn choice(branches: impl IntoIterator<Item = (PatternNode, u32)>) -> Self {
        PatternNode::Choice(
            branches
                .into_iter()
                .map(|(node, mark)| ChoiceBranch::new(node, mark))
                .collect(),
        )
    }

    /// Create a sequence, collapsing a single element to itself
    pub fn sequence(mut nodes: Vec<PatternNode>) -> Self {
        match nodes.len() {
            0 => PatternNode::Literal(String::new()),
            1 => nodes.remove(0),
            _ => PatternNode::Sequence(nodes),
        }
    }

    /// Flatten into the ordered list of non-sequence descendants
    ///
    /// Only sequences are expanded; every other node flattens to itself.
    pub fn flatten(&self) -> Vec<&PatternNode> {
        let mut flat = Vec::new();
        self.flatten_into(&mut flat);
        flat
    }

    /// Append the flattening of this node to `out`
    pub fn flatten_into<'a>(&'a self, out: &mut Vec<&'a PatternNode>) {
        match self {
            PatternNode::Sequence(children) => {
                for child in children {
                    child.flatten_into(out);
                }
            }
            other => out.push(other),
        }
    }

    /// Whether this is a literal containing only whitespace (or nothing)
    pub fn is_blank_literal(&self) -> bool {
        matches!(self, PatternNode::Literal(text) if text.trim().is_empty())
    }

    /// Short lowercase name of the node kind
    pub fn kind_name(&self) -> &'static str {
        match self {
            PatternNode::Literal(_) => "literal",
            PatternNode::Sequence(_) => "sequence",
            PatternNode::Optional(_) => "optional",
            PatternNode::Choice(_) => "choice",
            PatternNode::Regex(_) => "regex",
            PatternNode::Variable(_) => "variable",
        }
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    for c in text.chars() {
        if SPECIAL_CHARS.contains(&c) {
            f.write_str("\\")?;
        }
        write!(f, "{}", c)?;
    }
    Ok(())
}

fn write_branch(f: &mut fmt::Formatter<'_>, branch: &ChoiceBranch) -> fmt::Result {
    if branch.mark != 0 {
        write!(f, "{}{}", branch.mark, PARSE_MARK_SEPARATOR)?;
    }
    write!(f, "{}", branch.node)
}

impl fmt::Display for PatternNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternNode::Literal(text) => write_escaped(f, text),
            PatternNode::Sequence(children) => {
                for child in children {
                    write!(f, "{}", child)?;
                }
                Ok(())
            }
            PatternNode::Optional(inner) => match inner.as_ref() {
                // `[1¦text]` shorthand
                PatternNode::Choice(branches) if branches.len() == 1 && branches[0].mark != 0 => {
                    f.write_str("[")?;
                    write_branch(f, &branches[0])?;
                    f.write_str("]")
                }
                inner => write!(f, "[{}]", inner),
            },
            PatternNode::Choice(branches) => {
                f.write_str("(")?;
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write_branch(f, branch)?;
                }
                f.write_str(")")
            }
            PatternNode::Regex(regex) => write!(f, "<{}>", regex.as_str()),
            PatternNode::Variable(slot) => write!(f, "{}", slot),
        }
    }
}

impl fmt::Display for VariableSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("%")?;
        if self.nullable {
            f.write_str("-")?;
        }
        if let Some(sigil) = self.acceptance.sigil() {
            write!(f, "{}", sigil)?;
        }
        for (i, ty) in self.types.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(&ty.name)?;
        }
        f.write_str("%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::TypeId;

    fn type_ref(name: &str) -> TypeRef {
        TypeRef {
            name: name.to_string(),
            base_name: name.to_string(),
            id: TypeId(0),
            single: false,
        }
    }

    #[test]
    fn test_literal_display_escapes() {
        let node = PatternNode::literal("a [b] 50% (c|d)");
        assert_eq!(node.to_string(), r"a \[b\] 50\% \(c\|d\)");
    }

    #[test]
    fn test_choice_display_marks() {
        let node = PatternNode::choice([
            (PatternNode::literal("first"), 0),
            (PatternNode::literal("second"), 3),
        ]);
        assert_eq!(node.to_string(), "(first|3¦second)");
    }

    #[test]
    fn test_marked_optional_display() {
        let node = PatternNode::optional(PatternNode::choice([(PatternNode::literal("x"), 1)]));
        assert_eq!(node.to_string(), "[1¦x]");

        let plain = PatternNode::optional(PatternNode::choice([(PatternNode::literal("x"), 0)]));
        assert_eq!(plain.to_string(), "[(x)]");
    }

    #[test]
    fn test_variable_display() {
        let slot = VariableSlot {
            types: vec![type_ref("number"), type_ref("strings")],
            acceptance: Acceptance::LiteralsOnly,
            nullable: true,
        };
        assert_eq!(PatternNode::Variable(slot).to_string(), "%-*number/strings%");
    }

    #[test]
    fn test_flatten_only_expands_sequences() {
        let node = PatternNode::Sequence(vec![
            PatternNode::literal("a"),
            PatternNode::Sequence(vec![PatternNode::literal("b"), PatternNode::literal("c")]),
            PatternNode::optional(PatternNode::Sequence(vec![
                PatternNode::literal("d"),
                PatternNode::literal("e"),
            ])),
        ]);
        let flat = node.flatten();
        assert_eq!(flat.len(), 4);
        assert_eq!(flat[2], &PatternNode::literal("c"));
        assert!(matches!(flat[3], PatternNode::Optional(_)));
    }

    #[test]
    fn test_sequence_collapses() {
        assert_eq!(
            PatternNode::sequence(vec![PatternNode::literal("x")]),
            PatternNode::literal("x")
        );
        assert_eq!(PatternNode::sequence(Vec::new()), PatternNode::literal(""));
    }

    #[test]
    fn test_regex_equality_by_source() {
        let a = PatternRegex::new("[0-9]+").unwrap();
        let b = PatternRegex::new("[0-9]+").unwrap();
        let c = PatternRegex::new("[0-9]*").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_regex_serde() {
        let node = PatternNode::Regex(PatternRegex::new(r"\d+").unwrap());
        let json = serde_json::to_string(&node).unwrap();
        let back: PatternNode = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }

    #[test]
    fn test_acceptance_sigils() {
        assert_eq!(Acceptance::from_sigil('~'), Some(Acceptance::ExpressionsOnly));
        assert_eq!(Acceptance::from_sigil('*'), Some(Acceptance::LiteralsOnly));
        assert_eq!(Acceptance::from_sigil('-'), None);
        assert!(!Acceptance::ExpressionsOnly.allows_literals());
        assert!(Acceptance::Both.allows_literals() && Acceptance::Both.allows_expressions());
    }
}
