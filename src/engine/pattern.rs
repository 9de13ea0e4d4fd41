//! Compiled syntax patterns
//!
//! [`SyntaxPattern`] pairs the pattern text with its compiled tree and is
//! the usual entry point: compile once, match many lines.

use super::analysis::{PatternAnalyzer, PatternWarning};
use super::ast::PatternNode;
use super::compiler::compile;
use super::error::{CompileError, MatchError};
use super::matcher::PatternMatcher;
use super::resolver::ExpressionResolver;
use super::state::ParseResult;
use super::types::TypeResolver;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A pattern and its compiled tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxPattern {
    source: String,
    root: PatternNode,
}

impl SyntaxPattern {
    /// Compile `source`, resolving variable types through `types`
    ///
    /// # Example
    ///
    /// ```
    /// use syntax_pattern::engine::pattern::SyntaxPattern;
    /// use syntax_pattern::engine::resolver::LiteralResolver;
    /// use syntax_pattern::engine::types::TypeRegistry;
    ///
    /// let registry = TypeRegistry::with_defaults();
    /// let pattern = SyntaxPattern::compile("(enable|1¦disable) sound", &registry).unwrap();
    ///
    /// let result = pattern.parse("Disable sound", &LiteralResolver::new(&registry)).unwrap();
    /// assert_eq!(result.parse_mark, 1);
    /// ```
    pub fn compile<T: TypeResolver + ?Sized>(source: &str, types: &T) -> Result<Self, CompileError> {
        let root = compile(source, types)?;
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    /// Wrap an already built tree; the source is its serialization
    pub fn from_root(root: PatternNode) -> Self {
        Self {
            source: root.to_string(),
            root,
        }
    }

    /// The pattern text as given
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The compiled tree
    pub fn root(&self) -> &PatternNode {
        &self.root
    }

    /// The top-level elements, with sequences expanded
    pub fn flatten(&self) -> Vec<&PatternNode> {
        self.root.flatten()
    }

    /// A matcher over this pattern
    pub fn matcher<'r, R: ExpressionResolver + ?Sized>(
        &self,
        resolver: &'r R,
    ) -> PatternMatcher<'_, 'r, R> {
        PatternMatcher::new(&self.root, resolver)
    }

    /// One-shot match of the whole input with default limits
    pub fn parse<R: ExpressionResolver + ?Sized>(
        &self,
        input: &str,
        resolver: &R,
    ) -> Result<ParseResult<R::Value>, MatchError> {
        self.matcher(resolver).parse(input).map(|mut result| {
            result.pattern.clone_from(&self.source);
            result
        })
    }

    /// Check the pattern for likely mistakes
    pub fn analyze_warnings(&self) -> Vec<PatternWarning> {
        PatternAnalyzer::new(&self.root).analyze()
    }

    /// Serialize to JSON
    #[inline]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON
    #[inline]
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Writes the re-serialized tree, not the original text
impl fmt::Display for SyntaxPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}
