//! syntax-pattern - Pattern Compiler and Matcher for Syntax Declarations
//!
//! Scripting languages in the Skript family declare the syntax of each
//! statement with a small pattern language:
//!
//! ```text
//! give %number% [of] %items% to %player%
//! (enable|1¦disable) [the] sound
//! ```
//!
//! This crate provides:
//! - A compiler from pattern text to a [`PatternNode`] tree
//! - A type registry resolving `%type%` names, with plural handling
//! - A matcher that fills variable slots through a pluggable resolver
//! - Parse marks, regex groups and an immutable [`ParseResult`]
//! - Pattern warnings, tree printing and batch matching
//!
//! ## Quick Start
//!
//! ```rust
//! use syntax_pattern::prelude::*;
//!
//! let registry = TypeRegistry::with_defaults();
//! let pattern = SyntaxPattern::compile("say %string% [%number% times]", &registry).unwrap();
//!
//! let resolver = LiteralResolver::new(&registry);
//! let result = pattern.parse(r#"say "hi" 3 times"#, &resolver).unwrap();
//! assert_eq!(result.expressions.len(), 2);
//! assert_eq!(result.expressions[0].value, "hi");
//! ```
//!
//! ## Custom Resolvers
//!
//! Any `Fn(&str, &[TypeRef], Acceptance) -> Option<V>` closure can fill
//! variable slots:
//!
//! ```rust
//! use syntax_pattern::prelude::*;
//!
//! let registry = TypeRegistry::with_defaults();
//! let pattern = SyntaxPattern::compile("teleport to %string%", &registry).unwrap();
//!
//! let places = |text: &str, _types: &[TypeRef], _acceptance: Acceptance| {
//!     ["spawn", "home"].contains(&text).then(|| text.to_uppercase())
//! };
//! let result = pattern.parse("teleport to home", &places).unwrap();
//! assert_eq!(result.expressions, vec!["HOME".to_string()]);
//! ```
//!
//! ## Feature Flags
//!
//! - `logging` - Enable debug logging using the `log` crate
//! - `parallel` - Match batches of lines on rayon's thread pool

// Lint configuration for production quality
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all)]
#![allow(clippy::new_without_default)]
#![allow(clippy::module_inception)]

// Prelude module for convenient imports
pub mod prelude;

pub mod engine;

/// Re-export commonly used types for convenience
pub use engine::{
    // Diagnostics
    analysis::{PatternAnalyzer, PatternWarning, WarningKind},
    debug::{TreeDisplay, TreePrinter},
    // Errors
    error::{CompileError, CompileErrorKind, GroupKind, MatchError},
    // Matching
    matcher::{MatcherConfig, PatternMatcher},
    parallel::match_batch_parallel,
    resolver::{ExpressionResolver, LiteralResolver, ResolvedValue},
    state::{MatchState, ParseResult, RegexMatch},
    // Types
    types::{TypeId, TypeRef, TypeRegistry, TypeResolver},
    Acceptance,
    PatternNode,
    SyntaxPattern,
};
