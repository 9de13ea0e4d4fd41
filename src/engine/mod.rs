//! Pattern engine
//!
//! Compiles syntax patterns into a [`PatternNode`] tree and matches input
//! lines against them.
//!
//! # Pipeline
//!
//! 1. [`compiler`] parses the pattern text, resolving variable types
//!    through a [`TypeResolver`] such as [`TypeRegistry`]
//! 2. [`matcher`] walks the tree against an input line; variable slots
//!    are sized by [`lookahead`] and filled by an [`ExpressionResolver`]
//! 3. a successful match is frozen into a [`ParseResult`]

/// Logging macros - no-ops unless the `logging` feature is enabled
#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "logging"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logging")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

pub mod analysis;
pub mod ast;
pub mod compiler;
pub mod debug;
pub mod error;
pub mod lookahead;
pub mod matcher;
pub mod parallel;
pub mod pattern;
pub mod regex_cache;
pub mod resolver;
pub mod scanner;
pub mod state;
pub mod types;

pub use analysis::{PatternAnalyzer, PatternWarning, WarningKind};
pub use ast::{Acceptance, ChoiceBranch, PatternNode, PatternRegex, VariableSlot};
pub use compiler::{compile, PatternCompiler};
pub use debug::{TreeDisplay, TreePrinter};
pub use error::{CompileError, CompileErrorKind, GroupKind, MatchError};
pub use lookahead::{possible_next_boundaries, Boundary};
pub use matcher::{MatcherConfig, PatternMatcher};
pub use parallel::match_batch_parallel;
pub use pattern::SyntaxPattern;
pub use resolver::{ExpressionResolver, LiteralResolver, ResolvedValue};
pub use state::{MatchState, ParseResult, RegexMatch};
pub use types::{TypeId, TypeInfo, TypeRef, TypeRegistry, TypeResolver};
