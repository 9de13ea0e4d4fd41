//! Prelude module for convenient imports
//!
//! This module re-exports the types most programs need to compile and
//! match patterns:
//!
//! ```
//! use syntax_pattern::prelude::*;
//! ```
//!
//! # Re-exported Items
//!
//! ## Patterns
//! - [`SyntaxPattern`] - Pattern text with its compiled tree
//! - [`PatternNode`] - Node of a compiled pattern
//! - [`Acceptance`] - Which values a variable slot takes
//!
//! ## Types
//! - [`TypeRegistry`] - Registry of the types slots may name
//! - [`TypeRef`] - A type as named in a slot
//! - [`TypeResolver`] - Trait resolving type names
//!
//! ## Matching
//! - [`PatternMatcher`] - Matcher over a compiled pattern
//! - [`MatcherConfig`] - Limits for a match attempt
//! - [`ExpressionResolver`] - Trait filling variable slots
//! - [`LiteralResolver`] - Resolver using the registry's literal parsers
//! - [`ParseResult`] - Outcome of a successful match
//!
//! ## Errors
//! - [`CompileError`] - Pattern compilation error
//! - [`MatchError`] - Why a match produced no result

// ============================================================================
// Patterns
// ============================================================================

pub use crate::engine::{Acceptance, PatternNode, SyntaxPattern};

// ============================================================================
// Types
// ============================================================================

pub use crate::engine::types::{TypeRef, TypeRegistry, TypeResolver};

// ============================================================================
// Matching
// ============================================================================

pub use crate::engine::matcher::{MatcherConfig, PatternMatcher};
pub use crate::engine::resolver::{ExpressionResolver, LiteralResolver};
pub use crate::engine::state::ParseResult;

// ============================================================================
// Errors
// ============================================================================

pub use crate::engine::error::{CompileError, MatchError};
