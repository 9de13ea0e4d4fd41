//! Batch matching
//!
//! Matches one pattern against many independent lines. With the
//! `parallel` feature the lines are spread over rayon's thread pool;
//! without it they are matched in order on the calling thread. Either way
//! each line gets its own match state and results keep input order.
//!
//! ```toml
//! [dependencies]
//! syntax-pattern = { version = "0.1", features = ["parallel"] }
//! ```

use super::ast::PatternNode;
use super::error::MatchError;
use super::matcher::{MatcherConfig, PatternMatcher};
use super::resolver::ExpressionResolver;
use super::state::ParseResult;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Match every input against `pattern`
///
/// # Returns
/// Vector of results in the same order as inputs
///
/// # Example
///
/// ```
/// use syntax_pattern::engine::compiler::compile;
/// use syntax_pattern::engine::matcher::MatcherConfig;
/// use syntax_pattern::engine::parallel::match_batch_parallel;
/// use syntax_pattern::engine::resolver::LiteralResolver;
/// use syntax_pattern::engine::types::TypeRegistry;
///
/// let registry = TypeRegistry::with_defaults();
/// let pattern = compile("wait %number% seconds", &registry).unwrap();
/// let resolver = LiteralResolver::new(&registry);
///
/// let results = match_batch_parallel(
///     &pattern,
///     &["wait 1 seconds", "wait forever"],
///     &resolver,
///     MatcherConfig::default(),
/// );
/// assert!(results[0].is_ok());
/// assert!(results[1].is_err());
/// ```
#[cfg(feature = "rayon")]
pub fn match_batch_parallel<R>(
    pattern: &PatternNode,
    inputs: &[&str],
    resolver: &R,
    config: MatcherConfig,
) -> Vec<Result<ParseResult<R::Value>, MatchError>>
where
    R: ExpressionResolver + Sync + ?Sized,
    R::Value: Send,
{
    let matcher = PatternMatcher::new(pattern, resolver).with_config(config);
    inputs.par_iter().map(|input| matcher.parse(input)).collect()
}

/// Match every input against `pattern` (sequential fallback)
#[cfg(not(feature = "rayon"))]
pub fn match_batch_parallel<R>(
    pattern: &PatternNode,
    inputs: &[&str],
    resolver: &R,
    config: MatcherConfig,
) -> Vec<Result<ParseResult<R::Value>, MatchError>>
where
    R: ExpressionResolver + Sync + ?Sized,
    R::Value: Send,
{
    let matcher = PatternMatcher::new(pattern, resolver).with_config(config);
    inputs.iter().map(|input| matcher.parse(input)).collect()
}
