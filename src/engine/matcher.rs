//! Pattern matcher
//!
//! Matches input lines against a compiled [`PatternNode`] tree.
//!
//! Matching is greedy: an optional group that matches is kept, and the
//! first matching choice branch wins, even if a later element then fails.
//! The only search happens inside variable slots, which try each boundary
//! candidate from [`possible_next_boundaries`] until the resolver accepts
//! the text in front of it and the rest of the pattern still matches after
//! it. A slot followed by another slot thus splits `"12 34"` into `12` and
//! `34` even though the resolver would also take `1`.
//!
//! Literals skip leading spaces and end where their trimmed text ends, so
//! spaces between words in a pattern are optional in the input:
//! `"say %number%"` accepts `"say2"`.
//!
//! A regex group searches the input from the current position (after
//! leading spaces) as if it started there: `^` anchors at that position.
//!
//! # Example
//!
//! ```
//! use syntax_pattern::engine::compiler::compile;
//! use syntax_pattern::engine::matcher::PatternMatcher;
//! use syntax_pattern::engine::resolver::LiteralResolver;
//! use syntax_pattern::engine::types::TypeRegistry;
//!
//! let registry = TypeRegistry::with_defaults();
//! let pattern = compile("set volume to %number% [percent]", &registry).unwrap();
//! let resolver = LiteralResolver::new(&registry);
//! let matcher = PatternMatcher::new(&pattern, &resolver);
//!
//! let result = matcher.parse("set volume to 80 percent").unwrap();
//! assert_eq!(result.expressions[0].value, 80);
//! ```

use super::ast::{PatternNode, VariableSlot};
use super::error::MatchError;
use super::lookahead::{possible_next_boundaries, Boundary};
use super::resolver::ExpressionResolver;
use super::scanner::{
    enclosed_text, find_ignore_case, next_char_boundary, skip_spaces, starts_with_ignore_case,
};
use super::state::{LimitKind, MatchState, ParseResult, RegexMatch};
use regex::Regex;

/// Default maximum input size (1 MiB)
pub const DEFAULT_MAX_INPUT_SIZE: usize = 1024 * 1024;

/// Default maximum nesting depth
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 256;

/// Default maximum number of visited nodes and resolver calls per attempt
pub const DEFAULT_MAX_STEPS: usize = 100_000;

/// Limits applied to a match attempt
///
/// A limit of 0 disables the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatcherConfig {
    /// Maximum input size in bytes
    pub max_input_size: usize,

    /// Maximum nesting depth of the matched tree
    pub max_recursion_depth: usize,

    /// Maximum nodes visited plus resolver calls
    pub max_steps: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl MatcherConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum input size
    pub fn with_max_input_size(mut self, size: usize) -> Self {
        self.max_input_size = size;
        self
    }

    /// Set the maximum nesting depth
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    /// Set the maximum number of steps
    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = steps;
        self
    }
}

/// What follows the node being matched, for slot lookahead
enum Follow<'a, 'p> {
    /// Nothing
    End,
    /// The rest of the flattened top-level pattern
    Flat(&'a [&'p PatternNode]),
    /// Later siblings in a sequence, then whatever follows the sequence
    Siblings {
        rest: &'p [PatternNode],
        parent: &'a Follow<'a, 'p>,
    },
}

impl<'p> Follow<'_, 'p> {
    /// Flattened list of every node after the current one
    fn remainder(&self) -> Vec<&'p PatternNode> {
        let mut nodes = Vec::new();
        let mut frame = self;
        loop {
            match *frame {
                Follow::End => break,
                Follow::Flat(rest) => {
                    nodes.extend_from_slice(rest);
                    break;
                }
                Follow::Siblings { rest, parent } => {
                    for node in rest {
                        node.flatten_into(&mut nodes);
                    }
                    frame = parent;
                }
            }
        }
        nodes
    }
}

/// Matches input against a compiled pattern
pub struct PatternMatcher<'p, 'r, R: ExpressionResolver + ?Sized> {
    pattern: &'p PatternNode,
    resolver: &'r R,
    config: MatcherConfig,
}

impl<'p, 'r, R: ExpressionResolver + ?Sized> PatternMatcher<'p, 'r, R> {
    /// Create a matcher with the default limits
    pub fn new(pattern: &'p PatternNode, resolver: &'r R) -> Self {
        Self {
            pattern,
            resolver,
            config: MatcherConfig::default(),
        }
    }

    /// Replace the limits
    pub fn with_config(mut self, config: MatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// The pattern being matched
    pub fn pattern(&self) -> &'p PatternNode {
        self.pattern
    }

    /// The active limits
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Match the whole input
    ///
    /// The pattern must cover the input up to trailing whitespace.
    ///
    /// # Returns
    /// * `Ok(ParseResult)` - the collected values, regex matches and parse mark
    /// * `Err(MatchError)` - no match, a partial match, or a limit was hit
    pub fn parse(&self, input: &str) -> Result<ParseResult<R::Value>, MatchError> {
        let max_size = self.config.max_input_size;
        if max_size > 0 && input.len() > max_size {
            return Err(MatchError::InputTooLarge {
                input_size: input.len(),
                max_size,
            });
        }

        let (end, state) = self.match_at(input, 0);
        match state.limit_hit() {
            Some(LimitKind::Depth) => {
                log_debug!("Depth limit hit matching '{}'", self.pattern);
                return Err(MatchError::RecursionLimitExceeded {
                    max_depth: self.config.max_recursion_depth,
                });
            }
            Some(LimitKind::Steps) => {
                log_debug!("Step limit hit matching '{}'", self.pattern);
                return Err(MatchError::StepLimitExceeded {
                    max_steps: self.config.max_steps,
                });
            }
            None => {}
        }

        let end = end.ok_or(MatchError::NoMatch)?;
        if end < input.trim_end().len() {
            return Err(MatchError::Incomplete {
                consumed: end,
                len: input.len(),
            });
        }
        Ok(state.into_result(self.pattern.to_string(), end))
    }

    /// Whether the pattern covers the whole input
    pub fn is_match(&self, input: &str) -> bool {
        self.parse(input).is_ok()
    }

    /// Match a prefix of `input` starting at `start`
    ///
    /// Elements of the flattened pattern are matched in turn; the state's
    /// cursor advances as each one begins. Returns the end offset, or
    /// `None`, along with the state of the attempt.
    pub fn match_at(&self, input: &str, start: usize) -> (Option<usize>, MatchState<R::Value>) {
        let mut state = MatchState::new();
        let end = self.match_elements(input, start, &mut state);
        (end, state)
    }

    fn match_elements(
        &self,
        input: &str,
        start: usize,
        state: &mut MatchState<R::Value>,
    ) -> Option<usize> {
        let elements = self.pattern.flatten();
        let mut pos = start;
        for (i, &element) in elements.iter().enumerate() {
            state.advance_cursor();
            let follow = Follow::Flat(&elements[i + 1..]);
            pos = self.match_with(element, input, pos, state, &follow)?;
        }
        if state.limit_hit().is_some() {
            return None;
        }
        Some(pos)
    }

    /// Match a single node on its own at `start`
    ///
    /// Variable slots inside `node` only look ahead within `node`.
    pub fn match_node(
        &self,
        node: &'p PatternNode,
        input: &str,
        start: usize,
        state: &mut MatchState<R::Value>,
    ) -> Option<usize> {
        self.match_with(node, input, start, state, &Follow::End)
    }

    fn match_with(
        &self,
        node: &'p PatternNode,
        input: &str,
        start: usize,
        state: &mut MatchState<R::Value>,
        follow: &Follow<'_, 'p>,
    ) -> Option<usize> {
        if !state.enter(self.config.max_recursion_depth, self.config.max_steps) {
            return None;
        }
        let end = match node {
            PatternNode::Literal(text) => {
                let pos = skip_spaces(input, start);
                starts_with_ignore_case(input, pos, text.trim())
            }
            PatternNode::Sequence(children) => {
                let mut pos = Some(start);
                for (i, child) in children.iter().enumerate() {
                    let Some(at) = pos else { break };
                    let follow = Follow::Siblings {
                        rest: &children[i + 1..],
                        parent: follow,
                    };
                    pos = self.match_with(child, input, at, state, &follow);
                }
                pos
            }
            PatternNode::Optional(inner) => {
                let checkpoint = state.checkpoint();
                match self.match_with(inner, input, start, state, follow) {
                    Some(end) => Some(end),
                    None => {
                        state.rollback(checkpoint);
                        Some(start)
                    }
                }
            }
            PatternNode::Choice(branches) => {
                let mut end = None;
                for branch in branches {
                    let checkpoint = state.checkpoint();
                    if let Some(found) = self.match_with(&branch.node, input, start, state, follow) {
                        state.add_mark(branch.mark);
                        end = Some(found);
                        break;
                    }
                    state.rollback(checkpoint);
                }
                end
            }
            PatternNode::Regex(regex) => {
                let from = skip_spaces(input, start);
                regex
                    .regex()
                    .captures(&input[from..])
                    .and_then(|captures| RegexMatch::from_captures(&captures, from))
                    .map(|found| {
                        let end = found.end;
                        state.add_regex_match(found);
                        end
                    })
            }
            PatternNode::Variable(slot) => self.match_variable(slot, input, start, state, follow),
        };
        state.exit();
        end
    }

    fn match_variable(
        &self,
        slot: &VariableSlot,
        input: &str,
        start: usize,
        state: &mut MatchState<R::Value>,
        follow: &Follow<'_, 'p>,
    ) -> Option<usize> {
        let pos = skip_spaces(input, start);
        let rest = follow.remainder();

        // A parenthesized sub-expression is taken as a whole
        if input[pos..].starts_with('(') {
            if let Some(inner) = enclosed_text(input, b'(', b')', pos) {
                let end = pos + inner.len() + 2;
                let (from, to) = trimmed_span(input, pos + 1, end - 1)?;
                return self
                    .try_span(slot, input, (from, to), end, state, &rest)
                    .then_some(end);
            }
        }

        for boundary in possible_next_boundaries(&rest) {
            log_debug!("Slot {} at {} trying boundary {:?}", slot, pos, boundary);
            match boundary {
                Boundary::EndOfLine => {
                    let (from, to) = trimmed_span(input, pos, input.len())?;
                    return self
                        .try_span(slot, input, (from, to), to, state, &rest)
                        .then_some(to);
                }
                Boundary::Literal(text) => {
                    let Some(found) = find_ignore_case(input, text, pos) else {
                        continue;
                    };
                    if let Some((from, to)) = trimmed_span(input, pos, found) {
                        if self.try_span(slot, input, (from, to), to, state, &rest) {
                            return Some(to);
                        }
                    }
                }
                Boundary::Regex(regex) => {
                    let mut search = pos;
                    while let Some(found) = find_from(&regex, input, search) {
                        if let Some((from, to)) = trimmed_span(input, pos, found) {
                            if self.try_span(slot, input, (from, to), to, state, &rest) {
                                return Some(to);
                            }
                        }
                        if state.limit_hit().is_some() || found >= input.len() {
                            break;
                        }
                        search = next_char_boundary(input, found);
                    }
                }
            }
            if state.limit_hit().is_some() {
                return None;
            }
        }
        None
    }

    /// Resolve `span` as the slot's value and check that `rest` still
    /// matches from `end`
    ///
    /// Leaves the state untouched when either step fails.
    fn try_span(
        &self,
        slot: &VariableSlot,
        input: &str,
        (from, to): (usize, usize),
        end: usize,
        state: &mut MatchState<R::Value>,
        rest: &[&'p PatternNode],
    ) -> bool {
        let checkpoint = state.checkpoint();
        if self.resolve_span(slot, input, from, to, state)
            && self.rest_matches(input, end, state, rest)
        {
            return true;
        }
        state.rollback(checkpoint);
        false
    }

    /// Whether `rest` matches in order from `start`; records nothing
    fn rest_matches(
        &self,
        input: &str,
        start: usize,
        state: &mut MatchState<R::Value>,
        rest: &[&'p PatternNode],
    ) -> bool {
        let checkpoint = state.checkpoint();
        let mut pos = Some(start);
        for (i, &node) in rest.iter().enumerate() {
            let Some(at) = pos else { break };
            pos = self.match_with(node, input, at, state, &Follow::Flat(&rest[i + 1..]));
        }
        state.rollback(checkpoint);
        pos.is_some()
    }

    /// Hand `input[from..to]` to the resolver, recording the value on success
    fn resolve_span(
        &self,
        slot: &VariableSlot,
        input: &str,
        from: usize,
        to: usize,
        state: &mut MatchState<R::Value>,
    ) -> bool {
        if !state.count_step(self.config.max_steps) {
            return false;
        }
        match self
            .resolver
            .resolve(&input[from..to], &slot.types, slot.acceptance)
        {
            Some(value) => {
                state.add_expression(value);
                true
            }
            None => false,
        }
    }
}

/// Start of the leftmost match of `regex` in `input[from..]`, with `^`
/// anchored at `from`
fn find_from(regex: &Regex, input: &str, from: usize) -> Option<usize> {
    regex.find(&input[from..]).map(|found| from + found.start())
}

/// Bounds of `input[from..to]` without surrounding whitespace, `None` if blank
fn trimmed_span(input: &str, from: usize, to: usize) -> Option<(usize, usize)> {
    let fragment = &input[from..to];
    let without_leading = fragment.trim_start();
    let start = to - without_leading.len();
    let trimmed = without_leading.trim_end();
    if trimmed.is_empty() {
        return None;
    }
    Some((start, start + trimmed.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ast::Acceptance;
    use crate::engine::compiler::compile;
    use crate::engine::types::{TypeRef, TypeRegistry};
    use std::cell::RefCell;

    fn digits(text: &str, _types: &[TypeRef], _acceptance: Acceptance) -> Option<u64> {
        text.parse().ok()
    }

    fn compiled(pattern: &str) -> PatternNode {
        compile(pattern, &TypeRegistry::with_defaults()).unwrap()
    }

    #[test]
    fn test_trimmed_span() {
        assert_eq!(trimmed_span("a  xy  b", 1, 7), Some((3, 5)));
        assert_eq!(trimmed_span("a    b", 1, 5), None);
    }

    #[test]
    fn test_literal_consumed_end() {
        let pattern = compiled("pattern [with optional]");
        let matcher = PatternMatcher::new(&pattern, &digits);
        assert_eq!(matcher.match_at("pattern", 0).0, Some(7));
        assert_eq!(matcher.match_at("pattern with optional", 0).0, Some(21));
    }

    #[test]
    fn test_literal_is_case_insensitive() {
        let pattern = compiled("Hello World");
        let matcher = PatternMatcher::new(&pattern, &digits);
        assert_eq!(matcher.match_at("hello WORLD", 0).0, Some(11));
    }

    #[test]
    fn test_regex_records_match() {
        let pattern = compiled("give <[0-9]+> apples");
        let matcher = PatternMatcher::new(&pattern, &digits);
        let result = matcher.parse("give 12 apples").unwrap();
        assert_eq!(result.regex_matches.len(), 1);
        assert_eq!(result.regex_matches[0].text, "12");
        assert_eq!(result.regex_matches[0].end, 7);
        assert_eq!(result.end, 14);
    }

    #[test]
    fn test_slot_stops_before_literal() {
        let pattern = compiled("add %number% to %number%");
        let matcher = PatternMatcher::new(&pattern, &digits);
        let result = matcher.parse("add 3 to 40").unwrap();
        assert_eq!(result.expressions, vec![3, 40]);
    }

    #[test]
    fn test_adjacent_slots_retry_split() {
        // "1" resolves but leaves "2 34" for the second slot
        let pattern = compiled("add %number% %number%");
        let matcher = PatternMatcher::new(&pattern, &digits);
        let result = matcher.parse("add 12 34").unwrap();
        assert_eq!(result.expressions, vec![12, 34]);
    }

    #[test]
    fn test_slot_split_checks_whole_rest() {
        let pattern = compiled("%number%%number% end");
        let matcher = PatternMatcher::new(&pattern, &digits);
        let result = matcher.parse("1234 end").unwrap();
        assert_eq!(result.expressions, vec![1, 234]);
        assert_eq!(matcher.parse("1234"), Err(MatchError::NoMatch));
    }

    #[test]
    fn test_spaces_between_words_are_optional() {
        let pattern = compiled("say %number%");
        let matcher = PatternMatcher::new(&pattern, &digits);
        assert_eq!(matcher.parse("say2").unwrap().expressions, vec![2]);

        let pattern = compiled("pattern [with optional]");
        let matcher = PatternMatcher::new(&pattern, &digits);
        assert_eq!(matcher.match_at("patternwith optional", 0).0, Some(20));
    }

    #[test]
    fn test_regex_caret_anchors_at_position() {
        let pattern = compiled("code <^[A-Z]+>");
        let matcher = PatternMatcher::new(&pattern, &digits);
        let result = matcher.parse("code ABC").unwrap();
        assert_eq!((result.regex_matches[0].start, result.regex_matches[0].end), (5, 8));
        assert_eq!(matcher.parse("code 1ABC"), Err(MatchError::NoMatch));
    }

    #[test]
    fn test_slot_in_optional_sees_following_siblings() {
        let pattern = compiled("wait [%number% ticks] now");
        let matcher = PatternMatcher::new(&pattern, &digits);
        let result = matcher.parse("wait 5 ticks now").unwrap();
        assert_eq!(result.expressions, vec![5]);
        let result = matcher.parse("wait now").unwrap();
        assert!(result.expressions.is_empty());
    }

    #[test]
    fn test_parenthesized_slot() {
        let pattern = compiled("print %number%");
        let matcher = PatternMatcher::new(&pattern, &digits);
        let result = matcher.parse("print ( 7 )").unwrap();
        assert_eq!(result.expressions, vec![7]);
        assert_eq!(result.end, 11);
    }

    #[test]
    fn test_resolver_never_sees_empty_text() {
        let seen = RefCell::new(Vec::new());
        let recording = |text: &str, _types: &[TypeRef], _acceptance: Acceptance| {
            seen.borrow_mut().push(text.to_string());
            Some(())
        };
        let pattern = compiled("%number% %number%");
        let matcher = PatternMatcher::new(&pattern, &recording);
        assert!(matcher.parse("1 2").is_ok());
        assert!(seen.borrow().iter().all(|text| !text.trim().is_empty()));
    }

    #[test]
    fn test_regex_boundary_takes_text_before_match() {
        let pattern = compiled("%number%<x+>");
        let matcher = PatternMatcher::new(&pattern, &digits);
        let result = matcher.parse("12xx").unwrap();
        assert_eq!(result.expressions, vec![12]);
        assert_eq!(result.regex_matches[0].text, "xx");
    }

    #[test]
    fn test_failed_optional_rolls_back() {
        let any_text = |text: &str, _types: &[TypeRef], _acceptance: Acceptance| {
            Some(text.to_string())
        };
        // The optional resolves "4" and picks the marked branch before failing on "c"
        let pattern = compiled("[%number% (a|1¦b) c] %number%");
        let matcher = PatternMatcher::new(&pattern, &any_text);
        let result = matcher.parse("4 b 9").unwrap();
        assert_eq!(result.expressions, vec!["4 b 9".to_string()]);
        assert_eq!(result.parse_mark, 0);
    }

    #[test]
    fn test_incomplete() {
        let pattern = compiled("hello");
        let matcher = PatternMatcher::new(&pattern, &digits);
        assert_eq!(
            matcher.parse("hello there"),
            Err(MatchError::Incomplete {
                consumed: 5,
                len: 11
            })
        );
        assert!(matcher.parse("hello  ").is_ok());
    }

    #[test]
    fn test_input_too_large() {
        let pattern = compiled("x");
        let matcher = PatternMatcher::new(&pattern, &digits)
            .with_config(MatcherConfig::new().with_max_input_size(4));
        assert_eq!(
            matcher.parse("xxxxx"),
            Err(MatchError::InputTooLarge {
                input_size: 5,
                max_size: 4
            })
        );
    }

    #[test]
    fn test_step_limit() {
        let pattern = compiled("a [b] [c] [d]");
        let matcher = PatternMatcher::new(&pattern, &digits)
            .with_config(MatcherConfig::new().with_max_steps(1));
        assert_eq!(
            matcher.parse("a b c d"),
            Err(MatchError::StepLimitExceeded { max_steps: 1 })
        );
    }

    #[test]
    fn test_recursion_limit() {
        let pattern = compiled("[[[[x]]]]");
        let matcher = PatternMatcher::new(&pattern, &digits)
            .with_config(MatcherConfig::new().with_max_recursion_depth(3));
        assert_eq!(
            matcher.parse("x"),
            Err(MatchError::RecursionLimitExceeded { max_depth: 3 })
        );
    }

    #[test]
    fn test_cursor_counts_top_level_elements() {
        let pattern = compiled("a %number% [b]");
        let matcher = PatternMatcher::new(&pattern, &digits);
        let (end, state) = matcher.match_at("a 1 b", 0);
        assert_eq!(end, Some(5));
        assert_eq!(state.cursor(), 4);
    }
}
