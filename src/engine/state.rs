//! Per-attempt match state
//!
//! A [`MatchState`] is created right before a top-level match attempt and
//! owned by it. It collects what the attempt learns (parse mark, resolved
//! values, regex matches) and keeps the step and depth accounting used by
//! the matcher's limits. On success it is frozen into a [`ParseResult`].

use regex::Captures;
use serde::{Deserialize, Serialize};

/// A regex group match recorded during matching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexMatch {
    /// Byte offset where the match starts
    pub start: usize,
    /// Byte offset just after the match
    pub end: usize,
    /// The matched text
    pub text: String,
    /// Capture groups after group 0, `None` for groups that did not take part
    pub groups: Vec<Option<String>>,
}

impl RegexMatch {
    /// Build from captures taken on `input[offset..]`
    pub fn from_captures(captures: &Captures<'_>, offset: usize) -> Option<Self> {
        let whole = captures.get(0)?;
        Some(Self {
            start: offset + whole.start(),
            end: offset + whole.end(),
            text: whole.as_str().to_string(),
            groups: captures
                .iter()
                .skip(1)
                .map(|group| group.map(|m| m.as_str().to_string()))
                .collect(),
        })
    }
}

/// A limit that stopped a match attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    /// Nesting got deeper than `max_recursion_depth`
    Depth,
    /// More than `max_steps` nodes were visited
    Steps,
}

/// Position in the state's append-only lists, used to undo a failed branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    parse_mark: u32,
    expressions: usize,
    regex_matches: usize,
}

/// Mutable context of one match attempt
#[derive(Debug, Clone)]
pub struct MatchState<V> {
    cursor: usize,
    parse_mark: u32,
    expressions: Vec<V>,
    regex_matches: Vec<RegexMatch>,
    depth: usize,
    steps: usize,
    limit_hit: Option<LimitKind>,
}

impl<V> Default for MatchState<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MatchState<V> {
    /// Create a fresh state
    pub fn new() -> Self {
        Self {
            cursor: 0,
            parse_mark: 0,
            expressions: Vec::new(),
            regex_matches: Vec::new(),
            depth: 0,
            steps: 0,
            limit_hit: None,
        }
    }

    /// Index of the next element of the flattened top-level pattern
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Advance the cursor past the element that begins matching
    #[inline]
    pub fn advance_cursor(&mut self) {
        self.cursor += 1;
    }

    /// The accumulated parse mark
    #[inline]
    pub fn parse_mark(&self) -> u32 {
        self.parse_mark
    }

    /// Toggle the bits of `mark` into the parse mark
    #[inline]
    pub fn add_mark(&mut self, mark: u32) {
        self.parse_mark ^= mark;
    }

    /// Values resolved so far, in slot order
    pub fn expressions(&self) -> &[V] {
        &self.expressions
    }

    /// Record a resolved value
    pub fn add_expression(&mut self, value: V) {
        self.expressions.push(value);
    }

    /// Regex matches so far, in group order
    pub fn regex_matches(&self) -> &[RegexMatch] {
        &self.regex_matches
    }

    /// Record a regex match
    pub fn add_regex_match(&mut self, regex_match: RegexMatch) {
        self.regex_matches.push(regex_match);
    }

    /// Remember the current state of the lists and the parse mark
    #[inline]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            parse_mark: self.parse_mark,
            expressions: self.expressions.len(),
            regex_matches: self.regex_matches.len(),
        }
    }

    /// Drop everything recorded since `checkpoint`
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.parse_mark = checkpoint.parse_mark;
        self.expressions.truncate(checkpoint.expressions);
        self.regex_matches.truncate(checkpoint.regex_matches);
    }

    /// Enter a node, counting a step and a nesting level
    ///
    /// Returns `false` (and remembers why) when a limit is exceeded;
    /// 0 disables a limit.
    pub fn enter(&mut self, max_depth: usize, max_steps: usize) -> bool {
        if self.limit_hit.is_some() {
            return false;
        }
        self.depth += 1;
        self.steps += 1;
        if max_depth > 0 && self.depth > max_depth {
            self.limit_hit = Some(LimitKind::Depth);
        } else if max_steps > 0 && self.steps > max_steps {
            self.limit_hit = Some(LimitKind::Steps);
        }
        self.limit_hit.is_none()
    }

    /// Leave a node entered with [`enter`](Self::enter)
    #[inline]
    pub fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Count one resolver call against the step limit
    pub fn count_step(&mut self, max_steps: usize) -> bool {
        if self.limit_hit.is_some() {
            return false;
        }
        self.steps += 1;
        if max_steps > 0 && self.steps > max_steps {
            self.limit_hit = Some(LimitKind::Steps);
        }
        self.limit_hit.is_none()
    }

    /// Steps taken so far
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// The limit that stopped this attempt, if any
    pub fn limit_hit(&self) -> Option<LimitKind> {
        self.limit_hit
    }

    /// Freeze into an immutable result
    pub fn into_result(self, pattern: impl Into<String>, end: usize) -> ParseResult<V> {
        ParseResult {
            pattern: pattern.into(),
            end,
            parse_mark: self.parse_mark,
            expressions: self.expressions,
            regex_matches: self.regex_matches,
        }
    }
}

/// The outcome of a successful match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult<V> {
    /// The matched pattern, serialized
    pub pattern: String,
    /// Byte offset where matching stopped
    pub end: usize,
    /// The final parse mark
    pub parse_mark: u32,
    /// Resolved slot values, in slot order
    pub expressions: Vec<V>,
    /// Regex group matches, in group order
    pub regex_matches: Vec<RegexMatch>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_mark_is_xor() {
        let mut state: MatchState<()> = MatchState::new();
        state.add_mark(1);
        state.add_mark(2);
        assert_eq!(state.parse_mark(), 3);
        state.add_mark(1);
        assert_eq!(state.parse_mark(), 2);
    }

    #[test]
    fn test_rollback() {
        let mut state = MatchState::new();
        state.add_expression(1);
        let checkpoint = state.checkpoint();
        state.add_expression(2);
        state.add_mark(4);
        state.rollback(checkpoint);
        assert_eq!(state.expressions(), &[1]);
        assert_eq!(state.parse_mark(), 0);
    }

    #[test]
    fn test_depth_limit() {
        let mut state: MatchState<()> = MatchState::new();
        assert!(state.enter(2, 0));
        assert!(state.enter(2, 0));
        assert!(!state.enter(2, 0));
        assert_eq!(state.limit_hit(), Some(LimitKind::Depth));
        // Sticky once hit
        state.exit();
        state.exit();
        assert!(!state.enter(2, 0));
    }

    #[test]
    fn test_step_limit() {
        let mut state: MatchState<()> = MatchState::new();
        for _ in 0..3 {
            assert!(state.enter(0, 3));
            state.exit();
        }
        assert!(!state.count_step(3));
        assert_eq!(state.limit_hit(), Some(LimitKind::Steps));
    }

    #[test]
    fn test_regex_match_groups() {
        let regex = Regex::new(r"(\d+)(x)?").unwrap();
        let captures = regex.captures("ab 42").unwrap();
        let m = RegexMatch::from_captures(&captures, 0).unwrap();
        assert_eq!((m.start, m.end), (3, 5));
        assert_eq!(m.text, "42");

        let captures = regex.captures(&"ab 42"[3..]).unwrap();
        let m = RegexMatch::from_captures(&captures, 3).unwrap();
        assert_eq!((m.start, m.end), (3, 5));
        assert_eq!(m.text, "42");
        assert_eq!(m.groups, vec![Some("42".to_string()), None]);
    }

    #[test]
    fn test_into_result() {
        let mut state = MatchState::new();
        state.add_expression("v");
        state.add_mark(1);
        let result = state.into_result("say %number%", 5);
        assert_eq!(result.end, 5);
        assert_eq!(result.parse_mark, 1);
        assert_eq!(result.expressions, vec!["v"]);
    }
}
