//! Pattern analysis and warnings
//!
//! Compiled patterns can be valid yet not do what the author meant:
//! - empty groups (`[]`, `(a|)`, `<>`)
//! - choice branches that can never be picked
//! - two variable slots with nothing between them to split on
//! - two branches of a choice with the same parse mark
//!
//! # Example
//!
//! ```
//! use syntax_pattern::engine::analysis::{PatternAnalyzer, WarningKind};
//! use syntax_pattern::engine::compiler::compile;
//! use syntax_pattern::engine::types::TypeRegistry;
//!
//! let node = compile("(on|on)", &TypeRegistry::with_defaults()).unwrap();
//! let warnings = PatternAnalyzer::new(&node).analyze();
//! assert_eq!(warnings[0].kind, WarningKind::UnreachableBranch);
//! ```

use super::ast::{ChoiceBranch, PatternNode};
use std::fmt;

/// Kind of pattern warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// A group or choice branch with no content
    EmptyGroup,

    /// A choice branch that an earlier branch always shadows
    ///
    /// Example: `(a|a)`, or any branch after an empty one in `(|a)`
    UnreachableBranch,

    /// Variable slots separated only by spaces
    ///
    /// The first slot takes the shortest text the resolver accepts that
    /// still lets the rest match, so a permissive resolver splits early
    /// and every split costs a trial match of the rest.
    AdjacentVariables,

    /// Two branches of one choice carry the same non-zero parse mark
    DuplicateMark,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGroup => write!(f, "empty group"),
            Self::UnreachableBranch => write!(f, "unreachable branch"),
            Self::AdjacentVariables => write!(f, "adjacent variables"),
            Self::DuplicateMark => write!(f, "duplicate parse mark"),
        }
    }
}

/// A pattern warning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternWarning {
    /// The kind of warning
    pub kind: WarningKind,
    /// Child indices leading from the root to the offending node
    pub path: Vec<usize>,
    /// Human-readable message
    pub message: String,
}

impl PatternWarning {
    /// Create a new warning
    pub fn new(kind: WarningKind, path: Vec<usize>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
        }
    }
}

impl fmt::Display for PatternWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[root")?;
        for index in &self.path {
            write!(f, "/{}", index)?;
        }
        write!(f, "] {}: {}", self.kind, self.message)
    }
}

/// Pattern analyzer
pub struct PatternAnalyzer<'a> {
    root: &'a PatternNode,
}

impl<'a> PatternAnalyzer<'a> {
    /// Create a new analyzer for the given tree
    pub fn new(root: &'a PatternNode) -> Self {
        Self { root }
    }

    /// Analyze the tree and return all warnings, in tree order
    pub fn analyze(&self) -> Vec<PatternWarning> {
        let mut warnings = Vec::new();
        let mut path = Vec::new();
        Self::walk(self.root, &mut path, &mut warnings);
        warnings
    }

    fn walk(node: &PatternNode, path: &mut Vec<usize>, warnings: &mut Vec<PatternWarning>) {
        match node {
            PatternNode::Literal(_) | PatternNode::Variable(_) => {}
            PatternNode::Regex(regex) => {
                if regex.as_str().is_empty() {
                    warnings.push(PatternWarning::new(
                        WarningKind::EmptyGroup,
                        path.clone(),
                        "regex group is empty and matches everywhere",
                    ));
                }
            }
            PatternNode::Sequence(children) => {
                Self::detect_adjacent_variables(children, path, warnings);
                for (i, child) in children.iter().enumerate() {
                    path.push(i);
                    Self::walk(child, path, warnings);
                    path.pop();
                }
            }
            PatternNode::Optional(inner) => {
                if inner.is_blank_literal() {
                    warnings.push(PatternWarning::new(
                        WarningKind::EmptyGroup,
                        path.clone(),
                        "optional group has no content",
                    ));
                }
                path.push(0);
                Self::walk(inner, path, warnings);
                path.pop();
            }
            PatternNode::Choice(branches) => {
                Self::detect_branch_problems(branches, path, warnings);
                for (i, branch) in branches.iter().enumerate() {
                    path.push(i);
                    Self::walk(&branch.node, path, warnings);
                    path.pop();
                }
            }
        }
    }

    fn detect_adjacent_variables(
        children: &[PatternNode],
        path: &[usize],
        warnings: &mut Vec<PatternWarning>,
    ) {
        let mut previous_slot: Option<usize> = None;
        for (i, child) in children.iter().enumerate() {
            match child {
                PatternNode::Variable(slot) => {
                    if let Some(previous) = previous_slot {
                        warnings.push(PatternWarning::new(
                            WarningKind::AdjacentVariables,
                            child_path(path, i),
                            format!("{} directly follows the slot at index {}", slot, previous),
                        ));
                    }
                    previous_slot = Some(i);
                }
                blank if blank.is_blank_literal() => {}
                _ => previous_slot = None,
            }
        }
    }

    fn detect_branch_problems(
        branches: &[ChoiceBranch],
        path: &[usize],
        warnings: &mut Vec<PatternWarning>,
    ) {
        let first_empty = branches.iter().position(|b| b.node.is_blank_literal());

        for (i, branch) in branches.iter().enumerate() {
            if branch.node.is_blank_literal() {
                warnings.push(PatternWarning::new(
                    WarningKind::EmptyGroup,
                    child_path(path, i),
                    "choice branch is empty",
                ));
            }

            let earlier = &branches[..i];
            if let Some(empty) = first_empty.filter(|&empty| empty < i) {
                warnings.push(PatternWarning::new(
                    WarningKind::UnreachableBranch,
                    child_path(path, i),
                    format!("branch '{}' comes after empty branch {}", branch.node, empty),
                ));
            } else if let Some(same) = earlier.iter().position(|b| b.node == branch.node) {
                warnings.push(PatternWarning::new(
                    WarningKind::UnreachableBranch,
                    child_path(path, i),
                    format!("branch '{}' repeats branch {}", branch.node, same),
                ));
            }

            if branch.mark != 0 {
                if let Some(same) = earlier.iter().position(|b| b.mark == branch.mark) {
                    warnings.push(PatternWarning::new(
                        WarningKind::DuplicateMark,
                        child_path(path, i),
                        format!("mark {} is also used by branch {}", branch.mark, same),
                    ));
                }
            }
        }
    }
}

fn child_path(path: &[usize], index: usize) -> Vec<usize> {
    let mut child = path.to_vec();
    child.push(index);
    child
}
