//! Debugging helpers
//!
//! [`TreePrinter`] renders a compiled pattern as an indented tree, one
//! node per line.
//!
//! ```
//! use syntax_pattern::engine::compiler::compile;
//! use syntax_pattern::engine::debug::TreePrinter;
//! use syntax_pattern::engine::types::TypeRegistry;
//!
//! let node = compile("hi [there]", &TypeRegistry::with_defaults()).unwrap();
//! let tree = TreePrinter::new().print(&node);
//! assert_eq!(tree, "sequence\n  literal \"hi \"\n  optional\n    literal \"there\"\n");
//! ```

use super::ast::PatternNode;
use std::fmt;

/// Pretty-printer for pattern trees
pub struct TreePrinter {
    /// Indentation string
    indent: String,
    /// Maximum depth to print
    max_depth: Option<usize>,
}

impl TreePrinter {
    /// Create a new tree printer
    pub fn new() -> Self {
        Self {
            indent: "  ".to_string(),
            max_depth: None,
        }
    }

    /// Set the indentation string
    pub fn indent(mut self, indent: &str) -> Self {
        self.indent = indent.to_string();
        self
    }

    /// Set the maximum depth to print
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Print a pattern tree
    pub fn print(&self, node: &PatternNode) -> String {
        self.display(node).to_string()
    }

    /// Wrap a pattern tree for use with `{}` formatting
    pub fn display<'a>(&'a self, node: &'a PatternNode) -> TreeDisplay<'a> {
        TreeDisplay {
            printer: self,
            node,
        }
    }

    fn print_node(
        &self,
        node: &PatternNode,
        depth: usize,
        output: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let indent = self.indent.repeat(depth);
        if self.max_depth.is_some_and(|max| depth > max) {
            return writeln!(output, "{}...", indent);
        }

        match node {
            PatternNode::Literal(text) => writeln!(output, "{}literal {:?}", indent, text),
            PatternNode::Sequence(children) => {
                writeln!(output, "{}sequence", indent)?;
                for child in children {
                    self.print_node(child, depth + 1, output)?;
                }
                Ok(())
            }
            PatternNode::Optional(inner) => {
                writeln!(output, "{}optional", indent)?;
                self.print_node(inner, depth + 1, output)
            }
            PatternNode::Choice(branches) => {
                writeln!(output, "{}choice", indent)?;
                let branch_indent = self.indent.repeat(depth + 1);
                for branch in branches {
                    if branch.mark == 0 {
                        writeln!(output, "{}branch", branch_indent)?;
                    } else {
                        writeln!(output, "{}branch (mark {})", branch_indent, branch.mark)?;
                    }
                    self.print_node(&branch.node, depth + 2, output)?;
                }
                Ok(())
            }
            PatternNode::Regex(regex) => writeln!(output, "{}regex <{}>", indent, regex.as_str()),
            PatternNode::Variable(slot) => {
                let types: Vec<String> = slot.types.iter().map(|ty| ty.display_name()).collect();
                write!(output, "{}variable {} [{}]", indent, slot, types.join(", "))?;
                if slot.nullable {
                    write!(output, " nullable")?;
                }
                writeln!(output)
            }
        }
    }
}

/// A pattern tree rendered by a [`TreePrinter`] when formatted
pub struct TreeDisplay<'a> {
    printer: &'a TreePrinter,
    node: &'a PatternNode,
}

impl fmt::Display for TreeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.printer.print_node(self.node, 0, f)
    }
}

impl Default for TreePrinter {
    fn default() -> Self {
        Self::new()
    }
}
