//! Pattern compiler
//!
//! Turns pattern text into a [`PatternNode`] tree by recursive descent.
//!
//! # Grammar
//!
//! | syntax | node |
//! |---|---|
//! | `text` | literal, matched case-insensitively |
//! | `[...]` | optional group |
//! | `[1¦...]` | optional group whose content carries parse mark 1 |
//! | `(a\|b)` | choice group; each branch may start with `mark¦` |
//! | `<regex>` | regex group |
//! | `%type%`, `%~a/b%`, `%*type%`, `%-type%` | variable slot |
//! | `\c` | the literal character `c` |
//! | `a\|b` at top level | same as `(a\|b)` |
//!
//! # Example
//!
//! ```
//! use syntax_pattern::engine::compiler::compile;
//! use syntax_pattern::engine::types::TypeRegistry;
//! use syntax_pattern::engine::ast::PatternNode;
//!
//! let registry = TypeRegistry::with_defaults();
//! let node = compile("[optional]", &registry).unwrap();
//! assert_eq!(node, PatternNode::optional(PatternNode::literal("optional")));
//! ```

use super::ast::{Acceptance, ChoiceBranch, PatternNode, PatternRegex, VariableSlot};
use super::error::{CompileError, CompileErrorKind, GroupKind};
use super::regex_cache;
use super::scanner::{enclosed_text, split_alternatives, split_parse_mark, PARSE_MARK_SEPARATOR};
use super::types::TypeResolver;

/// Compiles pattern text against a type resolver
pub struct PatternCompiler<'r, R: TypeResolver + ?Sized> {
    resolver: &'r R,
}

impl<'r, R: TypeResolver + ?Sized> PatternCompiler<'r, R> {
    /// Create a compiler resolving variable types through `resolver`
    pub fn new(resolver: &'r R) -> Self {
        Self { resolver }
    }

    /// Compile a pattern
    ///
    /// # Returns
    /// * `Ok(PatternNode)` - the root of the compiled tree
    /// * `Err(CompileError)` - the first problem found; no partial tree
    pub fn compile(&self, pattern: &str) -> Result<PatternNode, CompileError> {
        let compilation = Compilation {
            pattern,
            resolver: self.resolver,
        };
        let node = compilation.compile_span(pattern, 0)?;
        log_debug!("Compiled pattern '{}' into a {}", pattern, node.kind_name());
        Ok(node)
    }
}

/// Compile a pattern with the given type resolver
pub fn compile<R: TypeResolver + ?Sized>(
    pattern: &str,
    resolver: &R,
) -> Result<PatternNode, CompileError> {
    PatternCompiler::new(resolver).compile(pattern)
}

/// State of one compile call: the full pattern (for error reports) and
/// the resolver. Spans are compiled with their byte offset in `pattern`.
struct Compilation<'a, R: TypeResolver + ?Sized> {
    pattern: &'a str,
    resolver: &'a R,
}

impl<'a, R: TypeResolver + ?Sized> Compilation<'a, R> {
    fn error(&self, position: usize, kind: CompileErrorKind) -> CompileError {
        CompileError::new(self.pattern, position, kind)
    }

    fn compile_span(&self, text: &str, base: usize) -> Result<PatternNode, CompileError> {
        if text.is_empty() {
            return Ok(PatternNode::Literal(String::new()));
        }

        let alternatives = split_alternatives(text);
        if alternatives.len() > 1 {
            return self.compile_choice(&alternatives, base);
        }

        let bytes = text.as_bytes();
        let mut elements = Vec::new();
        let mut literal = String::new();
        let mut i = 0;

        while i < text.len() {
            let position = base + i;
            match bytes[i] {
                b'[' => {
                    let inner = self.enclosed(text, i, base, GroupKind::Optional)?;
                    flush_literal(&mut literal, &mut elements);
                    if inner.is_empty() {
                        log_warn!(
                            "Empty optional group at index {} in pattern '{}'; escape the bracket to match it literally",
                            position,
                            self.pattern
                        );
                    }
                    let inner_base = position + 1;
                    let content = match split_parse_mark(inner) {
                        Some((digits, rest)) => {
                            let mark = self.parse_mark(digits, inner_base)?;
                            let rest_base = inner_base + digits.len() + PARSE_MARK_SEPARATOR.len_utf8();
                            let node = self.compile_span(rest, rest_base)?;
                            PatternNode::Choice(vec![ChoiceBranch::new(node, mark)])
                        }
                        None => self.compile_span(inner, inner_base)?,
                    };
                    elements.push(PatternNode::optional(content));
                    i += inner.len() + 2;
                }
                b'(' => {
                    let inner = self.enclosed(text, i, base, GroupKind::Choice)?;
                    flush_literal(&mut literal, &mut elements);
                    let parts = split_alternatives(inner);
                    elements.push(self.compile_choice(&parts, position + 1)?);
                    i += inner.len() + 2;
                }
                b'<' => {
                    let inner = self.enclosed(text, i, base, GroupKind::Regex)?;
                    flush_literal(&mut literal, &mut elements);
                    if inner.is_empty() {
                        log_warn!(
                            "Empty regex group at index {} in pattern '{}'",
                            position,
                            self.pattern
                        );
                    }
                    let regex = regex_cache::get_or_compile(inner).map_err(|e| {
                        self.error(
                            position,
                            CompileErrorKind::InvalidRegex {
                                regex: inner.to_string(),
                                message: e.to_string(),
                            },
                        )
                    })?;
                    elements.push(PatternNode::Regex(PatternRegex::from_regex(regex)));
                    i += inner.len() + 2;
                }
                b'%' => {
                    // `%` both opens and closes, so there is no nesting
                    let close = text[i + 1..].find('%').map(|offset| i + 1 + offset).ok_or_else(|| {
                        self.error(
                            position,
                            CompileErrorKind::UnclosedGroup {
                                group: GroupKind::Variable,
                            },
                        )
                    })?;
                    flush_literal(&mut literal, &mut elements);
                    let slot = self.compile_variable(&text[i + 1..close], position)?;
                    elements.push(PatternNode::Variable(slot));
                    i = close + 1;
                }
                b'\\' => {
                    let escaped = text[i + 1..]
                        .chars()
                        .next()
                        .ok_or_else(|| self.error(position, CompileErrorKind::TrailingBackslash))?;
                    literal.push(escaped);
                    i += 1 + escaped.len_utf8();
                }
                found @ (b']' | b')' | b'>') => {
                    return Err(self.error(
                        position,
                        CompileErrorKind::UnmatchedClosing {
                            found: char::from(found),
                        },
                    ));
                }
                // Top-level `|` never reaches here: split_alternatives ran first.
                _ => {
                    let c = text[i..].chars().next().unwrap_or_default();
                    literal.push(c);
                    i += c.len_utf8();
                }
            }
        }

        flush_literal(&mut literal, &mut elements);
        Ok(PatternNode::sequence(elements))
    }

    fn enclosed<'t>(
        &self,
        text: &'t str,
        i: usize,
        base: usize,
        group: GroupKind,
    ) -> Result<&'t str, CompileError> {
        let open = group.opening() as u8;
        let close = match group {
            GroupKind::Optional => b']',
            GroupKind::Choice => b')',
            GroupKind::Regex => b'>',
            GroupKind::Variable => b'%',
        };
        enclosed_text(text, open, close, i)
            .ok_or_else(|| self.error(base + i, CompileErrorKind::UnclosedGroup { group }))
    }

    fn compile_choice(
        &self,
        parts: &[(usize, &str)],
        base: usize,
    ) -> Result<PatternNode, CompileError> {
        let mut branches = Vec::with_capacity(parts.len());
        for &(offset, part) in parts {
            let part_base = base + offset;
            if part.is_empty() {
                log_warn!(
                    "Empty choice at index {} in pattern '{}'; escape the vertical bar to match it literally",
                    part_base,
                    self.pattern
                );
            }
            let branch = match split_parse_mark(part) {
                Some((digits, rest)) => {
                    let mark = self.parse_mark(digits, part_base)?;
                    let rest_base = part_base + digits.len() + PARSE_MARK_SEPARATOR.len_utf8();
                    ChoiceBranch::new(self.compile_span(rest, rest_base)?, mark)
                }
                None => ChoiceBranch::new(self.compile_span(part, part_base)?, 0),
            };
            branches.push(branch);
        }
        Ok(PatternNode::Choice(branches))
    }

    fn parse_mark(&self, digits: &str, position: usize) -> Result<u32, CompileError> {
        digits.parse::<u32>().map_err(|_| {
            self.error(
                position,
                CompileErrorKind::InvalidParseMark {
                    mark: digits.to_string(),
                },
            )
        })
    }

    /// Parse `[-][~*]type(/type)*`
    fn compile_variable(&self, body: &str, position: usize) -> Result<VariableSlot, CompileError> {
        let malformed = || {
            self.error(
                position,
                CompileErrorKind::MalformedVariable {
                    text: body.to_string(),
                },
            )
        };

        let (nullable, rest) = match body.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, body),
        };
        let (acceptance, rest) = match rest.chars().next().and_then(Acceptance::from_sigil) {
            Some(acceptance) => (acceptance, &rest[1..]),
            None => (Acceptance::Both, rest),
        };
        if rest.is_empty() {
            return Err(malformed());
        }

        let mut types = Vec::new();
        for name in rest.split('/') {
            let valid = !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_');
            if !valid {
                return Err(malformed());
            }
            let ty = self.resolver.resolve_type(name).ok_or_else(|| {
                self.error(
                    position,
                    CompileErrorKind::UnknownType {
                        name: name.to_string(),
                    },
                )
            })?;
            types.push(ty);
        }

        Ok(VariableSlot {
            types,
            acceptance,
            nullable,
        })
    }
}

fn flush_literal(literal: &mut String, elements: &mut Vec<PatternNode>) {
    if !literal.is_empty() {
        elements.push(PatternNode::Literal(std::mem::take(literal)));
    }
}
