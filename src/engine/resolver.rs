//! Expression resolution for variable slots
//!
//! The matcher decides where a slot's text starts and ends; what the text
//! means is up to an [`ExpressionResolver`]. A resolver may be called many
//! times for one slot, once per boundary candidate, and must not rely on
//! being called only for the final fragment.

use super::ast::Acceptance;
use super::types::{TypeId, TypeRef, TypeRegistry};
use serde::{Deserialize, Serialize};

/// Turns a fragment of input into a value for a variable slot
///
/// Implemented for closures taking `(text, types, acceptance)`:
///
/// ```
/// use syntax_pattern::engine::ast::Acceptance;
/// use syntax_pattern::engine::resolver::ExpressionResolver;
/// use syntax_pattern::engine::types::TypeRef;
///
/// let digits = |text: &str, _types: &[TypeRef], _acceptance: Acceptance| {
///     text.parse::<u32>().ok()
/// };
/// assert_eq!(digits.resolve("42", &[], Acceptance::Both), Some(42));
/// ```
pub trait ExpressionResolver {
    /// The value produced for a resolved slot
    type Value;

    /// Resolve `text` as one of `types`, or `None` if it is not valid there
    fn resolve(&self, text: &str, types: &[TypeRef], acceptance: Acceptance)
        -> Option<Self::Value>;
}

impl<F, V> ExpressionResolver for F
where
    F: Fn(&str, &[TypeRef], Acceptance) -> Option<V>,
{
    type Value = V;

    #[inline]
    fn resolve(&self, text: &str, types: &[TypeRef], acceptance: Acceptance) -> Option<V> {
        self(text, types, acceptance)
    }
}

/// A literal parsed by [`LiteralResolver`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedValue {
    /// Tag of the type that accepted the text
    pub type_id: TypeId,
    /// Base name of that type
    pub type_name: String,
    /// The parsed value
    pub value: serde_json::Value,
}

/// Resolves slots by trying the literal parsers of their types
///
/// Types are tried in slot order; the first parser that accepts the text
/// wins. Slots that only take expressions (`%~type%`) never resolve.
#[derive(Debug, Clone, Copy)]
pub struct LiteralResolver<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> LiteralResolver<'r> {
    /// Create a resolver over `registry`
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }
}

impl ExpressionResolver for LiteralResolver<'_> {
    type Value = ResolvedValue;

    fn resolve(&self, text: &str, types: &[TypeRef], acceptance: Acceptance) -> Option<ResolvedValue> {
        if !acceptance.allows_literals() {
            return None;
        }
        types.iter().find_map(|ty| {
            let info = self.registry.get(ty.id)?;
            let value = (info.literal_parser?)(text)?;
            Some(ResolvedValue {
                type_id: info.id,
                type_name: info.base_name.clone(),
                value,
            })
        })
    }
}
