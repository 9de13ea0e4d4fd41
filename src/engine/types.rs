//! Type references and the type registry
//!
//! Variable slots name the types they accept (`%number%`, `%strings%`).
//! The compiler resolves each name through a [`TypeResolver`] into a
//! [`TypeRef`]. [`TypeRegistry`] is the stock resolver: it knows each
//! type's base name, a regex matching its accepted spellings (with an
//! optional `plural` capture group), and an optional literal parser.
//!
//! # Singular and plural
//!
//! A name equal to a registered base name resolves with `single == false`.
//! Any other spelling goes through the name patterns in registration order
//! and resolves with `single == true` unless the `plural` group took part
//! in the match. The first rule means `%number%` counts as plural while
//! `%numbers%` also counts as plural; the rule is kept as observed.
//!
//! # Example
//!
//! ```
//! use syntax_pattern::engine::types::{TypeRegistry, TypeResolver};
//!
//! let registry = TypeRegistry::with_defaults();
//! let numbers = registry.resolve_type("numbers").unwrap();
//! assert_eq!(numbers.base_name, "number");
//! assert!(!numbers.single);
//! ```

use ahash::RandomState;
use hashbrown::HashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque tag identifying a registered type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u32);

/// A type as referenced from a variable slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    /// The name as written in the pattern
    pub name: String,
    /// The registered base name
    pub base_name: String,
    /// Tag of the registered type
    pub id: TypeId,
    /// Whether the slot expects a single value
    pub single: bool,
}

impl TypeRef {
    /// Human readable name: the base name, pluralized when not single
    pub fn display_name(&self) -> String {
        if self.single {
            self.base_name.clone()
        } else {
            pluralize(&self.base_name)
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// English plural of a type base name
///
/// Not a general pluralizer; covers the regular suffixes and `child`.
pub fn pluralize(base: &str) -> String {
    if let Some(stem) = base.strip_suffix("child") {
        return format!("{}children", stem);
    }
    let sibilant = ["s", "ch", "sh", "x", "z"]
        .iter()
        .any(|suffix| base.ends_with(suffix));
    if sibilant {
        format!("{}es", base)
    } else {
        format!("{}s", base)
    }
}

/// Resolves type names written in patterns
///
/// Implemented by [`TypeRegistry`] and by any
/// `Fn(&str) -> Option<TypeRef>` closure.
pub trait TypeResolver {
    /// Resolve a type name, or `None` if it is unknown
    fn resolve_type(&self, name: &str) -> Option<TypeRef>;
}

impl<F> TypeResolver for F
where
    F: Fn(&str) -> Option<TypeRef>,
{
    fn resolve_type(&self, name: &str) -> Option<TypeRef> {
        self(name)
    }
}

/// Parses literal text for a type into a JSON value
pub type LiteralParser = fn(&str) -> Option<serde_json::Value>;

/// A registered type
#[derive(Debug, Clone)]
pub struct TypeInfo {
    /// Tag assigned at registration
    pub id: TypeId,
    /// The base name
    pub base_name: String,
    /// Anchored regex over accepted spellings
    pub pattern: Regex,
    /// Literal parser, if the type has literals
    pub literal_parser: Option<LiteralParser>,
}

impl TypeInfo {
    /// Whether the name pattern declares a `plural` group
    pub fn has_plural_group(&self) -> bool {
        self.pattern
            .capture_names()
            .flatten()
            .any(|name| name == "plural")
    }
}

/// Error raised while registering a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A type with the same base name already exists
    DuplicateType {
        /// The duplicated base name
        name: String,
    },
    /// The name pattern does not compile
    InvalidPattern {
        /// The base name being registered
        name: String,
        /// The regex error message
        message: String,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateType { name } => {
                write!(f, "Type '{}' is already registered", name)
            }
            RegistryError::InvalidPattern { name, message } => {
                write!(f, "Invalid name pattern for type '{}': {}", name, message)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Base name of the built-in number type
pub const NUMBER_TYPE: &str = "number";
/// Base name of the built-in string type
pub const STRING_TYPE: &str = "string";
/// Base name of the built-in boolean type
pub const BOOLEAN_TYPE: &str = "boolean";

/// Registry of the types patterns may reference
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: Vec<TypeInfo>,
    by_name: HashMap<String, usize, RandomState>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the `number`, `string` and `boolean` types
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let defaults: [(&str, &str, LiteralParser); 3] = [
            (NUMBER_TYPE, "number(?<plural>s)?", parse_number_literal),
            (STRING_TYPE, "string(?<plural>s)?", parse_string_literal),
            (BOOLEAN_TYPE, "boolean(?<plural>s)?", parse_boolean_literal),
        ];
        for (name, pattern, parser) in defaults {
            registry
                .register(name, pattern, Some(parser))
                .expect("built-in type patterns are valid and distinct");
        }
        registry
    }

    /// Register a type
    ///
    /// # Arguments
    /// * `base_name` - The canonical name
    /// * `pattern` - Regex over accepted spellings; it is anchored on both
    ///   ends. Put the plural suffix in a group named `plural`.
    /// * `literal_parser` - Optional parser for literals of this type
    pub fn register(
        &mut self,
        base_name: &str,
        pattern: &str,
        literal_parser: Option<LiteralParser>,
    ) -> Result<TypeId, RegistryError> {
        if self.by_name.contains_key(base_name) {
            return Err(RegistryError::DuplicateType {
                name: base_name.to_string(),
            });
        }
        let anchored = format!("^(?:{})$", pattern.trim());
        let pattern = Regex::new(&anchored).map_err(|e| RegistryError::InvalidPattern {
            name: base_name.to_string(),
            message: e.to_string(),
        })?;

        let id = TypeId(self.types.len() as u32);
        self.by_name.insert(base_name.to_string(), self.types.len());
        self.types.push(TypeInfo {
            id,
            base_name: base_name.to_string(),
            pattern,
            literal_parser,
        });
        Ok(id)
    }

    /// Get a type by its exact base name
    pub fn get_by_exact_name(&self, name: &str) -> Option<&TypeInfo> {
        self.by_name.get(name).map(|&idx| &self.types[idx])
    }

    /// Get the first type whose name pattern matches `name`
    pub fn get_by_name(&self, name: &str) -> Option<&TypeInfo> {
        self.types.iter().find(|info| info.pattern.is_match(name))
    }

    /// Get a type by tag
    pub fn get(&self, id: TypeId) -> Option<&TypeInfo> {
        self.types.get(id.0 as usize)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no type is registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over registered types in registration order
    pub fn iter(&self) -> impl Iterator<Item = &TypeInfo> {
        self.types.iter()
    }

    fn type_ref(&self, info: &TypeInfo, name: &str, single: bool) -> TypeRef {
        TypeRef {
            name: name.to_string(),
            base_name: info.base_name.clone(),
            id: info.id,
            single,
        }
    }
}

impl TypeResolver for TypeRegistry {
    fn resolve_type(&self, name: &str) -> Option<TypeRef> {
        if let Some(info) = self.get_by_exact_name(name) {
            return Some(self.type_ref(info, name, false));
        }
        self.types.iter().find_map(|info| {
            let captures = info.pattern.captures(name)?;
            let plural = captures.name("plural").is_some();
            Some(self.type_ref(info, name, !plural))
        })
    }
}

fn parse_number_literal(text: &str) -> Option<serde_json::Value> {
    if let Ok(n) = text.parse::<i64>() {
        return Some(serde_json::Value::from(n));
    }
    let f = text.parse::<f64>().ok()?;
    serde_json::Number::from_f64(f).map(serde_json::Value::Number)
}

fn parse_string_literal(text: &str) -> Option<serde_json::Value> {
    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    if inner.contains('"') {
        return None;
    }
    Some(serde_json::Value::String(inner.to_string()))
}

fn parse_boolean_literal(text: &str) -> Option<serde_json::Value> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Some(serde_json::Value::Bool(true)),
        "false" | "no" | "off" => Some(serde_json::Value::Bool(false)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_name_is_not_single() {
        let registry = TypeRegistry::with_defaults();
        let ty = registry.resolve_type("number").unwrap();
        assert_eq!(ty.base_name, "number");
        assert!(!ty.single);
    }

    #[test]
    fn test_plural_group_sets_plural() {
        let registry = TypeRegistry::with_defaults();
        let ty = registry.resolve_type("strings").unwrap();
        assert_eq!(ty.base_name, "string");
        assert_eq!(ty.name, "strings");
        assert!(!ty.single);
    }

    #[test]
    fn test_alternate_spelling_is_single() {
        let mut registry = TypeRegistry::new();
        registry
            .register("integer", "int(eger)?(?<plural>s)?", None)
            .unwrap();
        let ty = registry.resolve_type("int").unwrap();
        assert!(ty.single);
        assert!(!registry.resolve_type("ints").unwrap().single);
    }

    #[test]
    fn test_pattern_without_plural_group() {
        let mut registry = TypeRegistry::new();
        registry.register("party", "part(y|ies)", None).unwrap();
        let info = registry.get_by_exact_name("party").unwrap();
        assert!(!info.has_plural_group());
        assert!(registry.resolve_type("parties").unwrap().single);
    }

    #[test]
    fn test_unknown_type() {
        let registry = TypeRegistry::with_defaults();
        assert!(registry.resolve_type("entity").is_none());
        assert!(registry.resolve_type("numberss").is_none());
    }

    #[test]
    fn test_duplicate_and_invalid_registration() {
        let mut registry = TypeRegistry::with_defaults();
        assert_eq!(
            registry.register("number", "num", None),
            Err(RegistryError::DuplicateType {
                name: "number".to_string()
            })
        );
        assert!(matches!(
            registry.register("broken", "(unclosed", None),
            Err(RegistryError::InvalidPattern { .. })
        ));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("number"), "numbers");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("match"), "matches");
        assert_eq!(pluralize("child"), "children");
        assert_eq!(pluralize("grandchild"), "grandchildren");
    }

    #[test]
    fn test_display_name() {
        let registry = TypeRegistry::with_defaults();
        assert_eq!(registry.resolve_type("number").unwrap().display_name(), "numbers");
    }

    #[test]
    fn test_default_literal_parsers() {
        let registry = TypeRegistry::with_defaults();
        let number = registry.get_by_exact_name(NUMBER_TYPE).unwrap();
        let parse = number.literal_parser.unwrap();
        assert_eq!(parse("2"), Some(serde_json::json!(2)));
        assert_eq!(parse("2.5"), Some(serde_json::json!(2.5)));
        assert_eq!(parse("two"), None);

        let string = registry.get_by_exact_name(STRING_TYPE).unwrap();
        assert_eq!(
            (string.literal_parser.unwrap())("\"hi\""),
            Some(serde_json::json!("hi"))
        );

        let boolean = registry.get_by_exact_name(BOOLEAN_TYPE).unwrap();
        assert_eq!((boolean.literal_parser.unwrap())("TRUE"), Some(serde_json::json!(true)));
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |name: &str| {
            (name == "thing").then(|| TypeRef {
                name: name.to_string(),
                base_name: "thing".to_string(),
                id: TypeId(7),
                single: true,
            })
        };
        assert_eq!(resolver.resolve_type("thing").unwrap().id, TypeId(7));
        assert!(resolver.resolve_type("other").is_none());
    }
}
