//! Integration tests for pattern compilation
//!
//! These tests cover the pattern grammar, re-serialization, type
//! resolution and compile errors through the public API.

use syntax_pattern::engine::ast::{Acceptance, PatternNode};
use syntax_pattern::engine::compiler::{compile, PatternCompiler};
use syntax_pattern::engine::error::{CompileErrorKind, GroupKind};
use syntax_pattern::engine::types::{TypeId, TypeRef, TypeRegistry, TypeResolver};
use syntax_pattern::SyntaxPattern;

fn registry() -> TypeRegistry {
    TypeRegistry::with_defaults()
}

// ============================================================================
// Node Shapes
// ============================================================================

#[test]
fn test_plain_text_is_one_literal() {
    assert_eq!(
        compile("syntax", &registry()).unwrap(),
        PatternNode::literal("syntax")
    );
}

#[test]
fn test_optional_wraps_literal() {
    assert_eq!(
        compile("[optional]", &registry()).unwrap(),
        PatternNode::optional(PatternNode::literal("optional"))
    );
}

#[test]
fn test_choice_marks() {
    let node = compile("(first|1¦second)", &registry()).unwrap();
    let PatternNode::Choice(branches) = node else {
        panic!("expected a choice");
    };
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[0].mark, 0);
    assert_eq!(branches[1].mark, 1);
    assert_eq!(branches[1].node, PatternNode::literal("second"));
}

#[test]
fn test_sequence_in_encounter_order() {
    let node = compile("give %number% <[a-z]+> [now]", &registry()).unwrap();
    let kinds: Vec<&str> = node.flatten().iter().map(|n| n.kind_name()).collect();
    assert_eq!(
        kinds,
        vec!["literal", "variable", "literal", "regex", "literal", "optional"]
    );
}

#[test]
fn test_regex_serializes_back() {
    let node = compile("<.+>", &registry()).unwrap();
    assert!(matches!(node, PatternNode::Regex(_)));
    assert_eq!(node.to_string(), "<.+>");
}

// ============================================================================
// Variable Slots
// ============================================================================

#[test]
fn test_variable_default_acceptance() {
    let PatternNode::Variable(slot) = compile("%number%", &registry()).unwrap() else {
        panic!("expected a variable");
    };
    assert_eq!(slot.acceptance, Acceptance::Both);
    assert_eq!(slot.types.len(), 1);
    assert!(!slot.nullable);
}

#[test]
fn test_variable_literals_only_with_two_types() {
    let PatternNode::Variable(slot) = compile("%*number/string%", &registry()).unwrap() else {
        panic!("expected a variable");
    };
    assert_eq!(slot.acceptance, Acceptance::LiteralsOnly);
    let names: Vec<&str> = slot.types.iter().map(|t| t.base_name.as_str()).collect();
    assert_eq!(names, vec!["number", "string"]);
}

#[test]
fn test_variable_plural_spelling() {
    let PatternNode::Variable(slot) = compile("%booleans%", &registry()).unwrap() else {
        panic!("expected a variable");
    };
    assert_eq!(slot.types[0].name, "booleans");
    assert_eq!(slot.types[0].base_name, "boolean");
    assert!(!slot.types[0].single);
    assert_eq!(slot.types[0].display_name(), "booleans");
}

#[test]
fn test_custom_type_resolver_closure() {
    let resolver = |name: &str| {
        (name == "player").then(|| TypeRef {
            name: name.to_string(),
            base_name: name.to_string(),
            id: TypeId(7),
            single: true,
        })
    };
    let node = PatternCompiler::new(&resolver)
        .compile("kick %player%")
        .unwrap();
    assert_eq!(node.to_string(), "kick %player%");
    assert!(compile("kick %number%", &resolver).is_err());
}

#[test]
fn test_registered_type_with_irregular_plural() {
    let mut types = registry();
    types
        .register("child", "child|(?<plural>children)", None)
        .unwrap();
    let many = types.resolve_type("children").unwrap();
    assert!(!many.single);
    assert_eq!(many.display_name(), "children");
    let PatternNode::Variable(slot) = compile("%children%", &types).unwrap() else {
        panic!("expected a variable");
    };
    assert_eq!(slot.types[0], many);
}

// ============================================================================
// Compile Errors
// ============================================================================

#[test]
fn test_unclosed_choice() {
    let error = compile("(unclosed", &registry()).unwrap_err();
    assert_eq!(
        error.kind,
        CompileErrorKind::UnclosedGroup {
            group: GroupKind::Choice
        }
    );
    assert_eq!(error.position, 0);
}

#[test]
fn test_unfinished_variable() {
    let error = compile("%unfinished type", &registry()).unwrap_err();
    assert_eq!(
        error.kind,
        CompileErrorKind::UnclosedGroup {
            group: GroupKind::Variable
        }
    );
}

#[test]
fn test_trailing_backslash() {
    let error = compile("oops\\", &registry()).unwrap_err();
    assert_eq!(error.kind, CompileErrorKind::TrailingBackslash);
}

#[test]
fn test_unmatched_closing_bracket() {
    let error = compile("a] b", &registry()).unwrap_err();
    assert_eq!(error.kind, CompileErrorKind::UnmatchedClosing { found: ']' });
    assert_eq!(error.position, 1);
}

#[test]
fn test_error_rendering_points_at_problem() {
    let error = compile("say (hello", &registry()).unwrap_err();
    assert_eq!(
        error.to_string(),
        "Unclosed choice group at index 4 in pattern 'say (hello'"
    );
    let rendered = error.format_with_source();
    assert!(rendered.ends_with("say (hello\n    ^\n"));
}

// ============================================================================
// Re-serialization
// ============================================================================

#[test]
fn test_serialize_then_compile_is_stable() {
    let patterns = [
        "syntax",
        "[optional]",
        "(first|1¦second)",
        "say %number% [!]",
        "[4¦x] and (a|(b|2¦c)) <[0-9]+\\.?>",
        r"50\% \[off\] a\|b",
        "%-~number/strings% go|3¦stop",
        "[lookie, (another|1¦choice) !]",
        "",
        "(a|)",
    ];
    for pattern in patterns {
        let first = compile(pattern, &registry()).unwrap();
        let again = compile(&first.to_string(), &registry()).unwrap();
        assert_eq!(first, again, "pattern {:?} serialized as {:?}", pattern, first.to_string());
    }
}

#[test]
fn test_syntax_pattern_keeps_source() {
    let pattern = SyntaxPattern::compile("a|b", &registry()).unwrap();
    assert_eq!(pattern.source(), "a|b");
    assert_eq!(pattern.to_string(), "(a|b)");
    assert!(pattern.analyze_warnings().is_empty());
}
