//! Type table behavior as seen through a checked program.

use crate::utils::{node, type_check};
use cairn_ast::nodes::NodeKind;
use cairn_type_checker::type_info::{IntKind, TypeIndex, TypeTerm};

#[test]
fn test_equal_annotations_share_an_index() {
    let source = "(def a (Fn [U8] (I32, Bool)) f)\n(def f (Fn [U8] (I32, Bool)) a)";
    let typed_context = type_check(source);
    let types: Vec<TypeIndex> = typed_context
        .filter_nodes(|node| node.kind == NodeKind::FnType)
        .into_iter()
        .map(|index| typed_context.node_type(index))
        .collect();
    assert_eq!(types.len(), 2);
    assert_eq!(types[0], types[1]);
}

#[test]
fn test_string_annotation_is_the_builtin_slot() {
    let source = "(def s [U8] \"a\")\n(def t String \"b\")";
    let typed_context = type_check(source);
    for text in ["[U8]", "String"] {
        let kind = if text == "String" {
            NodeKind::TypeName
        } else {
            NodeKind::ListType
        };
        let index = node(&typed_context, source, kind, text);
        assert_eq!(typed_context.node_type(index), TypeIndex::STRING);
    }
}

#[test]
fn test_int_nodes_by_kind() {
    let source = "(def p (U16, I64) (1, 2))";
    let typed_context = type_check(source);
    let one = node(&typed_context, source, NodeKind::Int, "1");
    let two = node(&typed_context, source, NodeKind::Int, "2");
    assert!(typed_context.is_node_int(one, IntKind::U16));
    assert!(typed_context.is_node_int(two, IntKind::I64));
    assert!(!typed_context.is_node_int(two, IntKind::U64));
}

#[test]
fn test_function_parts() {
    let source = "(def f (Fn I8 Bool ()) g)\n(def g (Fn I8 Bool ()) f)";
    let typed_context = type_check(source);
    let binder = node(&typed_context, source, NodeKind::Binder, "f");
    let types = typed_context.types();
    let (params, ret) = types
        .function_parts(typed_context.node_type(binder))
        .expect("a function type");
    assert_eq!(params, [IntKind::I8.type_index(), TypeIndex::BOOL]);
    assert_eq!(ret, TypeIndex::UNIT);
    assert!(matches!(
        types.term(typed_context.node_type(binder)),
        TypeTerm::Function(_)
    ));
}

#[test]
fn test_deep_type_renders() {
    let depth = 10_000;
    let ty = format!("{}U8{}", "[".repeat(depth), "]".repeat(depth));
    let source = format!("(def x {ty} [])");
    let typed_context = type_check(&source);
    assert!(typed_context.is_success());
    let arena = typed_context.arena();
    let def = arena.children(arena.root())[0];
    assert_eq!(typed_context.render_node_type(def), ty);
}
