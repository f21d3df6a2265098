use cairn_ast::{arena::Arena, builder::Builder, nodes::NodeIndex, nodes::NodeKind};
use cairn_type_checker::{TypeCheckerBuilder, typed_context::TypedContext};

pub(crate) fn get_test_data_path() -> std::path::PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::env::current_dir().unwrap());
    manifest_dir.join("test_data").join("cairn")
}

pub(crate) fn build_ast(source: &str) -> Arena {
    Builder::new(source).build_ast().unwrap()
}

pub(crate) fn try_type_check(source: &str) -> anyhow::Result<TypedContext> {
    let arena = Builder::new(source).build_ast()?;
    Ok(TypeCheckerBuilder::build_typed_context(arena, source)?.typed_context())
}

pub(crate) fn type_check(source: &str) -> TypedContext {
    try_type_check(source).expect("source should parse")
}

/// Diagnostic codes in discovery order.
pub(crate) fn codes(typed_context: &TypedContext) -> Vec<&'static str> {
    typed_context
        .diagnostics()
        .iter()
        .map(|diagnostic| diagnostic.kind.code())
        .collect()
}

/// The first node of `kind` whose text is `text`.
pub(crate) fn node(
    typed_context: &TypedContext,
    source: &str,
    kind: NodeKind,
    text: &str,
) -> NodeIndex {
    typed_context
        .arena()
        .find_by_text(source, kind, text)
        .unwrap_or_else(|| panic!("no {kind} node `{text}`"))
}

/// Rendered type of the first node of `kind` whose text is `text`.
pub(crate) fn type_of(typed_context: &TypedContext, source: &str, kind: NodeKind, text: &str) -> String {
    typed_context.render_node_type(node(typed_context, source, kind, text))
}

/// Source text of the node a diagnostic points at.
pub(crate) fn diagnostic_text<'s>(
    typed_context: &TypedContext,
    source: &'s str,
    nth: usize,
) -> &'s str {
    let diagnostic = typed_context.diagnostics()[nth];
    typed_context.arena().span(diagnostic.node).text(source)
}
