use crate::nodes::{Node, NodeIndex, NodeKind, Span, SubRun};

/// Flat, append-only storage for syntax nodes.
///
/// Nodes are addressed by [`NodeIndex`]. A compound node owns a contiguous run of
/// `child_indices`; children are always created before their parent, so a tree
/// is built bottom-up and no node is ever moved or removed afterwards.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct Arena {
    nodes: Vec<Node>,
    child_indices: Vec<NodeIndex>,
    root: Option<NodeIndex>,
}

impl Arena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            child_indices: Vec::with_capacity(nodes),
            root: None,
        }
    }

    /// Appends a node whose children are `children`, in order.
    ///
    /// # Panics
    ///
    /// Panics if a child index does not refer to an existing node, if a leaf kind is
    /// given children, or if the arena outgrows `u32` indices.
    pub fn new_node(&mut self, kind: NodeKind, span: Span, children: &[NodeIndex]) -> NodeIndex {
        assert!(
            !kind.is_leaf() || children.is_empty(),
            "leaf node `{kind}` cannot own children"
        );
        for child in children {
            assert!(
                child.index() < self.nodes.len(),
                "child {child} of `{kind}` does not exist in the arena"
            );
        }
        let subs = if children.is_empty() {
            SubRun::EMPTY
        } else {
            let start = u32::try_from(self.child_indices.len()).expect("child index overflow");
            self.child_indices.extend_from_slice(children);
            SubRun {
                start,
                len: u32::try_from(children.len()).expect("child count overflow"),
            }
        };
        let index = NodeIndex(u32::try_from(self.nodes.len()).expect("node index overflow"));
        self.nodes.push(Node { kind, span, subs });
        index
    }

    /// Marks `index` as the root of the tree.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn set_root(&mut self, index: NodeIndex) {
        assert!(index.index() < self.nodes.len(), "root {index} out of bounds");
        self.root = Some(index);
    }

    /// # Panics
    ///
    /// Panics if no root has been set.
    #[must_use]
    pub fn root(&self) -> NodeIndex {
        self.root.expect("arena has no root")
    }

    #[must_use]
    pub fn try_root(&self) -> Option<NodeIndex> {
        self.root
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index.index()]
    }

    #[must_use]
    pub fn kind(&self, index: NodeIndex) -> NodeKind {
        self.node(index).kind
    }

    #[must_use]
    pub fn span(&self, index: NodeIndex) -> Span {
        self.node(index).span
    }

    /// Children of `index` in source order; empty for leaves.
    #[must_use]
    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        &self.child_indices[self.node(index).subs.range()]
    }

    /// The `nth` child of `index`.
    ///
    /// # Panics
    ///
    /// Panics if the node has fewer than `nth + 1` children.
    #[must_use]
    pub fn child(&self, index: NodeIndex, nth: usize) -> NodeIndex {
        self.children(index)[nth]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        (0..self.nodes.len()).map(|i| NodeIndex(i as u32))
    }

    /// Indices of all nodes matching `fn_predicate`, in arena order.
    pub fn filter_nodes<T: Fn(&Node) -> bool>(&self, fn_predicate: T) -> Vec<NodeIndex> {
        self.indices()
            .filter(|index| fn_predicate(self.node(*index)))
            .collect()
    }

    /// First node, in arena order, whose kind is `kind` and whose span text equals
    /// `text`.
    #[must_use]
    pub fn find_by_text(&self, source: &str, kind: NodeKind, text: &str) -> Option<NodeIndex> {
        self.indices().find(|index| {
            let node = self.node(*index);
            node.kind == kind && node.span.text(source) == text
        })
    }
}
