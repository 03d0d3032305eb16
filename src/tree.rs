//! Immutable view over a tagged sentence tree.
//!
//! The NLP tagger hands the extraction core each paragraph as a tree of
//! tagged spans. This module exposes that structure read-only: tag identity,
//! child order, and document-order neighbours. Character offsets are never
//! read, and nothing in this crate mutates a tree after construction.

use serde::{Deserialize, Serialize};

/// Tag vocabulary read by the extraction core.
///
/// The upstream tagger emits more tags than these; everything the core does
/// not inspect by identity arrives as [`Tag::Word`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// Sentence root.
    Sentence,
    /// A named chemical mention.
    Molecule,
    /// A chemical mention without a usable name ("the product", "the residue").
    UnnamedMolecule,
    /// A chemical-name span inside a mention.
    ChemicalName,
    /// An explicit textual back-reference to a compound ("compound 3a").
    ReferenceToCompound,
    /// A cross-reference to a numbered procedure ("the method of Example 2").
    Procedure,
    /// An amount/measurement span attached to a mention.
    Quantity,
    /// A mixture wrapper, e.g. a parenthesised second name after a compound.
    Mixture,
    /// An atmosphere phrase ("under nitrogen").
    AtmospherePhrase,
    /// Non-definite determiner ("a", "an").
    Determiner,
    /// The definite determiner "the".
    DefiniteDeterminer,
    /// Numeric token.
    Cardinal,
    /// Mixed alphanumeric token ("3a").
    AlphanumericCardinal,
    /// Identifier token (labels such as "IV-a").
    Identifier,
    /// "Example"-style qualifier word preceding a section label.
    ExampleQualifier,
    /// "Method"/"Step"-style qualifier word preceding a label.
    MethodQualifier,
    /// Opening bracket token.
    LeftBracket,
    /// Closing bracket token.
    RightBracket,
    /// Comma token.
    Comma,
    /// Colon token.
    Colon,
    /// Any other token.
    Word,
}

/// Index of a node within a [`TaggedTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct NodeData {
    tag: Tag,
    token: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An immutable arena-backed tagged tree for one paragraph or span.
#[derive(Debug, Clone)]
pub struct TaggedTree {
    nodes: Vec<NodeData>,
}

impl TaggedTree {
    /// Build a tree from a [`NodeSpec`] description.
    pub fn new(root: NodeSpec) -> Self {
        let mut tree = TaggedTree { nodes: Vec::new() };
        tree.insert(root, None);
        tree
    }

    fn insert(&mut self, spec: NodeSpec, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            tag: spec.tag,
            token: spec.token,
            parent,
            children: Vec::new(),
        });
        for child in spec.children {
            let child_id = self.insert(child, Some(id));
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    /// The root node of this tree.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn tag(&self, id: NodeId) -> Tag {
        self.nodes[id.0].tag
    }

    /// The token text of a leaf node, if it carries one.
    pub fn token(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].token.as_deref()
    }

    /// All leaf tokens under `id` (including `id` itself when it is a leaf),
    /// space-joined in document order.
    pub fn value(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        self.collect_tokens(id, &mut parts);
        parts.join(" ")
    }

    fn collect_tokens<'t>(&'t self, id: NodeId, out: &mut Vec<&'t str>) {
        if let Some(token) = self.token(id) {
            out.push(token);
        }
        for &child in self.children(id) {
            self.collect_tokens(child, out);
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    fn sibling_offset(&self, id: NodeId, offset: isize) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&s| s == id)?;
        let target = pos as isize + offset;
        if target < 0 {
            return None;
        }
        siblings.get(target as usize).copied()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.sibling_offset(id, 1)
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.sibling_offset(id, -1)
    }

    /// The first leaf strictly after `id`'s subtree in document order.
    pub fn next_leaf(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            if let Some(sibling) = self.next_sibling(current) {
                return Some(self.first_leaf(sibling));
            }
            current = self.parent(current)?;
        }
    }

    /// The last leaf strictly before `id`'s subtree in document order.
    pub fn prev_leaf(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            if let Some(sibling) = self.prev_sibling(current) {
                return Some(self.last_leaf(sibling));
            }
            current = self.parent(current)?;
        }
    }

    fn first_leaf(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(&child) = self.children(current).first() {
            current = child;
        }
        current
    }

    fn last_leaf(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(&child) = self.children(current).last() {
            current = child;
        }
        current
    }

    /// Descendants of `id` (excluding `id` itself) carrying `tag`,
    /// in document order.
    pub fn descendants_with_tag(&self, id: NodeId, tag: Tag) -> Vec<NodeId> {
        self.descendants_with_tags(id, &[tag])
    }

    /// Descendants of `id` (excluding `id` itself) carrying any of `tags`,
    /// in document order.
    pub fn descendants_with_tags(&self, id: NodeId, tags: &[Tag]) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(id, tags, &mut out);
        out
    }

    fn collect_descendants(&self, id: NodeId, tags: &[Tag], out: &mut Vec<NodeId>) {
        for &child in self.children(id) {
            if tags.contains(&self.tag(child)) {
                out.push(child);
            }
            self.collect_descendants(child, tags, out);
        }
    }

    /// Direct children of `id` carrying any of `tags`, in document order.
    pub fn children_with_tags(&self, id: NodeId, tags: &[Tag]) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| tags.contains(&self.tag(child)))
            .collect()
    }

    pub fn first_child_with_tag(&self, id: NodeId, tag: Tag) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.tag(child) == tag)
    }
}

/// Declarative description of a node, used to construct trees at the tagger
/// boundary and in tests.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    tag: Tag,
    token: Option<String>,
    children: Vec<NodeSpec>,
}

/// A container node.
pub fn node(tag: Tag) -> NodeSpec {
    NodeSpec {
        tag,
        token: None,
        children: Vec::new(),
    }
}

/// A leaf token node.
pub fn token(tag: Tag, text: impl Into<String>) -> NodeSpec {
    NodeSpec {
        tag,
        token: Some(text.into()),
        children: Vec::new(),
    }
}

impl NodeSpec {
    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }
}
