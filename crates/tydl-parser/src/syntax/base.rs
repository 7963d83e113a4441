//! Base handle types for the syntax tree.

use serde::Serialize;

/// Index of a node in a `NodeArena`.
///
/// `NodeIndex` is the stable numeric identity of a node for the lifetime of a
/// compilation: it is dense, never reused, and never stored on the node
/// itself, so compiler phases key their side-tables by it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Sentinel for "no node" (absent optional child).
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == NodeIndex::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        self != NodeIndex::NONE
    }
}

impl Default for NodeIndex {
    fn default() -> Self {
        NodeIndex::NONE
    }
}

/// An ordered list of child nodes.
#[derive(Clone, Debug, Default, Serialize)]
pub struct NodeList {
    pub nodes: Vec<NodeIndex>,
}

impl NodeList {
    pub fn new(nodes: Vec<NodeIndex>) -> NodeList {
        NodeList { nodes }
    }

    pub fn empty() -> NodeList {
        NodeList { nodes: Vec::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes.iter().copied()
    }
}

impl FromIterator<NodeIndex> for NodeList {
    fn from_iter<T: IntoIterator<Item = NodeIndex>>(iter: T) -> NodeList {
        NodeList {
            nodes: iter.into_iter().collect(),
        }
    }
}
