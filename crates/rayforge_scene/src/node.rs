//! Scene node.

use glam::Mat4;

use crate::{MeshKey, NodeKey};

/// A node in the scene forest.
///
/// `local_matrix` is the node's transform relative to its parent; the
/// animation stage may override it per-frame with `M_anim`.
/// `children` holds stable keys rather than owned nodes — the arena in
/// [`crate::Model`] is the only owner, which is what keeps the graph
/// acyclic-by-construction: a key
/// can be stored in more than one place, but only a `SlotMap` entry is
/// ever dropped, so there is no double-free or reference-counting to get
/// wrong.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: Option<String>,
    pub local_matrix: Mat4,
    pub mesh: Option<MeshKey>,
    pub children: Vec<NodeKey>,
}

impl Node {
    #[must_use]
    pub fn new(local_matrix: Mat4) -> Self {
        Self { name: None, local_matrix, mesh: None, children: Vec::new() }
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_node_has_identity_transform_and_no_children() {
        let n = Node::default();
        assert_eq!(n.local_matrix, Mat4::IDENTITY);
        assert!(n.children.is_empty());
        assert!(n.mesh.is_none());
    }
}
