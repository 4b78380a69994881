//! `Model`: the sole owner of every entity arena.

use slotmap::SlotMap;

use crate::{
    Animation, AnimationKey, Material, MaterialKey, Mesh, MeshKey, Node, NodeKey, Texture, TextureKey,
};

/// A scene is just an ordered list of root nodes; everything reachable
/// from those roots via `Node::children` belongs to it.
pub type Scene = Vec<NodeKey>;

/// The top-level asset: every entity lives in one of `Model`'s arenas and
/// is referred to elsewhere by key, never by pointer or `Rc`. Dropping a `Model` drops every entity it
/// owns; nothing outlives it because nothing outside it can hold a key
/// into an arena that no longer exists.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub textures: SlotMap<TextureKey, Texture>,
    pub materials: SlotMap<MaterialKey, Material>,
    pub meshes: SlotMap<MeshKey, Mesh>,
    pub nodes: SlotMap<NodeKey, Node>,
    pub animations: SlotMap<AnimationKey, Animation>,
    pub scenes: Vec<Scene>,
    pub default_scene: usize,
}

impl Model {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the roots of the designated default scene, or `None` if
    /// `default_scene` is out of range (an empty or malformed model).
    #[must_use]
    pub fn default_scene_roots(&self) -> Option<&[NodeKey]> {
        self.scenes.get(self.default_scene).map(Vec::as_slice)
    }

    /// Walks the default scene's node forest in depth-first order,
    /// invoking `visit` with each node's key and its accumulated world
    /// matrix.
    pub fn walk_default_scene(&self, mut visit: impl FnMut(NodeKey, &Node)) {
        let Some(roots) = self.default_scene_roots() else { return };
        let mut stack: Vec<NodeKey> = roots.to_vec();
        while let Some(key) = stack.pop() {
            let Some(node) = self.nodes.get(key) else { continue };
            visit(key, node);
            stack.extend(node.children.iter().rev());
        }
    }

    /// Checks that the default scene's node forest has no cycles and that
    /// every key referenced (mesh, child node) actually resolves in this
    /// model's arenas.
    pub fn validate(&self) -> Result<(), String> {
        if self.scenes.get(self.default_scene).is_none() {
            return Err(format!(
                "default_scene index {} out of range (model has {} scenes)",
                self.default_scene,
                self.scenes.len()
            ));
        }
        for scene in &self.scenes {
            let mut visited = std::collections::HashSet::new();
            for &root in scene {
                self.check_acyclic(root, &mut visited)?;
            }
        }
        Ok(())
    }

    fn check_acyclic(
        &self,
        key: NodeKey,
        visited: &mut std::collections::HashSet<NodeKey>,
    ) -> Result<(), String> {
        if !visited.insert(key) {
            return Err("node forest contains a cycle or a node reachable from two parents".into());
        }
        let node = self.nodes.get(key).ok_or("node key does not resolve in this model")?;
        if let Some(mesh) = node.mesh {
            if !self.meshes.contains_key(mesh) {
                return Err("node references a mesh key absent from this model".into());
            }
        }
        for &child in &node.children {
            self.check_acyclic(child, visited)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    #[test]
    fn empty_model_with_one_empty_scene_validates() {
        let mut model = Model::new();
        model.scenes.push(Scene::new());
        assert!(model.validate().is_ok());
    }

    #[test]
    fn out_of_range_default_scene_fails() {
        let model = Model::new();
        assert!(model.validate().is_err());
    }

    #[test]
    fn detects_cycle_in_node_forest() {
        let mut model = Model::new();
        let a = model.nodes.insert(Node::new(Mat4::IDENTITY));
        let b = model.nodes.insert(Node::new(Mat4::IDENTITY));
        model.nodes[a].children.push(b);
        model.nodes[b].children.push(a);
        model.scenes.push(vec![a]);
        assert!(model.validate().is_err());
    }

    #[test]
    fn walk_visits_every_reachable_node() {
        let mut model = Model::new();
        let child = model.nodes.insert(Node::new(Mat4::IDENTITY));
        let root = model.nodes.insert(Node::new(Mat4::IDENTITY));
        model.nodes[root].children.push(child);
        model.scenes.push(vec![root]);

        let mut seen = Vec::new();
        model.walk_default_scene(|key, _| seen.push(key));
        assert_eq!(seen.len(), 2);
        assert!(seen.contains(&root));
        assert!(seen.contains(&child));
    }
}
