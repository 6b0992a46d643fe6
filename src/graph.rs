use std::sync::Arc;

use parking_lot::RwLock;

use crate::scene::{NodeId, SceneNode};

/// Mutable mirror of the loaded scene graph, shared between the registry and
/// whatever draws the scene.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Arc<RwLock<Vec<SceneNode>>>,
}

impl Clone for SceneGraph {
    fn clone(&self) -> Self {
        Self {
            nodes: Arc::clone(&self.nodes),
        }
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: Vec<SceneNode>) -> Self {
        Self {
            nodes: Arc::new(RwLock::new(nodes)),
        }
    }

    /// Returns a snapshot of all nodes.
    pub fn all_nodes(&self) -> Vec<SceneNode> {
        self.nodes.read().clone()
    }

    pub fn get(&self, id: &NodeId) -> Option<SceneNode> {
        self.nodes.read().iter().find(|node| &node.id == id).cloned()
    }

    /// Applies a mutation to the requested node.
    pub fn update<F, R>(&self, id: &NodeId, mut updater: F) -> Option<R>
    where
        F: FnMut(&mut SceneNode) -> R,
    {
        let mut guard = self.nodes.write();
        let node = guard.iter_mut().find(|node| &node.id == id)?;
        Some(updater(node))
    }

    pub fn set_visible(&self, id: &NodeId, visible: bool) -> bool {
        self.update(id, |node| node.visible = visible).is_some()
    }

    /// Nodes that still take part in the baked render pass.
    pub fn visible_count(&self) -> usize {
        self.nodes.read().iter().filter(|node| node.visible).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_node(id: &str, name: &str) -> SceneNode {
        SceneNode::new(NodeId::from(id), name)
    }

    #[test]
    fn clones_share_state() {
        let graph = SceneGraph::from_nodes(vec![make_node("1", "pc_target")]);
        let view = graph.clone();
        assert!(graph.set_visible(&NodeId::from("1"), false));
        assert!(!view.get(&NodeId::from("1")).unwrap().visible);
        assert_eq!(view.visible_count(), 0);
    }

    #[test]
    fn all_nodes_reflects_hidden_targets() {
        let graph = SceneGraph::from_nodes(vec![
            make_node("1", "pc_target"),
            make_node("2", "Desk"),
        ]);
        graph.set_visible(&NodeId::from("1"), false);
        let visible: Vec<_> = graph
            .all_nodes()
            .into_iter()
            .filter(|node| node.visible)
            .map(|node| node.name)
            .collect();
        assert_eq!(visible, vec!["Desk"]);
    }

    #[test]
    fn update_returns_false_for_missing_node() {
        let graph = SceneGraph::new();
        assert!(!graph.set_visible(&NodeId::from("ghost"), false));
    }
}
