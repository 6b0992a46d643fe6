use std::collections::BTreeMap;

use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::category::{category_for_node, is_interactive, TargetCategory};
use crate::graph::SceneGraph;
use crate::presentation::CursorStyle;
use crate::scene::{NodeId, Scene, SceneNode};

/// Scene node recognised as a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetNode {
    pub id: NodeId,
    pub name: String,
    /// `None` for marked nodes missing from the click table.
    pub category: Option<TargetCategory>,
    pub hovered: bool,
}

/// Render entry standing in for a hidden target node so hover and click can
/// be wired without touching the baked materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyEntry {
    pub node: NodeId,
    pub mesh: Option<String>,
    pub material: Option<String>,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl ProxyEntry {
    fn from_node(node: &SceneNode) -> Self {
        Self {
            node: node.id.clone(),
            mesh: node.mesh.clone(),
            material: node.material.clone(),
            position: node.position,
            rotation: node.rotation,
            scale: Vec3::ONE,
        }
    }
}

/// Result of the read-only classification pass over a scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    targets: BTreeMap<NodeId, TargetNode>,
    proxies: BTreeMap<NodeId, ProxyEntry>,
}

impl Classification {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> impl Iterator<Item = &TargetNode> {
        self.targets.values()
    }
}

/// Scans `scene` for nodes whose name contains `marker`. Does not mutate the
/// scene; see [`TargetRegistry::apply`] for the visibility changes.
pub fn classify(scene: &Scene, marker: &str) -> Classification {
    let mut classification = Classification::default();
    for node in scene.nodes.iter().filter(|node| node.name.contains(marker)) {
        classification.targets.insert(
            node.id.clone(),
            TargetNode {
                id: node.id.clone(),
                name: node.name.clone(),
                category: category_for_node(&node.name),
                hovered: false,
            },
        );
        classification
            .proxies
            .insert(node.id.clone(), ProxyEntry::from_node(node));
    }
    classification
}

/// Registered targets and their proxies for the current scene.
#[derive(Debug, Clone)]
pub struct TargetRegistry {
    targets: BTreeMap<NodeId, TargetNode>,
    proxies: BTreeMap<NodeId, ProxyEntry>,
    hover_scale: f32,
}

impl TargetRegistry {
    pub fn new(hover_scale: f32) -> Self {
        Self {
            targets: BTreeMap::new(),
            proxies: BTreeMap::new(),
            hover_scale,
        }
    }

    /// Hides every classified node in `graph` and takes ownership of its
    /// proxy. Nodes that are already registered are skipped, so applying the
    /// same classification twice is harmless. Returns the number of newly
    /// registered targets.
    pub fn apply(&mut self, classification: &Classification, graph: &SceneGraph) -> usize {
        let mut added = 0;
        for (id, target) in &classification.targets {
            if self.targets.contains_key(id) {
                continue;
            }
            if !graph.set_visible(id, false) {
                debug!("classified node {id} is not in the scene graph");
            }
            self.targets.insert(id.clone(), target.clone());
            if let Some(proxy) = classification.proxies.get(id) {
                self.proxies.insert(id.clone(), proxy.clone());
            }
            added += 1;
        }
        added
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn target(&self, id: &NodeId) -> Option<&TargetNode> {
        self.targets.get(id)
    }

    pub fn targets(&self) -> impl Iterator<Item = &TargetNode> {
        self.targets.values()
    }

    pub fn proxy(&self, id: &NodeId) -> Option<&ProxyEntry> {
        self.proxies.get(id)
    }

    pub fn proxies(&self) -> impl Iterator<Item = &ProxyEntry> {
        self.proxies.values()
    }

    /// Marks the node as hovered. Returns the cursor to show, or `None` when
    /// the cursor should stay as it is.
    pub fn pointer_over(&mut self, id: &NodeId, name: &str) -> Option<CursorStyle> {
        if !self.set_hovered(id, true) {
            debug!("pointer over unregistered node {id}");
            return None;
        }
        is_interactive(name).then_some(CursorStyle::Pointer)
    }

    pub fn pointer_out(&mut self, id: &NodeId) -> Option<CursorStyle> {
        if !self.set_hovered(id, false) {
            debug!("pointer out of unregistered node {id}");
            return None;
        }
        Some(CursorStyle::Default)
    }

    fn set_hovered(&mut self, id: &NodeId, hovered: bool) -> bool {
        let Some(target) = self.targets.get_mut(id) else {
            return false;
        };
        target.hovered = hovered;
        if let Some(proxy) = self.proxies.get_mut(id) {
            proxy.scale = if hovered {
                Vec3::splat(self.hover_scale)
            } else {
                Vec3::ONE
            };
        }
        true
    }
}
