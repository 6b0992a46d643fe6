use std::collections::HashSet;
use std::fmt;

use anyhow::{anyhow, bail, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

/// Stable identifier the scene graph assigns to a node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Loaded scene graph, flattened into its nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    /// Parses the XML scene description exported alongside the baked model.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let mut nodes = Vec::new();
        let mut seen = HashSet::new();

        for (index, element) in document
            .descendants()
            .filter(|n| n.has_tag_name("object"))
            .enumerate()
        {
            let name = required_text(&element, "name")?;
            let id = optional_text(&element, "id")
                .map(NodeId::new)
                .unwrap_or_else(|| NodeId::new(format!("node-{index}")));
            if !seen.insert(id.clone()) {
                bail!("duplicate node id {id}");
            }

            let mut node = SceneNode::new(id, name);
            node.mesh = optional_text(&element, "mesh");
            node.material = optional_text(&element, "material");
            node.position = parse_vec3(optional_text(&element, "position"), node.position)
                .with_context(|| format!("bad <position> on {}", node.name))?;
            node.rotation = parse_vec3(optional_text(&element, "rotation"), node.rotation)
                .with_context(|| format!("bad <rotation> on {}", node.name))?;
            node.scale = parse_vec3(optional_text(&element, "scale"), node.scale)
                .with_context(|| format!("bad <scale> on {}", node.name))?;
            node.visible = parse_bool(optional_text(&element, "visible"), node.visible)?;
            nodes.push(node);
        }

        Ok(Self { nodes })
    }
}

/// Node of the baked model with its geometry and material handles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl SceneNode {
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            mesh: None,
            material: None,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: default_scale(),
            visible: default_visible(),
        }
    }
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

fn default_visible() -> bool {
    true
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let components = value
        .split_whitespace()
        .map(|component| {
            component
                .parse::<f32>()
                .map_err(|err| anyhow!("failed to parse {component:?}: {err}"))
        })
        .collect::<Result<Vec<_>>>()?;
    match components.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(anyhow!(
            "vector needs 3 components, found {}",
            components.len()
        )),
    }
}

fn parse_bool(value: Option<String>, default: bool) -> Result<bool> {
    match value.as_deref() {
        None => Ok(default),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(anyhow!("failed to parse bool: {other}")),
    }
}
