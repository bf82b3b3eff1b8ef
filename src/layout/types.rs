use serde::{Deserialize, Serialize};

use crate::cluster::Cluster;
use crate::config::FlatSizing;
use crate::ir::{Direction, LineageNode, NodeKind};
use crate::model::TableAggregate;
use crate::ports::PortSide;
use crate::style::StyledEdge;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOptions {
    pub direction: Direction,
    pub node_spacing: f32,
    pub layer_spacing: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            direction: Direction::LeftRight,
            node_spacing: 50.0,
            layer_spacing: 120.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverPort {
    pub id: String,
    pub side: PortSide,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverNode {
    pub id: String,
    pub width: f32,
    pub height: f32,
    pub ports: Vec<SolverPort>,
}

/// Edge between two request nodes. When the endpoint is a column the port id
/// is set and the solver should route to that slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverEdge {
    pub id: String,
    pub source_node: String,
    pub target_node: String,
    pub source_port: Option<String>,
    pub target_port: Option<String>,
}

impl SolverEdge {
    pub fn source_ref(&self) -> &str {
        self.source_port.as_deref().unwrap_or(&self.source_node)
    }

    pub fn target_ref(&self) -> &str {
        self.target_port.as_deref().unwrap_or(&self.target_node)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverRequest {
    pub nodes: Vec<SolverNode>,
    pub edges: Vec<SolverEdge>,
    pub options: LayoutOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverPosition {
    pub id: String,
    pub x: f32,
    pub y: f32,
}

/// Top-left node positions in request units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverResponse {
    pub positions: Vec<SolverPosition>,
}

/// A raw node drawn on its own when no table grouping applies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatNode {
    pub id: String,
    pub label: String,
    pub node_kind: NodeKind,
    pub database_name: Option<String>,
    pub width: f32,
    pub height: f32,
}

impl FlatNode {
    /// Width follows the label length within the configured bounds.
    pub fn from_node(node: &LineageNode, sizing: &FlatSizing) -> Self {
        let label = node.label().to_string();
        let len = label.chars().count() as f32;
        let width = (len * sizing.char_width + sizing.padding)
            .clamp(sizing.min_width, sizing.max_width.max(sizing.min_width));
        Self {
            id: node.id.clone(),
            label,
            node_kind: node.kind,
            database_name: node.database_name().map(str::to_string),
            width,
            height: sizing.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum NodeData {
    Table(TableAggregate),
    #[serde(rename = "flatNode")]
    Flat(FlatNode),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(flatten)]
    pub data: NodeData,
}

impl PositionedNode {
    pub fn is_table(&self) -> bool {
        matches!(self.data, NodeData::Table(_))
    }
}

/// The two source models a layout can be built from.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagramModel {
    Tables(Vec<TableAggregate>),
    Flat(Vec<FlatNode>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Tables,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramLayout {
    pub mode: LayoutMode,
    pub direction: Direction,
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<StyledEdge>,
    pub clusters: Vec<Cluster>,
    pub width: f32,
    pub height: f32,
}

impl DiagramLayout {
    pub fn empty(direction: Direction) -> Self {
        Self {
            mode: LayoutMode::Flat,
            direction,
            nodes: Vec::new(),
            edges: Vec::new(),
            clusters: Vec::new(),
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}
