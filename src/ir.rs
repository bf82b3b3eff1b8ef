use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::LineageError;

/// Primary axis of the layered layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Direction {
    #[serde(rename = "TB", alias = "TD")]
    TopBottom,
    #[serde(rename = "BT")]
    BottomTop,
    #[default]
    #[serde(rename = "LR")]
    LeftRight,
    #[serde(rename = "RL")]
    RightLeft,
}

impl Direction {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "TD" | "TB" => Some(Self::TopBottom),
            "BT" => Some(Self::BottomTop),
            "LR" => Some(Self::LeftRight),
            "RL" => Some(Self::RightLeft),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::TopBottom => "TB",
            Self::BottomTop => "BT",
            Self::LeftRight => "LR",
            Self::RightLeft => "RL",
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftRight | Self::RightLeft)
    }

    pub fn is_reversed(self) -> bool {
        matches!(self, Self::RightLeft | Self::BottomTop)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Database,
    Table,
    #[default]
    Column,
}

/// Optional per-node attributes. Every field is optional in the input; absent
/// flags read as `false`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeMetadata {
    pub column_type: Option<String>,
    pub is_primary_key: Option<bool>,
    pub is_foreign_key: Option<bool>,
    pub is_nullable: Option<bool>,
    /// Single-letter catalog code: `V` view, `M` materialized view.
    pub table_kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageNode {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub database_name: Option<String>,
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub column_name: Option<String>,
    #[serde(default)]
    pub metadata: NodeMetadata,
}

impl LineageNode {
    pub fn column(id: &str, database: &str, table: &str, column: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: NodeKind::Column,
            database_name: Some(database.to_string()),
            table_name: Some(table.to_string()),
            column_name: Some(column.to_string()),
            metadata: NodeMetadata::default(),
        }
    }

    pub fn table(id: &str, database: &str, table: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: NodeKind::Table,
            database_name: Some(database.to_string()),
            table_name: Some(table.to_string()),
            column_name: None,
            metadata: NodeMetadata::default(),
        }
    }

    pub fn database(id: &str, database: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: NodeKind::Database,
            database_name: Some(database.to_string()),
            table_name: None,
            column_name: None,
            metadata: NodeMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: NodeMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn database_name(&self) -> Option<&str> {
        non_empty(self.database_name.as_deref())
    }

    pub fn table_name(&self) -> Option<&str> {
        non_empty(self.table_name.as_deref())
    }

    pub fn column_name(&self) -> Option<&str> {
        non_empty(self.column_name.as_deref())
    }

    /// Display label used when the node is drawn on its own.
    pub fn label(&self) -> &str {
        self.column_name()
            .or_else(|| self.table_name())
            .or_else(|| self.database_name())
            .unwrap_or(&self.id)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub transformation_type: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<f32>,
}

impl LineageEdge {
    pub fn new(id: &str, source: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            transformation_type: None,
            confidence_score: None,
        }
    }

    pub fn with_transformation(mut self, kind: &str) -> Self {
        self.transformation_type = Some(kind.to_string());
        self
    }

    pub fn with_confidence(mut self, score: f32) -> Self {
        self.confidence_score = Some(score);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineageGraph {
    #[serde(default)]
    pub nodes: Vec<LineageNode>,
    #[serde(default)]
    pub edges: Vec<LineageEdge>,
}

impl LineageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(input: &str) -> Result<Self, LineageError> {
        let graph: Self = serde_json::from_str(input)?;
        graph.validate()?;
        Ok(graph)
    }

    /// Rejects inputs that break node identity. Edges are not checked here:
    /// dangling references are filtered during layout.
    pub fn validate(&self) -> Result<(), LineageError> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if node.id.trim().is_empty() {
                return Err(LineageError::InvalidNode {
                    id: node.id.clone(),
                    reason: "empty id".to_string(),
                });
            }
            if !seen.insert(node.id.as_str()) {
                return Err(LineageError::InvalidNode {
                    id: node.id.clone(),
                    reason: "duplicate id".to_string(),
                });
            }
        }
        Ok(())
    }
}
