use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::ClusterConfig;
use crate::layout::{NodeData, PositionedNode};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Background rectangle behind every table of one database.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub database_name: String,
    pub member_table_ids: Vec<String>,
    pub bounds: Bounds,
}

struct Extent {
    members: Vec<String>,
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

/// Groups positioned table nodes by database, sorted by database name.
/// Flat nodes and nodes with unusable geometry are ignored; a database left
/// with no members produces no cluster.
pub fn compute_clusters(nodes: &[PositionedNode], config: &ClusterConfig) -> Vec<Cluster> {
    let mut extents: BTreeMap<&str, Extent> = BTreeMap::new();
    for node in nodes {
        let NodeData::Table(aggregate) = &node.data else {
            continue;
        };
        if !has_geometry(node) {
            tracing::warn!(node = %node.id, "skipping cluster member without position");
            continue;
        }
        let extent = extents
            .entry(aggregate.database_name.as_str())
            .or_insert_with(|| Extent {
                members: Vec::new(),
                min_x: f32::MAX,
                min_y: f32::MAX,
                max_x: f32::MIN,
                max_y: f32::MIN,
            });
        extent.members.push(node.id.clone());
        extent.min_x = extent.min_x.min(node.x);
        extent.min_y = extent.min_y.min(node.y);
        extent.max_x = extent.max_x.max(node.x + node.width);
        extent.max_y = extent.max_y.max(node.y + node.height);
    }

    let padding = config.padding;
    let header = config.header_height;
    extents
        .into_iter()
        .map(|(database, extent)| Cluster {
            database_name: database.to_string(),
            member_table_ids: extent.members,
            bounds: Bounds {
                x: extent.min_x - padding,
                y: extent.min_y - padding - header,
                width: (extent.max_x - extent.min_x) + padding * 2.0,
                height: (extent.max_y - extent.min_y) + padding * 2.0 + header,
            },
        })
        .collect()
}

fn has_geometry(node: &PositionedNode) -> bool {
    node.x.is_finite() && node.y.is_finite() && node.width.is_finite() && node.height.is_finite()
}
