//! Groups column-level lineage nodes into table aggregates.
//!
//! A table aggregate is keyed by `database.table`, so every column of a table
//! lands on one diagram card no matter how many subgraphs reference it.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::config::TableSizing;
use crate::ir::LineageNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum AssetType {
    #[default]
    Table,
    View,
    MaterializedView,
}

impl AssetType {
    /// Maps a catalog `tableKind` code. Unknown or absent codes are tables.
    pub fn from_table_kind(code: Option<&str>) -> Self {
        match code.map(|c| c.trim().to_ascii_uppercase()).as_deref() {
            Some("V") => Self::View,
            Some("M") => Self::MaterializedView,
            _ => Self::Table,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub id: String,
    pub name: String,
    pub data_type: Option<String>,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub is_nullable: bool,
}

impl ColumnDefinition {
    fn from_node(node: &LineageNode, name: &str) -> Self {
        let meta = &node.metadata;
        Self {
            id: node.id.clone(),
            name: name.to_string(),
            data_type: meta
                .column_type
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            is_primary_key: meta.is_primary_key.unwrap_or(false),
            is_foreign_key: meta.is_foreign_key.unwrap_or(false),
            is_nullable: meta.is_nullable.unwrap_or(false),
        }
    }

    /// Text drawn on the column row: name, then the data type when known.
    pub fn label(&self) -> String {
        match &self.data_type {
            Some(data_type) => format!("{} {}", self.name, data_type),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableAggregate {
    pub key: String,
    pub database_name: String,
    pub table_name: String,
    pub asset_type: AssetType,
    pub columns: Vec<ColumnDefinition>,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableModel {
    pub aggregates: Vec<TableAggregate>,
    /// Node id (column or table-level) to its aggregate key.
    pub column_to_table_key: HashMap<String, String>,
    /// Ids of table-level nodes; every other key in `column_to_table_key` is
    /// a column row.
    pub table_node_ids: HashSet<String>,
}

impl TableModel {
    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }

    pub fn aggregate(&self, key: &str) -> Option<&TableAggregate> {
        self.aggregates.iter().find(|agg| agg.key == key)
    }

    /// True when `node_id` is a column row (as opposed to a table-level node).
    pub fn is_column(&self, node_id: &str) -> bool {
        self.column_to_table_key.contains_key(node_id) && !self.table_node_ids.contains(node_id)
    }
}

pub fn table_key(database_name: &str, table_name: &str) -> String {
    format!("{}.{}", database_name, table_name)
}

/// Builds one aggregate per `(database, table)` pair in first-seen order.
/// Nodes without both names are left out; they belong to the flat path.
pub fn build_table_aggregates(nodes: &[LineageNode], sizing: &TableSizing) -> TableModel {
    let mut aggregates: Vec<TableAggregate> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();
    let mut column_to_table_key: HashMap<String, String> = HashMap::new();
    let mut table_node_ids: HashSet<String> = HashSet::new();

    for node in nodes {
        let (Some(database), Some(table)) = (node.database_name(), node.table_name()) else {
            continue;
        };
        if column_to_table_key.contains_key(&node.id) {
            continue;
        }
        let key = table_key(database, table);
        let idx = *index_by_key.entry(key.clone()).or_insert_with(|| {
            aggregates.push(TableAggregate {
                key: key.clone(),
                database_name: database.to_string(),
                table_name: table.to_string(),
                asset_type: AssetType::from_table_kind(node.metadata.table_kind.as_deref()),
                columns: Vec::new(),
                width: 0.0,
                height: 0.0,
            });
            aggregates.len() - 1
        });
        match node.column_name() {
            Some(column) => aggregates[idx]
                .columns
                .push(ColumnDefinition::from_node(node, column)),
            None => {
                table_node_ids.insert(node.id.clone());
            }
        }
        column_to_table_key.insert(node.id.clone(), key);
    }

    for aggregate in &mut aggregates {
        let (width, height) = aggregate_size(aggregate, sizing);
        aggregate.width = width;
        aggregate.height = height;
    }

    TableModel {
        aggregates,
        column_to_table_key,
        table_node_ids,
    }
}

pub fn build_table_aggregates_default(nodes: &[LineageNode]) -> TableModel {
    build_table_aggregates(nodes, &TableSizing::default())
}

pub fn aggregate_size(aggregate: &TableAggregate, sizing: &TableSizing) -> (f32, f32) {
    let rows = aggregate.columns.len() as f32;
    let height = (sizing.header_height + rows * sizing.row_height + sizing.padding)
        .max(sizing.min_height);

    let title_len = aggregate.table_name.chars().count() as f32;
    let longest_label = aggregate
        .columns
        .iter()
        .map(|col| col.label().chars().count())
        .max()
        .unwrap_or(0) as f32;
    let width = sizing
        .min_width
        .max(title_len * sizing.title_char_width + sizing.title_padding)
        .max(longest_label * sizing.column_char_width + sizing.column_padding)
        .clamp(sizing.min_width, sizing.max_width.max(sizing.min_width));

    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::NodeMetadata;

    fn col(id: &str, table: &str, column: &str) -> LineageNode {
        LineageNode::column(id, "warehouse", table, column)
    }

    #[test]
    fn merges_columns_of_the_same_table() {
        let nodes = vec![
            col("o.id", "orders", "id"),
            col("c.id", "customers", "id"),
            col("o.total", "orders", "total"),
            col("o.customer", "orders", "customer_id"),
        ];
        let model = build_table_aggregates_default(&nodes);
        assert_eq!(model.aggregates.len(), 2);
        let orders = model.aggregate("warehouse.orders").unwrap();
        let ids: Vec<&str> = orders.columns.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["o.id", "o.total", "o.customer"]);
        assert_eq!(model.column_to_table_key["o.total"], "warehouse.orders");
        assert_eq!(model.column_to_table_key["c.id"], "warehouse.customers");
    }

    #[test]
    fn diamond_shared_table_is_not_duplicated() {
        // Two branches of a diamond both read from `raw.events`.
        let nodes = vec![
            LineageNode::column("a", "raw", "events", "ts"),
            LineageNode::column("b", "mart", "daily", "day"),
            LineageNode::column("c", "mart", "hourly", "hour"),
            LineageNode::column("d", "raw", "events", "user_id"),
            LineageNode::column("e", "raw", "events", "kind"),
        ];
        let model = build_table_aggregates_default(&nodes);
        let events: Vec<_> = model
            .aggregates
            .iter()
            .filter(|agg| agg.key == "raw.events")
            .collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].columns.len(), 3);
    }

    #[test]
    fn skips_nodes_without_table_identity() {
        let nodes = vec![
            LineageNode::database("db", "warehouse"),
            LineageNode::column("x", "", "orders", "id"),
            col("o.id", "orders", "id"),
        ];
        let model = build_table_aggregates_default(&nodes);
        assert_eq!(model.aggregates.len(), 1);
        assert!(!model.column_to_table_key.contains_key("db"));
        assert!(!model.column_to_table_key.contains_key("x"));
    }

    #[test]
    fn table_level_nodes_register_without_columns() {
        let nodes = vec![
            LineageNode::table("t", "warehouse", "orders"),
            col("o.id", "orders", "id"),
        ];
        let model = build_table_aggregates_default(&nodes);
        assert_eq!(model.aggregates.len(), 1);
        assert_eq!(model.aggregates[0].columns.len(), 1);
        assert_eq!(model.column_to_table_key["t"], "warehouse.orders");
        assert!(model.is_column("o.id"));
        assert!(!model.is_column("t"));
    }

    #[test]
    fn asset_type_comes_from_first_column() {
        let view = col("v1", "active_users", "id").with_metadata(NodeMetadata {
            table_kind: Some("V".to_string()),
            ..Default::default()
        });
        let later = col("v2", "active_users", "name").with_metadata(NodeMetadata {
            table_kind: Some("M".to_string()),
            ..Default::default()
        });
        let model = build_table_aggregates_default(&[view, later]);
        assert_eq!(model.aggregates[0].asset_type, AssetType::View);

        assert_eq!(AssetType::from_table_kind(Some("m")), AssetType::MaterializedView);
        assert_eq!(AssetType::from_table_kind(Some("T")), AssetType::Table);
        assert_eq!(AssetType::from_table_kind(None), AssetType::Table);
    }

    #[test]
    fn column_flags_default_to_false() {
        let pk = col("o.id", "orders", "id").with_metadata(NodeMetadata {
            column_type: Some("bigint".to_string()),
            is_primary_key: Some(true),
            ..Default::default()
        });
        let model = build_table_aggregates_default(&[pk]);
        let column = &model.aggregates[0].columns[0];
        assert!(column.is_primary_key);
        assert!(!column.is_foreign_key);
        assert_eq!(column.label(), "id bigint");
    }

    #[test]
    fn sizing_grows_with_rows_and_clamps_width() {
        let sizing = TableSizing::default();
        let mut nodes = Vec::new();
        for i in 0..5 {
            nodes.push(col(&format!("c{i}"), "orders", &format!("col_{i}")));
        }
        let model = build_table_aggregates(&nodes, &sizing);
        let orders = &model.aggregates[0];
        assert_eq!(
            orders.height,
            sizing.header_height + 5.0 * sizing.row_height + sizing.padding
        );
        assert_eq!(orders.width, sizing.min_width);

        let long_name = "x".repeat(200);
        let model = build_table_aggregates(&[col("l", &long_name, "id")], &sizing);
        assert_eq!(model.aggregates[0].width, sizing.max_width);
        assert_eq!(model.aggregates[0].height, sizing.min_height);
    }

    #[test]
    fn building_twice_is_identical() {
        let nodes = vec![
            col("a", "orders", "id"),
            col("b", "customers", "name"),
            col("c", "orders", "total"),
        ];
        assert_eq!(
            build_table_aggregates_default(&nodes),
            build_table_aggregates_default(&nodes)
        );
    }

    #[test]
    fn empty_input_yields_empty_model() {
        let model = build_table_aggregates_default(&[]);
        assert!(model.is_empty());
        assert!(model.column_to_table_key.is_empty());
    }
}
