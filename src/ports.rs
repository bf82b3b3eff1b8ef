use std::collections::HashMap;

use serde::Serialize;

use crate::model::TableAggregate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortSide {
    /// Incoming edges attach here.
    West,
    /// Outgoing edges leave from here.
    East,
}

impl PortSide {
    fn suffix(self) -> &'static str {
        match self {
            PortSide::West => "target",
            PortSide::East => "source",
        }
    }
}

/// Attachment point for one column on one side of a table card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    pub id: String,
    pub table_key: String,
    pub column_id: String,
    pub side: PortSide,
    /// Position of the column within its aggregate.
    pub index: usize,
}

/// `{table}-{column}-{side}`. A `-` or `\` inside the table key or column id
/// is escaped with `\`, so distinct pairs never share an id.
pub fn port_id(table_key: &str, column_id: &str, side: PortSide) -> String {
    format!(
        "{}-{}-{}",
        escape_component(table_key),
        escape_component(column_id),
        side.suffix()
    )
}

fn escape_component(part: &str) -> String {
    if !part.contains(['-', '\\']) {
        return part.to_string();
    }
    let mut escaped = String::with_capacity(part.len() + 4);
    for ch in part.chars() {
        if ch == '-' || ch == '\\' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Two ports per column, target before source, in column order.
pub fn synthesize_ports(aggregate: &TableAggregate) -> Vec<Port> {
    let mut ports = Vec::with_capacity(aggregate.columns.len() * 2);
    for (index, column) in aggregate.columns.iter().enumerate() {
        for side in [PortSide::West, PortSide::East] {
            ports.push(Port {
                id: port_id(&aggregate.key, &column.id, side),
                table_key: aggregate.key.clone(),
                column_id: column.id.clone(),
                side,
                index,
            });
        }
    }
    ports
}

/// Reverse index from port id to the port it names. Ids embed user data that
/// may itself contain `-`, so they are never split.
#[derive(Debug, Clone, Default)]
pub struct PortLookup {
    ports: HashMap<String, Port>,
}

impl PortLookup {
    pub fn new(aggregates: &[TableAggregate]) -> Self {
        let mut ports = HashMap::new();
        for aggregate in aggregates {
            for port in synthesize_ports(aggregate) {
                ports.insert(port.id.clone(), port);
            }
        }
        Self { ports }
    }

    pub fn get(&self, port_id: &str) -> Option<&Port> {
        self.ports.get(port_id)
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}
