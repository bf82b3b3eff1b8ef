mod epoch;
mod ranking;
mod solver;
mod types;

pub use epoch::{LayoutSession, LayoutTicket, Resolution};
pub use ranking::LayeredSolver;
pub use solver::{
    DagreSolver, LayoutProgress, LayoutSolver, LayoutStage, Progress, ensure_complete,
};
pub use types::{
    DiagramLayout, DiagramModel, FlatNode, LayoutMode, LayoutOptions, NodeData, PositionedNode,
    SolverEdge, SolverNode, SolverPort, SolverPosition, SolverRequest, SolverResponse,
};

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::cluster::compute_clusters;
use crate::config::{Config, FlatSizing, SolverKind};
use crate::error::{LineageError, SolverError};
use crate::ir::{LineageEdge, LineageGraph, LineageNode};
use crate::model::{TableModel, build_table_aggregates};
use crate::ports::{PortSide, port_id, synthesize_ports};
use crate::style::{StyledEdge, styled_edge};

/// Where one edge endpoint attaches in the diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Endpoint {
    node: String,
    port: Option<String>,
}

fn resolve_table_endpoint(model: &TableModel, id: &str, side: PortSide) -> Option<Endpoint> {
    let key = model.column_to_table_key.get(id)?;
    let port = model.is_column(id).then(|| port_id(key, id, side));
    Some(Endpoint {
        node: key.clone(),
        port,
    })
}

fn resolve_table_edge(model: &TableModel, edge: &LineageEdge) -> Option<(Endpoint, Endpoint)> {
    let source = resolve_table_endpoint(model, &edge.source, PortSide::East)?;
    let target = resolve_table_endpoint(model, &edge.target, PortSide::West)?;
    Some((source, target))
}

/// Request for the table-grouped path. Edges whose endpoints do not resolve
/// to an aggregate are dropped.
pub fn build_layout_request(
    model: &TableModel,
    edges: &[LineageEdge],
    options: LayoutOptions,
) -> SolverRequest {
    table_request(model, edges, options).0
}

/// Request for graphs without table structure: one node per raw node, edges
/// between node ids.
pub fn build_flat_request(
    nodes: &[LineageNode],
    edges: &[LineageEdge],
    sizing: &FlatSizing,
    options: LayoutOptions,
) -> (Vec<FlatNode>, SolverRequest) {
    let (flat_nodes, request, _) = flat_request(nodes, edges, sizing, options);
    (flat_nodes, request)
}

/// Builds the table request together with the raw edge behind each request
/// edge, position for position.
fn table_request<'e>(
    model: &TableModel,
    edges: &'e [LineageEdge],
    options: LayoutOptions,
) -> (SolverRequest, Vec<&'e LineageEdge>) {
    let nodes = model
        .aggregates
        .iter()
        .map(|aggregate| SolverNode {
            id: aggregate.key.clone(),
            width: aggregate.width,
            height: aggregate.height,
            ports: synthesize_ports(aggregate)
                .into_iter()
                .map(|port| SolverPort {
                    id: port.id,
                    side: port.side,
                    index: port.index,
                })
                .collect(),
        })
        .collect();

    let mut kept = Vec::with_capacity(edges.len());
    let mut solver_edges = Vec::with_capacity(edges.len());
    for edge in edges {
        let Some((source, target)) = resolve_table_edge(model, edge) else {
            continue;
        };
        kept.push(edge);
        solver_edges.push(SolverEdge {
            id: edge.id.clone(),
            source_node: source.node,
            target_node: target.node,
            source_port: source.port,
            target_port: target.port,
        });
    }
    log_dropped(edges.len(), solver_edges.len());

    (
        SolverRequest {
            nodes,
            edges: solver_edges,
            options,
        },
        kept,
    )
}

fn flat_request<'e>(
    nodes: &[LineageNode],
    edges: &'e [LineageEdge],
    sizing: &FlatSizing,
    options: LayoutOptions,
) -> (Vec<FlatNode>, SolverRequest, Vec<&'e LineageEdge>) {
    let mut flat_nodes = Vec::with_capacity(nodes.len());
    let mut solver_nodes = Vec::with_capacity(nodes.len());
    let mut known: HashSet<&str> = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !known.insert(node.id.as_str()) {
            continue;
        }
        let flat = FlatNode::from_node(node, sizing);
        solver_nodes.push(SolverNode {
            id: flat.id.clone(),
            width: flat.width,
            height: flat.height,
            ports: Vec::new(),
        });
        flat_nodes.push(flat);
    }

    let kept: Vec<&LineageEdge> = edges
        .iter()
        .filter(|edge| {
            known.contains(edge.source.as_str()) && known.contains(edge.target.as_str())
        })
        .collect();
    let solver_edges: Vec<SolverEdge> = kept
        .iter()
        .map(|edge| SolverEdge {
            id: edge.id.clone(),
            source_node: edge.source.clone(),
            target_node: edge.target.clone(),
            source_port: None,
            target_port: None,
        })
        .collect();
    log_dropped(edges.len(), solver_edges.len());

    (
        flat_nodes,
        SolverRequest {
            nodes: solver_nodes,
            edges: solver_edges,
            options,
        },
        kept,
    )
}

fn log_dropped(total: usize, kept: usize) {
    if kept < total {
        tracing::debug!(dropped = total - kept, kept, "dropped unresolved lineage edges");
    }
}

/// Pairs solver positions with the model nodes they belong to, in model order.
pub fn apply_layout_result(
    response: &SolverResponse,
    model: &DiagramModel,
) -> Result<Vec<PositionedNode>, SolverError> {
    let positions: HashMap<&str, (f32, f32)> = response
        .positions
        .iter()
        .map(|p| (p.id.as_str(), (p.x, p.y)))
        .collect();
    let locate = |id: &str| {
        positions
            .get(id)
            .copied()
            .ok_or_else(|| SolverError::MissingPosition(id.to_string()))
    };

    match model {
        DiagramModel::Tables(aggregates) => aggregates
            .iter()
            .map(|aggregate| -> Result<PositionedNode, SolverError> {
                let (x, y) = locate(&aggregate.key)?;
                Ok(PositionedNode {
                    id: aggregate.key.clone(),
                    x,
                    y,
                    width: aggregate.width,
                    height: aggregate.height,
                    data: NodeData::Table(aggregate.clone()),
                })
            })
            .collect(),
        DiagramModel::Flat(nodes) => nodes
            .iter()
            .map(|node| -> Result<PositionedNode, SolverError> {
                let (x, y) = locate(&node.id)?;
                Ok(PositionedNode {
                    id: node.id.clone(),
                    x,
                    y,
                    width: node.width,
                    height: node.height,
                    data: NodeData::Flat(node.clone()),
                })
            })
            .collect(),
    }
}

pub fn solver_for(config: &Config) -> Box<dyn LayoutSolver> {
    match config.layout.solver {
        SolverKind::Dagre => Box::new(DagreSolver { margin: 8.0 }),
        SolverKind::Layered => Box::new(LayeredSolver {
            order_passes: config.layout.order_passes,
        }),
    }
}

/// Full pipeline from a raw lineage graph to a positioned, styled diagram.
/// Nothing is returned on solver failure.
pub fn layout_lineage(
    graph: &LineageGraph,
    config: &Config,
    solver: &dyn LayoutSolver,
    progress: Progress<'_>,
) -> Result<DiagramLayout, LineageError> {
    let options = config.layout.options();
    if graph.nodes.is_empty() {
        return Ok(DiagramLayout::empty(options.direction));
    }

    let table_model = build_table_aggregates(&graph.nodes, &config.layout.table);
    let (mode, model, request, edges) = if table_model.is_empty() {
        let (flat_nodes, request, kept) =
            flat_request(&graph.nodes, &graph.edges, &config.layout.flat, options);
        let edges = style_request_edges(&kept, &request, config);
        (LayoutMode::Flat, DiagramModel::Flat(flat_nodes), request, edges)
    } else {
        let (request, kept) = table_request(&table_model, &graph.edges, options);
        let edges = style_request_edges(&kept, &request, config);
        (
            LayoutMode::Tables,
            DiagramModel::Tables(table_model.aggregates),
            request,
            edges,
        )
    };

    let started = Instant::now();
    let response = solver.solve(&request, progress).map_err(|err| {
        tracing::warn!(error = %err, "layout solver failed");
        err
    })?;
    tracing::debug!(
        nodes = request.nodes.len(),
        edges = request.edges.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "layout solved"
    );

    let nodes = apply_layout_result(&response, &model)?;
    let clusters = compute_clusters(&nodes, &config.layout.cluster);
    let (width, height) = diagram_extent(&nodes);

    Ok(DiagramLayout {
        mode,
        direction: options.direction,
        nodes,
        edges,
        clusters,
        width,
        height,
    })
}

/// Styles the raw edges that survived into `request`. `kept[i]` is the raw
/// edge behind `request.edges[i]`; edge ids are not assumed unique.
fn style_request_edges(
    kept: &[&LineageEdge],
    request: &SolverRequest,
    config: &Config,
) -> Vec<StyledEdge> {
    kept.iter()
        .zip(&request.edges)
        .map(|(edge, solver_edge)| {
            let mut styled = styled_edge(
                edge,
                solver_edge.source_port.clone(),
                solver_edge.target_port.clone(),
                &config.theme.edges,
            );
            styled.source = solver_edge.source_node.clone();
            styled.target = solver_edge.target_node.clone();
            styled
        })
        .collect()
}

fn diagram_extent(nodes: &[PositionedNode]) -> (f32, f32) {
    nodes.iter().fold((0.0f32, 0.0f32), |(w, h), node| {
        (w.max(node.x + node.width), h.max(node.y + node.height))
    })
}
