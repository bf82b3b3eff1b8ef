use std::collections::HashSet;
use std::panic::{AssertUnwindSafe, catch_unwind};

use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};

use crate::error::SolverError;
use crate::ir::Direction;

use super::types::{SolverPosition, SolverRequest, SolverResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutStage {
    Ranking,
    Ordering,
    Positioning,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutProgress {
    pub stage: LayoutStage,
    pub completed: usize,
    pub total: usize,
}

/// Optional progress sink handed to a solver for long layouts.
#[derive(Default)]
pub struct Progress<'a> {
    callback: Option<&'a mut dyn FnMut(LayoutProgress)>,
}

impl<'a> Progress<'a> {
    pub fn new(callback: &'a mut dyn FnMut(LayoutProgress)) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    pub fn none() -> Self {
        Self { callback: None }
    }

    pub fn report(&mut self, stage: LayoutStage, completed: usize, total: usize) {
        if let Some(callback) = self.callback.as_mut() {
            callback(LayoutProgress {
                stage,
                completed,
                total,
            });
        }
    }
}

/// A layered-graph-drawing engine. Implementations must return exactly one
/// position per request node, keep ids untouched and tolerate cycles.
pub trait LayoutSolver {
    fn solve(
        &self,
        request: &SolverRequest,
        progress: Progress<'_>,
    ) -> Result<SolverResponse, SolverError>;
}

/// Checks the one-position-per-node contract.
pub fn ensure_complete(
    request: &SolverRequest,
    response: &SolverResponse,
) -> Result<(), SolverError> {
    let returned: HashSet<&str> = response.positions.iter().map(|p| p.id.as_str()).collect();
    for node in &request.nodes {
        if !returned.contains(node.id.as_str()) {
            return Err(SolverError::MissingPosition(node.id.clone()));
        }
    }
    Ok(())
}

/// Solver backed by the `dagre_rust` port of dagre. Ports are not passed to
/// the engine; edges are laid out node to node.
#[derive(Debug, Clone, Copy, Default)]
pub struct DagreSolver {
    pub margin: f32,
}

impl LayoutSolver for DagreSolver {
    fn solve(
        &self,
        request: &SolverRequest,
        mut progress: Progress<'_>,
    ) -> Result<SolverResponse, SolverError> {
        if request.nodes.is_empty() {
            return Ok(SolverResponse::default());
        }
        let total = request.nodes.len();
        progress.report(LayoutStage::Ranking, 0, total);

        let margin = self.margin;
        let positions = catch_unwind(AssertUnwindSafe(|| run_dagre(request, margin)))
            .map_err(|payload| SolverError::Engine(panic_message(payload.as_ref())))??;

        let response = SolverResponse { positions };
        ensure_complete(request, &response)?;
        progress.report(LayoutStage::Done, total, total);
        Ok(response)
    }
}

fn run_dagre(request: &SolverRequest, margin: f32) -> Result<Vec<SolverPosition>, SolverError> {
    let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
        DagreGraph::new(Some(GraphOption {
            directed: Some(true),
            multigraph: Some(false),
            compound: Some(false),
        }));

    let mut graph_config = DagreConfig::default();
    graph_config.rankdir = Some(dagre_rankdir(request.options.direction).to_string());
    graph_config.nodesep = Some(request.options.node_spacing);
    graph_config.ranksep = Some(request.options.layer_spacing);
    graph_config.marginx = Some(margin);
    graph_config.marginy = Some(margin);
    dagre_graph.set_graph(graph_config);

    for node in &request.nodes {
        let mut dagre_node = DagreNode::default();
        dagre_node.width = node.width;
        dagre_node.height = node.height;
        dagre_graph.set_node(node.id.clone(), Some(dagre_node));
    }

    let mut edge_set: HashSet<(&str, &str)> = HashSet::new();
    for edge in &request.edges {
        let from = edge.source_node.as_str();
        let to = edge.target_node.as_str();
        if from == to || !edge_set.insert((from, to)) {
            continue;
        }
        let _ = dagre_graph.set_edge(
            &from.to_string(),
            &to.to_string(),
            Some(DagreEdge::default()),
            None,
        );
    }

    dagre_layout::run_layout(&mut dagre_graph);

    let mut positions = Vec::with_capacity(request.nodes.len());
    for node in &request.nodes {
        let Some(dagre_node) = dagre_graph.node(&node.id) else {
            return Err(SolverError::MissingPosition(node.id.clone()));
        };
        positions.push(SolverPosition {
            id: node.id.clone(),
            x: dagre_node.x - node.width / 2.0,
            y: dagre_node.y - node.height / 2.0,
        });
    }
    Ok(positions)
}

fn dagre_rankdir(direction: Direction) -> &'static str {
    match direction {
        Direction::TopBottom => "tb",
        Direction::BottomTop => "bt",
        Direction::LeftRight => "lr",
        Direction::RightLeft => "rl",
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
