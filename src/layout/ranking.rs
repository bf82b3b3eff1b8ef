//! Built-in layered solver.
//!
//! Back edges found by an iterative DFS are left out of layer assignment, the
//! remaining DAG is layered by longest path, layers are ordered with median
//! sweeps and finally packed into bands along the primary axis.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::error::SolverError;

use super::solver::{LayoutSolver, LayoutStage, Progress, ensure_complete};
use super::types::{SolverPosition, SolverRequest, SolverResponse};

#[derive(Debug, Clone, Copy)]
pub struct LayeredSolver {
    pub order_passes: usize,
}

impl Default for LayeredSolver {
    fn default() -> Self {
        Self { order_passes: 4 }
    }
}

impl LayoutSolver for LayeredSolver {
    fn solve(
        &self,
        request: &SolverRequest,
        mut progress: Progress<'_>,
    ) -> Result<SolverResponse, SolverError> {
        let node_count = request.nodes.len();
        if node_count == 0 {
            return Ok(SolverResponse::default());
        }
        let edges = index_edges(request)?;

        progress.report(LayoutStage::Ranking, 0, node_count);
        let back_edges = find_back_edges(node_count, &edges);
        let forward: Vec<(usize, usize)> = edges
            .iter()
            .copied()
            .filter(|edge| !back_edges.contains(edge))
            .collect();
        let ranks = longest_path_ranks(node_count, &forward);

        let layer_count = ranks.iter().copied().max().unwrap_or(0) + 1;
        let mut layers: Vec<Vec<usize>> = vec![Vec::new(); layer_count];
        for (idx, rank) in ranks.iter().enumerate() {
            layers[*rank].push(idx);
        }

        let passes = self.order_passes.max(1);
        progress.report(LayoutStage::Ordering, 0, passes);
        order_layers(&mut layers, &forward, passes, &mut progress);

        progress.report(LayoutStage::Positioning, 0, node_count);
        let positions = assign_coordinates(request, &layers);

        let response = SolverResponse { positions };
        ensure_complete(request, &response)?;
        progress.report(LayoutStage::Done, node_count, node_count);
        Ok(response)
    }
}

/// Resolves edges to node indices, dropping self loops and duplicates.
fn index_edges(request: &SolverRequest) -> Result<Vec<(usize, usize)>, SolverError> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(request.nodes.len());
    for (idx, node) in request.nodes.iter().enumerate() {
        if index.insert(node.id.as_str(), idx).is_some() {
            return Err(SolverError::Rejected(format!(
                "duplicate node id `{}`",
                node.id
            )));
        }
    }

    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    let mut edges = Vec::with_capacity(request.edges.len());
    for edge in &request.edges {
        let (Some(&from), Some(&to)) = (
            index.get(edge.source_node.as_str()),
            index.get(edge.target_node.as_str()),
        ) else {
            return Err(SolverError::Rejected(format!(
                "edge `{}` references an unknown node",
                edge.id
            )));
        };
        if from == to || !seen.insert((from, to)) {
            continue;
        }
        edges.push((from, to));
    }
    Ok(edges)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Edges closing a cycle in a DFS that starts from nodes in request order.
fn find_back_edges(node_count: usize, edges: &[(usize, usize)]) -> HashSet<(usize, usize)> {
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for &(from, to) in edges {
        outgoing[from].push(to);
    }

    let mut marks = vec![Mark::Unvisited; node_count];
    let mut back_edges = HashSet::new();
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..node_count {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        marks[root] = Mark::OnStack;
        stack.push((root, 0));
        while let Some(frame) = stack.last_mut() {
            let (node, next_child) = *frame;
            if let Some(&child) = outgoing[node].get(next_child) {
                frame.1 += 1;
                match marks[child] {
                    Mark::Unvisited => {
                        marks[child] = Mark::OnStack;
                        stack.push((child, 0));
                    }
                    Mark::OnStack => {
                        back_edges.insert((node, child));
                    }
                    Mark::Done => {}
                }
            } else {
                marks[node] = Mark::Done;
                stack.pop();
            }
        }
    }

    back_edges
}

/// Longest-path layering over an acyclic edge set. Ties in the topological
/// order break by request position.
fn longest_path_ranks(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut indeg = vec![0usize; node_count];
    for &(from, to) in edges {
        outgoing[from].push(to);
        indeg[to] += 1;
    }

    let mut ready: BinaryHeap<Reverse<usize>> = (0..node_count)
        .filter(|idx| indeg[*idx] == 0)
        .map(Reverse)
        .collect();
    let mut ranks = vec![0usize; node_count];
    while let Some(Reverse(node)) = ready.pop() {
        for &next in &outgoing[node] {
            ranks[next] = ranks[next].max(ranks[node] + 1);
            indeg[next] -= 1;
            if indeg[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }
    ranks
}

fn order_layers(
    layers: &mut [Vec<usize>],
    edges: &[(usize, usize)],
    passes: usize,
    progress: &mut Progress<'_>,
) {
    if layers.len() <= 1 {
        progress.report(LayoutStage::Ordering, passes, passes);
        return;
    }
    let mut incoming: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut outgoing: HashMap<usize, Vec<usize>> = HashMap::new();
    for &(from, to) in edges {
        outgoing.entry(from).or_default().push(to);
        incoming.entry(to).or_default().push(from);
    }

    let mut positions: HashMap<usize, usize> = HashMap::new();
    update_positions(layers, &mut positions);

    for pass in 0..passes {
        for rank in 1..layers.len() {
            if layers[rank].len() > 1 {
                sort_layer(&mut layers[rank], &incoming, &positions);
                update_positions(layers, &mut positions);
            }
        }
        for rank in (0..layers.len() - 1).rev() {
            if layers[rank].len() > 1 {
                sort_layer(&mut layers[rank], &outgoing, &positions);
                update_positions(layers, &mut positions);
            }
        }
        progress.report(LayoutStage::Ordering, pass + 1, passes);
    }
}

fn update_positions(layers: &[Vec<usize>], positions: &mut HashMap<usize, usize>) {
    positions.clear();
    for layer in layers {
        for (pos, node) in layer.iter().enumerate() {
            positions.insert(*node, pos);
        }
    }
}

fn sort_layer(
    layer: &mut [usize],
    neighbors: &HashMap<usize, Vec<usize>>,
    positions: &HashMap<usize, usize>,
) {
    let current: HashMap<usize, usize> = layer
        .iter()
        .enumerate()
        .map(|(pos, node)| (*node, pos))
        .collect();
    let mut keyed: Vec<(f32, usize, usize)> = layer
        .iter()
        .map(|node| {
            (
                median_position(*node, neighbors, positions, &current),
                current[node],
                *node,
            )
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    for (slot, (_, _, node)) in layer.iter_mut().zip(keyed) {
        *slot = node;
    }
}

fn median_position(
    node: usize,
    neighbors: &HashMap<usize, Vec<usize>>,
    positions: &HashMap<usize, usize>,
    current: &HashMap<usize, usize>,
) -> f32 {
    let own = current.get(&node).copied().unwrap_or(0) as f32;
    let Some(list) = neighbors.get(&node) else {
        return own;
    };
    let mut values: Vec<f32> = list
        .iter()
        .filter_map(|neighbor| positions.get(neighbor))
        .map(|pos| *pos as f32)
        .collect();
    if values.is_empty() {
        return own;
    }
    values.sort_by(f32::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) * 0.5
    }
}

/// Packs layers into bands along the primary axis and stacks each layer along
/// the cross axis, centered against the widest layer.
fn assign_coordinates(request: &SolverRequest, layers: &[Vec<usize>]) -> Vec<SolverPosition> {
    let options = &request.options;
    let horizontal = options.direction.is_horizontal();
    let layer_gap = options.layer_spacing.max(0.0);
    let node_gap = options.node_spacing.max(0.0);
    let extent = |idx: usize| {
        let node = &request.nodes[idx];
        if horizontal {
            (node.width, node.height)
        } else {
            (node.height, node.width)
        }
    };

    let mut band_start = Vec::with_capacity(layers.len());
    let mut band_size = Vec::with_capacity(layers.len());
    let mut cross_len = Vec::with_capacity(layers.len());
    let mut cursor = 0.0f32;
    for layer in layers {
        let depth = layer
            .iter()
            .map(|idx| extent(*idx).0)
            .fold(0.0f32, f32::max);
        let span: f32 = layer.iter().map(|idx| extent(*idx).1).sum::<f32>()
            + node_gap * layer.len().saturating_sub(1) as f32;
        band_start.push(cursor);
        band_size.push(depth);
        cross_len.push(span);
        cursor += depth + layer_gap;
    }
    let total_primary = (cursor - layer_gap).max(0.0);
    let total_cross = cross_len.iter().copied().fold(0.0f32, f32::max);

    let mut positions = vec![None; request.nodes.len()];
    for (rank, layer) in layers.iter().enumerate() {
        let mut cross = (total_cross - cross_len[rank]) / 2.0;
        for &idx in layer {
            let (depth, breadth) = extent(idx);
            let mut primary = band_start[rank] + (band_size[rank] - depth) / 2.0;
            if options.direction.is_reversed() {
                primary = total_primary - primary - depth;
            }
            let (x, y) = if horizontal {
                (primary, cross)
            } else {
                (cross, primary)
            };
            positions[idx] = Some(SolverPosition {
                id: request.nodes[idx].id.clone(),
                x,
                y,
            });
            cross += breadth + node_gap;
        }
    }
    positions.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Direction;
    use crate::layout::types::{LayoutOptions, SolverEdge, SolverNode};

    fn request(ids: &[&str], pairs: &[(&str, &str)], direction: Direction) -> SolverRequest {
        SolverRequest {
            nodes: ids
                .iter()
                .map(|id| SolverNode {
                    id: id.to_string(),
                    width: 160.0,
                    height: 80.0,
                    ports: Vec::new(),
                })
                .collect(),
            edges: pairs
                .iter()
                .enumerate()
                .map(|(idx, (from, to))| SolverEdge {
                    id: format!("e{idx}"),
                    source_node: from.to_string(),
                    target_node: to.to_string(),
                    source_port: None,
                    target_port: None,
                })
                .collect(),
            options: LayoutOptions {
                direction,
                ..LayoutOptions::default()
            },
        }
    }

    fn solve(request: &SolverRequest) -> HashMap<String, (f32, f32)> {
        LayeredSolver::default()
            .solve(request, Progress::none())
            .unwrap()
            .positions
            .into_iter()
            .map(|p| (p.id, (p.x, p.y)))
            .collect()
    }

    #[test]
    fn diamond_respects_layering() {
        let req = request(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")],
            Direction::LeftRight,
        );
        let pos = solve(&req);
        assert!(pos["A"].0 < pos["B"].0);
        assert!(pos["A"].0 < pos["C"].0);
        assert!(pos["B"].0 < pos["D"].0);
        assert!(pos["C"].0 < pos["D"].0);
        let distinct: HashSet<(u32, u32)> = pos
            .values()
            .map(|(x, y)| (x.to_bits(), y.to_bits()))
            .collect();
        assert_eq!(distinct.len(), 4);
    }

    #[test]
    fn cycles_still_get_one_position_each() {
        let two = request(&["A", "B"], &[("A", "B"), ("B", "A")], Direction::LeftRight);
        assert_eq!(solve(&two).len(), 2);

        let five = request(
            &["A", "B", "C", "D", "E"],
            &[("A", "B"), ("B", "C"), ("C", "D"), ("D", "E"), ("E", "A")],
            Direction::LeftRight,
        );
        let pos = solve(&five);
        assert_eq!(pos.len(), 5);
        // The closing edge is the back edge; the rest stays ordered.
        assert!(pos["A"].0 < pos["B"].0);
        assert!(pos["D"].0 < pos["E"].0);
    }

    #[test]
    fn fan_out_and_fan_in() {
        let out = request(
            &["A", "B", "C", "D", "E"],
            &[("A", "B"), ("A", "C"), ("A", "D"), ("A", "E")],
            Direction::LeftRight,
        );
        let pos = solve(&out);
        for target in ["B", "C", "D", "E"] {
            assert!(pos["A"].0 < pos[target].0);
        }

        let fan_in = request(
            &["B", "C", "D", "E", "Z"],
            &[("B", "Z"), ("C", "Z"), ("D", "Z"), ("E", "Z")],
            Direction::LeftRight,
        );
        let pos = solve(&fan_in);
        for source in ["B", "C", "D", "E"] {
            assert!(pos[source].0 < pos["Z"].0);
        }
    }

    #[test]
    fn other_directions_follow_their_axis() {
        let pairs = [("A", "B"), ("B", "C")];
        let pos = solve(&request(&["A", "B", "C"], &pairs, Direction::TopBottom));
        assert!(pos["A"].1 < pos["B"].1 && pos["B"].1 < pos["C"].1);

        let pos = solve(&request(&["A", "B", "C"], &pairs, Direction::RightLeft));
        assert!(pos["A"].0 > pos["B"].0 && pos["B"].0 > pos["C"].0);

        let pos = solve(&request(&["A", "B", "C"], &pairs, Direction::BottomTop));
        assert!(pos["A"].1 > pos["B"].1 && pos["B"].1 > pos["C"].1);
    }

    #[test]
    fn disconnected_components_and_self_loops() {
        let req = request(
            &["A", "B", "X", "Y", "S"],
            &[("A", "B"), ("X", "Y"), ("S", "S")],
            Direction::LeftRight,
        );
        let pos = solve(&req);
        assert_eq!(pos.len(), 5);
        assert!(pos["A"].0 < pos["B"].0);
        assert!(pos["X"].0 < pos["Y"].0);
    }

    #[test]
    fn unknown_edge_endpoint_is_rejected() {
        let req = request(&["A"], &[("A", "ghost")], Direction::LeftRight);
        let result = LayeredSolver::default().solve(&req, Progress::none());
        assert!(matches!(result, Err(SolverError::Rejected(_))));
    }

    #[test]
    fn back_edges_close_cycles_only() {
        let edges = [(0, 1), (1, 2), (2, 0), (0, 2)];
        let back = find_back_edges(3, &edges);
        assert_eq!(back.len(), 1);
        assert!(back.contains(&(2, 0)));
    }

    #[test]
    fn deterministic_output() {
        let req = request(
            &["A", "B", "C", "D", "E"],
            &[("A", "C"), ("B", "C"), ("C", "D"), ("C", "E"), ("E", "A")],
            Direction::LeftRight,
        );
        let first = LayeredSolver::default().solve(&req, Progress::none()).unwrap();
        let second = LayeredSolver::default().solve(&req, Progress::none()).unwrap();
        assert_eq!(first, second);
    }
}
