use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use lineage_graph::config::{Config, SolverKind};
use lineage_graph::highlight::{Adjacency, reachable_from};
use lineage_graph::ir::{LineageEdge, LineageGraph, LineageNode};
use lineage_graph::layout::{Progress, layout_lineage, solver_for};
use lineage_graph::model::build_table_aggregates_default;
use std::hint::black_box;

/// `tables` tables spread over a few databases, `columns` columns each, and a
/// chain of column edges from every table to the next plus some skip edges.
fn warehouse_graph(tables: usize, columns: usize, skip_edges: usize) -> LineageGraph {
    let mut graph = LineageGraph::new();
    for t in 0..tables {
        let database = format!("db{}", t % 4);
        let table = format!("table_{t}");
        for c in 0..columns {
            graph.nodes.push(LineageNode::column(
                &format!("t{t}.c{c}"),
                &database,
                &table,
                &format!("column_{c}"),
            ));
        }
    }
    for t in 0..tables.saturating_sub(1) {
        for c in 0..columns {
            graph.edges.push(
                LineageEdge::new(&format!("e{t}.{c}"), &format!("t{t}.c{c}"), &format!("t{}.c{c}", t + 1))
                    .with_transformation("direct")
                    .with_confidence(0.5 + (c % 5) as f32 * 0.1),
            );
        }
    }
    let mut count = 0usize;
    for t in 0..tables {
        for u in (t + 2)..tables {
            if count >= skip_edges {
                break;
            }
            graph.edges.push(
                LineageEdge::new(&format!("s{t}.{u}"), &format!("t{t}.c0"), &format!("t{u}.c0"))
                    .with_transformation("derived"),
            );
            count += 1;
        }
    }
    graph
}

fn bench_model_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_build");
    for (tables, columns) in [(20usize, 8usize), (100, 12), (400, 16)] {
        let graph = warehouse_graph(tables, columns, 0);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{tables}x{columns}")),
            &graph.nodes,
            |b, nodes| {
                b.iter(|| {
                    let model = build_table_aggregates_default(black_box(nodes));
                    black_box(model.aggregates.len());
                });
            },
        );
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    for solver_kind in [SolverKind::Layered, SolverKind::Dagre] {
        let mut config = Config::default();
        config.layout.solver = solver_kind;
        let solver = solver_for(&config);
        for (tables, skip_edges) in [(20usize, 20usize), (60, 120)] {
            let graph = warehouse_graph(tables, 6, skip_edges);
            group.bench_with_input(
                BenchmarkId::new(format!("{solver_kind:?}"), tables),
                &graph,
                |b, graph| {
                    b.iter(|| {
                        let layout =
                            layout_lineage(black_box(graph), &config, solver.as_ref(), Progress::none())
                                .expect("layout failed");
                        black_box(layout.nodes.len());
                    });
                },
            );
        }
    }
    group.finish();
}

fn bench_hover_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("hover_traversal");
    for tables in [50usize, 500] {
        let graph = warehouse_graph(tables, 10, tables);
        let adjacency = Adjacency::from_edges(&graph.edges);
        let start = format!("t{}.c0", tables / 2);
        group.bench_with_input(BenchmarkId::from_parameter(tables), &start, |b, start| {
            b.iter(|| {
                let reached = reachable_from(black_box(start), &adjacency);
                black_box(reached.len());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_model_build, bench_layout, bench_hover_traversal);
criterion_main!(benches);
