#[cfg(feature = "cli")]
pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod highlight;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod ports;
pub mod style;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use cluster::{Bounds, Cluster, compute_clusters};
pub use config::{Config, LayoutConfig, SolverKind, load_config};
pub use error::{LineageError, SolverError};
pub use highlight::{Adjacency, Highlight, TraversalDirection, highlight, reachable_from};
pub use ir::{Direction, LineageEdge, LineageGraph, LineageNode, NodeKind};
pub use layout::{
    DagreSolver, DiagramLayout, LayeredSolver, LayoutSession, LayoutSolver, Progress,
    layout_lineage, solver_for,
};
pub use layout_dump::LayoutDump;
pub use model::{TableAggregate, TableModel, build_table_aggregates};
pub use ports::{PortLookup, synthesize_ports};
pub use style::{EdgeStyle, StyledEdge, style_edge};
pub use theme::Theme;
