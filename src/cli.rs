use crate::config::{Config, SolverKind, load_config};
use crate::highlight::highlight;
use crate::ir::{Direction, LineageGraph};
use crate::layout::{LayoutProgress, Progress, layout_lineage, solver_for};
use crate::layout_dump::write_layout_dump;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "lineage-layout",
    version,
    about = "Lay out a data lineage graph as table cards or flat nodes"
)]
pub struct Args {
    /// Input lineage JSON file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output layout JSON file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON5 file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Layout direction (TB, TD, BT, LR, RL)
    #[arg(short = 'd', long = "direction", value_parser = parse_direction)]
    pub direction: Option<Direction>,

    /// Layout engine
    #[arg(short = 's', long = "solver", value_enum)]
    pub solver: Option<SolverArg>,

    /// Embed the lineage reachable from this node id
    #[arg(long = "highlight")]
    pub highlight: Option<String>,

    /// Debug logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum SolverArg {
    Dagre,
    Layered,
}

impl From<SolverArg> for SolverKind {
    fn from(arg: SolverArg) -> Self {
        match arg {
            SolverArg::Dagre => SolverKind::Dagre,
            SolverArg::Layered => SolverKind::Layered,
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = apply_overrides(load_config(args.config.as_deref())?, &args);
    let input = read_input(args.input.as_deref())?;
    let graph = LineageGraph::from_json(&input)?;

    let solver = solver_for(&config);
    let mut report = |progress: LayoutProgress| {
        tracing::trace!(
            stage = ?progress.stage,
            completed = progress.completed,
            total = progress.total,
            "layout progress"
        );
    };
    let layout = layout_lineage(&graph, &config, solver.as_ref(), Progress::new(&mut report))?;

    let highlighted = match args.highlight.as_deref() {
        Some(node_id) => {
            if !graph.nodes.iter().any(|node| node.id == node_id) {
                return Err(anyhow::anyhow!("Unknown node for --highlight: {node_id}"));
            }
            Some(highlight(node_id, &graph.edges))
        }
        None => None,
    };

    write_layout_dump(args.output.as_deref(), &layout, highlighted)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn apply_overrides(mut config: Config, args: &Args) -> Config {
    if let Some(direction) = args.direction {
        config.layout.direction = direction;
    }
    if let Some(solver) = args.solver {
        config.layout.solver = solver.into();
    }
    config
}

fn parse_direction(value: &str) -> Result<Direction, String> {
    Direction::from_token(value).ok_or_else(|| format!("unknown direction '{value}'"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_file() {
        let args = Args::parse_from([
            "lineage-layout",
            "-i",
            "graph.json",
            "-d",
            "td",
            "--solver",
            "layered",
            "--highlight",
            "orders.id",
        ]);
        assert_eq!(args.direction, Some(Direction::TopBottom));
        assert_eq!(args.highlight.as_deref(), Some("orders.id"));

        let config = apply_overrides(Config::default(), &args);
        assert_eq!(config.layout.direction, Direction::TopBottom);
        assert_eq!(config.layout.solver, SolverKind::Layered);
    }

    #[test]
    fn missing_flags_keep_config_values() {
        let args = Args::parse_from(["lineage-layout"]);
        let config = apply_overrides(Config::default(), &args);
        assert_eq!(config.layout.direction, Direction::LeftRight);
        assert_eq!(config.layout.solver, SolverKind::Dagre);
    }

    #[test]
    fn rejects_unknown_direction() {
        assert!(Args::try_parse_from(["lineage-layout", "-d", "diagonal"]).is_err());
    }
}
