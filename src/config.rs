use crate::ir::Direction;
use crate::layout::LayoutOptions;
use crate::theme::{EdgePalette, Theme};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometry of a table aggregate card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableSizing {
    pub header_height: f32,
    pub row_height: f32,
    pub padding: f32,
    pub min_height: f32,
    pub min_width: f32,
    pub max_width: f32,
    pub title_char_width: f32,
    pub title_padding: f32,
    pub column_char_width: f32,
    pub column_padding: f32,
}

impl Default for TableSizing {
    fn default() -> Self {
        Self {
            header_height: 40.0,
            row_height: 28.0,
            padding: 8.0,
            min_height: 76.0,
            min_width: 220.0,
            max_width: 420.0,
            title_char_width: 9.0,
            title_padding: 64.0,
            column_char_width: 7.5,
            column_padding: 88.0,
        }
    }
}

/// Geometry of nodes laid out without table grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlatSizing {
    pub char_width: f32,
    pub padding: f32,
    pub min_width: f32,
    pub max_width: f32,
    pub height: f32,
}

impl Default for FlatSizing {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            padding: 40.0,
            min_width: 150.0,
            max_width: 320.0,
            height: 56.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterConfig {
    pub padding: f32,
    pub header_height: f32,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            padding: 24.0,
            header_height: 32.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
    #[default]
    Dagre,
    Layered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub direction: Direction,
    pub node_spacing: f32,
    pub layer_spacing: f32,
    pub order_passes: usize,
    pub solver: SolverKind,
    pub table: TableSizing,
    pub flat: FlatSizing,
    pub cluster: ClusterConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: Direction::LeftRight,
            node_spacing: 50.0,
            layer_spacing: 120.0,
            order_passes: 4,
            solver: SolverKind::Dagre,
            table: TableSizing::default(),
            flat: FlatSizing::default(),
            cluster: ClusterConfig::default(),
        }
    }
}

impl LayoutConfig {
    pub fn options(&self) -> LayoutOptions {
        LayoutOptions {
            direction: self.direction,
            node_spacing: self.node_spacing,
            layer_spacing: self.layer_spacing,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    direction: Option<Direction>,
    node_spacing: Option<f32>,
    layer_spacing: Option<f32>,
    order_passes: Option<usize>,
    solver: Option<SolverKind>,
    table: Option<TableSizing>,
    flat: Option<FlatSizing>,
    cluster: Option<ClusterConfig>,
    edge_colors: Option<EdgeColorsFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct EdgeColorsFile {
    direct: Option<String>,
    derived: Option<String>,
    aggregated: Option<String>,
    joined: Option<String>,
    calculation: Option<String>,
    fallback: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a JSON5 config document on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::by_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme `{}`", theme_name))?;
    }
    if let Some(v) = parsed.direction {
        config.layout.direction = v;
    }
    if let Some(v) = parsed.node_spacing {
        config.layout.node_spacing = v;
    }
    if let Some(v) = parsed.layer_spacing {
        config.layout.layer_spacing = v;
    }
    if let Some(v) = parsed.order_passes {
        config.layout.order_passes = v;
    }
    if let Some(v) = parsed.solver {
        config.layout.solver = v;
    }
    if let Some(v) = parsed.table {
        config.layout.table = v;
    }
    if let Some(v) = parsed.flat {
        config.layout.flat = v;
    }
    if let Some(v) = parsed.cluster {
        config.layout.cluster = v;
    }
    if let Some(colors) = parsed.edge_colors {
        apply_edge_colors(&mut config.theme.edges, colors);
    }
    Ok(config)
}

fn apply_edge_colors(palette: &mut EdgePalette, colors: EdgeColorsFile) {
    if let Some(v) = colors.direct {
        palette.direct = v;
    }
    if let Some(v) = colors.derived {
        palette.derived = v;
    }
    if let Some(v) = colors.aggregated {
        palette.aggregated = v;
    }
    if let Some(v) = colors.joined {
        palette.joined = v;
    }
    if let Some(v) = colors.calculation {
        palette.calculation = v;
    }
    if let Some(v) = colors.fallback {
        palette.fallback = v;
    }
}
