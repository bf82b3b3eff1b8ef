use lineage_graph::config::parse_config;
use lineage_graph::{
    Config, LayoutDump, LineageGraph, Progress, highlight, layout_lineage, solver_for,
};
use wasm_bindgen::prelude::*;

fn to_js(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Options use the same camelCase keys as the CLI config file.
fn build_config(options_json: Option<&str>) -> Result<Config, String> {
    match options_json.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => parse_config(raw).map_err(|error| error.to_string()),
        None => Ok(Config::default()),
    }
}

fn layout_to_json(graph_json: &str, options_json: Option<&str>) -> Result<String, String> {
    let config = build_config(options_json)?;
    let graph = LineageGraph::from_json(graph_json).map_err(|error| error.to_string())?;
    let solver = solver_for(&config);
    let layout = layout_lineage(&graph, &config, solver.as_ref(), Progress::none())
        .map_err(|error| error.to_string())?;
    LayoutDump::from_layout(&layout, None)
        .to_json_string()
        .map_err(|error| error.to_string())
}

fn highlight_to_json(graph_json: &str, node_id: &str) -> Result<String, String> {
    let graph = LineageGraph::from_json(graph_json).map_err(|error| error.to_string())?;
    serde_json::to_string(&highlight(node_id, &graph.edges)).map_err(|error| error.to_string())
}

#[wasm_bindgen]
pub fn layout_lineage_json(graph_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    layout_to_json(graph_json, options_json.as_deref()).map_err(to_js)
}

#[wasm_bindgen]
pub fn highlight_json(graph_json: &str, node_id: &str) -> Result<String, JsValue> {
    highlight_to_json(graph_json, node_id).map_err(to_js)
}
