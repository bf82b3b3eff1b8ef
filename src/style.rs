use serde::Serialize;

use crate::ir::LineageEdge;
use crate::theme::EdgePalette;

pub const BASE_STROKE_WIDTH: f32 = 2.0;
/// Edges below this confidence (percent) are drawn animated.
pub const ANIMATION_THRESHOLD: f32 = 80.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub color: String,
    pub opacity: f32,
    pub animated: bool,
    pub stroke_width: f32,
    pub marker_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyledEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    pub transformation_type: Option<String>,
    pub confidence_score: Option<f32>,
    pub style: EdgeStyle,
}

pub fn style_edge(edge: &LineageEdge) -> EdgeStyle {
    style_edge_with(edge, &EdgePalette::default())
}

pub fn style_edge_with(edge: &LineageEdge, palette: &EdgePalette) -> EdgeStyle {
    let color = edge_color(edge.transformation_type.as_deref(), palette).to_string();
    let confidence = edge.confidence_score.map(confidence_percent);
    EdgeStyle {
        marker_color: color.clone(),
        color,
        opacity: confidence.map_or(1.0, opacity_for),
        animated: confidence.is_some_and(|c| c < ANIMATION_THRESHOLD),
        stroke_width: BASE_STROKE_WIDTH,
    }
}

pub fn edge_color<'a>(transformation: Option<&str>, palette: &'a EdgePalette) -> &'a str {
    let Some(kind) = transformation else {
        return &palette.fallback;
    };
    match kind.trim().to_ascii_lowercase().as_str() {
        "direct" => &palette.direct,
        "derived" => &palette.derived,
        "aggregated" | "aggregation" => &palette.aggregated,
        "joined" => &palette.joined,
        "calculation" => &palette.calculation,
        _ => &palette.fallback,
    }
}

/// Scores arrive either as a fraction or as a percentage.
pub fn confidence_percent(score: f32) -> f32 {
    if score <= 1.0 { score * 100.0 } else { score }
}

fn opacity_for(percent: f32) -> f32 {
    if percent >= 90.0 {
        1.0
    } else if percent >= 70.0 {
        0.9
    } else if percent >= 50.0 {
        0.8
    } else {
        0.7
    }
}

pub fn styled_edge(
    edge: &LineageEdge,
    source_handle: Option<String>,
    target_handle: Option<String>,
    palette: &EdgePalette,
) -> StyledEdge {
    StyledEdge {
        id: edge.id.clone(),
        source: edge.source.clone(),
        target: edge.target.clone(),
        source_handle,
        target_handle,
        transformation_type: edge.transformation_type.clone(),
        confidence_score: edge.confidence_score,
        style: style_edge_with(edge, palette),
    }
}
