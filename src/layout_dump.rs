use crate::highlight::Highlight;
use crate::layout::DiagramLayout;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// The JSON document written by the CLI and returned by the WASM wrapper.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump<'a> {
    pub table_count: usize,
    pub flat_count: usize,
    #[serde(flatten)]
    pub layout: &'a DiagramLayout,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Highlight>,
}

impl<'a> LayoutDump<'a> {
    pub fn from_layout(layout: &'a DiagramLayout, highlight: Option<Highlight>) -> Self {
        let table_count = layout
            .nodes
            .iter()
            .filter(|node| node.is_table())
            .count();
        LayoutDump {
            table_count,
            flat_count: layout.nodes.len() - table_count,
            layout,
            highlight,
        }
    }

    pub fn to_json_string(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Writes the dump as pretty JSON to `path`, or stdout when no path is given.
pub fn write_layout_dump(
    path: Option<&Path>,
    layout: &DiagramLayout,
    highlight: Option<Highlight>,
) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout, highlight);
    match path {
        Some(path) if path != Path::new("-") => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writer.flush()?;
        }
        _ => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
