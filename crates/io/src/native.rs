// Native .chart format: UTF-8 JSON, one document per file.
//
// {
//   "title": "...",
//   "columns": ["HW1", ...],
//   "rows": ["Ana", ...],
//   "cells": [[{"tokens": [{"color": "#FF6B00"}, ...]}, ...], ...]
// }
//
// cells[r][c] belongs to rows[r] x columns[c].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use rewardgrid_engine::chart::{clean_label, Chart, UNNAMED_LABEL};
use rewardgrid_engine::palette::ColorSelector;

use crate::error::CodecError;
use crate::legacy;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<String>,
    #[serde(default)]
    pub cells: Vec<Vec<DocCell>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocCell {
    #[serde(default)]
    pub tokens: Vec<DocToken>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocToken {
    /// None only for legacy tokens saved without a color; one is picked on load.
    #[serde(default)]
    pub color: Option<String>,
}

impl DocToken {
    pub fn new(color: impl Into<String>) -> Self {
        Self { color: Some(color.into()) }
    }
}

/// Snapshot a chart as a document. Tokens still in flight are not written.
pub fn serialize(chart: &Chart) -> ChartDocument {
    ChartDocument {
        title: Some(chart.title().to_string()),
        columns: chart.columns().iter().map(|c| c.label().to_string()).collect(),
        rows: chart.rows().iter().map(|r| r.label().to_string()).collect(),
        cells: chart
            .rows()
            .iter()
            .map(|row| {
                row.cells()
                    .iter()
                    .map(|cell| DocCell {
                        tokens: cell.colors().map(DocToken::new).collect(),
                    })
                    .collect()
            })
            .collect(),
    }
}

/// Parse bytes as JSON, without interpreting the shape.
pub fn deserialize(bytes: &[u8]) -> Result<Value, CodecError> {
    let text = std::str::from_utf8(bytes).map_err(|e| CodecError::Encoding(e.to_string()))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    serde_json::from_str(text).map_err(|e| CodecError::Parse(e.to_string()))
}

/// Parse, migrate legacy shapes, and decode into a typed document.
pub fn from_bytes(bytes: &[u8]) -> Result<ChartDocument, CodecError> {
    let value = legacy::normalize(deserialize(bytes)?);
    serde_json::from_value(value).map_err(|e| CodecError::Shape(e.to_string()))
}

/// Compact JSON, the same layout browsers have always exported.
pub fn to_bytes(doc: &ChartDocument) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(doc).map_err(|e| CodecError::Serialize(e.to_string()))
}

/// Build a chart from a normalized document. History starts empty.
pub fn load(doc: &ChartDocument) -> Chart {
    let mut selector = ColorSelector::new();
    build(doc, &mut selector)
}

/// Replace `chart`'s contents with the chart encoded in `bytes`.
///
/// All-or-nothing: on error `chart` is untouched. Listeners, show mode and
/// the color selector stay with `chart`; history is reset.
pub fn load_into(chart: &mut Chart, bytes: &[u8]) -> Result<(), CodecError> {
    let doc = from_bytes(bytes)?;
    let built = build(&doc, chart.selector_mut());
    chart.replace_with(built);
    Ok(())
}

fn build(doc: &ChartDocument, selector: &mut ColorSelector) -> Chart {
    let mut chart = Chart::new();
    chart.set_title(doc.title.as_deref().unwrap_or(""));

    // Blank labels keep their slot so cells stay aligned
    for label in &doc.columns {
        chart.add_column(&clean_label(label).unwrap_or_else(|| UNNAMED_LABEL.to_string()));
    }
    for label in &doc.rows {
        chart.add_row(&clean_label(label).unwrap_or_else(|| UNNAMED_LABEL.to_string()));
    }

    if doc.cells.len() != doc.rows.len() {
        log::warn!(
            "document has {} cell rows for {} rows; extra ignored, missing left empty",
            doc.cells.len(),
            doc.rows.len()
        );
    }

    for (r, row_cells) in doc.cells.iter().enumerate().take(doc.rows.len()) {
        if row_cells.len() != doc.columns.len() {
            log::warn!(
                "row {} has {} cells for {} columns",
                r,
                row_cells.len(),
                doc.columns.len()
            );
        }
        for (c, cell) in row_cells.iter().enumerate().take(doc.columns.len()) {
            for token in &cell.tokens {
                let color = match token.color.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
                    Some(color) => color.to_string(),
                    None => selector.next().to_string(),
                };
                chart.attach_loaded_token(r, c, &color);
            }
        }
    }

    log::debug!(
        "loaded chart {:?}: {} columns, {} rows, {} stars",
        chart.title(),
        chart.column_count(),
        chart.row_count(),
        chart.total_stars()
    );
    chart.mark_clean();
    chart
}
