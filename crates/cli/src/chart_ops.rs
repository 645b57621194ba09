//! Chart file plumbing shared by the subcommands
//!
//! - open a `.chart` file into an engine `Chart`
//! - resolve `--row`/`--column` targets (label or `#n`)
//! - write the chart back, preferring the file it came from
//! - render `inspect` output

use std::path::{Path, PathBuf};

use rewardgrid_engine::chart::Chart;
use rewardgrid_io::store::{self, FileStore, SaveMethod};
use serde_json::{json, Value};

use crate::util::{display_width, pad_left, pad_right, truncate_display};
use crate::CliError;

/// Widest row-label column in the `inspect` table.
const MAX_LABEL_WIDTH: usize = 20;
/// Widest star column in the `inspect` table.
const MAX_COLUMN_WIDTH: usize = 12;

/// A chart loaded from disk together with the store it was read from.
pub struct ChartFile {
    pub chart: Chart,
    store: FileStore,
}

impl ChartFile {
    pub fn open(path: &Path) -> Result<Self, CliError> {
        let mut store = FileStore::for_file(path);
        let mut chart = Chart::new();
        store::open_chart(&mut store, &mut chart).map_err(CliError::store)?;
        log::debug!(
            "opened {}: {} rows x {} columns, {} stars",
            path.display(),
            chart.row_count(),
            chart.column_count(),
            chart.total_stars()
        );
        Ok(Self { chart, store })
    }

    /// Wrap a fresh chart that will be written through `store`.
    pub fn create(chart: Chart, store: FileStore) -> Self {
        Self { chart, store }
    }

    /// Write the chart back. Returns the path that was written.
    pub fn save(&mut self, name_hint: &str) -> Result<PathBuf, CliError> {
        let method = store::save_chart(&mut self.chart, &mut self.store, name_hint)
            .map_err(CliError::store)?;
        match method {
            SaveMethod::Overwrite(path) | SaveMethod::NewFile(path) => Ok(path),
            SaveMethod::Delivered => Err(CliError::io("chart was not written to a file")),
        }
    }
}

/// Which axis a target refers to, for messages.
#[derive(Debug, Clone, Copy)]
pub enum Axis {
    Row,
    Column,
}

impl Axis {
    fn name(self) -> &'static str {
        match self {
            Axis::Row => "row",
            Axis::Column => "column",
        }
    }
}

/// Resolve a `--row`/`--column` argument to an index.
///
/// `#n` is a 1-based position; anything else is matched against labels
/// (first exact match after trimming).
pub fn resolve_target(chart: &Chart, axis: Axis, target: &str) -> Result<usize, CliError> {
    let count = match axis {
        Axis::Row => chart.row_count(),
        Axis::Column => chart.column_count(),
    };
    let target = target.trim();

    if let Some(pos) = target.strip_prefix('#') {
        let n: usize = pos.parse().map_err(|_| {
            CliError::args(format!("invalid {} position: {}", axis.name(), target))
                .with_hint("positions are written #1, #2, ...")
        })?;
        if n == 0 || n > count {
            return Err(CliError::args(format!(
                "{} {} out of range (chart has {})",
                axis.name(),
                target,
                count
            )));
        }
        return Ok(n - 1);
    }

    let found = match axis {
        Axis::Row => chart.find_row(target),
        Axis::Column => chart.find_column(target),
    };
    found.ok_or_else(|| {
        CliError::args(format!("no {} named {:?}", axis.name(), target))
            .with_hint("run `rgrid inspect` to list labels, or use #n for a position")
    })
}

/// JSON view of a chart for `inspect --json`.
pub fn inspect_json(chart: &Chart) -> Value {
    let rows: Vec<Value> = chart
        .rows()
        .iter()
        .map(|row| {
            let cells: Vec<Value> = row
                .cells()
                .iter()
                .map(|cell| json!(cell.colors().collect::<Vec<_>>()))
                .collect();
            json!({
                "label": row.label(),
                "stars": row.star_count(),
                "cells": cells,
            })
        })
        .collect();

    json!({
        "title": chart.title(),
        "columns": chart.columns().iter().map(|c| c.label()).collect::<Vec<_>>(),
        "rows": rows,
        "total_stars": chart.total_stars(),
    })
}

/// Plain-text table: one line per row, star counts per column, row total last.
pub fn inspect_table(chart: &Chart) -> String {
    let label_width = chart
        .rows()
        .iter()
        .map(|r| display_width(r.label()))
        .max()
        .unwrap_or(0)
        .clamp(4, MAX_LABEL_WIDTH);
    let widths: Vec<usize> = chart
        .columns()
        .iter()
        .map(|c| display_width(c.label()).clamp(3, MAX_COLUMN_WIDTH))
        .collect();

    let mut out = String::new();
    out.push_str(chart.title());
    out.push('\n');

    out.push_str(&pad_right("", label_width));
    for (column, width) in chart.columns().iter().zip(&widths) {
        out.push_str("  ");
        out.push_str(&pad_left(&truncate_display(column.label(), *width), *width));
    }
    out.push_str("  Stars\n");

    for row in chart.rows() {
        out.push_str(&pad_right(row.label(), label_width));
        for (cell, width) in row.cells().iter().zip(&widths) {
            out.push_str("  ");
            out.push_str(&pad_left(&cell.len().to_string(), *width));
        }
        out.push_str("  ");
        out.push_str(&pad_left(&row.star_count().to_string(), 5));
        out.push('\n');
    }

    if chart.row_count() == 0 {
        out.push_str("(no rows)\n");
    }
    out
}
