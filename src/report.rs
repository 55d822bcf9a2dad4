//! Terminal rendering of cost trees and comparisons.
//!
//! Everything here is display only: sorting, expansion depth and
//! placeholders never change the forest or report being rendered.

use crate::compare::{item_cost, row_difference};
use crate::config::BomConfig;
use crate::constants::{ABSENT_PLACEHOLDER, COLLAPSED_MARKER, EXPANDED_MARKER, TREE_INDENT};
use crate::cost::{own_cost, total_cost};
use crate::models::{ComparisonReport, ComparisonRow, CostNode, CostTrend, Difference};
use colored::*;
use std::cmp::Ordering;

/// Layout of the side-by-side comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ComparisonView {
    /// Item cost per upload and the difference
    Simple,
    /// Every field of every upload
    Complete,
}

// =============================================================================
// Tree view
// =============================================================================

/// Render every root with its expanded subtree
pub fn render_forest(forest: &[CostNode], config: &BomConfig) -> String {
    let mut roots: Vec<&CostNode> = forest.iter().collect();
    if config.sort_roots_by_cost {
        roots.sort_by(|a, b| compare_totals(a, b));
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{}\n",
        format!(
            "{:<40} {:>8} {:>12} {:>10} {:>16} {:>18}",
            "Name", "Quantity", "Price", "Failure/yr", "Item cost/yr", "Assembly cost/yr"
        )
        .bright_white()
        .bold()
    ));

    for root in roots {
        render_node(root, 0, config, &mut out);
    }
    out
}

fn render_node(node: &CostNode, depth: usize, config: &BomConfig, out: &mut String) {
    let expanded = config.default_depth.is_none_or(|max| depth < max);
    let marker = match (node.has_children(), expanded) {
        (false, _) => " ",
        (true, true) => EXPANDED_MARKER,
        (true, false) => COLLAPSED_MARKER,
    };

    let label = format!("{}{} {}", " ".repeat(depth * TREE_INDENT), marker, node.name);
    let total = config.format_cost(total_cost(node));

    if depth == 0 {
        out.push_str(&format!(
            "{} {} {}\n",
            format!("{label:<40}").bright_cyan().bold(),
            format!("{:<49}", node.description).bright_black(),
            format!("{total:>18}").bright_white().bold(),
        ));
    } else {
        out.push_str(&format!(
            "{:<40} {:>8} {:>12} {:>10} {:>16} {:>18}\n",
            label,
            node.quantity,
            config.format_cost(node.price),
            format!("{:.3}", node.failure_rate),
            config.format_cost(own_cost(node)),
            total,
        ));
    }

    if !expanded {
        return;
    }

    let mut children: Vec<&CostNode> = node.children.iter().collect();
    if config.sort_children_by_cost {
        children.sort_by(|a, b| compare_totals(b, a));
    }
    for child in children {
        render_node(child, depth + 1, config, out);
    }
}

fn compare_totals(a: &CostNode, b: &CostNode) -> Ordering {
    total_cost(a)
        .partial_cmp(&total_cost(b))
        .unwrap_or(Ordering::Equal)
}

// =============================================================================
// Comparison views
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellStyle {
    Plain,
    Header,
    Strong,
    Trend(CostTrend),
}

#[derive(Debug, Clone)]
struct Cell {
    text: String,
    style: CellStyle,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: CellStyle::Plain,
        }
    }

    fn header(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: CellStyle::Header,
        }
    }

    fn strong(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: CellStyle::Strong,
        }
    }

    fn difference(difference: Difference, decimals: usize) -> Self {
        Self {
            text: difference.format(decimals),
            style: CellStyle::Trend(difference.trend_at(decimals)),
        }
    }

    fn render(&self, width: usize) -> String {
        let padded = format!("{:<width$}", self.text);
        match self.style {
            CellStyle::Plain => padded,
            CellStyle::Header => padded.bright_white().bold().to_string(),
            CellStyle::Strong => padded.bold().to_string(),
            CellStyle::Trend(CostTrend::Higher) => padded.red().to_string(),
            CellStyle::Trend(CostTrend::Lower) => padded.green().to_string(),
            CellStyle::Trend(CostTrend::Unchanged) => padded,
        }
    }
}

/// Rows of cells rendered with aligned columns
fn render_table(rows: &[Vec<Cell>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|column| {
            rows.iter()
                .filter_map(|row| row.get(column))
                .map(|cell| cell.text.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for row in rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| cell.render(*width))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// Render a comparison in the requested layout
pub fn render_comparison(
    report: &ComparisonReport,
    view: ComparisonView,
    config: &BomConfig,
) -> String {
    match view {
        ComparisonView::Simple => render_simple(report, config),
        ComparisonView::Complete => render_complete(report, config),
    }
}

fn cost_cell(cost: Option<f64>, config: &BomConfig) -> Cell {
    match cost {
        Some(cost) => Cell::plain(config.format_cost(cost)),
        None => Cell::plain(ABSENT_PLACEHOLDER),
    }
}

fn render_simple(report: &ComparisonReport, config: &BomConfig) -> String {
    let with_difference = report.file_count() == 2;

    let mut header = vec![Cell::header("Name"), Cell::header("Type")];
    header.extend(report.labels.iter().map(|label| Cell::header(label.as_str())));
    if with_difference {
        header.push(Cell::header("Difference"));
    }

    let mut rows = vec![header];
    for row in &report.rows {
        let mut cells = vec![Cell::plain(&row.name), Cell::plain(&row.item_type)];
        cells.extend(
            (0..report.file_count()).map(|index| cost_cell(item_cost(row.record(index)), config)),
        );
        if let Some(difference) = row_difference(row) {
            cells.push(Cell::difference(difference, config.decimals));
        }
        rows.push(cells);
    }

    let mut total = vec![Cell::strong("Total Cost"), Cell::plain("")];
    total.extend(
        report
            .totals
            .iter()
            .map(|cost| Cell::strong(config.format_cost(*cost))),
    );
    if let Some(difference) = report.total_difference() {
        total.push(Cell::difference(difference, config.decimals));
    }
    rows.push(total);

    render_table(&rows)
}

const COMPLETE_FIELDS: &[&str] = &[
    "Quantity",
    "Price",
    "Failure rate (1/year)",
    "Item cost ($/year)",
    "Description",
];

fn render_complete(report: &ComparisonReport, config: &BomConfig) -> String {
    let mut labels = vec![Cell::plain(""), Cell::plain(""), Cell::plain("")];
    let mut fields = vec![
        Cell::header("Name"),
        Cell::header("Type"),
        Cell::header("Parent"),
    ];
    for label in &report.labels {
        labels.push(Cell::header(label.as_str()));
        labels.extend((1..COMPLETE_FIELDS.len()).map(|_| Cell::plain("")));
        fields.extend(COMPLETE_FIELDS.iter().map(|field| Cell::header(*field)));
    }

    let mut rows = vec![labels, fields];
    for row in &report.rows {
        rows.push(complete_row(report, row, config));
    }

    render_table(&rows)
}

fn complete_row(report: &ComparisonReport, row: &ComparisonRow, config: &BomConfig) -> Vec<Cell> {
    let mut cells = vec![
        Cell::plain(&row.name),
        Cell::plain(&row.item_type),
        Cell::plain(row.parent_name.as_deref().unwrap_or(ABSENT_PLACEHOLDER)),
    ];

    for index in 0..report.file_count() {
        let Some(record) = row.record(index) else {
            cells.extend(COMPLETE_FIELDS.iter().map(|_| Cell::plain(ABSENT_PLACEHOLDER)));
            continue;
        };

        cells.push(Cell::plain(record.quantity.to_string()));
        cells.push(optional_number(record.price));
        cells.push(optional_number(record.failure_rate));
        cells.push(if record.is_product(&config.product_type) {
            Cell::strong(config.format_cost(report.totals[index]))
        } else {
            cost_cell(item_cost(Some(record)), config)
        });
        cells.push(Cell::plain(
            record.description.as_deref().unwrap_or(ABSENT_PLACEHOLDER),
        ));
    }

    cells
}

fn optional_number(value: Option<f64>) -> Cell {
    match value {
        Some(value) => Cell::plain(value.to_string()),
        None => Cell::plain(ABSENT_PLACEHOLDER),
    }
}
