use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use gtm_core::RunReport;
use gtm_model::{ResourceKind, RunState};

pub fn print_summary(report: &RunReport) {
    println!("Status: {}", report.status_label());
    if let Some(workspace) = &report.workspace {
        println!("Workspace: {} (ID: {})", workspace.name, workspace.id);
        println!("URL: {}", workspace.url);
    }
    if let Some(cleared) = &report.cleared {
        println!(
            "Cleared: {} existing resources ({} failed calls)",
            cleared.deleted.total(),
            cleared.failures
        );
    }
    println!("Duration: {:.2}s", report.duration.as_secs_f64());
    if report.state != RunState::DryRunDone {
        println!("{}", resource_table(report));
    }
    if let Some(error) = &report.error {
        eprintln!("error: {error}");
    }
    if !report.stats.errors.is_empty() {
        eprintln!("Errors:");
        for error in &report.stats.errors {
            eprintln!("- {error}");
        }
    }
    if let Some(code) = report.error_code {
        eprintln!("Error code: {code}");
    }
}

/// Requested, created and failed counts per resource kind.
pub fn resource_table(report: &RunReport) -> Table {
    let stats = &report.stats;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Resource"),
        header_cell("Requested"),
        header_cell("Created"),
        header_cell("Failed"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=3 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for kind in ResourceKind::CREATION_ORDER {
        table.add_row(vec![
            Cell::new(kind.plural()),
            Cell::new(stats.requested.get(kind)),
            Cell::new(stats.created.get(kind)),
            failed_cell(stats.failed(kind)),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(stats.requested.total()).add_attribute(Attribute::Bold),
        Cell::new(stats.created.total()).add_attribute(Attribute::Bold),
        failed_cell(
            stats
                .requested
                .total()
                .saturating_sub(stats.created.total()),
        )
        .add_attribute(Attribute::Bold),
    ]);
    table
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn failed_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(Color::Red).add_attribute(Attribute::Bold)
    } else {
        Cell::new(count).fg(Color::DarkGrey)
    }
}
