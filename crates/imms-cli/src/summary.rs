use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use imms_core::RunSummary;
use imms_map::{ColumnMapping, ColumnStatus};

pub fn print_run_summary(summary: &RunSummary) {
    println!("Run: {}", summary.run_id);
    if let Some(path) = &summary.artifact {
        println!("Artifact: {}", path.display());
    }
    if let Some(path) = &summary.unmatched_report {
        println!("Unmatched facilities: {}", path.display());
    }
    println!("{}", run_summary_table(summary));
    if !summary.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &summary.warnings {
            println!("- {warning}");
        }
    }
}

pub fn run_summary_table(summary: &RunSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Stage"), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);

    table.add_row(vec![Cell::new("Input rows"), Cell::new(summary.input_rows)]);
    table.add_row(vec![
        Cell::new("Facilities matched"),
        Cell::new(summary.facilities_matched),
    ]);
    table.add_row(vec![
        Cell::new("Facilities unmatched"),
        count_cell(summary.facilities_unmatched, Color::Red),
    ]);
    table.add_row(vec![
        Cell::new("Clients").add_attribute(Attribute::Bold),
        Cell::new(summary.clients).add_attribute(Attribute::Bold),
    ]);
    let batches = if summary.dry_run {
        format!("{} (dry run)", summary.batches)
    } else {
        summary.batches.to_string()
    };
    table.add_row(vec![Cell::new("Batches"), Cell::new(batches)]);
    table.add_row(vec![
        Cell::new("Warnings"),
        count_cell(summary.warnings.len(), Color::Yellow),
    ]);
    table
}

pub fn mapping_table(mapping: &ColumnMapping) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Canonical"),
        header_cell("Status"),
        header_cell("Score"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);

    for decision in &mapping.decisions {
        let (target, status, score) = match decision.status {
            ColumnStatus::Mapped { target, score } => {
                (target, Cell::new("mapped").fg(Color::Green), Some(score))
            }
            ColumnStatus::Passthrough { target } => {
                (target, Cell::new("kept").fg(Color::Green), None)
            }
            ColumnStatus::Duplicate { target, score } => {
                (target, Cell::new("duplicate").fg(Color::Yellow), Some(score))
            }
            ColumnStatus::Unmapped { best, score } => {
                (best, Cell::new("dropped").fg(Color::Red), Some(score))
            }
        };
        table.add_row(vec![
            Cell::new(&decision.source),
            Cell::new(target),
            status,
            match score {
                Some(score) => Cell::new(format!("{score:.0}")),
                None => dim_cell("-"),
            },
        ]);
    }
    table
}

pub fn print_mapping(mapping: &ColumnMapping) {
    println!("{}", mapping_table(mapping));
    let missing = mapping.missing_required();
    if !missing.is_empty() {
        eprintln!("Missing required columns: {}", missing.join(", "));
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
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

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}
