use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use tablec_core::TableReport;
use tablec_model::{Diagnostic, SheetKind};

use crate::commands::BuildResult;

pub fn print_summary(result: &BuildResult) {
    let outcome = &result.outcome;
    if result.dry_run {
        println!("Output: (dry run, nothing written)");
    } else {
        println!("Output: {}", result.options.output_root.display());
    }
    if outcome.succeeded() {
        print_table_summary(&outcome.tables);
        println!(
            "Files: {}  Enum groups: {}  Localization keys: {}  Time: {:.2?}",
            outcome.files.len(),
            outcome.enum_groups,
            outcome.localization_keys,
            outcome.duration
        );
    } else {
        print_diagnostics(&outcome.diagnostics);
        println!(
            "Stopped after {} with {} problem(s) in {:.2?}",
            outcome.stage,
            outcome.diagnostics.len(),
            outcome.duration
        );
        if let Some(path) = &result.report {
            println!("Report: {}", path.display());
        }
    }
    if !result.unknown.is_empty() {
        eprintln!("Unknown selections:");
        for name in &result.unknown {
            eprintln!("- {name}");
        }
    }
}

fn print_table_summary(tables: &[TableReport]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Kind"),
        header_cell("Workbook"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Shards"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);

    let mut total_rows = 0usize;
    let mut total_shards = 0usize;
    for report in tables {
        if !report.reference_only {
            total_rows += report.rows;
            total_shards += report.shards;
        }
        table.add_row(vec![
            name_cell(report),
            kind_cell(report.kind),
            Cell::new(&report.file),
            Cell::new(report.rows),
            Cell::new(report.exported_columns),
            count_cell(report.shards),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(total_shards).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Sheet"),
        header_cell("Cell"),
        header_cell("Column"),
        header_cell("Code"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    for diagnostic in diagnostics {
        table.add_row(vec![
            Cell::new(&diagnostic.file),
            Cell::new(&diagnostic.sheet),
            Cell::new(diagnostic.cell_reference()).add_attribute(Attribute::Bold),
            if diagnostic.column_label.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(&diagnostic.column_label)
            },
            Cell::new(diagnostic.code).fg(Color::Red),
            Cell::new(&diagnostic.message),
        ]);
    }
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    if table.column_count() >= 6 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(24)),
            ColumnConstraint::UpperBoundary(Width::Fixed(20)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
            ColumnConstraint::UpperBoundary(Width::Fixed(18)),
            ColumnConstraint::UpperBoundary(Width::Fixed(36)),
            ColumnConstraint::UpperBoundary(Width::Percentage(45)),
        ]);
    }
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

/// Reference-only tables are listed dimmed.
fn name_cell(report: &TableReport) -> Cell {
    if report.reference_only {
        Cell::new(format!("  -> {}", report.name)).fg(Color::DarkGrey)
    } else {
        Cell::new(&report.name)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold)
    }
}

fn kind_cell(kind: SheetKind) -> Cell {
    let color = match kind {
        SheetKind::Data => Color::Green,
        SheetKind::Merge => Color::Magenta,
        SheetKind::Type => Color::Yellow,
        SheetKind::LocalText => Color::Cyan,
    };
    Cell::new(kind.tag()).fg(color)
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
    } else {
        dim_cell("-")
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
