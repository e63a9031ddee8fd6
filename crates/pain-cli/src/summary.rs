use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use pain_core::RunReport;
use pain_map::MappingIssue;

pub fn print_summary(report: &RunReport) {
    println!("Source: {}", report.source.display());
    if let Some(path) = &report.output_path {
        println!("Output: {}", path.display());
    }
    println!("{}", summary_table(report));
    if let Some(problems) = problem_table(report) {
        println!();
        println!("Problems:");
        println!("{problems}");
    }
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    if let Some(failure) = &report.failure {
        eprintln!(
            "error: {} (while reaching stage '{}', {})",
            failure.message, failure.stage, failure.kind
        );
    }
}

pub fn summary_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Revision"),
        header_cell("Stage"),
        header_cell("Status"),
        header_cell("Transactions"),
        header_cell("Control sum"),
        header_cell("Warnings"),
        header_cell("Problems"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 3..7 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let revision = report
        .version
        .map_or_else(|| report.requested_version.clone(), |v| v.to_string());
    table.add_row(vec![
        Cell::new(revision)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        Cell::new(report.stage),
        status_cell(report.success),
        optional_cell(report.transaction_count),
        optional_cell(report.control_sum),
        count_cell(report.warnings.len(), Color::Yellow),
        count_cell(report.problem_count(), Color::Red),
    ]);
    table
}

/// One row per field, mapping or schema problem, in the order found.
pub fn problem_table(report: &RunReport) -> Option<Table> {
    if report.problem_count() == 0 {
        return None;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Check"),
        header_cell("Location"),
        header_cell("Problem"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);

    for error in &report.field_errors {
        let problem = match &error.value {
            Some(value) => format!("'{value}' is {}", error.issue.message()),
            None => error.issue.message().to_string(),
        };
        let location = match &error.column {
            Some(column) => format!("{}: {} (column '{column}')", error.record, error.field),
            None => format!("{}: {}", error.record, error.field),
        };
        table.add_row(vec![check_cell("FIELD"), Cell::new(location), Cell::new(problem)]);
    }
    for issue in &report.mapping_issues {
        let problem = match issue {
            MappingIssue::Unresolved { .. } => "no value and no default".to_string(),
            MappingIssue::InvalidValue {
                value, expected, ..
            } => format!("'{value}' is not a valid {expected}"),
        };
        table.add_row(vec![
            check_cell("MAPPING"),
            Cell::new(format!("{}: {}", issue.record(), issue.field())),
            Cell::new(problem),
        ]);
    }
    for violation in &report.violations {
        table.add_row(vec![
            check_cell("SCHEMA"),
            Cell::new(&violation.location),
            Cell::new(&violation.message),
        ]);
    }
    Some(table)
}

fn status_cell(success: bool) -> Cell {
    if success {
        Cell::new("✓ written")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("✗ failed")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    }
}

fn check_cell(label: &str) -> Cell {
    Cell::new(label).fg(Color::Red)
}

fn optional_cell<T: ToString>(value: Option<T>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
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
    if table.column_count() >= 3 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(9)),
            ColumnConstraint::UpperBoundary(Width::Percentage(50)),
            ColumnConstraint::LowerBoundary(Width::Fixed(20)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
