use std::collections::HashMap;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use sample_acl::SampleStatus;
use sample_core::{GenerateOtuSheetOutput, ImportSamplesOutput, UpdateAclsOutput};
use sample_map::FileFormat;
use sample_model::ValidationReport;
use sample_transform::UnmappedColumn;

pub fn print_import_summary(output: &ImportSamplesOutput) {
    println!("Sample set: {}", output.sample_set.name);
    println!("Reference: {}", output.sample_set_ref);
    println!("Report: {}", output.report.name);
    if let Some(path) = &output.otu_path {
        println!("OTU template: {}", path.display());
    }
    if let Some(share) = &output.workspace_acl {
        match &share.report {
            Some(report) => println!(
                "Workspace sharing: {} user(s), {} of {} samples updated",
                report.acl.len(),
                report.len() - report.failure_count(),
                report.len()
            ),
            None => println!("Workspace sharing: no other users"),
        }
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Sample"), header_cell("ID")]);
    apply_table_style(&mut table);
    for sample in &output.sample_set.samples {
        table.add_row(vec![
            Cell::new(&sample.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            dim_cell(sample.id.as_str()),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        count_cell(output.sample_set.len(), Color::Cyan),
    ]);
    println!("{table}");

    print_unmapped_columns(&output.unmapped_columns);
    print_issue_table(&output.issues);
}

fn print_unmapped_columns(columns: &[UnmappedColumn]) {
    if columns.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Ignored column"), header_cell("Did you mean")]);
    apply_table_style(&mut table);
    for column in columns {
        let suggestion = match &column.suggestion {
            Some(suggestion) => Cell::new(suggestion).fg(Color::Yellow),
            None => dim_cell("-"),
        };
        table.add_row(vec![Cell::new(&column.header), suggestion]);
    }
    println!();
    println!("Unmapped columns:");
    println!("{table}");
}

/// Prints skipped rows, one line per failed cell.
pub fn print_issue_table(report: &ValidationReport) {
    if report.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Column"),
        header_cell("Code"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for issue in &report.issues {
        table.add_row(vec![
            Cell::new(issue.row),
            Cell::new(&issue.column),
            Cell::new(issue.reason.code()).fg(Color::Red),
            Cell::new(issue.reason.to_string()),
        ]);
    }
    println!();
    println!(
        "Skipped rows ({}): {}",
        report.failed_rows().len(),
        join_rows(&report.failed_rows())
    );
    println!("{table}");
}

fn join_rows(rows: &[usize]) -> String {
    rows.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn print_otu_summary(output: &GenerateOtuSheetOutput) {
    println!("OTU template: {}", output.path.display());
    println!("Report: {}", output.report.name);
}

pub fn print_acl_summary(output: &UpdateAclsOutput) {
    let mut grants = Table::new();
    grants.set_header(vec![header_cell("User"), header_cell("Level")]);
    apply_table_style(&mut grants);
    for (user, level) in output.report.acl.iter() {
        grants.add_row(vec![Cell::new(user), Cell::new(level)]);
    }
    println!("{grants}");

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Sample"),
        header_cell("Status"),
        header_cell("Attempts"),
        header_cell("Error"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for (id, status) in &output.report.samples {
        let row = match status {
            SampleStatus::Applied { status, attempts } => vec![
                dim_cell(id.as_str()),
                Cell::new(status).fg(Color::Green),
                Cell::new(attempts),
                dim_cell("-"),
            ],
            SampleStatus::Failed {
                error, attempts, ..
            } => vec![
                dim_cell(id.as_str()),
                Cell::new("failed")
                    .fg(Color::Red)
                    .add_attribute(Attribute::Bold),
                Cell::new(attempts),
                Cell::new(error.to_string()),
            ],
        };
        table.add_row(row);
    }
    println!("{table}");
    println!("{}", output.status);
}

pub fn print_formats() {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Format"),
        header_cell("Header row"),
        header_cell("Columns"),
        header_cell("Required"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for format in FileFormat::ALL {
        let mapping = format.mapping();
        let required = mapping
            .required_fields()
            .map(|rule| rule.header)
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(format)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(mapping.header_row_index() + 1),
            Cell::new(mapping.columns().len()),
            Cell::new(required),
        ]);
    }
    println!("{table}");

    for format in FileFormat::ALL {
        let mapping = format.mapping();
        let checks: HashMap<&str, String> = mapping
            .verification_rules()
            .map(|(field, verifier)| (field, verifier.to_string()))
            .collect();
        let mut columns = Table::new();
        columns.set_header(vec![
            header_cell("Header"),
            header_cell("Field"),
            header_cell("Aliases"),
            header_cell("Check"),
        ]);
        apply_table_style(&mut columns);
        for (header, field) in mapping.column_mapping() {
            let aliases = mapping
                .rule(field)
                .map(|rule| rule.aliases.join(", "))
                .filter(|aliases| !aliases.is_empty());
            columns.add_row(vec![
                Cell::new(header),
                Cell::new(field),
                aliases.map_or_else(|| dim_cell("-"), Cell::new),
                checks.get(field).map_or_else(|| dim_cell("-"), Cell::new),
            ]);
        }
        println!();
        println!("{format} columns:");
        println!("{columns}");
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
