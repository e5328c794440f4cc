//! Aligned text output, loosely after psql's table style.

use descry_core::catalog::{DataTypeRow, FunctionRow, RelationListRow, RoleRow, SchemaRow};
use descry_core::{RelationDescriptor, RelationKind};

/// Print one descriptor: title, aligned column table, footer sections.
pub fn descriptor(descriptor: &RelationDescriptor, verbose: bool) {
    let identity = &descriptor.identity;
    println!(
        "{} \"{}.{}\"",
        capitalize(descriptor.kind.label()),
        identity.schema,
        identity.name
    );

    let headers = column_headers(descriptor.kind, verbose);
    let rows: Vec<Vec<String>> = descriptor
        .columns
        .iter()
        .map(|col| {
            let mut cells = vec![col.name.clone(), col.type_name.clone()];
            if descriptor.kind.has_column_modifiers() {
                cells.push(col.modifiers.clone().unwrap_or_default());
            }
            if extra_header(descriptor.kind).is_some() {
                cells.push(col.extra.clone().unwrap_or_default());
            }
            if verbose {
                cells.push(col.storage.clone().unwrap_or_default());
                if descriptor.kind.has_stats_target() {
                    cells.push(
                        col.stats_target.map(|t| t.to_string()).unwrap_or_default(),
                    );
                }
                if descriptor.kind.supports_column_comments() {
                    cells.push(col.comment.clone().unwrap_or_default());
                }
            }
            cells
        })
        .collect();
    print_table(&headers, &rows);

    for section in &descriptor.sections {
        println!("{}:", section.label);
        for line in &section.lines {
            println!("    {line}");
        }
    }
    println!();
}

fn column_headers(kind: RelationKind, verbose: bool) -> Vec<&'static str> {
    let mut headers = vec!["Column", "Type"];
    if kind.has_column_modifiers() {
        headers.push("Modifiers");
    }
    if let Some(extra) = extra_header(kind) {
        headers.push(extra);
    }
    if verbose {
        headers.push("Storage");
        if kind.has_stats_target() {
            headers.push("Stats target");
        }
        if kind.supports_column_comments() {
            headers.push("Description");
        }
    }
    headers
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn extra_header(kind: RelationKind) -> Option<&'static str> {
    match kind {
        RelationKind::Sequence => Some("Value"),
        RelationKind::Index => Some("Definition"),
        RelationKind::ForeignTable => Some("FDW options"),
        _ => None,
    }
}

pub fn relation_list(title: &str, rows: &[RelationListRow], verbose: bool) {
    println!("{title}");
    let mut headers = vec!["Schema", "Name", "Type", "Owner"];
    if verbose {
        headers.push("Size");
        headers.push("Description");
    }
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            let mut cells = vec![
                r.schema.clone(),
                r.name.clone(),
                r.kind.label().to_string(),
                r.owner.clone().unwrap_or_default(),
            ];
            if verbose {
                cells.push(r.size.clone().unwrap_or_default());
                cells.push(r.description.clone().unwrap_or_default());
            }
            cells
        })
        .collect();
    print_table(&headers, &rows);
}

pub fn schema_list(rows: &[SchemaRow], verbose: bool) {
    println!("List of schemas");
    let mut headers = vec!["Name", "Owner"];
    if verbose {
        headers.push("Access privileges");
        headers.push("Description");
    }
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            let mut cells = vec![r.name.clone(), r.owner.clone().unwrap_or_default()];
            if verbose {
                cells.push(r.access_privileges.clone().unwrap_or_default());
                cells.push(r.description.clone().unwrap_or_default());
            }
            cells
        })
        .collect();
    print_table(&headers, &rows);
}

pub fn role_list(rows: &[RoleRow], verbose: bool) {
    println!("List of roles");
    let mut headers = vec!["Role name", "Attributes", "Member of"];
    if verbose {
        headers.push("Description");
    }
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            let mut cells = vec![
                r.name.clone(),
                role_attributes(r),
                r.member_of.join(", "),
            ];
            if verbose {
                cells.push(r.description.clone().unwrap_or_default());
            }
            cells
        })
        .collect();
    print_table(&headers, &rows);
}

fn role_attributes(role: &RoleRow) -> String {
    let mut attrs = Vec::new();
    if role.is_superuser {
        attrs.push("Superuser".to_string());
    }
    if !role.inherits {
        attrs.push("No inheritance".to_string());
    }
    if role.can_create_role {
        attrs.push("Create role".to_string());
    }
    if role.can_create_db {
        attrs.push("Create DB".to_string());
    }
    if !role.can_login {
        attrs.push("Cannot login".to_string());
    }
    if role.replication {
        attrs.push("Replication".to_string());
    }
    if role.connection_limit >= 0 {
        attrs.push(format!("{} connections", role.connection_limit));
    }
    if let Some(until) = &role.valid_until {
        attrs.push(format!("Password valid until {until}"));
    }
    attrs.join(", ")
}

pub fn function_list(rows: &[FunctionRow], verbose: bool) {
    println!("List of functions");
    let mut headers = vec![
        "Schema",
        "Name",
        "Result data type",
        "Argument data types",
        "Type",
    ];
    if verbose {
        headers.extend(["Volatility", "Owner", "Language", "Description"]);
    }
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            let mut cells = vec![
                r.schema.clone(),
                r.name.clone(),
                r.result_type.clone(),
                r.argument_types.clone(),
                r.kind.clone(),
            ];
            if verbose {
                cells.push(r.volatility.clone().unwrap_or_default());
                cells.push(r.owner.clone().unwrap_or_default());
                cells.push(r.language.clone().unwrap_or_default());
                cells.push(r.description.clone().unwrap_or_default());
            }
            cells
        })
        .collect();
    print_table(&headers, &rows);
}

pub fn data_type_list(rows: &[DataTypeRow], verbose: bool) {
    println!("List of data types");
    let mut headers = vec!["Schema", "Name"];
    if verbose {
        headers.extend(["Internal name", "Size", "Elements", "Access privileges"]);
    }
    headers.push("Description");
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            let mut cells = vec![r.schema.clone(), r.name.clone()];
            if verbose {
                cells.push(r.internal_name.clone().unwrap_or_default());
                cells.push(r.size.clone().unwrap_or_default());
                cells.push(r.elements.clone().unwrap_or_default());
                cells.push(r.access_privileges.clone().unwrap_or_default());
            }
            cells.push(r.description.clone().unwrap_or_default());
            cells
        })
        .collect();
    print_table(&headers, &rows);
}

/// Left-aligned table with a ` | ` column separator and a dashed rule under
/// the header, column widths sized to content. Multi-line cells only occur
/// in the first line position of a row, so rows are flattened on newlines.
fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let w = cell.lines().map(|l| l.chars().count()).max().unwrap_or(0);
            if w > widths[i] {
                widths[i] = w;
            }
        }
    }

    let header_line: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{h:^width$}", width = widths[i]))
        .collect();
    println!(" {}", header_line.join(" | "));

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    println!("-{}-", rule.join("-+-"));

    for row in rows {
        let line_count = row
            .iter()
            .map(|c| c.lines().count().max(1))
            .max()
            .unwrap_or(1);
        for line_idx in 0..line_count {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let text = cell.lines().nth(line_idx).unwrap_or("");
                    format!("{text:<width$}", width = widths[i])
                })
                .collect();
            println!(" {}", cells.join(" | ").trim_end());
        }
    }
    println!("({} row{})", rows.len(), if rows.len() == 1 { "" } else { "s" });
    println!();
}
