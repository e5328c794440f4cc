//! Footer section builders.
//!
//! Sections render in a fixed order, each gated by its relation flag so no
//! query is issued that is known to return nothing. Rule and trigger sets are
//! partitioned into four firing-mode buckets (enabled, disabled, always,
//! replica-only) emitted as separate labeled sections.

use descry_core::catalog::{FiringMode, TableIndexRow};
use descry_core::{
    CatalogAccess, CatalogError, FooterSection, RelationFlags, RelationIdentity, RelationKind,
};

const RULE_LABELS: [&str; 4] = [
    "Rules",
    "Disabled rules",
    "Rules firing always",
    "Rules firing on replica only",
];

const TRIGGER_LABELS: [&str; 4] = [
    "Triggers",
    "Disabled triggers",
    "Triggers firing always",
    "Triggers firing on replica only",
];

/// Append every applicable footer section for one relation, in fixed order.
pub(crate) async fn build_sections<C: CatalogAccess>(
    catalog: &C,
    identity: &RelationIdentity,
    flags: &RelationFlags,
    verbose: bool,
    sections: &mut Vec<FooterSection>,
) -> Result<(), CatalogError> {
    match flags.kind {
        RelationKind::Index => index_section(catalog, identity, sections).await?,
        RelationKind::Sequence => owned_by_section(catalog, identity, sections).await?,
        kind if kind.is_table_like() => {
            table_sections(catalog, identity, flags, verbose, sections).await?
        }
        _ => {}
    }

    // Views and materialized views list their rewrite rules without the
    // internal _RETURN rule.
    if matches!(
        flags.kind,
        RelationKind::View | RelationKind::MaterializedView
    ) && flags.has_rules
    {
        let rules = catalog.rules(identity.oid, true).await?;
        let lines: Vec<String> = rules
            .iter()
            .map(|r| strip_rule_prefix(&r.definition).to_string())
            .collect();
        if !lines.is_empty() {
            sections.push(FooterSection::new("Rules", lines));
        }
    }

    // Triggers apply to tables and views alike.
    if flags.has_triggers {
        let triggers = catalog.triggers(identity.oid).await?;
        push_categorized(sections, TRIGGER_LABELS, &triggers, |t| t.firing, |t| {
            strip_trigger_prefix(&t.definition).to_string()
        });
    }

    Ok(())
}

/// Single header section of a standalone index, naming the owning table.
async fn index_section<C: CatalogAccess>(
    catalog: &C,
    identity: &RelationIdentity,
    sections: &mut Vec<FooterSection>,
) -> Result<(), CatalogError> {
    let Some(detail) = catalog.index_detail(identity.oid).await? else {
        return Ok(());
    };

    let mut line = String::new();
    if detail.is_primary {
        line.push_str("primary key, ");
    } else if detail.is_unique {
        line.push_str("unique, ");
    }
    line.push_str(&detail.method);
    // index and table are assumed to share a schema
    line.push_str(&format!(
        ", for table \"{}.{}\"",
        identity.schema, detail.table
    ));
    if let Some(predicate) = &detail.predicate {
        line.push_str(&format!(", predicate ({predicate})"));
    }
    if detail.is_clustered {
        line.push_str(", clustered");
    }
    if !detail.is_valid {
        line.push_str(", invalid");
    }
    if detail.is_deferrable {
        line.push_str(", deferrable");
    }
    if detail.is_deferred {
        line.push_str(", initially deferred");
    }

    sections.push(FooterSection::new("Index", vec![line]));
    Ok(())
}

/// "Owned by" line of a sequence. No owner row means no section; extra rows
/// were already discarded at the port boundary.
async fn owned_by_section<C: CatalogAccess>(
    catalog: &C,
    identity: &RelationIdentity,
    sections: &mut Vec<FooterSection>,
) -> Result<(), CatalogError> {
    if let Some(owner) = catalog.sequence_owner(identity.oid).await? {
        sections.push(FooterSection::new(
            "Owned by",
            vec![format!("{}.{}.{}", owner.schema, owner.table, owner.column)],
        ));
    }
    Ok(())
}

/// The table-like footer chain: indexes, constraints, references, rules,
/// foreign server, inheritance, typed-table and OID notes.
async fn table_sections<C: CatalogAccess>(
    catalog: &C,
    identity: &RelationIdentity,
    flags: &RelationFlags,
    verbose: bool,
    sections: &mut Vec<FooterSection>,
) -> Result<(), CatalogError> {
    if flags.has_index {
        let indexes = catalog.table_indexes(identity.oid).await?;
        let lines: Vec<String> = indexes.iter().map(index_line).collect();
        if !lines.is_empty() {
            sections.push(FooterSection::new("Indexes", lines));
        }
    }

    if flags.has_checks {
        let checks = catalog.check_constraints(identity.oid).await?;
        let lines: Vec<String> = checks
            .iter()
            .map(|c| format!("\"{}\" {}", c.name, c.definition))
            .collect();
        if !lines.is_empty() {
            sections.push(FooterSection::new("Check constraints", lines));
        }
    }

    // Foreign-key constraints require triggers, so the trigger flag gates
    // both directions of the lookup.
    if flags.has_triggers {
        let fks = catalog.foreign_keys(identity.oid).await?;
        let lines: Vec<String> = fks
            .iter()
            .map(|c| format!("\"{}\" {}", c.name, c.definition))
            .collect();
        if !lines.is_empty() {
            sections.push(FooterSection::new("Foreign-key constraints", lines));
        }

        let incoming = catalog.incoming_references(identity.oid).await?;
        let lines: Vec<String> = incoming
            .iter()
            .map(|r| format!("TABLE \"{}\" CONSTRAINT \"{}\" {}", r.table, r.name, r.definition))
            .collect();
        if !lines.is_empty() {
            sections.push(FooterSection::new("Referenced by", lines));
        }
    }

    // Materialized views keep their rules out of the table footer; they are
    // listed via the view path instead.
    if flags.has_rules && flags.kind != RelationKind::MaterializedView {
        let rules = catalog.rules(identity.oid, false).await?;
        push_categorized(sections, RULE_LABELS, &rules, |r| r.firing, |r| {
            strip_rule_prefix(&r.definition).to_string()
        });
    }

    if flags.kind == RelationKind::ForeignTable {
        if let Some(server) = catalog.foreign_server(identity.oid).await? {
            sections.push(FooterSection::new("Server", vec![server.name]));
            if let Some(options) = server.options.filter(|o| !o.is_empty()) {
                sections.push(FooterSection::new("FDW options", vec![format!("({options})")]));
            }
        }
    }

    let links = catalog.inheritance(identity.oid).await?;
    if !links.parents.is_empty() {
        sections.push(FooterSection::new("Inherits", links.parents));
    }
    if !links.children.is_empty() {
        if verbose {
            sections.push(FooterSection::new("Child tables", links.children));
        } else {
            sections.push(FooterSection::new(
                "Number of child tables",
                vec![links.children.len().to_string()],
            ));
        }
    }

    if let Some(type_name) = flags.typed_of_type.as_deref().filter(|t| !t.is_empty()) {
        sections.push(FooterSection::new(
            "Typed table of type",
            vec![type_name.to_string()],
        ));
    }

    if verbose && flags.kind != RelationKind::MaterializedView {
        sections.push(FooterSection::new(
            "Has OIDs",
            vec![if flags.has_oids { "yes" } else { "no" }.to_string()],
        ));
    }

    Ok(())
}

/// One line of the Indexes footer. Exclusion constraints echo their
/// constraint definition verbatim; everything else gets its label, the
/// definition tail after `USING`, and the deferral/cluster/validity notes.
fn index_line(row: &TableIndexRow) -> String {
    let mut line = format!("\"{}\"", row.name);
    if row.constraint_type == Some('x') {
        if let Some(def) = &row.constraint_def {
            line.push(' ');
            line.push_str(def);
        }
    } else {
        if row.is_primary {
            line.push_str(" PRIMARY KEY,");
        } else if row.is_unique {
            if row.constraint_type == Some('u') {
                line.push_str(" UNIQUE CONSTRAINT,");
            } else {
                line.push_str(" UNIQUE,");
            }
        }
        line.push(' ');
        line.push_str(strip_using_clause(&row.definition));
        if row.is_deferrable {
            line.push_str(" DEFERRABLE");
        }
        if row.is_deferred {
            line.push_str(" INITIALLY DEFERRED");
        }
    }
    if row.is_clustered {
        line.push_str(" CLUSTER");
    }
    if !row.is_valid {
        line.push_str(" INVALID");
    }
    line
}

/// Partition rows into the four firing-mode buckets and emit one labeled
/// section per non-empty bucket, in fixed bucket order. Every row lands in
/// exactly one bucket; relative order within a bucket is preserved.
fn push_categorized<T>(
    sections: &mut Vec<FooterSection>,
    labels: [&str; 4],
    rows: &[T],
    firing: impl Fn(&T) -> FiringMode,
    render: impl Fn(&T) -> String,
) {
    for (bucket, label) in labels.iter().enumerate() {
        let lines: Vec<String> = rows
            .iter()
            .filter(|r| firing(r).bucket() == bucket)
            .map(&render)
            .collect();
        if !lines.is_empty() {
            sections.push(FooterSection::new(*label, lines));
        }
    }
}

/// Everything after " USING " in an index definition is echoed verbatim.
fn strip_using_clause(definition: &str) -> &str {
    match definition.find(" USING ") {
        Some(pos) => &definition[pos + " USING ".len()..],
        None => definition,
    }
}

/// Everything after " TRIGGER " in a trigger definition is echoed verbatim.
fn strip_trigger_prefix(definition: &str) -> &str {
    match definition.find(" TRIGGER ") {
        Some(pos) => &definition[pos + " TRIGGER ".len()..],
        None => definition,
    }
}

/// Everything after "CREATE RULE " in a rule definition is echoed verbatim.
fn strip_rule_prefix(definition: &str) -> &str {
    definition.strip_prefix("CREATE RULE ").unwrap_or(definition)
}
