//! Descriptor assembly: the kind-driven, strictly ordered build of one
//! relation's description.
//!
//! The relation kind is fixed by the flags fetch and statically selects every
//! later step — which columns the section carries, which footers are
//! attempted. There is no kind transition within one invocation.

use descry_core::catalog::{ColumnRow, SequenceRow};
use descry_core::{
    CatalogAccess, CatalogError, ColumnDescriptor, FooterSection, RelationDescriptor,
    RelationIdentity, RelationKind,
};

use crate::footer;

/// Build the descriptor for one resolved relation. Returns `None` when the
/// relation vanished between resolution and assembly; the caller skips it and
/// keeps describing the other matches.
pub(crate) async fn describe_relation<C: CatalogAccess>(
    catalog: &C,
    identity: RelationIdentity,
    verbose: bool,
) -> Result<Option<RelationDescriptor>, CatalogError> {
    let Some(flags) = catalog.relation_flags(identity.oid).await? else {
        tracing::debug!(oid = %identity.oid, "relation vanished between resolve and describe");
        return Ok(None);
    };
    let kind = flags.kind;
    tracing::debug!(oid = %identity.oid, schema = %identity.schema, name = %identity.name,
        kind = kind.label(), "assembling descriptor");

    // Sequence state first; its absence is not fatal to the rest.
    let seq_values = if kind == RelationKind::Sequence {
        catalog
            .sequence_values(&identity.schema, &identity.name)
            .await?
    } else {
        None
    };

    let rows = catalog.columns(identity.oid, kind, verbose).await?;
    let columns = build_columns(&rows, kind, verbose, seq_values.as_ref());

    let mut sections = Vec::new();

    if matches!(kind, RelationKind::View | RelationKind::MaterializedView) && verbose {
        if let Some(definition) = catalog.view_definition(identity.oid).await? {
            sections.push(FooterSection::new("View definition", vec![definition]));
        }
    }

    footer::build_sections(catalog, &identity, &flags, verbose, &mut sections).await?;

    if verbose {
        if let Some(options) = flags.reloptions.as_deref().filter(|o| !o.is_empty()) {
            sections.push(FooterSection::new("Options", vec![options.to_string()]));
        }
    }

    Ok(Some(RelationDescriptor {
        identity,
        kind,
        owner: flags.owner,
        columns,
        sections,
    }))
}

/// Compose the column section. Attributes with non-positive numbers or a
/// dropped flag are excluded unconditionally; sequence values align with the
/// surviving columns by position.
fn build_columns(
    rows: &[ColumnRow],
    kind: RelationKind,
    verbose: bool,
    seq_values: Option<&SequenceRow>,
) -> Vec<ColumnDescriptor> {
    rows.iter()
        .filter(|r| r.attnum > 0 && !r.is_dropped)
        .enumerate()
        .map(|(pos, row)| {
            let modifiers = kind
                .has_column_modifiers()
                .then(|| compose_modifiers(row));

            let extra = match kind {
                RelationKind::Sequence => seq_values
                    .and_then(|s| s.values.get(pos).cloned())
                    .flatten(),
                RelationKind::Index => row.index_def.clone(),
                RelationKind::ForeignTable => row.fdw_options.clone(),
                _ => None,
            };

            ColumnDescriptor {
                name: row.name.clone(),
                type_name: row.type_name.clone(),
                modifiers,
                extra,
                storage: verbose
                    .then(|| row.storage.map(|c| storage_label(c).to_string()))
                    .flatten(),
                stats_target: (verbose && kind.has_stats_target())
                    .then_some(row.stats_target)
                    .flatten(),
                comment: (verbose && kind.supports_column_comments())
                    .then(|| row.comment.clone())
                    .flatten(),
            }
        })
        .collect()
}

fn compose_modifiers(row: &ColumnRow) -> String {
    let mut parts = Vec::new();
    if let Some(collation) = &row.collation {
        parts.push(format!("collate {collation}"));
    }
    if row.not_null {
        parts.push("not null".to_string());
    }
    if let Some(default) = &row.default {
        parts.push(format!("default {default}"));
    }
    parts.join(" ")
}

fn storage_label(tag: char) -> &'static str {
    match tag {
        'p' => "plain",
        'm' => "main",
        'x' => "extended",
        'e' => "external",
        _ => "???",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(attnum: i32, name: &str) -> ColumnRow {
        ColumnRow {
            attnum,
            name: name.to_string(),
            type_name: "integer".to_string(),
            ..ColumnRow::default()
        }
    }

    #[test]
    fn dropped_and_system_attributes_are_excluded() {
        let rows = vec![
            ColumnRow {
                is_dropped: true,
                ..row(1, "gone")
            },
            row(-2, "ctid"),
            row(0, "whole_row"),
            row(2, "id"),
        ];
        let cols = build_columns(&rows, RelationKind::Table, false, None);
        assert_eq!(cols.len(), 1);
        assert_eq!(cols[0].name, "id");
    }

    #[test]
    fn modifiers_compose_in_fixed_order() {
        let mut r = row(1, "name");
        r.collation = Some("\"C\"".to_string());
        r.not_null = true;
        r.default = Some("'x'::text".to_string());
        let cols = build_columns(&[r], RelationKind::Table, false, None);
        assert_eq!(
            cols[0].modifiers.as_deref(),
            Some("collate \"C\" not null default 'x'::text")
        );
    }

    #[test]
    fn modifiers_absent_for_sequences_and_indexes() {
        for kind in [RelationKind::Sequence, RelationKind::Index] {
            let cols = build_columns(&[row(1, "a")], kind, false, None);
            assert_eq!(cols[0].modifiers, None, "kind {kind:?}");
        }
        // present but empty for an unadorned table column
        let cols = build_columns(&[row(1, "a")], RelationKind::Table, false, None);
        assert_eq!(cols[0].modifiers.as_deref(), Some(""));
    }

    #[test]
    fn sequence_values_align_after_filtering() {
        let rows = vec![
            ColumnRow {
                is_dropped: true,
                ..row(1, "dropped")
            },
            row(2, "last_value"),
            row(3, "is_called"),
        ];
        let seq = SequenceRow {
            values: vec![Some("42".to_string()), Some("t".to_string())],
        };
        let cols = build_columns(&rows, RelationKind::Sequence, false, Some(&seq));
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0].extra.as_deref(), Some("42"));
        assert_eq!(cols[1].extra.as_deref(), Some("t"));
    }

    #[test]
    fn storage_labels() {
        assert_eq!(storage_label('p'), "plain");
        assert_eq!(storage_label('m'), "main");
        assert_eq!(storage_label('x'), "extended");
        assert_eq!(storage_label('e'), "external");
        assert_eq!(storage_label('q'), "???");
    }

    #[test]
    fn verbose_only_fields_stay_hidden_without_verbose() {
        let mut r = row(1, "id");
        r.storage = Some('p');
        r.stats_target = Some(100);
        r.comment = Some("the key".to_string());
        let cols = build_columns(&[r], RelationKind::Table, false, None);
        assert_eq!(cols[0].storage, None);
        assert_eq!(cols[0].stats_target, None);
        assert_eq!(cols[0].comment, None);
    }

    #[test]
    fn verbose_fields_respect_kind() {
        let mut r = row(1, "id");
        r.storage = Some('x');
        r.stats_target = Some(100);
        r.comment = Some("c".to_string());
        // views get comments but no stats target
        let cols = build_columns(&[r], RelationKind::View, true, None);
        assert_eq!(cols[0].storage.as_deref(), Some("extended"));
        assert_eq!(cols[0].stats_target, None);
        assert_eq!(cols[0].comment.as_deref(), Some("c"));
    }
}
