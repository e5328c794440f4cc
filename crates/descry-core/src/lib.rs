//! # descry-core
//!
//! Shared data model for the descry catalog-introspection toolkit:
//!
//! - [`RelationKind`] and the relation identity/flag types
//! - the assembled [`RelationDescriptor`] output
//! - the glob-style name-pattern compiler ([`pattern`])
//! - the [`CatalogAccess`] port trait the engine drives ([`catalog`])
//! - the error taxonomy ([`error`])
//!
//! No SQL lives here; backends implement [`CatalogAccess`] elsewhere.

use serde::Serialize;

pub mod catalog;
pub mod error;
pub mod pattern;

pub use catalog::CatalogAccess;
pub use error::CatalogError;
pub use pattern::NamePattern;

/// Closed tag distinguishing relation categories. Fixed once a relation is
/// resolved; every kind-dependent branch in the engine matches on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RelationKind {
    Table,
    View,
    MaterializedView,
    Index,
    Sequence,
    Special,
    ForeignTable,
}

impl RelationKind {
    /// Every kind the describe operation resolves over.
    pub const ALL: &'static [RelationKind] = &[
        RelationKind::Table,
        RelationKind::View,
        RelationKind::MaterializedView,
        RelationKind::Index,
        RelationKind::Sequence,
        RelationKind::Special,
        RelationKind::ForeignTable,
    ];

    /// Kind set of the bare relation listing (tables, views, materialized
    /// views, sequences and foreign tables).
    pub const LISTING_DEFAULT: &'static [RelationKind] = &[
        RelationKind::Table,
        RelationKind::View,
        RelationKind::MaterializedView,
        RelationKind::Sequence,
        RelationKind::ForeignTable,
    ];

    pub const TABLES: &'static [RelationKind] = &[RelationKind::Table];
    pub const VIEWS: &'static [RelationKind] = &[RelationKind::View, RelationKind::Special];
    pub const SEQUENCES: &'static [RelationKind] = &[RelationKind::Sequence, RelationKind::Special];
    pub const INDEXES: &'static [RelationKind] = &[RelationKind::Index, RelationKind::Special];

    /// Parse a `pg_class.relkind` tag.
    pub fn from_relkind(c: char) -> Option<Self> {
        match c {
            'r' => Some(Self::Table),
            'v' => Some(Self::View),
            'm' => Some(Self::MaterializedView),
            'i' => Some(Self::Index),
            'S' => Some(Self::Sequence),
            's' => Some(Self::Special),
            'f' => Some(Self::ForeignTable),
            _ => None,
        }
    }

    /// The `pg_class.relkind` tag for this kind.
    pub fn relkind(self) -> char {
        match self {
            Self::Table => 'r',
            Self::View => 'v',
            Self::MaterializedView => 'm',
            Self::Index => 'i',
            Self::Sequence => 'S',
            Self::Special => 's',
            Self::ForeignTable => 'f',
        }
    }

    /// Human-readable label, as shown in object listings.
    pub fn label(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::View => "view",
            Self::MaterializedView => "materialized view",
            Self::Index => "index",
            Self::Sequence => "sequence",
            Self::Special => "special",
            Self::ForeignTable => "foreign table",
        }
    }

    /// Tables, materialized views and foreign tables share the full set of
    /// table footers (indexes, constraints, inheritance, ...).
    pub fn is_table_like(self) -> bool {
        matches!(
            self,
            Self::Table | Self::MaterializedView | Self::ForeignTable
        )
    }

    /// Kinds whose column section carries a Modifiers column
    /// (collation / not null / default).
    pub fn has_column_modifiers(self) -> bool {
        matches!(
            self,
            Self::Table | Self::View | Self::MaterializedView | Self::ForeignTable
        )
    }

    /// Kinds whose columns can carry comments.
    pub fn supports_column_comments(self) -> bool {
        self.has_column_modifiers()
    }

    /// Kinds whose columns carry a per-column statistics target.
    pub fn has_stats_target(self) -> bool {
        self.is_table_like()
    }
}

/// Opaque catalog key of one relation (`pg_class.oid` on Postgres).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RelationOid(pub i64);

impl std::fmt::Display for RelationOid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One resolved relation. Created per resolution, consumed by one descriptor
/// build, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationIdentity {
    pub oid: RelationOid,
    pub schema: String,
    pub name: String,
}

/// `pg_class.relpersistence`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Persistence {
    Permanent,
    Unlogged,
    Temporary,
}

impl Persistence {
    pub fn from_tag(c: char) -> Self {
        match c {
            'u' => Self::Unlogged,
            't' => Self::Temporary,
            _ => Self::Permanent,
        }
    }
}

/// Per-relation header row, fetched once at the start of a descriptor build.
/// The boolean flags gate which footer sections are attempted at all, so the
/// engine never issues a query known to return nothing.
#[derive(Debug, Clone, Serialize)]
pub struct RelationFlags {
    pub kind: RelationKind,
    /// Owning role name.
    pub owner: Option<String>,
    pub has_checks: bool,
    pub has_index: bool,
    pub has_rules: bool,
    pub has_triggers: bool,
    pub has_oids: bool,
    pub tablespace: i64,
    /// Storage options, already joined to display form (`fillfactor=70, ...`).
    pub reloptions: Option<String>,
    /// Type name when this is a typed table (`CREATE TABLE ... OF type`).
    pub typed_of_type: Option<String>,
    pub persistence: Persistence,
}

/// One line of the column section of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub type_name: String,
    /// Composed collation / not-null / default text. `Some` (possibly empty)
    /// for kinds that show a Modifiers column, `None` otherwise.
    pub modifiers: Option<String>,
    /// Kind-specific extra: sequence current value, index column definition,
    /// or foreign-table column options.
    pub extra: Option<String>,
    /// Storage mode label, verbose only.
    pub storage: Option<String>,
    /// Per-column statistics target, verbose only.
    pub stats_target: Option<i32>,
    /// Column comment, verbose only.
    pub comment: Option<String>,
}

/// A labeled block of auxiliary descriptive lines appended after the column
/// section. Only ever emitted non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FooterSection {
    pub label: String,
    pub lines: Vec<String>,
}

impl FooterSection {
    pub fn new(label: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            label: label.into(),
            lines,
        }
    }
}

/// The assembled description of one relation. Built once, immutable, returned
/// by value.
#[derive(Debug, Clone, Serialize)]
pub struct RelationDescriptor {
    pub identity: RelationIdentity,
    pub kind: RelationKind,
    /// Owning role name, from the flags fetch.
    pub owner: Option<String>,
    pub columns: Vec<ColumnDescriptor>,
    pub sections: Vec<FooterSection>,
}

impl RelationDescriptor {
    /// Look up a footer section by label.
    pub fn section(&self, label: &str) -> Option<&FooterSection> {
        self.sections.iter().find(|s| s.label == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relkind_tags_round_trip() {
        for kind in RelationKind::ALL {
            assert_eq!(RelationKind::from_relkind(kind.relkind()), Some(*kind));
        }
        assert_eq!(RelationKind::from_relkind('z'), None);
    }

    #[test]
    fn table_like_kinds() {
        assert!(RelationKind::Table.is_table_like());
        assert!(RelationKind::MaterializedView.is_table_like());
        assert!(RelationKind::ForeignTable.is_table_like());
        assert!(!RelationKind::View.is_table_like());
        assert!(!RelationKind::Index.is_table_like());
        assert!(!RelationKind::Sequence.is_table_like());
    }

    #[test]
    fn modifiers_follow_kind() {
        assert!(RelationKind::View.has_column_modifiers());
        assert!(!RelationKind::Sequence.has_column_modifiers());
        assert!(!RelationKind::Index.has_column_modifiers());
    }

    #[test]
    fn persistence_tags() {
        assert_eq!(Persistence::from_tag('p'), Persistence::Permanent);
        assert_eq!(Persistence::from_tag('u'), Persistence::Unlogged);
        assert_eq!(Persistence::from_tag('t'), Persistence::Temporary);
    }
}
