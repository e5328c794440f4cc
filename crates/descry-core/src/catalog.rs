//! The catalog access port: the narrow, storage-agnostic boundary between
//! the describe/list engine and the backing metadata store.
//!
//! Backends (the Postgres adapter, the in-memory test catalog) implement
//! [`CatalogAccess`]; the engine only ever sees these typed rows. Row shapes
//! are validated once at this boundary — the engine never indexes into
//! positional tuples.
//!
//! Filter arguments are anchored regex sources produced by
//! [`crate::pattern::NamePattern`]; `None` means "apply the backend's default
//! visibility rule" (on Postgres: visible, non-system schemas).

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CatalogError;
use crate::{RelationFlags, RelationIdentity, RelationKind, RelationOid};

/// One `pg_attribute` row, before the engine applies the hard column filter
/// (`attnum > 0 && !is_dropped`).
#[derive(Debug, Clone, Default, Serialize)]
pub struct ColumnRow {
    pub attnum: i32,
    pub is_dropped: bool,
    pub name: String,
    pub type_name: String,
    pub default: Option<String>,
    pub not_null: bool,
    /// Collation name, only when it differs from the type's own collation.
    pub collation: Option<String>,
    /// Per-column index expression, index relations only.
    pub index_def: Option<String>,
    /// Per-column wrapper options, foreign tables only.
    pub fdw_options: Option<String>,
    /// `attstorage` tag (`p`/`m`/`x`/`e`), fetched when verbose.
    pub storage: Option<char>,
    /// Statistics target, fetched when verbose; `None` means default.
    pub stats_target: Option<i32>,
    pub comment: Option<String>,
}

/// Header detail of a standalone index relation.
#[derive(Debug, Clone, Serialize)]
pub struct IndexDetail {
    pub is_unique: bool,
    pub is_primary: bool,
    pub is_clustered: bool,
    pub is_valid: bool,
    pub is_deferrable: bool,
    pub is_deferred: bool,
    /// Access method name (`btree`, `gin`, ...).
    pub method: String,
    /// Name of the indexed table, assumed to share the index's schema.
    pub table: String,
    pub predicate: Option<String>,
}

/// Current state row of a sequence, one value per column of the sequence
/// relation, positionally aligned with its column rows.
#[derive(Debug, Clone, Serialize)]
pub struct SequenceRow {
    pub values: Vec<Option<String>>,
}

/// A fully qualified column reference (sequence ownership).
#[derive(Debug, Clone, Serialize)]
pub struct ColumnRef {
    pub schema: String,
    pub table: String,
    pub column: String,
}

/// One index of a table, as listed in the Indexes footer.
#[derive(Debug, Clone, Serialize)]
pub struct TableIndexRow {
    pub name: String,
    pub is_primary: bool,
    pub is_unique: bool,
    pub is_clustered: bool,
    pub is_valid: bool,
    /// Full index definition (`CREATE INDEX ... USING btree (col)`).
    pub definition: String,
    /// Definition of the owning constraint, when the index backs one.
    pub constraint_def: Option<String>,
    /// Constraint type tag (`p`/`u`/`x`), when the index backs a constraint.
    pub constraint_type: Option<char>,
    pub is_deferrable: bool,
    pub is_deferred: bool,
    pub tablespace: i64,
}

/// A named constraint with its reconstructed definition.
#[derive(Debug, Clone, Serialize)]
pub struct ConstraintRow {
    pub name: String,
    pub definition: String,
}

/// A foreign-key constraint on another table referencing this one.
#[derive(Debug, Clone, Serialize)]
pub struct IncomingRefRow {
    pub name: String,
    /// The referencing table, schema-qualified where not visible.
    pub table: String,
    pub definition: String,
}

/// Firing mode of a rule or trigger. The four category buckets of the
/// partitioned footer sections render in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FiringMode {
    Enabled,
    Disabled,
    Always,
    ReplicaOnly,
}

impl FiringMode {
    /// Parse a catalog firing flag. Very old catalogs encode enabled and
    /// disabled as booleans; those fold into the first two buckets.
    pub fn from_flag(flag: &str) -> Self {
        match flag {
            "D" | "false" | "f" => Self::Disabled,
            "A" => Self::Always,
            "R" => Self::ReplicaOnly,
            _ => Self::Enabled,
        }
    }

    /// Fixed bucket position for category partitioning.
    pub fn bucket(self) -> usize {
        match self {
            Self::Enabled => 0,
            Self::Disabled => 1,
            Self::Always => 2,
            Self::ReplicaOnly => 3,
        }
    }
}

/// One rewrite rule of a relation.
#[derive(Debug, Clone, Serialize)]
pub struct RuleRow {
    pub name: String,
    /// `CREATE RULE ...` text, trailing semicolon trimmed.
    pub definition: String,
    pub firing: FiringMode,
}

/// One user-defined trigger of a relation (internal triggers are excluded
/// at the port boundary).
#[derive(Debug, Clone, Serialize)]
pub struct TriggerRow {
    pub name: String,
    /// `CREATE TRIGGER ...` text.
    pub definition: String,
    pub firing: FiringMode,
}

/// Inheritance links of a table, both directions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InheritanceLinks {
    /// Parent tables, in inheritance order.
    pub parents: Vec<String>,
    /// Child tables, name order.
    pub children: Vec<String>,
}

/// Foreign server backing a foreign table.
#[derive(Debug, Clone, Serialize)]
pub struct ServerRow {
    pub name: String,
    /// Per-table wrapper options, already joined to display form.
    pub options: Option<String>,
}

/// One row of a relation listing.
#[derive(Debug, Clone, Serialize)]
pub struct RelationListRow {
    pub schema: String,
    pub name: String,
    pub kind: RelationKind,
    pub owner: Option<String>,
    /// Pretty-printed on-disk size, verbose only.
    pub size: Option<String>,
    pub description: Option<String>,
}

/// One row of the schema listing.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaRow {
    pub name: String,
    pub owner: Option<String>,
    pub access_privileges: Option<String>,
    pub description: Option<String>,
}

/// One row of the role listing.
#[derive(Debug, Clone, Serialize)]
pub struct RoleRow {
    pub name: String,
    pub is_superuser: bool,
    pub inherits: bool,
    pub can_create_role: bool,
    pub can_create_db: bool,
    pub can_login: bool,
    pub replication: bool,
    pub connection_limit: i32,
    pub valid_until: Option<String>,
    pub member_of: Vec<String>,
    pub description: Option<String>,
}

/// One row of the function listing.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionRow {
    pub schema: String,
    pub name: String,
    pub result_type: String,
    pub argument_types: String,
    /// `agg`, `window`, `trigger` or `normal`.
    pub kind: String,
    pub volatility: Option<String>,
    pub owner: Option<String>,
    pub language: Option<String>,
    pub source: Option<String>,
    pub description: Option<String>,
}

/// One row of the data-type listing.
#[derive(Debug, Clone, Serialize)]
pub struct DataTypeRow {
    pub schema: String,
    pub name: String,
    pub internal_name: Option<String>,
    pub size: Option<String>,
    /// Enum labels, newline-joined.
    pub elements: Option<String>,
    pub access_privileges: Option<String>,
    pub description: Option<String>,
}

/// Abstract interface to the backing catalog store.
///
/// Callers must bind one implementation to a single consistent read snapshot
/// for the duration of one describe invocation, or accept that concurrent
/// schema changes between calls surface as a vanished relation or an empty
/// section. Every method is a cancellation point: a canceled query returns
/// its error unmodified and no further work happens.
#[async_trait]
pub trait CatalogAccess: Send + Sync {
    /// Relations matching the filters, ordered by (schema, name).
    async fn find_relations(
        &self,
        schema_filter: Option<&str>,
        name_filter: Option<&str>,
        kinds: &[RelationKind],
    ) -> Result<Vec<RelationIdentity>, CatalogError>;

    /// Header flags of one relation; `None` when it no longer exists.
    async fn relation_flags(&self, oid: RelationOid)
    -> Result<Option<RelationFlags>, CatalogError>;

    /// Column rows of one relation, ordered by attribute number. The verbose
    /// flag gates the storage/stats/comment fields exactly as the column
    /// section does.
    async fn columns(
        &self,
        oid: RelationOid,
        kind: RelationKind,
        verbose: bool,
    ) -> Result<Vec<ColumnRow>, CatalogError>;

    /// Index header detail; `None` when the relation is not an index or has
    /// vanished.
    async fn index_detail(&self, oid: RelationOid) -> Result<Option<IndexDetail>, CatalogError>;

    /// Current value row of a sequence; `None` when unavailable.
    async fn sequence_values(
        &self,
        schema: &str,
        name: &str,
    ) -> Result<Option<SequenceRow>, CatalogError>;

    /// The column owning a sequence. A multi-row result yields the first row;
    /// extras are ignored without error.
    async fn sequence_owner(&self, oid: RelationOid) -> Result<Option<ColumnRef>, CatalogError>;

    /// Indexes of a table, ordered primary-first, unique-next, then by name.
    async fn table_indexes(&self, oid: RelationOid) -> Result<Vec<TableIndexRow>, CatalogError>;

    /// Check constraints, name order.
    async fn check_constraints(&self, oid: RelationOid)
    -> Result<Vec<ConstraintRow>, CatalogError>;

    /// Outgoing foreign-key constraints, name order.
    async fn foreign_keys(&self, oid: RelationOid) -> Result<Vec<ConstraintRow>, CatalogError>;

    /// Foreign keys on other tables referencing this one, name order.
    async fn incoming_references(
        &self,
        oid: RelationOid,
    ) -> Result<Vec<IncomingRefRow>, CatalogError>;

    /// Rewrite rules, name order. `exclude_return` drops the `_RETURN` rule
    /// (the view-definition rule).
    async fn rules(
        &self,
        oid: RelationOid,
        exclude_return: bool,
    ) -> Result<Vec<RuleRow>, CatalogError>;

    /// User-defined triggers, name order.
    async fn triggers(&self, oid: RelationOid) -> Result<Vec<TriggerRow>, CatalogError>;

    /// Inheritance links, both directions.
    async fn inheritance(&self, oid: RelationOid) -> Result<InheritanceLinks, CatalogError>;

    /// Foreign server of a foreign table.
    async fn foreign_server(&self, oid: RelationOid) -> Result<Option<ServerRow>, CatalogError>;

    /// Reconstructed definition of a view or materialized view.
    async fn view_definition(&self, oid: RelationOid) -> Result<Option<String>, CatalogError>;

    /// Relation listing rows matching the filters, ordered by (schema, name).
    async fn list_relations(
        &self,
        schema_filter: Option<&str>,
        name_filter: Option<&str>,
        kinds: &[RelationKind],
        verbose: bool,
    ) -> Result<Vec<RelationListRow>, CatalogError>;

    /// Schema listing, name order.
    async fn list_schemas(
        &self,
        name_filter: Option<&str>,
        verbose: bool,
    ) -> Result<Vec<SchemaRow>, CatalogError>;

    /// Role listing, name order.
    async fn list_roles(
        &self,
        name_filter: Option<&str>,
        verbose: bool,
    ) -> Result<Vec<RoleRow>, CatalogError>;

    /// Function listing, ordered by (schema, name, argument types).
    async fn list_functions(
        &self,
        schema_filter: Option<&str>,
        name_filter: Option<&str>,
        verbose: bool,
    ) -> Result<Vec<FunctionRow>, CatalogError>;

    /// Data-type listing, ordered by (schema, name).
    async fn list_data_types(
        &self,
        schema_filter: Option<&str>,
        name_filter: Option<&str>,
        verbose: bool,
    ) -> Result<Vec<DataTypeRow>, CatalogError>;
}
