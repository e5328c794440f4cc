//! Object listings: single-pass filter-and-project over the catalog.
//!
//! Each family compiles the shared name pattern, hands the filters to the
//! backend and returns its typed rows as-is. Column projection (the
//! verbose-only extras) happens backend-side; there is no kind-dependent
//! branching here.

use descry_core::catalog::{DataTypeRow, FunctionRow, RelationListRow, RoleRow, SchemaRow};
use descry_core::{CatalogAccess, CatalogError, NamePattern, RelationKind};

pub(crate) async fn list_objects<C: CatalogAccess>(
    catalog: &C,
    pattern: &str,
    verbose: bool,
    kinds: &[RelationKind],
) -> Result<Vec<RelationListRow>, CatalogError> {
    let compiled = NamePattern::compile(pattern);
    catalog
        .list_relations(
            compiled.schema.as_deref(),
            compiled.name.as_deref(),
            kinds,
            verbose,
        )
        .await
}

/// Schema names never carry a schema qualifier themselves; the name part of
/// the compiled pattern is the filter.
pub(crate) async fn list_schemas<C: CatalogAccess>(
    catalog: &C,
    pattern: &str,
    verbose: bool,
) -> Result<Vec<SchemaRow>, CatalogError> {
    let compiled = NamePattern::compile(pattern);
    catalog.list_schemas(compiled.name.as_deref(), verbose).await
}

pub(crate) async fn list_roles<C: CatalogAccess>(
    catalog: &C,
    pattern: &str,
    verbose: bool,
) -> Result<Vec<RoleRow>, CatalogError> {
    let compiled = NamePattern::compile(pattern);
    catalog.list_roles(compiled.name.as_deref(), verbose).await
}

pub(crate) async fn list_functions<C: CatalogAccess>(
    catalog: &C,
    pattern: &str,
    verbose: bool,
) -> Result<Vec<FunctionRow>, CatalogError> {
    let compiled = NamePattern::compile(pattern);
    catalog
        .list_functions(compiled.schema.as_deref(), compiled.name.as_deref(), verbose)
        .await
}

pub(crate) async fn list_data_types<C: CatalogAccess>(
    catalog: &C,
    pattern: &str,
    verbose: bool,
) -> Result<Vec<DataTypeRow>, CatalogError> {
    let compiled = NamePattern::compile(pattern);
    catalog
        .list_data_types(compiled.schema.as_deref(), compiled.name.as_deref(), verbose)
        .await
}
