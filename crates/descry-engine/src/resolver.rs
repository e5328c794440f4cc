//! Relation resolution: pattern in, ordered relation identities out.

use descry_core::{CatalogAccess, CatalogError, NamePattern, RelationIdentity, RelationKind};

/// Find every relation matching `pattern`, in (schema, name) order. With no
/// schema filter the backend's default visibility rule applies. An empty
/// result is a normal outcome the caller maps to `DescribeOutcome::NoMatch`.
pub(crate) async fn resolve<C: CatalogAccess>(
    catalog: &C,
    pattern: &str,
) -> Result<Vec<RelationIdentity>, CatalogError> {
    let compiled = NamePattern::compile(pattern);
    tracing::debug!(
        pattern,
        schema_filter = compiled.schema.as_deref(),
        name_filter = compiled.name.as_deref(),
        "resolving relations"
    );
    catalog
        .find_relations(
            compiled.schema.as_deref(),
            compiled.name.as_deref(),
            RelationKind::ALL,
        )
        .await
}
