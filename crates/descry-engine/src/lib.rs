//! # descry-engine
//!
//! The describe/list engine: resolves glob-style name patterns against a
//! [`CatalogAccess`] backend and assembles structured relation descriptors
//! (the `\d` family of an interactive shell), plus the sibling object
//! listings.
//!
//! The engine owns no mutable state and issues a bounded, statically known
//! sequence of catalog queries per operation — one resolution query, then
//! per-relation metadata queries, each awaited before the next. Rendering is
//! the caller's job; everything returned here is structured data.

use serde::Serialize;

use descry_core::catalog::{
    DataTypeRow, FunctionRow, RelationListRow, RoleRow, SchemaRow,
};
use descry_core::{CatalogAccess, CatalogError, NamePattern, RelationDescriptor, RelationKind};

mod assembler;
mod footer;
mod lister;
mod resolver;

/// Result of a describe call. Zero matches is a normal outcome, distinct from
/// a catalog failure, so it lives on the `Ok` path.
#[derive(Debug, Serialize)]
pub enum DescribeOutcome {
    /// One descriptor per matched relation, in (schema, name) order.
    /// Relations that vanished between resolution and assembly are skipped;
    /// the remaining matches still describe successfully.
    Described(Vec<RelationDescriptor>),
    /// The pattern matched no relation at all.
    NoMatch { pattern: String },
}

/// The describe/list engine over one catalog backend.
///
/// One engine per read snapshot: the backend handed in here must stay
/// consistent for the duration of each call.
pub struct DescribeEngine<C> {
    catalog: C,
}

impl<C: CatalogAccess> DescribeEngine<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Resolve `pattern` and assemble a descriptor for every matched
    /// relation.
    pub async fn describe(
        &self,
        pattern: &str,
        verbose: bool,
    ) -> Result<DescribeOutcome, CatalogError> {
        let matches = resolver::resolve(&self.catalog, pattern).await?;
        if matches.is_empty() {
            tracing::debug!(pattern, "no relation matched");
            return Ok(DescribeOutcome::NoMatch {
                pattern: pattern.to_string(),
            });
        }

        let mut descriptors = Vec::with_capacity(matches.len());
        for identity in matches {
            if let Some(descriptor) =
                assembler::describe_relation(&self.catalog, identity, verbose).await?
            {
                descriptors.push(descriptor);
            }
        }
        Ok(DescribeOutcome::Described(descriptors))
    }

    /// The bare listing backing a pattern-less describe: tables, views,
    /// materialized views, sequences and foreign tables.
    pub async fn list_all_relations(
        &self,
        pattern: &str,
        verbose: bool,
    ) -> Result<Vec<RelationListRow>, CatalogError> {
        lister::list_objects(&self.catalog, pattern, verbose, RelationKind::LISTING_DEFAULT).await
    }

    pub async fn list_tables(
        &self,
        pattern: &str,
        verbose: bool,
    ) -> Result<Vec<RelationListRow>, CatalogError> {
        lister::list_objects(&self.catalog, pattern, verbose, RelationKind::TABLES).await
    }

    pub async fn list_views(
        &self,
        pattern: &str,
        verbose: bool,
    ) -> Result<Vec<RelationListRow>, CatalogError> {
        lister::list_objects(&self.catalog, pattern, verbose, RelationKind::VIEWS).await
    }

    pub async fn list_sequences(
        &self,
        pattern: &str,
        verbose: bool,
    ) -> Result<Vec<RelationListRow>, CatalogError> {
        lister::list_objects(&self.catalog, pattern, verbose, RelationKind::SEQUENCES).await
    }

    pub async fn list_indexes(
        &self,
        pattern: &str,
        verbose: bool,
    ) -> Result<Vec<RelationListRow>, CatalogError> {
        lister::list_objects(&self.catalog, pattern, verbose, RelationKind::INDEXES).await
    }

    pub async fn list_schemas(
        &self,
        pattern: &str,
        verbose: bool,
    ) -> Result<Vec<SchemaRow>, CatalogError> {
        lister::list_schemas(&self.catalog, pattern, verbose).await
    }

    pub async fn list_roles(
        &self,
        pattern: &str,
        verbose: bool,
    ) -> Result<Vec<RoleRow>, CatalogError> {
        lister::list_roles(&self.catalog, pattern, verbose).await
    }

    pub async fn list_functions(
        &self,
        pattern: &str,
        verbose: bool,
    ) -> Result<Vec<FunctionRow>, CatalogError> {
        lister::list_functions(&self.catalog, pattern, verbose).await
    }

    pub async fn list_data_types(
        &self,
        pattern: &str,
        verbose: bool,
    ) -> Result<Vec<DataTypeRow>, CatalogError> {
        lister::list_data_types(&self.catalog, pattern, verbose).await
    }
}

/// Compile a raw pattern without running anything, exposed for callers that
/// want to inspect the filters (diagnostics, completion).
pub fn compile_pattern(pattern: &str) -> NamePattern {
    NamePattern::compile(pattern)
}
