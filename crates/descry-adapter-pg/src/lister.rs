//! Listing queries behind the `list_*` port methods.
//!
//! Each builds the projection from the verbose flag with `CASE WHEN`
//! expressions so the statement shape stays constant across calls.

use sqlx::Row;

use descry_core::catalog::{DataTypeRow, FunctionRow, RelationListRow, RoleRow, SchemaRow};
use descry_core::{CatalogError, RelationKind};

use crate::{relkind_tags, wrap, DEFAULT_VISIBILITY, PgCatalog};

pub(crate) async fn list_relations(
    catalog: &PgCatalog,
    schema_filter: Option<&str>,
    name_filter: Option<&str>,
    kinds: &[RelationKind],
    verbose: bool,
) -> Result<Vec<RelationListRow>, CatalogError> {
    let sql = format!(
        "SELECT n.nspname AS schema,
                c.relname AS name,
                c.relkind::text AS relkind,
                pg_catalog.pg_get_userbyid(c.relowner) AS owner,
                CASE WHEN $4 THEN
                    pg_catalog.pg_size_pretty(pg_catalog.pg_table_size(c.oid))
                END AS size,
                CASE WHEN $4 THEN
                    pg_catalog.obj_description(c.oid, 'pg_class')
                END AS description
         FROM pg_catalog.pg_class c
         LEFT JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
         WHERE c.relkind::text = ANY($1)
           AND ($2::text IS NULL OR n.nspname ~ $2)
           AND ($3::text IS NULL OR c.relname ~ $3)
           AND ($2::text IS NOT NULL OR {DEFAULT_VISIBILITY})
         ORDER BY 1, 2"
    );
    tracing::debug!(?schema_filter, ?name_filter, verbose, "list_relations");
    let rows = sqlx::query(&sql)
        .bind(relkind_tags(kinds))
        .bind(schema_filter)
        .bind(name_filter)
        .bind(verbose)
        .fetch_all(catalog.pool())
        .await
        .map_err(wrap("list_relations"))?;

    rows.into_iter()
        .map(|row| {
            let relkind: String = row.get("relkind");
            let kind = relkind
                .chars()
                .next()
                .and_then(RelationKind::from_relkind)
                .ok_or_else(|| {
                    CatalogError::query(
                        "list_relations",
                        anyhow::anyhow!("unrecognized relkind {relkind:?}"),
                    )
                })?;
            Ok(RelationListRow {
                schema: row.get("schema"),
                name: row.get("name"),
                kind,
                owner: row.get("owner"),
                size: row.get("size"),
                description: row.get("description"),
            })
        })
        .collect()
}

pub(crate) async fn list_schemas(
    catalog: &PgCatalog,
    name_filter: Option<&str>,
    verbose: bool,
) -> Result<Vec<SchemaRow>, CatalogError> {
    let sql = "SELECT n.nspname AS name,
                      pg_catalog.pg_get_userbyid(n.nspowner) AS owner,
                      CASE WHEN $2 THEN
                          pg_catalog.array_to_string(n.nspacl, E'\\n')
                      END AS access_privileges,
                      CASE WHEN $2 THEN
                          pg_catalog.obj_description(n.oid, 'pg_namespace')
                      END AS description
               FROM pg_catalog.pg_namespace n
               WHERE ($1::text IS NULL OR n.nspname ~ $1)
                 AND ($1::text IS NOT NULL
                      OR (n.nspname !~ '^pg_' AND n.nspname <> 'information_schema'))
               ORDER BY 1";
    tracing::debug!(?name_filter, verbose, "list_schemas");
    let rows = sqlx::query(sql)
        .bind(name_filter)
        .bind(verbose)
        .fetch_all(catalog.pool())
        .await
        .map_err(wrap("list_schemas"))?;

    Ok(rows
        .into_iter()
        .map(|row| SchemaRow {
            name: row.get("name"),
            owner: row.get("owner"),
            access_privileges: row.get("access_privileges"),
            description: row.get("description"),
        })
        .collect())
}

pub(crate) async fn list_roles(
    catalog: &PgCatalog,
    name_filter: Option<&str>,
    verbose: bool,
) -> Result<Vec<RoleRow>, CatalogError> {
    let sql = "SELECT r.rolname AS name,
                      r.rolsuper, r.rolinherit, r.rolcreaterole, r.rolcreatedb,
                      r.rolcanlogin, r.rolreplication,
                      r.rolconnlimit,
                      r.rolvaliduntil::text AS rolvaliduntil,
                      ARRAY(SELECT b.rolname
                            FROM pg_catalog.pg_auth_members m
                            JOIN pg_catalog.pg_roles b ON (m.roleid = b.oid)
                            WHERE m.member = r.oid) AS memberof,
                      CASE WHEN $2 THEN
                          pg_catalog.shobj_description(r.oid, 'pg_authid')
                      END AS description
               FROM pg_catalog.pg_roles r
               WHERE ($1::text IS NULL OR r.rolname ~ $1)
               ORDER BY 1";
    tracing::debug!(?name_filter, verbose, "list_roles");
    let rows = sqlx::query(sql)
        .bind(name_filter)
        .bind(verbose)
        .fetch_all(catalog.pool())
        .await
        .map_err(wrap("list_roles"))?;

    Ok(rows
        .into_iter()
        .map(|row| RoleRow {
            name: row.get("name"),
            is_superuser: row.get("rolsuper"),
            inherits: row.get("rolinherit"),
            can_create_role: row.get("rolcreaterole"),
            can_create_db: row.get("rolcreatedb"),
            can_login: row.get("rolcanlogin"),
            replication: row.get("rolreplication"),
            connection_limit: row.get("rolconnlimit"),
            valid_until: row.get("rolvaliduntil"),
            member_of: row.get("memberof"),
            description: row.get("description"),
        })
        .collect())
}

pub(crate) async fn list_functions(
    catalog: &PgCatalog,
    schema_filter: Option<&str>,
    name_filter: Option<&str>,
    verbose: bool,
) -> Result<Vec<FunctionRow>, CatalogError> {
    let sql = "SELECT n.nspname AS schema,
                      p.proname AS name,
                      pg_catalog.pg_get_function_result(p.oid) AS result_type,
                      pg_catalog.pg_get_function_arguments(p.oid) AS argument_types,
                      CASE WHEN p.prokind = 'a' THEN 'agg'
                           WHEN p.prokind = 'w' THEN 'window'
                           WHEN p.prorettype = 'pg_catalog.trigger'::pg_catalog.regtype
                               THEN 'trigger'
                           ELSE 'normal'
                      END AS kind,
                      CASE WHEN $3 THEN
                          CASE WHEN p.provolatile = 'i' THEN 'immutable'
                               WHEN p.provolatile = 's' THEN 'stable'
                               WHEN p.provolatile = 'v' THEN 'volatile'
                          END
                      END AS volatility,
                      CASE WHEN $3 THEN pg_catalog.pg_get_userbyid(p.proowner)
                      END AS owner,
                      CASE WHEN $3 THEN l.lanname END AS language,
                      CASE WHEN $3 THEN p.prosrc END AS source,
                      CASE WHEN $3 THEN
                          pg_catalog.obj_description(p.oid, 'pg_proc')
                      END AS description
               FROM pg_catalog.pg_proc p
               LEFT JOIN pg_catalog.pg_namespace n ON n.oid = p.pronamespace
               LEFT JOIN pg_catalog.pg_language l ON l.oid = p.prolang
               WHERE ($1::text IS NULL OR n.nspname ~ $1)
                 AND ($2::text IS NULL OR p.proname ~ $2)
                 AND ($1::text IS NOT NULL
                      OR (pg_catalog.pg_function_is_visible(p.oid)
                          AND n.nspname <> 'pg_catalog'
                          AND n.nspname <> 'information_schema'))
               ORDER BY 1, 2, 4";
    tracing::debug!(?schema_filter, ?name_filter, verbose, "list_functions");
    let rows = sqlx::query(sql)
        .bind(schema_filter)
        .bind(name_filter)
        .bind(verbose)
        .fetch_all(catalog.pool())
        .await
        .map_err(wrap("list_functions"))?;

    Ok(rows
        .into_iter()
        .map(|row| FunctionRow {
            schema: row.get("schema"),
            name: row.get("name"),
            result_type: row.get("result_type"),
            argument_types: row.get("argument_types"),
            kind: row.get("kind"),
            volatility: row.get("volatility"),
            owner: row.get("owner"),
            language: row.get("language"),
            source: row.get("source"),
            description: row.get("description"),
        })
        .collect())
}

pub(crate) async fn list_data_types(
    catalog: &PgCatalog,
    schema_filter: Option<&str>,
    name_filter: Option<&str>,
    verbose: bool,
) -> Result<Vec<DataTypeRow>, CatalogError> {
    let sql = "SELECT n.nspname AS schema,
                      pg_catalog.format_type(t.oid, NULL) AS name,
                      CASE WHEN $3 THEN t.typname END AS internal_name,
                      CASE WHEN $3 THEN
                          CASE WHEN t.typrelid != 0 THEN 'tuple'
                               WHEN t.typlen < 0 THEN 'var'
                               ELSE t.typlen::text
                          END
                      END AS size,
                      CASE WHEN $3 THEN
                          pg_catalog.array_to_string(ARRAY(
                              SELECT e.enumlabel
                              FROM pg_catalog.pg_enum e
                              WHERE e.enumtypid = t.oid
                              ORDER BY e.enumsortorder
                          ), E'\\n')
                      END AS elements,
                      CASE WHEN $3 THEN
                          pg_catalog.array_to_string(t.typacl, E'\\n')
                      END AS access_privileges,
                      pg_catalog.obj_description(t.oid, 'pg_type') AS description
               FROM pg_catalog.pg_type t
               LEFT JOIN pg_catalog.pg_namespace n ON n.oid = t.typnamespace
               WHERE (t.typrelid = 0 OR (SELECT c.relkind = 'c'
                                         FROM pg_catalog.pg_class c
                                         WHERE c.oid = t.typrelid))
                 AND NOT EXISTS (SELECT 1 FROM pg_catalog.pg_type el
                                 WHERE el.oid = t.typelem AND el.typarray = t.oid)
                 AND ($1::text IS NULL OR n.nspname ~ $1)
                 AND ($2::text IS NULL OR t.typname ~ $2
                      OR pg_catalog.format_type(t.oid, NULL) ~ $2)
                 AND ($1::text IS NOT NULL
                      OR (pg_catalog.pg_type_is_visible(t.oid)
                          AND n.nspname <> 'pg_catalog'
                          AND n.nspname <> 'information_schema'))
               ORDER BY 1, 2";
    tracing::debug!(?schema_filter, ?name_filter, verbose, "list_data_types");
    let rows = sqlx::query(sql)
        .bind(schema_filter)
        .bind(name_filter)
        .bind(verbose)
        .fetch_all(catalog.pool())
        .await
        .map_err(wrap("list_data_types"))?;

    Ok(rows
        .into_iter()
        .map(|row| DataTypeRow {
            schema: row.get("schema"),
            name: row.get("name"),
            internal_name: row.get("internal_name"),
            size: row.get("size"),
            elements: row
                .get::<Option<String>, _>("elements")
                .filter(|e| !e.is_empty()),
            access_privileges: row.get("access_privileges"),
            description: row.get("description"),
        })
        .collect())
}
