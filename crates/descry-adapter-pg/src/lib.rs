//! # descry-adapter-pg
//!
//! [`CatalogAccess`] implementation over a live Postgres `pg_catalog`.
//!
//! Compiled name filters are applied server-side with the `~` operator;
//! every query is logged at debug level and failures are wrapped in
//! [`CatalogError::Query`] with the query's context label. Snapshot
//! consistency across the queries of one describe invocation is the
//! caller's responsibility (run the engine inside one transaction when it
//! matters).

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use descry_core::catalog::{
    ColumnRef, ColumnRow, ConstraintRow, DataTypeRow, FiringMode, FunctionRow, IncomingRefRow,
    IndexDetail, InheritanceLinks, RelationListRow, RoleRow, RuleRow, SchemaRow, SequenceRow,
    ServerRow, TableIndexRow, TriggerRow,
};
use descry_core::{
    CatalogAccess, CatalogError, Persistence, RelationFlags, RelationIdentity, RelationKind,
    RelationOid,
};

mod lister;

/// Catalog port over a Postgres connection pool.
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn wrap(context: &'static str) -> impl Fn(sqlx::Error) -> CatalogError {
    move |e| CatalogError::query(context, e)
}

/// Double-quote an identifier for interpolation into dynamic SQL (only used
/// where Postgres gives us no way to bind one, i.e. `SELECT * FROM <seq>`).
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn first_char(value: &str) -> Option<char> {
    value.chars().next()
}

/// SQL fragment applying the default visibility rule when no schema filter
/// was compiled: visible relations outside the system schemas.
const DEFAULT_VISIBILITY: &str = "(n.nspname <> 'pg_catalog'
         AND n.nspname <> 'information_schema'
         AND n.nspname !~ '^pg_toast'
         AND pg_catalog.pg_table_is_visible(c.oid))";

fn relkind_tags(kinds: &[RelationKind]) -> Vec<String> {
    kinds.iter().map(|k| k.relkind().to_string()).collect()
}

#[async_trait]
impl CatalogAccess for PgCatalog {
    async fn find_relations(
        &self,
        schema_filter: Option<&str>,
        name_filter: Option<&str>,
        kinds: &[RelationKind],
    ) -> Result<Vec<RelationIdentity>, CatalogError> {
        let sql = format!(
            "SELECT c.oid::bigint AS oid,
                    COALESCE(n.nspname, '') AS nspname,
                    c.relname
             FROM pg_catalog.pg_class c
             LEFT JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
             WHERE c.relkind::text = ANY($1)
               AND ($2::text IS NULL OR n.nspname ~ $2)
               AND ($3::text IS NULL OR c.relname ~ $3)
               AND ($2::text IS NOT NULL OR {DEFAULT_VISIBILITY})
             ORDER BY 2, 3"
        );
        tracing::debug!(?schema_filter, ?name_filter, "find_relations");
        let rows = sqlx::query(&sql)
            .bind(relkind_tags(kinds))
            .bind(schema_filter)
            .bind(name_filter)
            .fetch_all(&self.pool)
            .await
            .map_err(wrap("find_relations"))?;

        Ok(rows
            .into_iter()
            .map(|row| RelationIdentity {
                oid: RelationOid(row.get("oid")),
                schema: row.get("nspname"),
                name: row.get("relname"),
            })
            .collect())
    }

    async fn relation_flags(
        &self,
        oid: RelationOid,
    ) -> Result<Option<RelationFlags>, CatalogError> {
        let sql = "SELECT c.relchecks, c.relkind::text AS relkind,
                          pg_catalog.pg_get_userbyid(c.relowner) AS relowner,
                          c.relhasindex, c.relhasrules, c.relhastriggers,
                          EXISTS (SELECT 1 FROM pg_catalog.pg_attribute oa
                                  WHERE oa.attrelid = c.oid AND oa.attname = 'oid'
                                    AND oa.attnum < 0) AS relhasoids,
                          pg_catalog.array_to_string(c.reloptions || array(
                              SELECT 'toast.' || x FROM pg_catalog.unnest(tc.reloptions) x
                          ), ', ') AS reloptions,
                          c.reltablespace::bigint AS reltablespace,
                          CASE WHEN c.reloftype = 0 THEN ''
                               ELSE c.reloftype::pg_catalog.regtype::pg_catalog.text
                          END AS reloftype,
                          c.relpersistence::text AS relpersistence
                   FROM pg_catalog.pg_class c
                   LEFT JOIN pg_catalog.pg_class tc ON (c.reltoastrelid = tc.oid)
                   WHERE c.oid = $1::oid";
        tracing::debug!(oid = oid.0, "relation_flags");
        let Some(row) = sqlx::query(sql)
            .bind(oid.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(wrap("relation_flags"))?
        else {
            return Ok(None);
        };

        let relkind: String = row.get("relkind");
        let kind = first_char(&relkind)
            .and_then(RelationKind::from_relkind)
            .ok_or_else(|| {
                CatalogError::query(
                    "relation_flags",
                    anyhow::anyhow!("unrecognized relkind {relkind:?} for oid {}", oid.0),
                )
            })?;

        let persistence: String = row.get("relpersistence");
        let reloftype: String = row.get("reloftype");
        Ok(Some(RelationFlags {
            kind,
            owner: row.get("relowner"),
            has_checks: row.get::<i16, _>("relchecks") > 0,
            has_index: row.get("relhasindex"),
            has_rules: row.get("relhasrules"),
            has_triggers: row.get("relhastriggers"),
            has_oids: row.get("relhasoids"),
            tablespace: row.get("reltablespace"),
            reloptions: row
                .get::<Option<String>, _>("reloptions")
                .filter(|o| !o.is_empty()),
            typed_of_type: (!reloftype.is_empty()).then_some(reloftype),
            persistence: first_char(&persistence).map_or(Persistence::Permanent, Persistence::from_tag),
        }))
    }

    async fn columns(
        &self,
        oid: RelationOid,
        kind: RelationKind,
        verbose: bool,
    ) -> Result<Vec<ColumnRow>, CatalogError> {
        let mut sql = String::from(
            "SELECT a.attnum, a.attisdropped, a.attname,
                    pg_catalog.format_type(a.atttypid, a.atttypmod) AS atttype,
                    (SELECT substring(pg_catalog.pg_get_expr(d.adbin, d.adrelid) for 128)
                     FROM pg_catalog.pg_attrdef d
                     WHERE d.adrelid = a.attrelid AND d.adnum = a.attnum AND a.atthasdef
                    ) AS attdefault,
                    a.attnotnull,
                    (SELECT c.collname
                     FROM pg_catalog.pg_collation c, pg_catalog.pg_type t
                     WHERE c.oid = a.attcollation AND t.oid = a.atttypid
                       AND a.attcollation <> t.typcollation
                    ) AS attcollation",
        );

        if kind == RelationKind::Index {
            sql.push_str(
                ", pg_catalog.pg_get_indexdef(a.attrelid, a.attnum, true) AS indexdef",
            );
        } else {
            sql.push_str(", NULL::text AS indexdef");
        }

        if kind == RelationKind::ForeignTable {
            sql.push_str(
                ", CASE WHEN attfdwoptions IS NULL THEN ''
                        ELSE '(' || pg_catalog.array_to_string(ARRAY(
                            SELECT pg_catalog.quote_ident(option_name) || ' '
                                   || pg_catalog.quote_literal(option_value)
                            FROM pg_catalog.pg_options_to_table(attfdwoptions)
                        ), ', ') || ')'
                   END AS attfdwoptions",
            );
        } else {
            sql.push_str(", NULL::text AS attfdwoptions");
        }

        if verbose {
            sql.push_str(
                ", a.attstorage::text AS attstorage,
                   (CASE WHEN a.attstattarget = -1 THEN NULL
                         ELSE a.attstattarget END)::int4 AS attstattarget",
            );
            if kind.supports_column_comments() {
                sql.push_str(
                    ", pg_catalog.col_description(a.attrelid, a.attnum) AS attcomment",
                );
            } else {
                sql.push_str(", NULL::text AS attcomment");
            }
        } else {
            sql.push_str(
                ", NULL::text AS attstorage, NULL::int4 AS attstattarget,
                   NULL::text AS attcomment",
            );
        }

        sql.push_str(
            " FROM pg_catalog.pg_attribute a
              WHERE a.attrelid = $1::oid AND a.attnum > 0 AND NOT a.attisdropped
              ORDER BY a.attnum",
        );

        tracing::debug!(oid = oid.0, kind = kind.label(), verbose, "columns");
        let rows = sqlx::query(&sql)
            .bind(oid.0)
            .fetch_all(&self.pool)
            .await
            .map_err(wrap("columns"))?;

        Ok(rows
            .into_iter()
            .map(|row| ColumnRow {
                attnum: row.get::<i16, _>("attnum") as i32,
                is_dropped: row.get("attisdropped"),
                name: row.get("attname"),
                type_name: row.get("atttype"),
                default: row.get("attdefault"),
                not_null: row.get("attnotnull"),
                collation: row.get("attcollation"),
                index_def: row.get("indexdef"),
                fdw_options: row
                    .get::<Option<String>, _>("attfdwoptions")
                    .filter(|o| !o.is_empty()),
                storage: row
                    .get::<Option<String>, _>("attstorage")
                    .as_deref()
                    .and_then(first_char),
                stats_target: row.get("attstattarget"),
                comment: row.get("attcomment"),
            })
            .collect())
    }

    async fn index_detail(&self, oid: RelationOid) -> Result<Option<IndexDetail>, CatalogError> {
        let sql = "SELECT i.indisunique, i.indisprimary, i.indisclustered, i.indisvalid,
                          (NOT i.indimmediate) AND EXISTS (
                              SELECT 1 FROM pg_catalog.pg_constraint
                              WHERE conrelid = i.indrelid AND conindid = i.indexrelid
                                AND contype IN ('p','u','x') AND condeferrable
                          ) AS condeferrable,
                          (NOT i.indimmediate) AND EXISTS (
                              SELECT 1 FROM pg_catalog.pg_constraint
                              WHERE conrelid = i.indrelid AND conindid = i.indexrelid
                                AND contype IN ('p','u','x') AND condeferred
                          ) AS condeferred,
                          a.amname, c2.relname AS tablename,
                          pg_catalog.pg_get_expr(i.indpred, i.indrelid, true) AS indpred
                   FROM pg_catalog.pg_index i, pg_catalog.pg_class c,
                        pg_catalog.pg_class c2, pg_catalog.pg_am a
                   WHERE i.indexrelid = c.oid AND c.oid = $1::oid
                     AND c.relam = a.oid AND i.indrelid = c2.oid";
        tracing::debug!(oid = oid.0, "index_detail");
        let row = sqlx::query(sql)
            .bind(oid.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(wrap("index_detail"))?;

        Ok(row.map(|row| IndexDetail {
            is_unique: row.get("indisunique"),
            is_primary: row.get("indisprimary"),
            is_clustered: row.get("indisclustered"),
            is_valid: row.get("indisvalid"),
            is_deferrable: row.get("condeferrable"),
            is_deferred: row.get("condeferred"),
            method: row.get("amname"),
            table: row.get("tablename"),
            predicate: row.get("indpred"),
        }))
    }

    async fn sequence_values(
        &self,
        schema: &str,
        name: &str,
    ) -> Result<Option<SequenceRow>, CatalogError> {
        // The sequence relation itself is the row source; its shape varies
        // across server versions, so values are stringified column by column.
        let sql = format!(
            "SELECT * FROM {}.{}",
            quote_ident(schema),
            quote_ident(name)
        );
        tracing::debug!(schema, name, "sequence_values");
        let row = sqlx::query(&sql)
            .fetch_optional(&self.pool)
            .await
            .map_err(wrap("sequence_values"))?;

        Ok(row.map(|row| SequenceRow {
            values: (0..row.len()).map(|i| stringify_column(&row, i)).collect(),
        }))
    }

    async fn sequence_owner(&self, oid: RelationOid) -> Result<Option<ColumnRef>, CatalogError> {
        let sql = "SELECT n.nspname, c.relname, a.attname
                   FROM pg_catalog.pg_class c
                   INNER JOIN pg_catalog.pg_depend d ON c.oid = d.refobjid
                   INNER JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
                   INNER JOIN pg_catalog.pg_attribute a
                           ON (a.attrelid = c.oid AND a.attnum = d.refobjsubid)
                   WHERE d.classid = 'pg_catalog.pg_class'::pg_catalog.regclass
                     AND d.refclassid = 'pg_catalog.pg_class'::pg_catalog.regclass
                     AND d.objid = $1::oid AND d.deptype = 'a'";
        tracing::debug!(oid = oid.0, "sequence_owner");
        let rows = sqlx::query(sql)
            .bind(oid.0)
            .fetch_all(&self.pool)
            .await
            .map_err(wrap("sequence_owner"))?;

        // More than one owner row should never happen; if it does, the first
        // row wins and the rest are ignored.
        Ok(rows.first().map(|row| ColumnRef {
            schema: row.get("nspname"),
            table: row.get("relname"),
            column: row.get("attname"),
        }))
    }

    async fn table_indexes(&self, oid: RelationOid) -> Result<Vec<TableIndexRow>, CatalogError> {
        let sql = "SELECT c2.relname, i.indisprimary, i.indisunique, i.indisclustered,
                          i.indisvalid,
                          pg_catalog.pg_get_indexdef(i.indexrelid, 0, true) AS indexdef,
                          pg_catalog.pg_get_constraintdef(con.oid, true) AS condef,
                          con.contype::text AS contype,
                          con.condeferrable, con.condeferred,
                          c2.reltablespace::bigint AS reltablespace
                   FROM pg_catalog.pg_class c, pg_catalog.pg_class c2, pg_catalog.pg_index i
                   LEFT JOIN pg_catalog.pg_constraint con
                          ON (conrelid = i.indrelid AND conindid = i.indexrelid
                              AND contype IN ('p','u','x'))
                   WHERE c.oid = $1::oid AND c.oid = i.indrelid AND i.indexrelid = c2.oid
                   ORDER BY i.indisprimary DESC, i.indisunique DESC, c2.relname";
        tracing::debug!(oid = oid.0, "table_indexes");
        let rows = sqlx::query(sql)
            .bind(oid.0)
            .fetch_all(&self.pool)
            .await
            .map_err(wrap("table_indexes"))?;

        Ok(rows
            .into_iter()
            .map(|row| TableIndexRow {
                name: row.get("relname"),
                is_primary: row.get("indisprimary"),
                is_unique: row.get("indisunique"),
                is_clustered: row.get("indisclustered"),
                is_valid: row.get("indisvalid"),
                definition: row.get("indexdef"),
                constraint_def: row.get("condef"),
                constraint_type: row
                    .get::<Option<String>, _>("contype")
                    .as_deref()
                    .and_then(first_char),
                is_deferrable: row
                    .get::<Option<bool>, _>("condeferrable")
                    .unwrap_or(false),
                is_deferred: row.get::<Option<bool>, _>("condeferred").unwrap_or(false),
                tablespace: row.get("reltablespace"),
            })
            .collect())
    }

    async fn check_constraints(
        &self,
        oid: RelationOid,
    ) -> Result<Vec<ConstraintRow>, CatalogError> {
        let sql = "SELECT r.conname, pg_catalog.pg_get_constraintdef(r.oid, true) AS condef
                   FROM pg_catalog.pg_constraint r
                   WHERE r.conrelid = $1::oid AND r.contype = 'c'
                   ORDER BY 1";
        tracing::debug!(oid = oid.0, "check_constraints");
        let rows = sqlx::query(sql)
            .bind(oid.0)
            .fetch_all(&self.pool)
            .await
            .map_err(wrap("check_constraints"))?;
        Ok(constraint_rows(rows))
    }

    async fn foreign_keys(&self, oid: RelationOid) -> Result<Vec<ConstraintRow>, CatalogError> {
        let sql = "SELECT r.conname, pg_catalog.pg_get_constraintdef(r.oid, true) AS condef
                   FROM pg_catalog.pg_constraint r
                   WHERE r.conrelid = $1::oid AND r.contype = 'f'
                   ORDER BY 1";
        tracing::debug!(oid = oid.0, "foreign_keys");
        let rows = sqlx::query(sql)
            .bind(oid.0)
            .fetch_all(&self.pool)
            .await
            .map_err(wrap("foreign_keys"))?;
        Ok(constraint_rows(rows))
    }

    async fn incoming_references(
        &self,
        oid: RelationOid,
    ) -> Result<Vec<IncomingRefRow>, CatalogError> {
        let sql = "SELECT c.conname,
                          c.conrelid::pg_catalog.regclass::text AS tablename,
                          pg_catalog.pg_get_constraintdef(c.oid, true) AS condef
                   FROM pg_catalog.pg_constraint c
                   WHERE c.confrelid = $1::oid AND c.contype = 'f'
                   ORDER BY 1";
        tracing::debug!(oid = oid.0, "incoming_references");
        let rows = sqlx::query(sql)
            .bind(oid.0)
            .fetch_all(&self.pool)
            .await
            .map_err(wrap("incoming_references"))?;

        Ok(rows
            .into_iter()
            .map(|row| IncomingRefRow {
                name: row.get("conname"),
                table: row.get("tablename"),
                definition: row.get("condef"),
            })
            .collect())
    }

    async fn rules(
        &self,
        oid: RelationOid,
        exclude_return: bool,
    ) -> Result<Vec<RuleRow>, CatalogError> {
        let mut sql = String::from(
            "SELECT r.rulename,
                    trim(trailing ';' from pg_catalog.pg_get_ruledef(r.oid, true)) AS ruledef,
                    r.ev_enabled::text AS ev_enabled
             FROM pg_catalog.pg_rewrite r
             WHERE r.ev_class = $1::oid",
        );
        if exclude_return {
            sql.push_str(" AND r.rulename <> '_RETURN'");
        }
        sql.push_str(" ORDER BY 1");

        tracing::debug!(oid = oid.0, exclude_return, "rules");
        let rows = sqlx::query(&sql)
            .bind(oid.0)
            .fetch_all(&self.pool)
            .await
            .map_err(wrap("rules"))?;

        Ok(rows
            .into_iter()
            .map(|row| RuleRow {
                name: row.get("rulename"),
                definition: row.get("ruledef"),
                firing: FiringMode::from_flag(row.get::<String, _>("ev_enabled").as_str()),
            })
            .collect())
    }

    async fn triggers(&self, oid: RelationOid) -> Result<Vec<TriggerRow>, CatalogError> {
        let sql = "SELECT t.tgname,
                          pg_catalog.pg_get_triggerdef(t.oid, true) AS tgdef,
                          t.tgenabled::text AS tgenabled
                   FROM pg_catalog.pg_trigger t
                   WHERE t.tgrelid = $1::oid AND NOT t.tgisinternal
                   ORDER BY 1";
        tracing::debug!(oid = oid.0, "triggers");
        let rows = sqlx::query(sql)
            .bind(oid.0)
            .fetch_all(&self.pool)
            .await
            .map_err(wrap("triggers"))?;

        Ok(rows
            .into_iter()
            .map(|row| TriggerRow {
                name: row.get("tgname"),
                definition: row.get("tgdef"),
                firing: FiringMode::from_flag(row.get::<String, _>("tgenabled").as_str()),
            })
            .collect())
    }

    async fn inheritance(&self, oid: RelationOid) -> Result<InheritanceLinks, CatalogError> {
        let parents_sql = "SELECT c.oid::pg_catalog.regclass::text AS relname
                           FROM pg_catalog.pg_class c, pg_catalog.pg_inherits i
                           WHERE c.oid = i.inhparent AND i.inhrelid = $1::oid
                           ORDER BY i.inhseqno";
        let children_sql = "SELECT c.oid::pg_catalog.regclass::text AS relname
                            FROM pg_catalog.pg_class c, pg_catalog.pg_inherits i
                            WHERE c.oid = i.inhrelid AND i.inhparent = $1::oid
                            ORDER BY c.oid::pg_catalog.regclass::pg_catalog.text";
        tracing::debug!(oid = oid.0, "inheritance");
        let parents = sqlx::query(parents_sql)
            .bind(oid.0)
            .fetch_all(&self.pool)
            .await
            .map_err(wrap("inheritance"))?;
        let children = sqlx::query(children_sql)
            .bind(oid.0)
            .fetch_all(&self.pool)
            .await
            .map_err(wrap("inheritance"))?;

        Ok(InheritanceLinks {
            parents: parents.into_iter().map(|r| r.get("relname")).collect(),
            children: children.into_iter().map(|r| r.get("relname")).collect(),
        })
    }

    async fn foreign_server(&self, oid: RelationOid) -> Result<Option<ServerRow>, CatalogError> {
        let sql = "SELECT s.srvname,
                          pg_catalog.array_to_string(ARRAY(
                              SELECT pg_catalog.quote_ident(option_name) || ' '
                                     || pg_catalog.quote_literal(option_value)
                              FROM pg_catalog.pg_options_to_table(ftoptions)
                          ), ', ') AS ftoptions
                   FROM pg_catalog.pg_foreign_table f, pg_catalog.pg_foreign_server s
                   WHERE f.ftrelid = $1::oid AND s.oid = f.ftserver";
        tracing::debug!(oid = oid.0, "foreign_server");
        let row = sqlx::query(sql)
            .bind(oid.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(wrap("foreign_server"))?;

        Ok(row.map(|row| ServerRow {
            name: row.get("srvname"),
            options: row
                .get::<Option<String>, _>("ftoptions")
                .filter(|o| !o.is_empty()),
        }))
    }

    async fn view_definition(&self, oid: RelationOid) -> Result<Option<String>, CatalogError> {
        let sql = "SELECT pg_catalog.pg_get_viewdef($1::oid, true) AS viewdef";
        tracing::debug!(oid = oid.0, "view_definition");
        let row = sqlx::query(sql)
            .bind(oid.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(wrap("view_definition"))?;
        Ok(row.and_then(|row| row.get("viewdef")))
    }

    async fn list_relations(
        &self,
        schema_filter: Option<&str>,
        name_filter: Option<&str>,
        kinds: &[RelationKind],
        verbose: bool,
    ) -> Result<Vec<RelationListRow>, CatalogError> {
        lister::list_relations(self, schema_filter, name_filter, kinds, verbose).await
    }

    async fn list_schemas(
        &self,
        name_filter: Option<&str>,
        verbose: bool,
    ) -> Result<Vec<SchemaRow>, CatalogError> {
        lister::list_schemas(self, name_filter, verbose).await
    }

    async fn list_roles(
        &self,
        name_filter: Option<&str>,
        verbose: bool,
    ) -> Result<Vec<RoleRow>, CatalogError> {
        lister::list_roles(self, name_filter, verbose).await
    }

    async fn list_functions(
        &self,
        schema_filter: Option<&str>,
        name_filter: Option<&str>,
        verbose: bool,
    ) -> Result<Vec<FunctionRow>, CatalogError> {
        lister::list_functions(self, schema_filter, name_filter, verbose).await
    }

    async fn list_data_types(
        &self,
        schema_filter: Option<&str>,
        name_filter: Option<&str>,
        verbose: bool,
    ) -> Result<Vec<DataTypeRow>, CatalogError> {
        lister::list_data_types(self, schema_filter, name_filter, verbose).await
    }
}

fn constraint_rows(rows: Vec<PgRow>) -> Vec<ConstraintRow> {
    rows.into_iter()
        .map(|row| ConstraintRow {
            name: row.get("conname"),
            definition: row.get("condef"),
        })
        .collect()
}

/// Best-effort stringification of one column of an arbitrary row. Sequence
/// relations only expose name, numeric and boolean columns.
fn stringify_column(row: &PgRow, idx: usize) -> Option<String> {
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v;
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map(|x| x.to_string());
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(idx) {
        return v.map(|x| x.to_string());
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(idx) {
        return v.map(|x| if x { "t" } else { "f" }.to_string());
    }
    None
}
