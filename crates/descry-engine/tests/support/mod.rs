//! In-memory catalog backend for engine tests.
//!
//! Fixtures are built relation by relation; compiled name filters are applied
//! with the `regex` crate the way the server-side `~` operator would.

use async_trait::async_trait;
use regex::Regex;

use descry_core::catalog::{
    ColumnRef, ColumnRow, ConstraintRow, DataTypeRow, FiringMode, FunctionRow, IncomingRefRow,
    IndexDetail, InheritanceLinks, RelationListRow, RoleRow, RuleRow, SchemaRow, SequenceRow,
    ServerRow, TableIndexRow, TriggerRow,
};
use descry_core::{
    CatalogAccess, CatalogError, Persistence, RelationFlags, RelationIdentity, RelationKind,
    RelationOid,
};

pub struct MockRelation {
    pub identity: RelationIdentity,
    pub flags: RelationFlags,
    /// Simulates a drop between resolution and assembly: the relation still
    /// resolves but its flags row is gone.
    pub vanished: bool,
    pub columns: Vec<ColumnRow>,
    pub sequence: Option<SequenceRow>,
    pub sequence_owner: Option<ColumnRef>,
    pub index_detail: Option<IndexDetail>,
    pub table_indexes: Vec<TableIndexRow>,
    pub checks: Vec<ConstraintRow>,
    pub foreign_keys: Vec<ConstraintRow>,
    pub incoming: Vec<IncomingRefRow>,
    pub rules: Vec<RuleRow>,
    pub triggers: Vec<TriggerRow>,
    pub inheritance: InheritanceLinks,
    pub server: Option<ServerRow>,
    pub view_def: Option<String>,
}

impl MockRelation {
    pub fn new(oid: i64, schema: &str, name: &str, kind: RelationKind) -> Self {
        Self {
            identity: RelationIdentity {
                oid: RelationOid(oid),
                schema: schema.to_string(),
                name: name.to_string(),
            },
            flags: RelationFlags {
                kind,
                owner: Some("postgres".to_string()),
                has_checks: false,
                has_index: false,
                has_rules: false,
                has_triggers: false,
                has_oids: false,
                tablespace: 0,
                reloptions: None,
                typed_of_type: None,
                persistence: Persistence::Permanent,
            },
            vanished: false,
            columns: Vec::new(),
            sequence: None,
            sequence_owner: None,
            index_detail: None,
            table_indexes: Vec::new(),
            checks: Vec::new(),
            foreign_keys: Vec::new(),
            incoming: Vec::new(),
            rules: Vec::new(),
            triggers: Vec::new(),
            inheritance: InheritanceLinks::default(),
            server: None,
            view_def: None,
        }
    }

    pub fn vanished(mut self) -> Self {
        self.vanished = true;
        self
    }

    pub fn owner(mut self, owner: &str) -> Self {
        self.flags.owner = Some(owner.to_string());
        self
    }

    pub fn column(mut self, name: &str, type_name: &str) -> Self {
        let attnum = self.columns.len() as i32 + 1;
        self.columns.push(ColumnRow {
            attnum,
            name: name.to_string(),
            type_name: type_name.to_string(),
            ..ColumnRow::default()
        });
        self
    }

    pub fn column_row(mut self, row: ColumnRow) -> Self {
        self.columns.push(row);
        self
    }

    pub fn index(mut self, row: TableIndexRow) -> Self {
        self.flags.has_index = true;
        self.table_indexes.push(row);
        self
    }

    pub fn check(mut self, name: &str, definition: &str) -> Self {
        self.flags.has_checks = true;
        self.checks.push(ConstraintRow {
            name: name.to_string(),
            definition: definition.to_string(),
        });
        self
    }

    pub fn foreign_key(mut self, name: &str, definition: &str) -> Self {
        self.flags.has_triggers = true;
        self.foreign_keys.push(ConstraintRow {
            name: name.to_string(),
            definition: definition.to_string(),
        });
        self
    }

    pub fn referenced_by(mut self, table: &str, name: &str, definition: &str) -> Self {
        self.flags.has_triggers = true;
        self.incoming.push(IncomingRefRow {
            name: name.to_string(),
            table: table.to_string(),
            definition: definition.to_string(),
        });
        self
    }

    pub fn rule(mut self, name: &str, firing: FiringMode) -> Self {
        self.flags.has_rules = true;
        self.rules.push(RuleRow {
            name: name.to_string(),
            definition: format!("CREATE RULE {name} AS ON UPDATE TO t DO NOTIFY t"),
            firing,
        });
        self
    }

    pub fn trigger(mut self, name: &str, firing: FiringMode) -> Self {
        self.flags.has_triggers = true;
        self.triggers.push(TriggerRow {
            name: name.to_string(),
            definition: format!(
                "CREATE TRIGGER {name} BEFORE INSERT ON t FOR EACH ROW EXECUTE PROCEDURE f()"
            ),
            firing,
        });
        self
    }

    pub fn sequence_state(mut self, values: &[&str]) -> Self {
        self.sequence = Some(SequenceRow {
            values: values.iter().map(|v| Some(v.to_string())).collect(),
        });
        self
    }

    pub fn owned_by(mut self, schema: &str, table: &str, column: &str) -> Self {
        self.sequence_owner = Some(ColumnRef {
            schema: schema.to_string(),
            table: table.to_string(),
            column: column.to_string(),
        });
        self
    }

    pub fn index_detail(mut self, detail: IndexDetail) -> Self {
        self.index_detail = Some(detail);
        self
    }

    pub fn inherits(mut self, parents: &[&str]) -> Self {
        self.inheritance.parents = parents.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn children(mut self, children: &[&str]) -> Self {
        self.inheritance.children = children.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn served_by(mut self, server: &str, options: Option<&str>) -> Self {
        self.server = Some(ServerRow {
            name: server.to_string(),
            options: options.map(|o| o.to_string()),
        });
        self
    }

    pub fn view_definition(mut self, definition: &str) -> Self {
        self.view_def = Some(definition.to_string());
        self
    }

    pub fn reloptions(mut self, options: &str) -> Self {
        self.flags.reloptions = Some(options.to_string());
        self
    }
}

#[derive(Default)]
pub struct MockCatalog {
    pub relations: Vec<MockRelation>,
    pub schemas: Vec<SchemaRow>,
    pub roles: Vec<RoleRow>,
    pub functions: Vec<FunctionRow>,
    pub data_types: Vec<DataTypeRow>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn relation(mut self, relation: MockRelation) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn schema(mut self, name: &str, owner: &str) -> Self {
        self.schemas.push(SchemaRow {
            name: name.to_string(),
            owner: Some(owner.to_string()),
            access_privileges: None,
            description: None,
        });
        self
    }

    pub fn role(mut self, name: &str, can_login: bool) -> Self {
        self.roles.push(RoleRow {
            name: name.to_string(),
            is_superuser: false,
            inherits: true,
            can_create_role: false,
            can_create_db: false,
            can_login,
            replication: false,
            connection_limit: -1,
            valid_until: None,
            member_of: Vec::new(),
            description: None,
        });
        self
    }

    pub fn function(mut self, schema: &str, name: &str, result_type: &str, args: &str) -> Self {
        self.functions.push(FunctionRow {
            schema: schema.to_string(),
            name: name.to_string(),
            result_type: result_type.to_string(),
            argument_types: args.to_string(),
            kind: "normal".to_string(),
            volatility: None,
            owner: None,
            language: None,
            source: None,
            description: None,
        });
        self
    }

    pub fn data_type(mut self, schema: &str, name: &str) -> Self {
        self.data_types.push(DataTypeRow {
            schema: schema.to_string(),
            name: name.to_string(),
            internal_name: None,
            size: None,
            elements: None,
            access_privileges: None,
            description: None,
        });
        self
    }

    fn get(&self, oid: RelationOid) -> Option<&MockRelation> {
        self.relations.iter().find(|r| r.identity.oid == oid)
    }
}

fn matches(filter: Option<&str>, value: &str) -> bool {
    match filter {
        Some(source) => Regex::new(source).unwrap().is_match(value),
        None => true,
    }
}

fn visible_by_default(schema: &str) -> bool {
    !schema.starts_with("pg_") && schema != "information_schema"
}

#[async_trait]
impl CatalogAccess for MockCatalog {
    async fn find_relations(
        &self,
        schema_filter: Option<&str>,
        name_filter: Option<&str>,
        kinds: &[RelationKind],
    ) -> Result<Vec<RelationIdentity>, CatalogError> {
        let mut found: Vec<RelationIdentity> = self
            .relations
            .iter()
            .filter(|r| kinds.contains(&r.flags.kind))
            .filter(|r| match schema_filter {
                Some(f) => matches(Some(f), &r.identity.schema),
                None => visible_by_default(&r.identity.schema),
            })
            .filter(|r| matches(name_filter, &r.identity.name))
            .map(|r| r.identity.clone())
            .collect();
        found.sort_by(|a, b| (&a.schema, &a.name).cmp(&(&b.schema, &b.name)));
        Ok(found)
    }

    async fn relation_flags(
        &self,
        oid: RelationOid,
    ) -> Result<Option<RelationFlags>, CatalogError> {
        Ok(self
            .get(oid)
            .filter(|r| !r.vanished)
            .map(|r| r.flags.clone()))
    }

    async fn columns(
        &self,
        oid: RelationOid,
        _kind: RelationKind,
        _verbose: bool,
    ) -> Result<Vec<ColumnRow>, CatalogError> {
        Ok(self.get(oid).map(|r| r.columns.clone()).unwrap_or_default())
    }

    async fn index_detail(&self, oid: RelationOid) -> Result<Option<IndexDetail>, CatalogError> {
        Ok(self.get(oid).and_then(|r| r.index_detail.clone()))
    }

    async fn sequence_values(
        &self,
        schema: &str,
        name: &str,
    ) -> Result<Option<SequenceRow>, CatalogError> {
        Ok(self
            .relations
            .iter()
            .find(|r| r.identity.schema == schema && r.identity.name == name)
            .and_then(|r| r.sequence.clone()))
    }

    async fn sequence_owner(&self, oid: RelationOid) -> Result<Option<ColumnRef>, CatalogError> {
        Ok(self.get(oid).and_then(|r| r.sequence_owner.clone()))
    }

    async fn table_indexes(&self, oid: RelationOid) -> Result<Vec<TableIndexRow>, CatalogError> {
        Ok(self
            .get(oid)
            .map(|r| r.table_indexes.clone())
            .unwrap_or_default())
    }

    async fn check_constraints(
        &self,
        oid: RelationOid,
    ) -> Result<Vec<ConstraintRow>, CatalogError> {
        Ok(self.get(oid).map(|r| r.checks.clone()).unwrap_or_default())
    }

    async fn foreign_keys(&self, oid: RelationOid) -> Result<Vec<ConstraintRow>, CatalogError> {
        Ok(self
            .get(oid)
            .map(|r| r.foreign_keys.clone())
            .unwrap_or_default())
    }

    async fn incoming_references(
        &self,
        oid: RelationOid,
    ) -> Result<Vec<IncomingRefRow>, CatalogError> {
        Ok(self.get(oid).map(|r| r.incoming.clone()).unwrap_or_default())
    }

    async fn rules(
        &self,
        oid: RelationOid,
        exclude_return: bool,
    ) -> Result<Vec<RuleRow>, CatalogError> {
        Ok(self
            .get(oid)
            .map(|r| {
                r.rules
                    .iter()
                    .filter(|rule| !exclude_return || rule.name != "_RETURN")
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn triggers(&self, oid: RelationOid) -> Result<Vec<TriggerRow>, CatalogError> {
        Ok(self.get(oid).map(|r| r.triggers.clone()).unwrap_or_default())
    }

    async fn inheritance(&self, oid: RelationOid) -> Result<InheritanceLinks, CatalogError> {
        Ok(self
            .get(oid)
            .map(|r| r.inheritance.clone())
            .unwrap_or_default())
    }

    async fn foreign_server(&self, oid: RelationOid) -> Result<Option<ServerRow>, CatalogError> {
        Ok(self.get(oid).and_then(|r| r.server.clone()))
    }

    async fn view_definition(&self, oid: RelationOid) -> Result<Option<String>, CatalogError> {
        Ok(self.get(oid).and_then(|r| r.view_def.clone()))
    }

    async fn list_relations(
        &self,
        schema_filter: Option<&str>,
        name_filter: Option<&str>,
        kinds: &[RelationKind],
        verbose: bool,
    ) -> Result<Vec<RelationListRow>, CatalogError> {
        let mut rows: Vec<RelationListRow> = self
            .relations
            .iter()
            .filter(|r| kinds.contains(&r.flags.kind))
            .filter(|r| match schema_filter {
                Some(f) => matches(Some(f), &r.identity.schema),
                None => visible_by_default(&r.identity.schema),
            })
            .filter(|r| matches(name_filter, &r.identity.name))
            .map(|r| RelationListRow {
                schema: r.identity.schema.clone(),
                name: r.identity.name.clone(),
                kind: r.flags.kind,
                owner: Some("postgres".to_string()),
                size: verbose.then(|| "8192 bytes".to_string()),
                description: None,
            })
            .collect();
        rows.sort_by(|a, b| (&a.schema, &a.name).cmp(&(&b.schema, &b.name)));
        Ok(rows)
    }

    async fn list_schemas(
        &self,
        name_filter: Option<&str>,
        _verbose: bool,
    ) -> Result<Vec<SchemaRow>, CatalogError> {
        let mut rows: Vec<SchemaRow> = self
            .schemas
            .iter()
            .filter(|s| match name_filter {
                Some(f) => matches(Some(f), &s.name),
                None => visible_by_default(&s.name),
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn list_roles(
        &self,
        name_filter: Option<&str>,
        _verbose: bool,
    ) -> Result<Vec<RoleRow>, CatalogError> {
        let mut rows: Vec<RoleRow> = self
            .roles
            .iter()
            .filter(|r| matches(name_filter, &r.name))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn list_functions(
        &self,
        schema_filter: Option<&str>,
        name_filter: Option<&str>,
        _verbose: bool,
    ) -> Result<Vec<FunctionRow>, CatalogError> {
        let mut rows: Vec<FunctionRow> = self
            .functions
            .iter()
            .filter(|f| match schema_filter {
                Some(p) => matches(Some(p), &f.schema),
                None => visible_by_default(&f.schema),
            })
            .filter(|f| matches(name_filter, &f.name))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (&a.schema, &a.name, &a.argument_types).cmp(&(&b.schema, &b.name, &b.argument_types))
        });
        Ok(rows)
    }

    async fn list_data_types(
        &self,
        schema_filter: Option<&str>,
        name_filter: Option<&str>,
        _verbose: bool,
    ) -> Result<Vec<DataTypeRow>, CatalogError> {
        let mut rows: Vec<DataTypeRow> = self
            .data_types
            .iter()
            .filter(|t| match schema_filter {
                Some(p) => matches(Some(p), &t.schema),
                None => visible_by_default(&t.schema),
            })
            .filter(|t| matches(name_filter, &t.name))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (&a.schema, &a.name).cmp(&(&b.schema, &b.name)));
        Ok(rows)
    }
}
