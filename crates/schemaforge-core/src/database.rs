//! Database: the arena owning every table
//!
//! Cross references inside the schema graph (referrers, cross foreign keys)
//! are plain handles into this arena, never owning pointers.

use crate::config::{Config, Defaults};
use crate::constraint::ForeignKey;
use crate::error::SchemaError;
use crate::platform::Platform;
use crate::table::Table;
use serde::Serialize;
use std::collections::HashMap;

/// Stable handle of a table within its database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TableId(pub usize);

/// Stable handle of a foreign key: owning table plus position in that table
///
/// Foreign keys are never removed, so handle equality is identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ForeignKeyId {
    pub table: TableId,
    pub position: usize,
}

impl ForeignKeyId {
    pub fn new(table: TableId, position: usize) -> Self {
        Self { table, position }
    }
}

/// A many-to-many relationship through a cross-reference table
///
/// `incoming` points from the middle table at the table the pairing was
/// computed for; `outgoing` points from the middle table at the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrossForeignKeys {
    pub middle_table: TableId,
    pub incoming: ForeignKeyId,
    pub outgoing: ForeignKeyId,
}

/// A database schema
#[derive(Debug, Clone, Serialize)]
pub struct Database {
    pub name: String,

    /// Target platform
    pub platform: Platform,

    /// Schema applied to tables that declare none
    pub default_schema: Option<String>,

    defaults: Defaults,
    tables: Vec<Table>,

    #[serde(skip)]
    tables_by_name: HashMap<String, TableId>,
}

impl Database {
    /// Create an empty database for `platform` with default settings
    pub fn new(name: impl Into<String>, platform: Platform) -> Self {
        Self {
            name: name.into(),
            platform,
            default_schema: None,
            defaults: Defaults::default(),
            tables: Vec::new(),
            tables_by_name: HashMap::new(),
        }
    }

    /// Create an empty database configured from `config`
    pub fn from_config(name: impl Into<String>, config: &Config) -> Self {
        let mut database = Self::new(name, config.platform);
        database.default_schema = config.default_schema.clone();
        database.defaults = config.defaults.clone();
        database
    }

    /// Replace the defaults; only affects tables added afterwards
    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Attach a table; it adopts the database defaults and default schema
    pub fn add_table(&mut self, mut table: Table) -> Result<TableId, SchemaError> {
        if self.tables_by_name.contains_key(&table.name) {
            return Err(SchemaError::DuplicateTable(table.name));
        }

        if table.schema.is_none() {
            table.schema = self.default_schema.clone();
        }
        table.inherit_defaults(&self.defaults);

        let id = TableId(self.tables.len());
        self.tables_by_name.insert(table.name.clone(), id);
        self.tables.push(table);

        Ok(id)
    }

    /// All tables, in declaration order
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Handles of all tables, in declaration order
    pub fn table_ids(&self) -> impl Iterator<Item = TableId> {
        (0..self.tables.len()).map(TableId)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables_by_name.contains_key(name)
    }

    /// Handle of the table named `name`
    pub fn table_id(&self, name: &str) -> Option<TableId> {
        self.tables_by_name.get(name).copied()
    }

    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.get(id.0)
    }

    pub fn table_mut(&mut self, id: TableId) -> Option<&mut Table> {
        self.tables.get_mut(id.0)
    }

    /// Handle of the table named `name`, failing when it is not declared
    pub fn require_table(&self, name: &str) -> Result<TableId, SchemaError> {
        self.table_id(name)
            .ok_or_else(|| SchemaError::TableNotFound(name.to_string()))
    }

    pub fn table_by_name(&self, name: &str) -> Option<&Table> {
        self.table_id(name).and_then(|id| self.table(id))
    }

    pub fn table_by_name_mut(&mut self, name: &str) -> Option<&mut Table> {
        let id = self.table_id(name)?;
        self.table_mut(id)
    }

    /// Resolve a foreign key handle
    pub fn foreign_key(&self, id: ForeignKeyId) -> Option<&ForeignKey> {
        self.table(id.table)?.foreign_key(id.position)
    }

    /// Total number of foreign keys across all tables
    pub fn foreign_key_count(&self) -> usize {
        self.tables.iter().map(|t| t.foreign_keys().len()).sum()
    }

    /// Pair every referrer coming from a cross-reference table with the
    /// other foreign keys of that table
    pub fn cross_foreign_keys(&self, table: TableId) -> Vec<CrossForeignKeys> {
        let Some(target) = self.table(table) else {
            return Vec::new();
        };

        let mut pairs = Vec::new();
        for &incoming in target.referrers() {
            let Some(middle) = self.table(incoming.table) else {
                continue;
            };
            if !middle.is_cross_ref {
                continue;
            }

            for (position, _) in middle.other_foreign_keys(incoming.position) {
                pairs.push(CrossForeignKeys {
                    middle_table: incoming.table,
                    incoming,
                    outgoing: ForeignKeyId::new(incoming.table, position),
                });
            }
        }

        pairs
    }
}
