//! Table behaviors
//!
//! A behavior is declared on a table by name and applied during
//! finalization. Names are resolved to implementations through a
//! [`BehaviorRegistry`] of factory functions.

use crate::column::{Column, ColumnType};
use crate::error::SchemaError;
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Behavior parameters, by name
pub type BehaviorParameters = BTreeMap<String, String>;

/// A behavior declared on a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorDecl {
    pub name: String,

    #[serde(default)]
    pub parameters: BehaviorParameters,
}

/// A schema behavior
pub trait SchemaBehavior: std::fmt::Debug {
    /// Name the behavior is declared under
    fn name(&self) -> &str;

    /// Modify the table the behavior is declared on
    ///
    /// Must be safe to apply more than once.
    fn modify_table(&self, table: &mut Table) -> Result<(), SchemaError>;
}

/// Factory creating a behavior from its declared parameters
pub type BehaviorFactory = fn(&BehaviorParameters) -> Box<dyn SchemaBehavior>;

/// String-keyed registry of behaviors
#[derive(Debug, Clone)]
pub struct BehaviorRegistry {
    factories: HashMap<String, BehaviorFactory>,
}

impl BehaviorRegistry {
    /// Create a registry holding the built-in behaviors
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register(Timestampable::NAME, timestampable);
        registry
    }

    /// Register (or replace) a behavior factory
    pub fn register(&mut self, name: impl Into<String>, factory: BehaviorFactory) {
        self.factories.insert(name.into(), factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Instantiate a declared behavior
    pub fn create(&self, decl: &BehaviorDecl) -> Option<Box<dyn SchemaBehavior>> {
        self.factories
            .get(&decl.name)
            .map(|factory| factory(&decl.parameters))
    }

    /// Apply every behavior declared on `table`, in declaration order
    pub fn apply(&self, table: &mut Table) -> Result<usize, SchemaError> {
        let decls = table.behaviors().to_vec();

        for decl in &decls {
            let behavior = self
                .create(decl)
                .ok_or_else(|| SchemaError::UnknownBehavior {
                    table: table.name.clone(),
                    behavior: decl.name.clone(),
                })?;

            tracing::debug!(table = %table.name, behavior = behavior.name(), "applying behavior");
            behavior.modify_table(table)?;
        }

        Ok(decls.len())
    }
}

impl Default for BehaviorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn timestampable(params: &BehaviorParameters) -> Box<dyn SchemaBehavior> {
    Box::new(Timestampable::from_parameters(params))
}

/// Adds creation and update timestamp columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestampable {
    pub create_column: String,
    pub update_column: String,
}

impl Timestampable {
    pub const NAME: &'static str = "timestampable";

    pub fn from_parameters(params: &BehaviorParameters) -> Self {
        Self {
            create_column: params
                .get("create_column")
                .cloned()
                .unwrap_or_else(|| "created_at".to_string()),
            update_column: params
                .get("update_column")
                .cloned()
                .unwrap_or_else(|| "updated_at".to_string()),
        }
    }
}

impl SchemaBehavior for Timestampable {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn modify_table(&self, table: &mut Table) -> Result<(), SchemaError> {
        for name in [&self.create_column, &self.update_column] {
            if !table.has_column(name) {
                table.add_column(Column::new(name.clone(), ColumnType::Timestamp))?;
            }
        }
        Ok(())
    }
}
