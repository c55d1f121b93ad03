//! Table model and entity registry
//!
//! A table owns its columns, foreign keys, indices and unique constraints,
//! and keeps three column lookups in sync: exact name, lowercase name and
//! external name. Column positions are always the contiguous range `1..=N`.

use crate::behavior::{BehaviorDecl, BehaviorParameters};
use crate::column::Column;
use crate::config::{Defaults, IdMethod, StringFormat};
use crate::constraint::{ForeignKey, Index};
use crate::database::ForeignKeyId;
use crate::error::SchemaError;
use crate::naming::{NameStrategy, NamingMethod};
use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameter of the id method (for example a sequence name)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdMethodParameter {
    pub name: Option<String>,
    pub value: String,
}

/// A table of the schema
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    /// Common name
    pub name: String,

    /// Schema qualifier
    pub schema: Option<String>,

    /// Alias of a table declared elsewhere; aliased tables are only referenced, never declared
    pub alias: Option<String>,

    pub description: Option<String>,

    /// Primary key generation strategy; falls back to the database default
    pub id_method: Option<IdMethod>,

    pub id_method_parameters: Vec<IdMethodParameter>,

    pub read_only: bool,
    pub is_abstract: bool,

    /// Skip code generation for this table
    pub skip_generation: bool,

    /// Many-to-many link table
    pub is_cross_ref: bool,

    /// Default serialization format; falls back to the database default
    pub string_format: Option<StringFormat>,

    /// Add indices over primary key suffixes; falls back to the database default
    pub heavy_indexing: Option<bool>,

    /// Naming method for external names; falls back to the database default
    pub naming_method: Option<NamingMethod>,

    columns: Vec<Column>,

    #[serde(skip)]
    columns_by_name: HashMap<String, usize>,

    #[serde(skip)]
    columns_by_lower_name: HashMap<String, usize>,

    #[serde(skip)]
    columns_by_external_name: HashMap<String, usize>,

    foreign_keys: Vec<ForeignKey>,
    indices: Vec<Index>,
    unices: Vec<Index>,
    behaviors: Vec<BehaviorDecl>,

    /// Foreign keys of other tables pointing at this table
    referrers: Vec<ForeignKeyId>,

    contains_foreign_pk: bool,

    #[serde(skip)]
    inherited: Defaults,
}

impl Table {
    /// Create an empty table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            alias: None,
            description: None,
            id_method: None,
            id_method_parameters: Vec::new(),
            read_only: false,
            is_abstract: false,
            skip_generation: false,
            is_cross_ref: false,
            string_format: None,
            heavy_indexing: None,
            naming_method: None,
            columns: Vec::new(),
            columns_by_name: HashMap::new(),
            columns_by_lower_name: HashMap::new(),
            columns_by_external_name: HashMap::new(),
            foreign_keys: Vec::new(),
            indices: Vec::new(),
            unices: Vec::new(),
            behaviors: Vec::new(),
            referrers: Vec::new(),
            contains_foreign_pk: false,
            inherited: Defaults::default(),
        }
    }

    /// Set the schema qualifier
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Set the id method
    pub fn with_id_method(mut self, id_method: IdMethod) -> Self {
        self.id_method = Some(id_method);
        self
    }

    /// Mark as cross-reference (many-to-many link) table
    pub fn cross_ref(mut self) -> Self {
        self.is_cross_ref = true;
        self
    }

    /// Whether this table only aliases a table declared elsewhere
    pub fn is_alias(&self) -> bool {
        self.alias.is_some()
    }

    /// Name qualified with the schema when the platform supports schemas
    pub fn qualified_name(&self, platform: Platform) -> String {
        match &self.schema {
            Some(schema) if platform.supports_schemas() => format!("{}.{}", schema, self.name),
            _ => self.name.clone(),
        }
    }

    // ---- defaults ------------------------------------------------------

    /// Adopt the defaults of the owning database
    pub(crate) fn inherit_defaults(&mut self, defaults: &Defaults) {
        self.inherited = defaults.clone();
        self.refresh_external_names(|column, method| method.apply(column));
    }

    /// Id method, falling back to the database default
    pub fn effective_id_method(&self) -> IdMethod {
        self.id_method.unwrap_or(self.inherited.id_method)
    }

    /// Naming method, falling back to the database default
    pub fn effective_naming_method(&self) -> NamingMethod {
        self.naming_method.unwrap_or(self.inherited.naming_method)
    }

    /// Serialization format, falling back to the database default
    pub fn effective_string_format(&self) -> StringFormat {
        self.string_format.unwrap_or(self.inherited.string_format)
    }

    /// Heavy indexing flag, falling back to the database default
    pub fn effective_heavy_indexing(&self) -> bool {
        self.heavy_indexing.unwrap_or(self.inherited.heavy_indexing)
    }

    // ---- columns -------------------------------------------------------

    /// Attach a column
    ///
    /// Fails when a column with the same name exists, or when a second
    /// inheritance discriminator is added.
    pub fn add_column(&mut self, mut column: Column) -> Result<&mut Column, SchemaError> {
        if self.columns_by_name.contains_key(&column.name) {
            return Err(SchemaError::DuplicateColumn {
                table: self.name.clone(),
                column: column.name,
            });
        }

        if column.inheritance {
            if let Some(existing) = self.inheritance_column() {
                return Err(SchemaError::DuplicateInheritanceColumn {
                    table: self.name.clone(),
                    existing: existing.name.clone(),
                    column: column.name,
                });
            }
        }

        if !column.external_name_explicit {
            column.external_name = self.effective_naming_method().apply(&column.name);
        }

        column.position = self.columns.len() + 1;
        let idx = self.columns.len();

        self.columns_by_name.insert(column.name.clone(), idx);
        self.columns_by_lower_name.insert(column.name.to_lowercase(), idx);
        self.columns_by_external_name.insert(column.external_name.clone(), idx);
        self.columns.push(column);

        Ok(&mut self.columns[idx])
    }

    /// Detach a column and renumber the remaining ones
    pub fn remove_column(&mut self, name: &str) -> Result<Column, SchemaError> {
        let idx = self
            .columns_by_name
            .get(name)
            .copied()
            .ok_or_else(|| SchemaError::ColumnNotFound {
                table: self.name.clone(),
                column: name.to_string(),
            })?;

        let mut removed = self.columns.remove(idx);
        removed.position = 0;
        self.reindex_columns();

        Ok(removed)
    }

    fn reindex_columns(&mut self) {
        self.columns_by_name.clear();
        self.columns_by_lower_name.clear();
        self.columns_by_external_name.clear();

        for (idx, column) in self.columns.iter_mut().enumerate() {
            column.position = idx + 1;
            self.columns_by_name.insert(column.name.clone(), idx);
            self.columns_by_lower_name.insert(column.name.to_lowercase(), idx);
            self.columns_by_external_name.insert(column.external_name.clone(), idx);
        }
    }

    fn refresh_external_names(&mut self, derive: impl Fn(&str, NamingMethod) -> String) {
        let method = self.effective_naming_method();
        for column in self.columns.iter_mut().filter(|c| !c.external_name_explicit) {
            column.external_name = derive(&column.name, method);
        }
        self.reindex_columns();
    }

    /// Re-derive every non-explicit external name with `strategy`
    pub fn derive_external_names(&mut self, strategy: &dyn NameStrategy) {
        self.refresh_external_names(|column, method| strategy.external_name(column, method));
    }

    /// All columns, in position order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names, in position order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns_by_name.contains_key(name)
    }

    pub fn has_column_ignore_case(&self, name: &str) -> bool {
        self.columns_by_lower_name.contains_key(&name.to_lowercase())
    }

    /// Column by exact name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns_by_name.get(name).map(|&idx| &self.columns[idx])
    }

    /// Mutable column by exact name
    ///
    /// Renaming a column through this handle desynchronizes the lookups;
    /// remove and re-add it instead.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        let idx = *self.columns_by_name.get(name)?;
        Some(&mut self.columns[idx])
    }

    /// Column by case-insensitive name
    pub fn column_ignore_case(&self, name: &str) -> Option<&Column> {
        self.columns_by_lower_name
            .get(&name.to_lowercase())
            .map(|&idx| &self.columns[idx])
    }

    /// Column by external name
    pub fn column_by_external_name(&self, external_name: &str) -> Option<&Column> {
        self.columns_by_external_name
            .get(external_name)
            .map(|&idx| &self.columns[idx])
    }

    /// Primary key columns, in position order
    pub fn primary_key(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }

    /// Primary key column names, in position order
    pub fn primary_key_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn has_primary_key(&self) -> bool {
        self.columns.iter().any(|c| c.primary_key)
    }

    pub fn has_composite_primary_key(&self) -> bool {
        self.columns.iter().filter(|c| c.primary_key).count() > 1
    }

    /// First primary key column flagged auto-increment
    pub fn auto_increment_primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary_key && c.auto_increment)
    }

    pub fn has_auto_increment_primary_key(&self) -> bool {
        self.auto_increment_primary_key().is_some()
    }

    pub fn has_auto_increment_column(&self) -> bool {
        self.columns.iter().any(|c| c.auto_increment)
    }

    /// Single-table inheritance discriminator
    pub fn inheritance_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.inheritance)
    }

    pub fn lazy_load_column_count(&self) -> usize {
        self.columns.iter().filter(|c| c.lazy_load).count()
    }

    pub fn has_enum_columns(&self) -> bool {
        self.columns.iter().any(Column::is_enum)
    }

    // ---- foreign keys --------------------------------------------------

    /// Attach a foreign key, returning its position in the table
    pub fn add_foreign_key(&mut self, foreign_key: ForeignKey) -> usize {
        self.foreign_keys.push(foreign_key);
        self.foreign_keys.len() - 1
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    /// Mutable view; the collection itself cannot grow or shrink through it
    pub fn foreign_keys_mut(&mut self) -> &mut [ForeignKey] {
        &mut self.foreign_keys
    }

    /// Foreign key at `position`
    pub fn foreign_key(&self, position: usize) -> Option<&ForeignKey> {
        self.foreign_keys.get(position)
    }

    /// Foreign key by constraint name
    pub fn foreign_key_by_name(&self, name: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.name == name)
    }

    /// Foreign keys using `column` as a local column
    pub fn column_foreign_keys(&self, column: &str) -> Vec<&ForeignKey> {
        self.foreign_keys
            .iter()
            .filter(|fk| fk.has_local_column(column))
            .collect()
    }

    /// Foreign keys targeting the table named `table`
    pub fn foreign_keys_referencing_table(&self, table: &str) -> Vec<&ForeignKey> {
        self.foreign_keys
            .iter()
            .filter(|fk| fk.foreign_table == table)
            .collect()
    }

    /// Foreign keys other than the one at `position`, with their positions
    pub fn other_foreign_keys(&self, position: usize) -> Vec<(usize, &ForeignKey)> {
        self.foreign_keys
            .iter()
            .enumerate()
            .filter(|(pos, _)| *pos != position)
            .collect()
    }

    /// Whether some primary key column is also a foreign key column
    pub fn contains_foreign_pk(&self) -> bool {
        self.contains_foreign_pk
    }

    /// Flag the table as containing a foreign primary key; never unset
    pub fn set_contains_foreign_pk(&mut self) {
        self.contains_foreign_pk = true;
    }

    // ---- referrers -----------------------------------------------------

    /// Foreign keys of other tables pointing at this table
    pub fn referrers(&self) -> &[ForeignKeyId] {
        &self.referrers
    }

    pub fn has_referrer(&self, fk: ForeignKeyId) -> bool {
        self.referrers.contains(&fk)
    }

    /// Register a referrer; returns false when it was already present
    pub fn add_referrer(&mut self, fk: ForeignKeyId) -> bool {
        if self.has_referrer(fk) {
            return false;
        }
        self.referrers.push(fk);
        true
    }

    // ---- indices -------------------------------------------------------

    /// Attach an index (the `unique` flag is cleared)
    pub fn add_index(&mut self, mut index: Index) -> &mut Index {
        index.unique = false;
        self.indices.push(index);
        let idx = self.indices.len() - 1;
        &mut self.indices[idx]
    }

    /// Attach a unique constraint (the `unique` flag is set)
    pub fn add_unique(&mut self, mut unique: Index) -> &mut Index {
        unique.unique = true;
        self.unices.push(unique);
        let idx = self.unices.len() - 1;
        &mut self.unices[idx]
    }

    pub fn indices(&self) -> &[Index] {
        &self.indices
    }

    pub fn indices_mut(&mut self) -> &mut [Index] {
        &mut self.indices
    }

    pub fn unices(&self) -> &[Index] {
        &self.unices
    }

    pub fn unices_mut(&mut self) -> &mut [Index] {
        &mut self.unices
    }

    /// Whether a (non-unique) index named `name` exists
    pub fn has_index(&self, name: &str) -> bool {
        self.indices.iter().any(|i| i.name == name)
    }

    /// Index by name
    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indices.iter().find(|i| i.name == name)
    }

    /// Detach the index named `name`
    pub fn remove_index(&mut self, name: &str) -> Result<Index, SchemaError> {
        let pos = self
            .indices
            .iter()
            .position(|i| i.name == name)
            .ok_or_else(|| SchemaError::IndexNotFound {
                table: self.name.clone(),
                index: name.to_string(),
            })?;

        Ok(self.indices.remove(pos))
    }

    // ---- behaviors -----------------------------------------------------

    /// Declare a behavior; each behavior may be declared once per table
    pub fn add_behavior(
        &mut self,
        name: impl Into<String>,
        parameters: BehaviorParameters,
    ) -> Result<(), SchemaError> {
        let name = name.into();
        if self.has_behavior(&name) {
            return Err(SchemaError::DuplicateBehavior {
                table: self.name.clone(),
                behavior: name,
            });
        }

        self.behaviors.push(BehaviorDecl { name, parameters });
        Ok(())
    }

    pub fn has_behavior(&self, name: &str) -> bool {
        self.behaviors.iter().any(|b| b.name == name)
    }

    pub fn behaviors(&self) -> &[BehaviorDecl] {
        &self.behaviors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;
    use crate::database::TableId;
    use pretty_assertions::assert_eq;

    fn positions(table: &Table) -> Vec<usize> {
        table.columns().iter().map(|c| c.position).collect()
    }

    fn book() -> Table {
        let mut table = Table::new("book");
        table
            .add_column(Column::new("id", ColumnType::Integer).primary_key().auto_increment())
            .unwrap();
        table.add_column(Column::new("title", ColumnType::Varchar)).unwrap();
        table.add_column(Column::new("author_id", ColumnType::Integer)).unwrap();
        table
    }

    #[test]
    fn positions_are_contiguous_after_add_and_remove() {
        let mut table = book();
        assert_eq!(positions(&table), vec![1, 2, 3]);

        let removed = table.remove_column("title").unwrap();
        assert_eq!(removed.position, 0);
        assert_eq!(positions(&table), vec![1, 2]);
        assert_eq!(table.column_names(), vec!["id", "author_id"]);

        table.add_column(Column::new("isbn", ColumnType::Varchar)).unwrap();
        assert_eq!(positions(&table), vec![1, 2, 3]);
        assert_eq!(table.column("isbn").unwrap().position, 3);
    }

    #[test]
    fn duplicate_column_is_rejected() {
        let mut table = book();
        let err = table.add_column(Column::new("title", ColumnType::Clob)).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateColumn {
                table: "book".to_string(),
                column: "title".to_string(),
            }
        );
        assert_eq!(table.columns().len(), 3);
    }

    #[test]
    fn case_variant_is_a_distinct_column() {
        let mut table = book();
        table.add_column(Column::new("Title", ColumnType::Varchar)).unwrap();
        assert!(table.has_column("Title"));
        assert!(table.has_column("title"));
    }

    #[test]
    fn column_lookups() {
        let table = book();
        assert!(table.has_column("author_id"));
        assert!(!table.has_column("AUTHOR_ID"));
        assert!(table.has_column_ignore_case("AUTHOR_ID"));
        assert_eq!(table.column_ignore_case("Title").unwrap().name, "title");
        assert_eq!(table.column_by_external_name("AuthorId").unwrap().name, "author_id");
        assert!(table.column("missing").is_none());
        assert!(table.column_by_external_name("Missing").is_none());
    }

    #[test]
    fn lookups_survive_removal() {
        let mut table = book();
        table.remove_column("id").unwrap();
        assert!(table.column("id").is_none());
        assert!(table.column_by_external_name("Id").is_none());
        assert_eq!(table.column_ignore_case("TITLE").unwrap().position, 1);
    }

    #[test]
    fn remove_missing_column_fails() {
        let mut table = book();
        assert!(matches!(
            table.remove_column("missing"),
            Err(SchemaError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn single_inheritance_column() {
        let mut table = book();
        table
            .add_column(Column::new("kind", ColumnType::Varchar).inheritance())
            .unwrap();
        let err = table
            .add_column(Column::new("subkind", ColumnType::Varchar).inheritance())
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateInheritanceColumn { .. }));
        assert_eq!(table.inheritance_column().unwrap().name, "kind");
    }

    #[test]
    fn derived_facts() {
        let mut table = book();
        assert!(table.has_primary_key());
        assert!(!table.has_composite_primary_key());
        assert_eq!(table.auto_increment_primary_key().unwrap().name, "id");

        table
            .add_column(Column::new("cover", ColumnType::Blob).lazy_load())
            .unwrap();
        table
            .add_column(Column::new(
                "status",
                ColumnType::Enum {
                    values: vec!["draft".to_string()],
                },
            ))
            .unwrap();
        assert_eq!(table.lazy_load_column_count(), 1);
        assert!(table.has_enum_columns());
    }

    #[test]
    fn foreign_key_queries() {
        let mut table = book();
        table.add_foreign_key(ForeignKey::new("author").reference("author_id", "id"));
        table.add_foreign_key(ForeignKey::new("publisher").reference("publisher_id", "id"));

        assert_eq!(table.column_foreign_keys("author_id").len(), 1);
        assert_eq!(table.foreign_keys_referencing_table("publisher").len(), 1);
        let others = table.other_foreign_keys(0);
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].0, 1);
    }

    #[test]
    fn referrers_are_deduplicated_by_identity() {
        let mut table = Table::new("author");
        let fk = ForeignKeyId::new(TableId(0), 0);
        assert!(table.add_referrer(fk));
        assert!(!table.add_referrer(fk));
        assert!(table.add_referrer(ForeignKeyId::new(TableId(0), 1)));
        assert_eq!(table.referrers().len(), 2);
    }

    #[test]
    fn index_registry() {
        let mut table = book();
        table.add_index(Index::on(["title"]).named("book_title"));
        table.add_unique(Index::on(["title", "author_id"]));

        assert!(table.has_index("book_title"));
        assert!(table.unices()[0].unique);

        let removed = table.remove_index("book_title").unwrap();
        assert_eq!(removed.column_names(), vec!["title"]);
        assert!(!table.has_index("book_title"));
        assert!(matches!(
            table.remove_index("book_title"),
            Err(SchemaError::IndexNotFound { .. })
        ));
    }

    #[test]
    fn duplicate_behavior_is_rejected() {
        let mut table = book();
        table.add_behavior("timestampable", BehaviorParameters::new()).unwrap();
        assert!(matches!(
            table.add_behavior("timestampable", BehaviorParameters::new()),
            Err(SchemaError::DuplicateBehavior { .. })
        ));
    }

    #[test]
    fn defaults_fall_back_to_database() {
        let mut table = book();
        let defaults = Defaults {
            id_method: IdMethod::Native,
            naming_method: NamingMethod::NoChange,
            string_format: StringFormat::Json,
            heavy_indexing: true,
        };
        table.inherit_defaults(&defaults);

        assert_eq!(table.effective_id_method(), IdMethod::Native);
        assert_eq!(table.effective_string_format(), StringFormat::Json);
        assert!(table.effective_heavy_indexing());
        // external names re-derived with the inherited naming method
        assert_eq!(table.column_by_external_name("author_id").unwrap().name, "author_id");

        table.id_method = Some(IdMethod::None);
        assert_eq!(table.effective_id_method(), IdMethod::None);
    }

    #[test]
    fn qualified_name_depends_on_platform() {
        let table = Table::new("book").with_schema("library");
        assert_eq!(table.qualified_name(Platform::Postgresql), "library.book");
        assert_eq!(table.qualified_name(Platform::Mysql), "book");

        let mut alias = Table::new("writer");
        assert!(!alias.is_alias());
        alias.alias = Some("author".to_string());
        assert!(alias.is_alias());
    }
}
