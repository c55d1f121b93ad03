//! Foreign keys, indices and unique constraints

use serde::{Deserialize, Serialize};

/// Referential action on update/delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForeignKeyAction {
    /// Let the platform decide
    None,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
    NoAction,
}

impl Default for ForeignKeyAction {
    fn default() -> Self {
        Self::None
    }
}

/// One (local column, foreign column) pair of a foreign key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnReference {
    pub local: String,
    pub foreign: String,
}

/// A foreign key declared on a table
///
/// Columns are stored as pairs, so the local and foreign lists always have
/// the same length and position `i` of one maps to position `i` of the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    /// Constraint name; empty until named by the author or the naming pass
    pub name: String,

    /// Name of the referenced table
    pub foreign_table: String,

    /// Optional schema of the referenced table
    pub foreign_schema: Option<String>,

    /// Ordered column pairs
    pub references: Vec<ColumnReference>,

    pub on_update: ForeignKeyAction,
    pub on_delete: ForeignKeyAction,

    /// Do not emit DDL for this constraint
    pub skip_sql: bool,
}

impl ForeignKey {
    /// Create an unnamed foreign key to `foreign_table`
    pub fn new(foreign_table: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            foreign_table: foreign_table.into(),
            foreign_schema: None,
            references: Vec::new(),
            on_update: ForeignKeyAction::None,
            on_delete: ForeignKeyAction::None,
            skip_sql: false,
        }
    }

    /// Set the constraint name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Append a (local, foreign) column pair
    pub fn reference(mut self, local: impl Into<String>, foreign: impl Into<String>) -> Self {
        self.add_reference(local, foreign);
        self
    }

    /// Set the ON DELETE action
    pub fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = action;
        self
    }

    /// Set the ON UPDATE action
    pub fn on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = action;
        self
    }

    /// Append a (local, foreign) column pair
    pub fn add_reference(&mut self, local: impl Into<String>, foreign: impl Into<String>) {
        self.references.push(ColumnReference {
            local: local.into(),
            foreign: foreign.into(),
        });
    }

    /// Local column names, in declaration order
    pub fn local_columns(&self) -> Vec<&str> {
        self.references.iter().map(|r| r.local.as_str()).collect()
    }

    /// Referenced column names, in declaration order
    pub fn foreign_columns(&self) -> Vec<&str> {
        self.references.iter().map(|r| r.foreign.as_str()).collect()
    }

    /// Referenced column mapped to `local`, if any
    pub fn mapped_foreign_column(&self, local: &str) -> Option<&str> {
        self.references
            .iter()
            .find(|r| r.local == local)
            .map(|r| r.foreign.as_str())
    }

    /// Whether the foreign key spans more than one column
    pub fn is_composite(&self) -> bool {
        self.references.len() > 1
    }

    /// Whether `column` is one of the local columns
    pub fn has_local_column(&self, column: &str) -> bool {
        self.references.iter().any(|r| r.local == column)
    }

    /// Whether the constraint still needs a generated name
    pub fn is_unnamed(&self) -> bool {
        self.name.is_empty()
    }
}

/// A column of an index, with an optional prefix length
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct IndexColumn {
    pub name: String,

    /// Prefix length; `None` indexes the full column
    pub size: Option<u32>,
}

/// An index or unique constraint
///
/// Unique constraints are indices with `unique` set; tables keep them in a
/// separate collection but both share column-list and naming behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Index {
    /// Index name; empty until named by the author or the naming pass
    pub name: String,

    /// Ordered indexed columns
    pub columns: Vec<IndexColumn>,

    pub unique: bool,
}

impl Index {
    /// Create an unnamed, non-unique index
    pub fn new() -> Self {
        Self {
            name: String::new(),
            columns: Vec::new(),
            unique: false,
        }
    }

    /// Create an unnamed unique constraint
    pub fn unique() -> Self {
        Self {
            unique: true,
            ..Self::new()
        }
    }

    /// Create a non-unique index over full columns
    pub fn on<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = Self::new();
        for column in columns {
            index.add_column(column, None);
        }
        index
    }

    /// Set the index name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Append a full column
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.add_column(name, None);
        self
    }

    /// Append a column with a prefix length
    pub fn column_prefix(mut self, name: impl Into<String>, size: u32) -> Self {
        self.add_column(name, Some(size));
        self
    }

    /// Append a column
    pub fn add_column(&mut self, name: impl Into<String>, size: Option<u32>) {
        self.columns.push(IndexColumn {
            name: name.into(),
            size,
        });
    }

    /// Column names, in index order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Whether `name` is one of the indexed columns
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Whether any column is indexed by prefix only
    pub fn has_column_size(&self) -> bool {
        self.columns.iter().any(|c| c.size.is_some())
    }

    /// Index every column in full
    pub fn reset_columns_size(&mut self) {
        for column in &mut self.columns {
            column.size = None;
        }
    }

    /// Whether the index still needs a generated name
    pub fn is_unnamed(&self) -> bool {
        self.name.is_empty()
    }
}

impl Default for Index {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_key_pairs_stay_correlated() {
        let fk = ForeignKey::new("author")
            .reference("author_id", "id")
            .reference("author_version", "version")
            .on_delete(ForeignKeyAction::Cascade);

        assert_eq!(fk.local_columns(), vec!["author_id", "author_version"]);
        assert_eq!(fk.foreign_columns(), vec!["id", "version"]);
        assert_eq!(fk.mapped_foreign_column("author_version"), Some("version"));
        assert!(fk.is_composite());
        assert!(fk.is_unnamed());
        assert_eq!(fk.on_delete, ForeignKeyAction::Cascade);
    }

    #[test]
    fn index_columns() {
        let mut index = Index::on(["title", "subtitle"]).column_prefix("summary", 32);
        assert_eq!(index.column_names(), vec!["title", "subtitle", "summary"]);
        assert!(index.has_column("summary"));
        assert!(index.has_column_size());

        index.reset_columns_size();
        assert!(!index.has_column_size());
        assert!(!index.unique);
        assert!(Index::unique().unique);
    }
}
