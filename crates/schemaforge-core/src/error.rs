//! Errors raised while building and resolving a schema

/// Schema construction and resolution errors
///
/// Structural variants (duplicates, missing entities) are always fatal.
/// The `Dangling*` variants are only produced when strict reference
/// checking is enabled; otherwise they are reported as diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Table '{0}' is already declared in the database")]
    DuplicateTable(String),

    #[error("Table '{0}' does not exist in the database")]
    TableNotFound(String),

    #[error("Column '{column}' already exists in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    #[error("Table '{table}' already has inheritance column '{existing}', cannot add '{column}'")]
    DuplicateInheritanceColumn {
        table: String,
        existing: String,
        column: String,
    },

    #[error("Behavior '{behavior}' is already registered on table '{table}'")]
    DuplicateBehavior { table: String, behavior: String },

    #[error("Column '{column}' does not exist in table '{table}'")]
    ColumnNotFound { table: String, column: String },

    #[error("Index '{index}' does not exist in table '{table}'")]
    IndexNotFound { table: String, index: String },

    #[error("Unknown behavior '{behavior}' declared on table '{table}'")]
    UnknownBehavior { table: String, behavior: String },

    #[error("Table '{table}' contains a foreign key to nonexistent table '{foreign_table}'")]
    DanglingForeignKey {
        table: String,
        foreign_key: String,
        foreign_table: String,
    },

    #[error("Table '{table}' contains foreign key '{foreign_key}' with nonexistent local column '{column}'")]
    DanglingLocalColumn {
        table: String,
        foreign_key: String,
        column: String,
    },

    #[error("Table '{table}' contains foreign key '{foreign_key}' to table '{foreign_table}' with nonexistent column '{column}'")]
    DanglingForeignColumn {
        table: String,
        foreign_key: String,
        foreign_table: String,
        column: String,
    },
}

impl SchemaError {
    /// Whether this error describes a cross-table reference problem
    pub fn is_referential(&self) -> bool {
        matches!(
            self,
            Self::DanglingForeignKey { .. }
                | Self::DanglingLocalColumn { .. }
                | Self::DanglingForeignColumn { .. }
        )
    }
}
