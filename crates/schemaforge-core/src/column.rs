//! Column model and type classification

use crate::database::ForeignKeyId;
use serde::{Deserialize, Serialize};

/// Column type classification
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnType {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Double,

    /// Fixed-point number; precision and scale live on the column
    Decimal,

    Char,
    Varchar,
    LongVarchar,
    Clob,
    Blob,
    Date,
    Time,
    Timestamp,

    /// Enumerated type with its allowed values
    Enum {
        values: Vec<String>,
    },
}

impl ColumnType {
    /// Whether this is an enumerated type
    pub fn is_enum(&self) -> bool {
        matches!(self, Self::Enum { .. })
    }

    /// Whether values of this type are large objects (candidates for lazy loading)
    pub fn is_lob(&self) -> bool {
        matches!(self, Self::Clob | Self::Blob | Self::LongVarchar)
    }

    /// Whether this is a date/time type
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::Timestamp)
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean => write!(f, "BOOLEAN"),
            Self::TinyInt => write!(f, "TINYINT"),
            Self::SmallInt => write!(f, "SMALLINT"),
            Self::Integer => write!(f, "INTEGER"),
            Self::BigInt => write!(f, "BIGINT"),
            Self::Float => write!(f, "FLOAT"),
            Self::Double => write!(f, "DOUBLE"),
            Self::Decimal => write!(f, "DECIMAL"),
            Self::Char => write!(f, "CHAR"),
            Self::Varchar => write!(f, "VARCHAR"),
            Self::LongVarchar => write!(f, "LONGVARCHAR"),
            Self::Clob => write!(f, "CLOB"),
            Self::Blob => write!(f, "BLOB"),
            Self::Date => write!(f, "DATE"),
            Self::Time => write!(f, "TIME"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
            Self::Enum { values } => write!(f, "ENUM({})", values.join(", ")),
        }
    }
}

/// A column of a table
///
/// A column is owned by exactly one table. Its position is assigned by the
/// table when the column is attached and renumbered on every structural change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Name used by generated code; derived from `name` when left empty
    pub external_name: String,

    /// 1-based position within the table (0 while detached)
    pub position: usize,

    /// Type classification
    pub column_type: ColumnType,

    /// Size (length or precision)
    pub size: Option<u32>,

    /// Scale for decimal types
    pub scale: Option<u32>,

    /// Part of the primary key
    pub primary_key: bool,

    /// Value generated by the database
    pub auto_increment: bool,

    /// Declared unique on its own
    pub unique: bool,

    /// NOT NULL constraint
    pub not_null: bool,

    /// Loaded on demand by generated code
    pub lazy_load: bool,

    /// Discriminator column for single-table inheritance
    pub inheritance: bool,

    /// Default value expression
    pub default_value: Option<String>,

    pub description: Option<String>,

    /// Foreign keys pointing at this column (filled by the referrer pass)
    pub referrers: Vec<ForeignKeyId>,

    #[serde(skip)]
    pub(crate) external_name_explicit: bool,
}

impl Column {
    /// Create a new nullable, non-key column
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            external_name: String::new(),
            position: 0,
            column_type,
            size: None,
            scale: None,
            primary_key: false,
            auto_increment: false,
            unique: false,
            not_null: false,
            lazy_load: false,
            inheritance: false,
            default_value: None,
            description: None,
            referrers: Vec::new(),
            external_name_explicit: false,
        }
    }

    /// Mark as primary key (implies NOT NULL)
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self
    }

    /// Mark as auto-increment
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Mark as unique
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Mark as NOT NULL
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Mark as lazily loaded
    pub fn lazy_load(mut self) -> Self {
        self.lazy_load = true;
        self
    }

    /// Mark as inheritance discriminator
    pub fn inheritance(mut self) -> Self {
        self.inheritance = true;
        self
    }

    /// Set size
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Set size and scale
    pub fn with_precision(mut self, size: u32, scale: u32) -> Self {
        self.size = Some(size);
        self.scale = Some(scale);
        self
    }

    /// Set default value
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Set an explicit external name
    pub fn with_external_name(mut self, external_name: impl Into<String>) -> Self {
        self.external_name = external_name.into();
        self.external_name_explicit = true;
        self
    }

    /// Whether the external name was set explicitly rather than derived
    pub fn has_explicit_external_name(&self) -> bool {
        self.external_name_explicit
    }

    /// Whether the column is an enumerated type
    pub fn is_enum(&self) -> bool {
        self.column_type.is_enum()
    }

    /// Whether `fk` is already registered as a referrer of this column
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

    /// Whether any foreign key points at this column
    pub fn is_referenced(&self) -> bool {
        !self.referrers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::TableId;

    #[test]
    fn column_type_display() {
        assert_eq!(ColumnType::Integer.to_string(), "INTEGER");
        let status = ColumnType::Enum {
            values: vec!["draft".to_string(), "published".to_string()],
        };
        assert_eq!(status.to_string(), "ENUM(draft, published)");
        assert!(status.is_enum());
        assert!(ColumnType::Blob.is_lob());
        assert!(ColumnType::Timestamp.is_temporal());
    }

    #[test]
    fn builder_flags() {
        let id = Column::new("id", ColumnType::Integer).primary_key().auto_increment();
        assert!(id.primary_key);
        assert!(id.not_null);
        assert!(id.auto_increment);
        assert!(!id.unique);
        assert!(!id.has_explicit_external_name());

        let named = Column::new("isbn", ColumnType::Varchar).with_external_name("Isbn13");
        assert!(named.has_explicit_external_name());
    }

    #[test]
    fn referrers_are_deduplicated() {
        let mut column = Column::new("id", ColumnType::Integer);
        let fk = ForeignKeyId::new(TableId(1), 0);

        assert!(column.add_referrer(fk));
        assert!(!column.add_referrer(fk));
        assert_eq!(column.referrers.len(), 1);
        assert!(column.is_referenced());
    }
}
