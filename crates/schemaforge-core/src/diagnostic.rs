//! Diagnostic codes and error reporting
//!
//! IMPORTANT: Diagnostic codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Diagnostic code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // Referential consistency (1xxx)
    /// A foreign key targets a table that is not part of the schema
    RefMissingTable,

    /// A foreign key names a local column that does not exist
    RefMissingLocalColumn,

    /// A foreign key names a referenced column that does not exist in the target table
    RefMissingForeignColumn,

    // Index synthesis (2xxx)
    /// An index was synthesized to cover a foreign key column set
    IndexSynthesized,

    // General warnings (9xxx)
    /// General informational message
    Info,

    /// General warning message
    Warning,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RefMissingTable => "REF_MISSING_TABLE",
            Self::RefMissingLocalColumn => "REF_MISSING_LOCAL_COLUMN",
            Self::RefMissingForeignColumn => "REF_MISSING_FOREIGN_COLUMN",
            Self::IndexSynthesized => "INDEX_SYNTHESIZED",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning - the schema resolved, but with incomplete linkage
    Warn,

    /// Error - blocking issue
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Where in the schema a diagnostic applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Table common name
    pub table: String,

    /// Constraint (foreign key or index) name, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,

    /// Column name, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
}

impl Location {
    /// Create a location pointing at a whole table
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            constraint: None,
            column: None,
        }
    }

    /// Create a location pointing at a constraint of a table
    pub fn constraint(table: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            constraint: Some(constraint.into()),
            column: None,
        }
    }

    /// Narrow the location to a single column
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.table)?;
        if let Some(constraint) = &self.constraint {
            write!(f, "[{}]", constraint)?;
        }
        if let Some(column) = &self.column {
            write!(f, ".{}", column)?;
        }
        Ok(())
    }
}

/// A diagnostic message with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Schema location (best-effort)
    pub location: Option<Location>,
}

impl Diagnostic {
    /// Create a new diagnostic with minimal fields
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            location: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_code_stability() {
        assert_eq!(DiagnosticCode::RefMissingTable.as_str(), "REF_MISSING_TABLE");
        assert_eq!(DiagnosticCode::RefMissingForeignColumn.as_str(), "REF_MISSING_FOREIGN_COLUMN");
        assert_eq!(DiagnosticCode::IndexSynthesized.as_str(), "INDEX_SYNTHESIZED");
    }

    #[test]
    fn location_display() {
        let loc = Location::constraint("book", "book_FK_1").with_column("author_id");
        assert_eq!(loc.to_string(), "book[book_FK_1].author_id");
        assert_eq!(Location::table("author").to_string(), "author");
    }

    #[test]
    fn diagnostic_serialization() {
        let diag = Diagnostic::new(
            DiagnosticCode::RefMissingTable,
            Severity::Warn,
            "Foreign key 'book_FK_1' references unknown table 'writer'",
        )
        .with_location(Location::constraint("book", "book_FK_1"));

        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("REF_MISSING_TABLE"));
        assert!(json.contains("warn"));
        assert!(!json.contains("\"column\""));
    }
}
