//! SchemaForge Core
//!
//! In-memory relational schema model: the database arena, tables with their
//! column/constraint registries, uniqueness and index queries, and the
//! pluggable naming strategies and behaviors used while resolving a schema.
//! Never rename diagnostic codes - they are part of the public API.

pub mod behavior;
pub mod column;
pub mod config;
pub mod constraint;
pub mod database;
pub mod diagnostic;
pub mod error;
pub mod naming;
pub mod oracle;
pub mod platform;
pub mod report;
pub mod table;

pub use behavior::{BehaviorDecl, BehaviorParameters, BehaviorRegistry, SchemaBehavior, Timestampable};
pub use column::{Column, ColumnType};
pub use config::{Config, ConfigError, Defaults, IdMethod, StringFormat};
pub use constraint::{ColumnReference, ForeignKey, ForeignKeyAction, Index, IndexColumn};
pub use database::{CrossForeignKeys, Database, ForeignKeyId, TableId};
pub use diagnostic::{Diagnostic, DiagnosticCode, Location, Severity};
pub use error::SchemaError;
pub use naming::{ConstraintKind, ConstraintScope, DefaultNameStrategy, NameStrategy, NameStrategyRegistry, NamingMethod};
pub use platform::{NativeIdStrategy, Platform};
pub use report::{Report, ReportSummary, ReportVersion};
pub use table::{IdMethodParameter, Table};
