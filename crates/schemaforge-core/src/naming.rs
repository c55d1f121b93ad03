//! Pluggable naming strategies
//!
//! A [`NameStrategy`] produces generated constraint names and external
//! (code-facing) column names. Strategies are registered under a string key
//! in a [`NameStrategyRegistry`] and picked once from configuration.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Separator used between the parts of generated names
pub const NAME_SEPARATOR: char = '_';

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]+").expect("valid regex"));

/// How external names are derived from column names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingMethod {
    /// `author_id` -> `AuthorId`
    Underscore,

    /// Strip non-alphanumerics, capitalize each segment: `author-ID` -> `AuthorId`
    Clean,

    /// Capitalize the first letter of each segment, keep the rest: `authorID` -> `AuthorID`
    PhpName,

    /// Use the column name as is
    NoChange,
}

impl Default for NamingMethod {
    fn default() -> Self {
        Self::Underscore
    }
}

impl NamingMethod {
    /// Apply the method to a schema name
    pub fn apply(&self, name: &str) -> String {
        match self {
            Self::Underscore => name
                .split(NAME_SEPARATOR)
                .map(|part| capitalize(&part.to_lowercase()))
                .collect(),
            Self::Clean => NON_ALPHANUMERIC
                .split(name)
                .map(|part| capitalize(&part.to_lowercase()))
                .collect(),
            Self::PhpName => NON_ALPHANUMERIC.split(name).map(capitalize).collect(),
            Self::NoChange => name.to_string(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Kind of constraint a generated name is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    ForeignKey,
    Index,
    Unique,
}

impl ConstraintKind {
    /// Type tag embedded in generated names
    pub fn tag(&self) -> &'static str {
        match self {
            Self::ForeignKey => "FK",
            Self::Index => "I",
            Self::Unique => "U",
        }
    }
}

/// Inputs for a generated constraint name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintScope<'a> {
    /// Common name of the owning table
    pub table: &'a str,

    /// Kind of constraint
    pub kind: ConstraintKind,

    /// 1-based position of the constraint within its collection
    pub number: usize,

    /// Identifier length limit of the target platform
    pub max_length: usize,
}

/// A naming strategy
///
/// Implementations must be deterministic: identical inputs yield identical names.
pub trait NameStrategy: std::fmt::Debug + Send + Sync {
    /// Registry key of this strategy
    fn name(&self) -> &'static str;

    /// Generate a constraint name, unique within the database for distinct scopes
    fn constraint_name(&self, scope: &ConstraintScope<'_>) -> String;

    /// Derive the external name of a column
    fn external_name(&self, column: &str, method: NamingMethod) -> String {
        method.apply(column)
    }
}

/// Built-in strategy: `<table>_<tag>_<number>`, truncated to the platform limit
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNameStrategy;

impl NameStrategy for DefaultNameStrategy {
    fn name(&self) -> &'static str {
        "default"
    }

    fn constraint_name(&self, scope: &ConstraintScope<'_>) -> String {
        let tag = scope.kind.tag();
        let number = scope.number.to_string();

        // two separators
        let max_body = scope
            .max_length
            .saturating_sub(tag.len() + number.len() + 2);

        // identifier limits count bytes
        let mut end = scope.table.len().min(max_body);
        while !scope.table.is_char_boundary(end) {
            end -= 1;
        }
        let body = &scope.table[..end];

        format!("{body}{NAME_SEPARATOR}{tag}{NAME_SEPARATOR}{number}")
    }
}

fn default_strategy() -> Box<dyn NameStrategy> {
    Box::new(DefaultNameStrategy)
}

/// Factory producing a fresh strategy instance
pub type NameStrategyFactory = fn() -> Box<dyn NameStrategy>;

/// String-keyed registry of naming strategies
#[derive(Debug, Clone)]
pub struct NameStrategyRegistry {
    factories: HashMap<String, NameStrategyFactory>,
}

impl NameStrategyRegistry {
    /// Create a registry holding the built-in strategies
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("default", default_strategy);
        registry
    }

    /// Register (or replace) a strategy factory
    pub fn register(&mut self, key: impl Into<String>, factory: NameStrategyFactory) {
        self.factories.insert(key.into(), factory);
    }

    /// Instantiate the strategy registered under `key`
    pub fn create(&self, key: &str) -> Option<Box<dyn NameStrategy>> {
        self.factories.get(key).map(|factory| factory())
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for NameStrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(table: &str, kind: ConstraintKind, number: usize, max_length: usize) -> ConstraintScope<'_> {
        ConstraintScope {
            table,
            kind,
            number,
            max_length,
        }
    }

    #[test]
    fn naming_methods() {
        assert_eq!(NamingMethod::Underscore.apply("author_id"), "AuthorId");
        assert_eq!(NamingMethod::Underscore.apply("BOOK_TITLE"), "BookTitle");
        assert_eq!(NamingMethod::Clean.apply("author-ID"), "AuthorId");
        assert_eq!(NamingMethod::PhpName.apply("authorID"), "AuthorID");
        assert_eq!(NamingMethod::PhpName.apply("book title"), "BookTitle");
        assert_eq!(NamingMethod::NoChange.apply("author_id"), "author_id");
    }

    #[test]
    fn default_constraint_names() {
        let strategy = DefaultNameStrategy;
        assert_eq!(strategy.constraint_name(&scope("book", ConstraintKind::ForeignKey, 1, 64)), "book_FK_1");
        assert_eq!(strategy.constraint_name(&scope("book", ConstraintKind::Index, 2, 64)), "book_I_2");
        assert_eq!(strategy.constraint_name(&scope("book", ConstraintKind::Unique, 10, 64)), "book_U_10");
    }

    #[test]
    fn constraint_names_fit_platform_limit() {
        let strategy = DefaultNameStrategy;
        let table = "a_really_long_table_name_for_oracle";
        let name = strategy.constraint_name(&scope(table, ConstraintKind::ForeignKey, 12, 30));
        assert_eq!(name.len(), 30);
        assert!(name.ends_with("_FK_12"));
    }

    #[test]
    fn truncation_respects_multibyte_table_names() {
        let strategy = DefaultNameStrategy;
        // five bytes left for the table part, 'é' is two bytes
        let name = strategy.constraint_name(&scope("ééé", ConstraintKind::ForeignKey, 1, 10));
        assert_eq!(name, "éé_FK_1");
        assert!(name.len() <= 10);

        let name = strategy.constraint_name(&scope("bücherei", ConstraintKind::Index, 1, 9));
        assert_eq!(name, "büch_I_1");
        assert!(name.len() <= 9);
    }

    #[test]
    fn registry_resolves_builtin() {
        let registry = NameStrategyRegistry::new();
        assert_eq!(registry.keys(), vec!["default"]);
        assert_eq!(registry.create("default").unwrap().name(), "default");
        assert!(registry.create("missing").is_none());
    }
}
