//! Two-phase schema resolution
//!
//! Phase one finalizes each table on its own (behaviors, heavy indexing,
//! naming, id method). Phase two needs every table to be known: it links
//! referrers, which in turn triggers index synthesis on platforms that need
//! it. Both phases are idempotent, so a schema can be resolved again after
//! more tables are added.

use crate::finalize::finalize_table;
use crate::index_synthesis::SynthesizedIndex;
use crate::referrers::{setup_referrers, ReferenceCheck};
use schemaforge_core::{
    BehaviorRegistry, Config, ConfigError, Database, DefaultNameStrategy, Diagnostic,
    DiagnosticCode, Location, NameStrategy, NameStrategyRegistry, Report, SchemaError, Severity,
};

/// Drives finalization and referrer linkage over a whole database
#[derive(Debug)]
pub struct SchemaResolver {
    strategy: Box<dyn NameStrategy>,
    behaviors: BehaviorRegistry,
    check: ReferenceCheck,
}

impl SchemaResolver {
    /// Resolver with the default naming strategy, built-in behaviors and
    /// tolerant reference checking
    pub fn new() -> Self {
        Self {
            strategy: Box::new(DefaultNameStrategy),
            behaviors: BehaviorRegistry::new(),
            check: ReferenceCheck::Tolerant,
        }
    }

    /// Resolver configured from `config`, using the built-in registries
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::from_registries(config, &NameStrategyRegistry::new(), BehaviorRegistry::new())
    }

    /// Resolver configured from `config`, resolving the naming strategy in `strategies`
    pub fn from_registries(
        config: &Config,
        strategies: &NameStrategyRegistry,
        behaviors: BehaviorRegistry,
    ) -> Result<Self, ConfigError> {
        let strategy = strategies.create(&config.naming_strategy).ok_or_else(|| {
            ConfigError::UnknownNamingStrategy {
                name: config.naming_strategy.clone(),
                available: strategies.keys().join(", "),
            }
        })?;

        Ok(Self {
            strategy,
            behaviors,
            check: ReferenceCheck::from_strict(config.strict_references),
        })
    }

    /// Set how dangling references are handled
    pub fn with_reference_check(mut self, check: ReferenceCheck) -> Self {
        self.check = check;
        self
    }

    /// Replace the naming strategy
    pub fn with_name_strategy(mut self, strategy: Box<dyn NameStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Replace the behavior registry
    pub fn with_behaviors(mut self, behaviors: BehaviorRegistry) -> Self {
        self.behaviors = behaviors;
        self
    }

    pub fn reference_check(&self) -> ReferenceCheck {
        self.check
    }

    /// Phase one: finalize every table
    pub fn finalize(&self, db: &mut Database, report: &mut Report) -> Result<(), SchemaError> {
        let max_length = db.platform.max_identifier_length();
        let ids: Vec<_> = db.table_ids().collect();

        for id in ids {
            let Some(table) = db.table_mut(id) else {
                continue;
            };

            let outcome = finalize_table(table, &self.behaviors, self.strategy.as_ref(), max_length)?;

            report.summary.tables_resolved += 1;
            report.summary.names_assigned += outcome.names.len();
            record_synthesized(report, &outcome.heavy_indices);
        }

        Ok(())
    }

    /// Phase two: link referrers of every table
    pub fn link(&self, db: &mut Database, report: &mut Report) -> Result<(), SchemaError> {
        let ids: Vec<_> = db.table_ids().collect();

        for id in ids {
            let outcome = setup_referrers(db, id, self.check)?;

            report.summary.foreign_keys_linked += outcome.foreign_keys;
            for diagnostic in outcome.diagnostics {
                report.add_diagnostic(diagnostic);
            }
            record_synthesized(report, &outcome.synthesized);
        }

        Ok(())
    }

    /// Run both phases and return the resolution report
    pub fn resolve(&self, db: &mut Database) -> Result<Report, SchemaError> {
        let mut report = Report::new();

        tracing::info!(
            database = %db.name,
            platform = %db.platform,
            tables = db.table_count(),
            strategy = self.strategy.name(),
            "resolving schema"
        );

        self.finalize(db, &mut report)?;
        self.link(db, &mut report)?;

        tracing::info!(
            database = %db.name,
            names_assigned = report.summary.names_assigned,
            foreign_keys = report.summary.foreign_keys_linked,
            indices_synthesized = report.summary.indices_synthesized,
            warnings = report.summary.warnings,
            "schema resolved"
        );

        Ok(report)
    }
}

impl Default for SchemaResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn record_synthesized(report: &mut Report, indices: &[SynthesizedIndex]) {
    for index in indices {
        report.summary.indices_synthesized += 1;
        report.add_diagnostic(
            Diagnostic::new(
                DiagnosticCode::IndexSynthesized,
                Severity::Info,
                format!(
                    "Added index '{}' on ({})",
                    index.name,
                    index.columns.join(", ")
                ),
            )
            .with_location(Location::constraint(&index.table, &index.name)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemaforge_core::Platform;

    #[test]
    fn unknown_naming_strategy_is_a_config_error() {
        let mut config = Config::default();
        config.naming_strategy = "legacy".to_string();

        let err = SchemaResolver::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownNamingStrategy { ref name, .. } if name == "legacy"));
        assert!(err.to_string().contains("default"));
    }

    #[test]
    fn strict_flag_comes_from_config() {
        let mut config = Config::default();
        config.strict_references = true;
        let resolver = SchemaResolver::from_config(&config).unwrap();
        assert_eq!(resolver.reference_check(), ReferenceCheck::Strict);
        assert_eq!(SchemaResolver::new().reference_check(), ReferenceCheck::Tolerant);
    }

    #[test]
    fn empty_database_resolves() {
        let mut db = Database::new("empty", Platform::Mysql);
        let report = SchemaResolver::new().resolve(&mut db).unwrap();
        assert_eq!(report.summary.tables_resolved, 0);
        assert!(!report.has_errors());
    }
}
