//! Referrer resolution
//!
//! Foreign keys are declared on the referencing side only. This pass
//! materializes the inverse edges: every referenced table and column learns
//! which foreign keys point at it. Edges are deduplicated by handle, so the
//! pass can be rerun as more tables join the schema.

use crate::index_synthesis::{synthesize_indices, SynthesizedIndex};
use schemaforge_core::{
    ColumnReference, Database, Diagnostic, DiagnosticCode, ForeignKeyId, Location, SchemaError,
    Severity, TableId,
};
use serde::{Deserialize, Serialize};

/// How dangling references are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceCheck {
    /// Skip the broken link and report a warning diagnostic
    #[default]
    Tolerant,

    /// Fail on the first broken link
    Strict,
}

impl ReferenceCheck {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Self::Strict
        } else {
            Self::Tolerant
        }
    }
}

/// Result of linking the foreign keys of one table
#[derive(Debug, Clone, Default)]
pub struct ReferrerOutcome {
    /// Foreign keys processed
    pub foreign_keys: usize,

    /// Referrer edges added (table and column edges); zero on a rerun
    pub edges_added: usize,

    /// Problems skipped in tolerant mode
    pub diagnostics: Vec<Diagnostic>,

    /// Indices synthesized on the owning or referenced tables
    pub synthesized: Vec<SynthesizedIndex>,
}

/// Link every foreign key of `table_id` to its target table and columns
///
/// When the platform requires synthesized indices, the index synthesizer
/// runs for the owning table and the referenced table after each key.
pub fn setup_referrers(
    db: &mut Database,
    table_id: TableId,
    check: ReferenceCheck,
) -> Result<ReferrerOutcome, SchemaError> {
    let mut outcome = ReferrerOutcome::default();

    let Some(table) = db.table(table_id) else {
        return Ok(outcome);
    };
    let table_name = table.name.clone();
    let fk_count = table.foreign_keys().len();

    for position in 0..fk_count {
        let fk_id = ForeignKeyId::new(table_id, position);
        let Some(fk) = db.foreign_key(fk_id) else {
            continue;
        };
        let fk_name = fk.name.clone();
        let foreign_table = fk.foreign_table.clone();
        let references: Vec<ColumnReference> = fk.references.clone();

        outcome.foreign_keys += 1;

        // target table
        let target_id = db.table_id(&foreign_table);
        match target_id.and_then(|id| db.table_mut(id)) {
            Some(target) => {
                if target.add_referrer(fk_id) {
                    outcome.edges_added += 1;
                }
            }
            None => {
                let err = SchemaError::DanglingForeignKey {
                    table: table_name.clone(),
                    foreign_key: fk_name.clone(),
                    foreign_table: foreign_table.clone(),
                };
                report(
                    check,
                    err,
                    DiagnosticCode::RefMissingTable,
                    Location::constraint(&table_name, &fk_name),
                    &mut outcome,
                )?;
            }
        }

        // local columns
        for reference in &references {
            let Some(table) = db.table_mut(table_id) else {
                break;
            };

            let is_pk = table.column(&reference.local).map(|c| c.primary_key);
            match is_pk {
                Some(true) => {
                    if !table.contains_foreign_pk() {
                        table.set_contains_foreign_pk();
                    }
                }
                Some(false) => {}
                None => {
                    let err = SchemaError::DanglingLocalColumn {
                        table: table_name.clone(),
                        foreign_key: fk_name.clone(),
                        column: reference.local.clone(),
                    };
                    report(
                        check,
                        err,
                        DiagnosticCode::RefMissingLocalColumn,
                        Location::constraint(&table_name, &fk_name).with_column(&reference.local),
                        &mut outcome,
                    )?;
                }
            }
        }

        // referenced columns
        if let Some(target_id) = target_id {
            for reference in &references {
                let Some(target) = db.table_mut(target_id) else {
                    break;
                };

                match target.column_mut(&reference.foreign) {
                    Some(column) => {
                        if column.add_referrer(fk_id) {
                            outcome.edges_added += 1;
                        }
                    }
                    None => {
                        let err = SchemaError::DanglingForeignColumn {
                            table: table_name.clone(),
                            foreign_key: fk_name.clone(),
                            foreign_table: foreign_table.clone(),
                            column: reference.foreign.clone(),
                        };
                        report(
                            check,
                            err,
                            DiagnosticCode::RefMissingForeignColumn,
                            Location::constraint(&foreign_table, &fk_name)
                                .with_column(&reference.foreign),
                            &mut outcome,
                        )?;
                    }
                }
            }
        }

        if db.platform.requires_synthesized_indices() {
            outcome.synthesized.extend(synthesize_indices(db, table_id));
            if let Some(target_id) = target_id.filter(|&id| id != table_id) {
                outcome.synthesized.extend(synthesize_indices(db, target_id));
            }
        }
    }

    tracing::debug!(
        table = %table_name,
        foreign_keys = outcome.foreign_keys,
        edges_added = outcome.edges_added,
        skipped = outcome.diagnostics.len(),
        "linked referrers"
    );

    Ok(outcome)
}

/// Fail in strict mode, record a warning otherwise
fn report(
    check: ReferenceCheck,
    err: SchemaError,
    code: DiagnosticCode,
    location: Location,
    outcome: &mut ReferrerOutcome,
) -> Result<(), SchemaError> {
    match check {
        ReferenceCheck::Strict => Err(err),
        ReferenceCheck::Tolerant => {
            tracing::warn!(location = %location, "{}", err);
            outcome
                .diagnostics
                .push(Diagnostic::new(code, Severity::Warn, err.to_string()).with_location(location));
            Ok(())
        }
    }
}
