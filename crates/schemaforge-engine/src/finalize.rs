//! Per-table finalization
//!
//! Runs once every column and constraint of a table is attached:
//! behaviors, heavy indexing, constraint naming, then id method
//! normalization.

use crate::constraint_naming::{name_constraints, AssignedName};
use crate::index_synthesis::{SynthesisReason, SynthesizedIndex};
use schemaforge_core::{BehaviorRegistry, IdMethod, Index, NameStrategy, SchemaError, Table};

/// What finalization changed on a table
#[derive(Debug, Clone, Default)]
pub struct FinalizeOutcome {
    pub behaviors_applied: usize,
    pub heavy_indices: Vec<SynthesizedIndex>,
    pub names: Vec<AssignedName>,

    /// The id method was downgraded from `Native` to `None`
    pub id_method_normalized: bool,
}

/// Finalize one table
pub fn finalize_table(
    table: &mut Table,
    behaviors: &BehaviorRegistry,
    strategy: &dyn NameStrategy,
    max_identifier_length: usize,
) -> Result<FinalizeOutcome, SchemaError> {
    let mut outcome = FinalizeOutcome {
        behaviors_applied: behaviors.apply(table)?,
        ..FinalizeOutcome::default()
    };

    table.derive_external_names(strategy);

    if table.effective_heavy_indexing() {
        outcome.heavy_indices = heavy_indexing(table);
    }

    outcome.names = name_constraints(table, strategy, max_identifier_length);

    // heavy indices were unnamed until now
    for index in &mut outcome.heavy_indices {
        if let Some(named) = table
            .indices()
            .iter()
            .find(|i| i.column_names() == index.columns)
        {
            index.name = named.name.clone();
        }
    }

    outcome.id_method_normalized = normalize_id_method(table);

    Ok(outcome)
}

/// Index every proper suffix of a composite primary key
///
/// For a primary key `(a, b, c)` this adds `(b, c)` and `(c)`; the full key
/// is already served by the primary key itself. Suffixes that already have
/// an index with exactly those columns are skipped.
pub fn heavy_indexing(table: &mut Table) -> Vec<SynthesizedIndex> {
    let pk: Vec<String> = table
        .primary_key_names()
        .into_iter()
        .map(String::from)
        .collect();

    let mut added = Vec::new();
    for start in 1..pk.len() {
        let suffix = &pk[start..];
        let exists = table
            .indices()
            .iter()
            .any(|index| index.column_names() == suffix);
        if exists {
            continue;
        }

        table.add_index(Index::on(suffix.iter().cloned()));
        added.push(SynthesizedIndex {
            table: table.name.clone(),
            name: String::new(),
            columns: suffix.to_vec(),
            reason: SynthesisReason::HeavyIndexing,
        });
    }

    added
}

/// Downgrade `Native` to `None` when no column is auto-incremented
pub fn normalize_id_method(table: &mut Table) -> bool {
    if table.effective_id_method() == IdMethod::Native && !table.has_auto_increment_column() {
        tracing::debug!(table = %table.name, "no auto-increment column, id method set to none");
        table.id_method = Some(IdMethod::None);
        return true;
    }
    false
}
