//! Index synthesis for engines that need every foreign key side indexed
//!
//! MySQL refuses foreign keys whose local or referenced columns are not the
//! leftmost columns of some index. Before adding anything, a coverage map of
//! existing leftmost prefixes is built: an index on `(a, b, c)` also serves
//! `(a)` and `(a, b)`, but not `(b)` or `(c)`.

use schemaforge_core::{Database, Index, Table, TableId};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

/// Name under which the primary key is recorded in the coverage map
pub const PRIMARY_KEY_NAME: &str = "PRIMARY";

const COLUMN_DELIMITER: &str = ",";

/// Leftmost-prefix coverage of a table's index-like constructs
///
/// Keys are delimited column lists, so column order matters.
#[derive(Debug, Clone, Default)]
pub struct CoverageMap {
    covered: HashMap<String, Vec<String>>,
}

impl CoverageMap {
    /// Build the map from the primary key, indices and unique constraints of `table`
    pub fn for_table(table: &Table) -> Self {
        let mut map = Self::default();

        let pk = table.primary_key_names();
        if !pk.is_empty() {
            map.record(PRIMARY_KEY_NAME, &pk);
        }

        for index in table.indices().iter().chain(table.unices()) {
            map.record(&index.name, &index.column_names());
        }

        map
    }

    /// Record every leftmost prefix of `columns` as covered by `name`
    pub fn record<S: AsRef<str>>(&mut self, name: &str, columns: &[S]) {
        for len in 1..=columns.len() {
            self.covered
                .entry(column_key(&columns[..len]))
                .or_default()
                .push(name.to_string());
        }
    }

    /// Drop every prefix recorded for `name`
    pub fn forget(&mut self, name: &str) {
        self.covered.retain(|_, names| {
            names.retain(|n| n != name);
            !names.is_empty()
        });
    }

    /// Whether `columns` (in this order) is a leftmost prefix of some construct
    pub fn is_covered<S: AsRef<str>>(&self, columns: &[S]) -> bool {
        self.covered.contains_key(&column_key(columns))
    }

    /// Constructs covering `columns`
    pub fn covering<S: AsRef<str>>(&self, columns: &[S]) -> &[String] {
        self.covered
            .get(&column_key(columns))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn column_key<S: AsRef<str>>(columns: &[S]) -> String {
    columns
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(COLUMN_DELIMITER)
}

/// Why an index was synthesized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisReason {
    /// Columns referenced by a foreign key of another table
    Referenced,

    /// Local columns of one of the table's own foreign keys
    ForeignKey,

    /// Suffix of a composite primary key
    HeavyIndexing,
}

/// An index added by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesizedIndex {
    pub table: String,
    pub name: String,
    pub columns: Vec<String>,
    pub reason: SynthesisReason,
}

/// Derive the name of the index backing a foreign key's local columns
///
/// The last `FK_` of the constraint name becomes `FI_`; names without it
/// are prefixed with `FI_`.
pub fn foreign_key_index_name(foreign_key_name: &str) -> String {
    match foreign_key_name.rfind("FK_") {
        Some(pos) => {
            let mut name = foreign_key_name.to_string();
            name.replace_range(pos..pos + 3, "FI_");
            name
        }
        None => format!("FI_{foreign_key_name}"),
    }
}

/// A column list one side of a foreign key needs covered
#[derive(Debug, Clone)]
struct Requirement {
    foreign_key: String,
    columns: Vec<String>,
    reason: SynthesisReason,
}

/// Add the indices `table_id` needs so that every inbound and outbound
/// foreign key column set is covered
///
/// Never fails; foreign keys whose columns do not all resolve are skipped.
/// An existing index carrying a generated name is replaced; requirements it
/// used to cover are checked again.
pub fn synthesize_indices(db: &mut Database, table_id: TableId) -> Vec<SynthesizedIndex> {
    let Some(table) = db.table(table_id) else {
        return Vec::new();
    };

    // Referenced column lists of inbound foreign keys, resolved before
    // taking the table mutably.
    let inbound: Vec<Requirement> = table
        .referrers()
        .iter()
        .filter_map(|&fk_id| db.foreign_key(fk_id))
        .map(|fk| Requirement {
            foreign_key: fk.name.clone(),
            columns: fk.foreign_columns().into_iter().map(String::from).collect(),
            reason: SynthesisReason::Referenced,
        })
        .collect();

    let Some(table) = db.table_mut(table_id) else {
        return Vec::new();
    };

    let outbound = table.foreign_keys().iter().map(|fk| Requirement {
        foreign_key: fk.name.clone(),
        columns: fk.local_columns().into_iter().map(String::from).collect(),
        reason: SynthesisReason::ForeignKey,
    });

    let mut pending: VecDeque<Requirement> = inbound
        .into_iter()
        .chain(outbound)
        .filter(|req| !req.columns.is_empty() && req.columns.iter().all(|c| table.has_column(c)))
        .collect();

    let mut coverage = CoverageMap::for_table(table);
    let mut satisfied: Vec<Requirement> = Vec::new();
    let mut created: Vec<SynthesizedIndex> = Vec::new();
    let mut counter = 0;

    while let Some(req) = pending.pop_front() {
        if coverage.is_covered(&req.columns) {
            satisfied.push(req);
            continue;
        }

        let base = match req.reason {
            SynthesisReason::Referenced => {
                counter += 1;
                format!("I_referenced_{}_{counter}", req.foreign_key)
            }
            _ => foreign_key_index_name(&req.foreign_key),
        };
        let name = if created.iter().any(|index| index.name == base) {
            free_index_name(table, &base)
        } else {
            base
        };

        if let Ok(stale) = table.remove_index(&name) {
            tracing::debug!(
                table = %table.name,
                index = %name,
                columns = %stale.column_names().join(COLUMN_DELIMITER),
                "replacing stale index"
            );
            coverage.forget(&name);

            let (lost, kept): (Vec<_>, Vec<_>) = satisfied
                .into_iter()
                .partition(|r| !coverage.is_covered(&r.columns));
            satisfied = kept;
            for r in lost.into_iter().rev() {
                pending.push_front(r);
            }
        }

        create_index(table, &name, &req.columns);
        coverage.record(&name, &req.columns);
        created.push(SynthesizedIndex {
            table: table.name.clone(),
            name,
            columns: req.columns.clone(),
            reason: req.reason,
        });
        satisfied.push(req);
    }

    for index in &created {
        tracing::debug!(
            table = %index.table,
            index = %index.name,
            columns = %index.columns.join(COLUMN_DELIMITER),
            "synthesized index"
        );
    }

    created
}

/// First `<base>_<n>` (n >= 2) not used by any index of `table`
fn free_index_name(table: &Table, base: &str) -> String {
    (2..)
        .map(|n| format!("{base}_{n}"))
        .find(|name| !table.has_index(name))
        .unwrap_or_else(|| base.to_string())
}

fn create_index(table: &mut Table, name: &str, columns: &[String]) {
    let mut index = Index::on(columns.iter().cloned()).named(name);
    index.reset_columns_size();
    table.add_index(index);
}
