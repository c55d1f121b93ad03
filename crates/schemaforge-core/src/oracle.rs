//! Uniqueness and index queries
//!
//! Pure queries over an already resolved table, used by the index
//! synthesizer and by code emitters. They never fail; no match is `false`.

use crate::constraint::Index;
use crate::table::Table;

impl Table {
    /// Whether `columns` is guaranteed unique
    ///
    /// True for a single column flagged unique, a single-column primary key,
    /// the full primary key set, or the column set of a unique constraint.
    /// Order is irrelevant, size is not.
    pub fn is_unique<S: AsRef<str>>(&self, columns: &[S]) -> bool {
        if columns.is_empty() {
            return false;
        }

        if let [single] = columns {
            if let Some(column) = self.column(single.as_ref()) {
                if column.unique {
                    return true;
                }
                if column.primary_key && self.primary_key().len() == 1 {
                    return true;
                }
            }
        }

        let pk = self.primary_key_names();
        if pk.len() == columns.len() && pk.iter().all(|name| contains(columns, name)) {
            return true;
        }

        self.unices()
            .iter()
            .any(|unique| same_column_set(unique, columns))
    }

    /// Whether some declared index has exactly the columns in `columns`
    pub fn is_index<S: AsRef<str>>(&self, columns: &[S]) -> bool {
        if columns.is_empty() {
            return false;
        }

        self.indices()
            .iter()
            .any(|index| same_column_set(index, columns))
    }
}

fn contains<S: AsRef<str>>(columns: &[S], name: &str) -> bool {
    columns.iter().any(|c| c.as_ref() == name)
}

fn same_column_set<S: AsRef<str>>(index: &Index, columns: &[S]) -> bool {
    index.columns.len() == columns.len()
        && columns.iter().all(|c| index.has_column(c.as_ref()))
}
