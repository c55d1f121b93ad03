//! Constraint naming engine
//!
//! Assigns generated names to every foreign key, index and unique constraint
//! left unnamed by the schema author. Numbers count positions within each
//! collection, so `FK` and `I` sequences are independent.

use schemaforge_core::{ConstraintKind, ConstraintScope, NameStrategy, Table};
use serde::Serialize;
use std::collections::HashSet;

/// A name generated by the naming pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignedName {
    pub kind: ConstraintKind,

    /// Position of the constraint within its collection (0-based)
    pub position: usize,

    pub name: String,
}

/// Name every unnamed constraint of `table`
///
/// `max_length` is the identifier length limit of the target platform.
/// Returns the names that were assigned, in collection order (foreign keys,
/// then indices, then unique constraints). Already named constraints are
/// left untouched, so running the pass twice assigns nothing the second time.
/// A generated name never repeats a name already used on the table.
pub fn name_constraints(
    table: &mut Table,
    strategy: &dyn NameStrategy,
    max_length: usize,
) -> Vec<AssignedName> {
    let table_name = table.name.clone();
    let mut assigned = Vec::new();

    let mut taken: HashSet<String> = table
        .foreign_keys()
        .iter()
        .map(|fk| fk.name.clone())
        .chain(table.indices().iter().map(|i| i.name.clone()))
        .chain(table.unices().iter().map(|u| u.name.clone()))
        .filter(|name| !name.is_empty())
        .collect();

    // numbering starts at the position; a number already used by an
    // author-declared name is skipped
    let mut generate = |kind: ConstraintKind, position: usize| {
        let mut number = position + 1;
        loop {
            let name = strategy.constraint_name(&ConstraintScope {
                table: &table_name,
                kind,
                number,
                max_length,
            });
            if taken.insert(name.clone()) {
                return name;
            }
            number += 1;
        }
    };

    for (position, fk) in table.foreign_keys_mut().iter_mut().enumerate() {
        if fk.is_unnamed() {
            fk.name = generate(ConstraintKind::ForeignKey, position);
            assigned.push(AssignedName {
                kind: ConstraintKind::ForeignKey,
                position,
                name: fk.name.clone(),
            });
        }
    }

    for (position, index) in table.indices_mut().iter_mut().enumerate() {
        if index.is_unnamed() {
            index.name = generate(ConstraintKind::Index, position);
            assigned.push(AssignedName {
                kind: ConstraintKind::Index,
                position,
                name: index.name.clone(),
            });
        }
    }

    for (position, unique) in table.unices_mut().iter_mut().enumerate() {
        if unique.is_unnamed() {
            unique.name = generate(ConstraintKind::Unique, position);
            assigned.push(AssignedName {
                kind: ConstraintKind::Unique,
                position,
                name: unique.name.clone(),
            });
        }
    }

    for name in &assigned {
        tracing::debug!(table = %table_name, kind = name.kind.tag(), name = %name.name, "assigned constraint name");
    }

    assigned
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemaforge_core::{Column, ColumnType, DefaultNameStrategy, ForeignKey, Index};

    fn table_with_constraints() -> Table {
        let mut table = Table::new("book");
        for name in ["id", "a", "b", "c", "author_id", "publisher_id"] {
            table.add_column(Column::new(name, ColumnType::Integer)).unwrap();
        }
        table.add_foreign_key(ForeignKey::new("author").reference("author_id", "id"));
        table.add_foreign_key(ForeignKey::new("publisher").reference("publisher_id", "id"));
        table.add_index(Index::on(["a", "b"]));
        table.add_index(Index::on(["a", "b", "c"]));
        table.add_unique(Index::on(["c"]));
        table
    }

    #[test]
    fn overlapping_unnamed_indices_get_sequential_names() {
        let mut table = table_with_constraints();
        name_constraints(&mut table, &DefaultNameStrategy, 64);

        let names: Vec<&str> = table.indices().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["book_I_1", "book_I_2"]);
    }

    #[test]
    fn sequences_are_per_collection() {
        let mut table = table_with_constraints();
        let assigned = name_constraints(&mut table, &DefaultNameStrategy, 64);

        let names: Vec<&str> = assigned.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["book_FK_1", "book_FK_2", "book_I_1", "book_I_2", "book_U_1"]
        );
    }

    #[test]
    fn no_empty_or_duplicate_names_after_naming() {
        let mut table = table_with_constraints();
        name_constraints(&mut table, &DefaultNameStrategy, 64);

        let mut seen = HashSet::new();
        for name in table
            .foreign_keys()
            .iter()
            .map(|fk| &fk.name)
            .chain(table.indices().iter().map(|i| &i.name))
            .chain(table.unices().iter().map(|u| &u.name))
        {
            assert!(!name.is_empty());
            assert!(seen.insert(name.clone()), "duplicate name {name}");
        }
    }

    #[test]
    fn author_names_are_kept_and_numbering_follows_position() {
        let mut table = table_with_constraints();
        table.foreign_keys_mut()[0].name = "fk_book_author".to_string();

        let assigned = name_constraints(&mut table, &DefaultNameStrategy, 64);

        assert_eq!(table.foreign_keys()[0].name, "fk_book_author");
        assert_eq!(table.foreign_keys()[1].name, "book_FK_2");
        assert_eq!(assigned.len(), 4);
    }

    #[test]
    fn generated_name_skips_author_declared_name() {
        let mut table = table_with_constraints();
        table.foreign_keys_mut()[0].name = "book_FK_2".to_string();
        table.indices_mut()[1].name = "book_I_1".to_string();

        name_constraints(&mut table, &DefaultNameStrategy, 64);

        let fks: Vec<&str> = table.foreign_keys().iter().map(|fk| fk.name.as_str()).collect();
        assert_eq!(fks, vec!["book_FK_2", "book_FK_3"]);
        let indices: Vec<&str> = table.indices().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(indices, vec!["book_I_2", "book_I_1"]);
    }

    #[test]
    fn second_run_assigns_nothing() {
        let mut table = table_with_constraints();
        name_constraints(&mut table, &DefaultNameStrategy, 64);
        assert!(name_constraints(&mut table, &DefaultNameStrategy, 64).is_empty());
    }
}
