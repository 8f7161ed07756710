//! Write-units for the wide-column store.
//!
//! A [`Mutation`] collects the column writes for a single row. Putting a
//! second update for an already-written `(family, qualifier)` replaces the
//! earlier one in place, so each column is written at most once per
//! mutation.
//!
//! A [`MutationBatch`] accumulates mutations across many records before they
//! are handed to a [`CellWrite`](crate::CellWrite). Mutations for the same row
//! are merged with the same last-write-wins rule, rows keep their first-seen
//! order, and rows that end up without any column are discarded on
//! [`freeze`](MutationBatch::freeze).

use std::collections::HashMap;

use bytes::Bytes;

use crate::cell::ColumnUpdate;

type ColumnId = (Bytes, Bytes);

/// The set of column writes applied atomically for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    row: Bytes,
    updates: Vec<ColumnUpdate>,
    columns: HashMap<ColumnId, usize>,
}

impl Mutation {
    pub fn new(row: impl Into<Bytes>) -> Self {
        Self {
            row: row.into(),
            updates: Vec::new(),
            columns: HashMap::new(),
        }
    }

    pub fn row(&self) -> &Bytes {
        &self.row
    }

    /// Adds a column write, replacing any earlier write to the same
    /// `(family, qualifier)`.
    pub fn put(&mut self, update: ColumnUpdate) {
        let id = (update.family.clone(), update.qualifier.clone());
        match self.columns.get(&id) {
            Some(&index) => self.updates[index] = update,
            None => {
                self.columns.insert(id, self.updates.len());
                self.updates.push(update);
            }
        }
    }

    /// Column writes in first-put order.
    pub fn updates(&self) -> &[ColumnUpdate] {
        &self.updates
    }

    pub fn into_updates(self) -> Vec<ColumnUpdate> {
        self.updates
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn estimate_size(&self) -> usize {
        self.row.len()
            + self
                .updates
                .iter()
                .map(ColumnUpdate::estimate_size)
                .sum::<usize>()
    }

    /// Folds every update of `other` into this mutation.
    fn merge(&mut self, other: Mutation) {
        for update in other.updates {
            self.put(update);
        }
    }
}

/// Accumulates mutations by row until they are frozen for writing.
#[derive(Debug, Clone, Default)]
pub struct MutationBatch {
    mutations: Vec<Mutation>,
    rows: HashMap<Bytes, usize>,
}

impl MutationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a mutation to the batch, merging it into any pending mutation
    /// for the same row.
    pub fn apply(&mut self, mutation: Mutation) {
        match self.rows.get(mutation.row()) {
            Some(&index) => self.mutations[index].merge(mutation),
            None => {
                self.rows.insert(mutation.row().clone(), self.mutations.len());
                self.mutations.push(mutation);
            }
        }
    }

    /// Number of distinct rows in the batch.
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Estimate the size of the batch in bytes.
    pub fn estimate_size(&self) -> usize {
        self.mutations.iter().map(Mutation::estimate_size).sum()
    }

    /// Freezes the batch into the mutations to hand to a writer, dropping any
    /// row without column writes.
    pub fn freeze(self) -> Vec<Mutation> {
        self.mutations
            .into_iter()
            .filter(|mutation| !mutation.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mutation(row: &str, columns: &[(&str, &str, &str)]) -> Mutation {
        let mut mutation = Mutation::new(row.to_string());
        for (family, qualifier, value) in columns {
            mutation.put(ColumnUpdate::new(
                family.to_string(),
                qualifier.to_string(),
                value.to_string(),
            ));
        }
        mutation
    }

    #[test]
    fn should_overwrite_same_column_within_mutation() {
        // given
        let mut mutation = mutation("row", &[("cf", "cq", "v1"), ("cf", "other", "v2")]);

        // when
        mutation.put(ColumnUpdate::new("cf", "cq", "v3"));

        // then
        assert_eq!(mutation.len(), 2);
        assert_eq!(mutation.updates()[0].value, Bytes::from("v3"));
        assert_eq!(mutation.updates()[1].value, Bytes::from("v2"));
    }

    #[test]
    fn should_treat_family_and_qualifier_as_distinct_columns() {
        // given
        let mutation = mutation("row", &[("a", "b", "v1"), ("ab", "", "v2"), ("", "ab", "v3")]);

        // then
        assert_eq!(mutation.len(), 3);
    }

    #[test]
    fn should_merge_mutations_for_same_row() {
        // given
        let mut batch = MutationBatch::new();

        // when
        batch.apply(mutation("row1", &[("cf", "a", "1")]));
        batch.apply(mutation("row2", &[("cf", "a", "2")]));
        batch.apply(mutation("row1", &[("cf", "a", "3"), ("cf", "b", "4")]));

        // then
        let frozen = batch.freeze();
        assert_eq!(frozen.len(), 2);
        assert_eq!(frozen[0].row(), &Bytes::from("row1"));
        assert_eq!(frozen[0].len(), 2);
        assert_eq!(frozen[0].updates()[0].value, Bytes::from("3"));
        assert_eq!(frozen[1].row(), &Bytes::from("row2"));
    }

    #[test]
    fn should_discard_empty_mutations_on_freeze() {
        // given
        let mut batch = MutationBatch::new();
        batch.apply(Mutation::new("empty"));
        batch.apply(mutation("row", &[("cf", "cq", "v")]));

        // when
        let frozen = batch.freeze();

        // then
        assert_eq!(frozen.len(), 1);
        assert_eq!(frozen[0].row(), &Bytes::from("row"));
    }

    #[test]
    fn should_estimate_size() {
        // given
        let mut batch = MutationBatch::new();
        batch.apply(mutation("k1", &[("cf", "cq", "value")]));

        // when
        let size = batch.estimate_size();

        // then - row + family + qualifier + value + timestamp
        assert_eq!(size, 2 + 2 + 2 + 5 + 8);
    }
}
