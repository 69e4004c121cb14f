//! Row-major sparse matrix
//!
//! Entries are kept sorted by `(row, col)` so that point lookups and row slices
//! are binary searches over a single contiguous buffer. Matrices are immutable
//! once built; recombining them (transpose, train/test split) yields a new one.

use std::collections::BTreeSet;

/// A single `(row, col, value)` triple
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry<T> {
    pub row: usize,
    pub col: usize,
    pub value: T,
}

impl<T> Entry<T> {
    pub fn new(row: usize, col: usize, value: T) -> Self {
        Self { row, col, value }
    }

    fn key(&self) -> (usize, usize) {
        (self.row, self.col)
    }
}

/// Sparse matrix sorted by `(row, col)`
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix<T> {
    entries: Vec<Entry<T>>,
    rows: BTreeSet<usize>,
}

/// User -> item ratings
pub type RatingMatrix = SparseMatrix<f64>;

/// Item -> attribute presence flags
pub type AttributeMatrix = SparseMatrix<u8>;

impl<T: Copy> SparseMatrix<T> {
    /// Build a matrix from entries in any order
    ///
    /// Duplicate `(row, col)` pairs are not rejected; which one `get` returns is unspecified.
    pub fn new(mut entries: Vec<Entry<T>>) -> Self {
        entries.sort_by_key(Entry::key);
        let rows = entries.iter().map(|e| e.row).collect();
        Self { entries, rows }
    }

    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            rows: BTreeSet::new(),
        }
    }

    /// Value stored at `(row, col)`, or `None` when absent
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        self.entries
            .binary_search_by_key(&(row, col), Entry::key)
            .ok()
            .map(|idx| self.entries[idx].value)
    }

    /// All entries of `row`, ordered by column
    pub fn get_row(&self, row: usize) -> &[Entry<T>] {
        let lower = self.entries.partition_point(|e| e.row < row);
        let upper = lower + self.entries[lower..].partition_point(|e| e.row == row);
        &self.entries[lower..upper]
    }

    /// Every entry in `(row, col)` order
    pub fn get_all(&self) -> &[Entry<T>] {
        &self.entries
    }

    /// Distinct row ids, ascending
    pub fn row_indexes(&self) -> &BTreeSet<usize> {
        &self.rows
    }

    pub fn transpose(&self) -> Self {
        Self::new(
            self.entries
                .iter()
                .map(|e| Entry::new(e.col, e.row, e.value))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate rows as `(row_id, entries)` in ascending row order
    pub fn rows(&self) -> impl Iterator<Item = (usize, &[Entry<T>])> + '_ {
        self.rows.iter().map(move |&row| (row, self.get_row(row)))
    }
}

impl<T: Copy> Default for SparseMatrix<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Copy> FromIterator<Entry<T>> for SparseMatrix<T> {
    fn from_iter<I: IntoIterator<Item = Entry<T>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RatingMatrix {
        SparseMatrix::new(vec![
            Entry::new(3, 7, 10.0),
            Entry::new(1, 20, 3.0),
            Entry::new(3, 1, 50.0),
            Entry::new(1, 10, 5.0),
            Entry::new(2, 10, 4.0),
        ])
    }

    #[test]
    fn test_entries_sorted_after_construction() {
        let matrix = sample();
        let keys: Vec<_> = matrix.get_all().iter().map(|e| (e.row, e.col)).collect();
        assert_eq!(keys, vec![(1, 10), (1, 20), (2, 10), (3, 1), (3, 7)]);
    }

    #[test]
    fn test_row_indexes_match_entries() {
        let matrix = sample();
        let expected: BTreeSet<usize> = matrix.get_all().iter().map(|e| e.row).collect();
        assert_eq!(matrix.row_indexes(), &expected);
        assert_eq!(
            matrix.row_indexes().iter().copied().collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_get_present_and_absent() {
        let matrix = sample();
        assert_eq!(matrix.get(1, 20), Some(3.0));
        assert_eq!(matrix.get(3, 1), Some(50.0));
        assert_eq!(matrix.get(1, 7), None);
        assert_eq!(matrix.get(9, 10), None);
    }

    #[test]
    fn test_get_row() {
        let matrix = sample();
        let row = matrix.get_row(3);
        assert_eq!(row.len(), 2);
        assert_eq!(row[0], Entry::new(3, 1, 50.0));
        assert_eq!(row[1], Entry::new(3, 7, 10.0));

        assert!(matrix.get_row(0).is_empty());
        assert!(matrix.get_row(4).is_empty());
    }

    #[test]
    fn test_transpose() {
        let matrix = sample();
        let transposed = matrix.transpose();

        assert_eq!(transposed.len(), matrix.len());
        assert_eq!(transposed.get(10, 2), Some(4.0));
        assert_eq!(
            transposed.row_indexes().iter().copied().collect::<Vec<_>>(),
            vec![1, 7, 10, 20]
        );
        assert_eq!(transposed.get_row(10).len(), 2);
    }

    #[test]
    fn test_double_transpose_is_identity() {
        let matrix = sample();
        assert_eq!(matrix.transpose().transpose(), matrix);
    }

    #[test]
    fn test_empty_matrix() {
        let matrix: RatingMatrix = SparseMatrix::empty();
        assert!(matrix.is_empty());
        assert!(matrix.row_indexes().is_empty());
        assert!(matrix.get_row(1).is_empty());
        assert_eq!(matrix.get(1, 1), None);
        assert!(matrix.transpose().is_empty());
    }

    #[test]
    fn test_rows_iterator() {
        let matrix = sample();
        let sizes: Vec<_> = matrix.rows().map(|(row, e)| (row, e.len())).collect();
        assert_eq!(sizes, vec![(1, 2), (2, 1), (3, 2)]);
    }

    #[test]
    fn test_from_iterator() {
        let matrix: AttributeMatrix = vec![Entry::new(2, 5, 1u8), Entry::new(1, 5, 1u8)]
            .into_iter()
            .collect();
        assert_eq!(matrix.get_all()[0].row, 1);
        assert_eq!(matrix.get(2, 5), Some(1));
    }
}
