//! User-user similarity with top-K neighbor selection
//!
//! Every pair of rows is scored once with a Pearson correlation and offered to
//! both rows' bounded heaps, so each row ends up with its K most similar rows.

use crate::progress::ProgressReporter;
use crate::sparse_matrix::{Entry, RatingMatrix};
use crate::stats::RowAverages;
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap};
use tracing::{debug, info};

/// A similar row and its similarity score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: usize,
    pub similarity: f64,
}

/// Pearson correlation of two column-sorted rows
///
/// Shared columns feed the numerator. Every column of a row, shared or not,
/// feeds that row's own variance term in the denominator. Returns 0 when the
/// denominator vanishes.
pub fn pearson(row_x: &[Entry<f64>], avg_x: f64, row_y: &[Entry<f64>], avg_y: f64) -> f64 {
    let mut i = 0;
    let mut j = 0;
    let mut numerator = 0.0;
    let mut denominator_x = 0.0;
    let mut denominator_y = 0.0;

    while i < row_x.len() && j < row_y.len() {
        let dx = row_x[i].value - avg_x;
        let dy = row_y[j].value - avg_y;
        match row_x[i].col.cmp(&row_y[j].col) {
            Ordering::Less => {
                denominator_x += dx * dx;
                i += 1;
            }
            Ordering::Greater => {
                denominator_y += dy * dy;
                j += 1;
            }
            Ordering::Equal => {
                numerator += dx * dy;
                denominator_x += dx * dx;
                denominator_y += dy * dy;
                i += 1;
                j += 1;
            }
        }
    }
    denominator_x += row_x[i..]
        .iter()
        .map(|e| (e.value - avg_x).powi(2))
        .sum::<f64>();
    denominator_y += row_y[j..]
        .iter()
        .map(|e| (e.value - avg_y).powi(2))
        .sum::<f64>();

    let denominator = (denominator_x * denominator_y).sqrt();
    if denominator.abs() < f64::EPSILON {
        return 0.0;
    }
    numerator / denominator
}

/// Heap key: similarity first, id to keep ordering total
#[derive(Debug, Clone, Copy)]
struct Candidate(Neighbor);

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .similarity
            .total_cmp(&other.0.similarity)
            .then_with(|| other.0.id.cmp(&self.0.id))
    }
}

/// Bounded min-heap keeping the `capacity` highest-similarity candidates
#[derive(Debug, Clone)]
pub struct TopK {
    capacity: usize,
    heap: BinaryHeap<Reverse<Candidate>>,
}

impl TopK {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    /// Insert while below capacity, afterwards only if strictly better than the current minimum
    pub fn offer(&mut self, id: usize, similarity: f64) {
        let candidate = Candidate(Neighbor { id, similarity });
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(candidate));
            return;
        }
        if let Some(mut min) = self.heap.peek_mut() {
            if min.0 .0.similarity < similarity {
                *min = Reverse(candidate);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Retained neighbors, most similar first
    pub fn into_sorted_vec(self) -> Vec<Neighbor> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(Candidate(neighbor))| neighbor)
            .collect()
    }
}

/// Row id -> most similar rows, descending by similarity
#[derive(Debug, Clone, Default)]
pub struct NeighborMap {
    neighbors: BTreeMap<usize, Vec<Neighbor>>,
}

impl NeighborMap {
    /// Neighbors of `row`; empty for rows without any
    pub fn get(&self, row: usize) -> &[Neighbor] {
        self.neighbors.get(&row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of rows with an entry
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Neighbor])> + '_ {
        self.neighbors.iter().map(|(&row, n)| (row, n.as_slice()))
    }
}

/// Score every row pair of `matrix` and keep the top `k` neighbors per row
///
/// `averages` must hold the row means of `matrix`. A matrix with fewer than two
/// rows yields an empty map.
pub fn build_neighbor_map(
    matrix: &RatingMatrix,
    k: usize,
    averages: &RowAverages,
    progress_interval: usize,
) -> NeighborMap {
    let rows: Vec<(usize, &[Entry<f64>], f64)> = matrix
        .rows()
        .filter_map(|(row, entries)| averages.get(row).map(|avg| (row, entries, avg)))
        .collect();

    if rows.len() < 2 {
        debug!(rows = rows.len(), "Too few rows for similarity");
        return NeighborMap::default();
    }

    let pairs = rows.len() * (rows.len() - 1) / 2;
    info!(rows = rows.len(), pairs, k, "Computing user similarity");

    let mut heaps: Vec<TopK> = rows.iter().map(|_| TopK::new(k)).collect();
    let mut progress = ProgressReporter::new("train", pairs, progress_interval);

    for (a, &(x, row_x, avg_x)) in rows.iter().enumerate() {
        for (b, &(y, row_y, avg_y)) in rows.iter().enumerate().skip(a + 1) {
            let score = pearson(row_x, avg_x, row_y, avg_y);
            heaps[a].offer(y, score);
            heaps[b].offer(x, score);
            progress.tick();
        }
    }

    let neighbors = rows
        .iter()
        .zip(heaps)
        .map(|(&(row, _, _), heap)| (row, heap.into_sorted_vec()))
        .collect();

    NeighborMap { neighbors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse_matrix::SparseMatrix;

    fn row(entries: &[(usize, f64)]) -> Vec<Entry<f64>> {
        entries
            .iter()
            .map(|&(col, value)| Entry::new(0, col, value))
            .collect()
    }

    fn mean(entries: &[Entry<f64>]) -> f64 {
        entries.iter().map(|e| e.value).sum::<f64>() / entries.len() as f64
    }

    #[test]
    fn test_pearson_two_user_scenario() {
        // user 1 = {10: 5, 20: 3}, user 2 = {10: 4, 20: 4}: user 2 has no variance
        let x = row(&[(10, 5.0), (20, 3.0)]);
        let y = row(&[(10, 4.0), (20, 4.0)]);
        assert_eq!(pearson(&x, 4.0, &y, 4.0), 0.0);
    }

    #[test]
    fn test_pearson_perfect_correlation() {
        let x = row(&[(1, 1.0), (2, 2.0), (3, 3.0)]);
        let y = row(&[(1, 2.0), (2, 4.0), (3, 6.0)]);
        let score = pearson(&x, mean(&x), &y, mean(&y));
        assert!((score - 1.0).abs() < 1e-12);

        let z = row(&[(1, 3.0), (2, 2.0), (3, 1.0)]);
        let score = pearson(&x, mean(&x), &z, mean(&z));
        assert!((score + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_counts_full_row_variance() {
        // overlap is columns 1 and 2 only; column 3 still enters x's denominator
        let x = row(&[(1, 1.0), (2, 3.0), (3, 5.0)]);
        let y = row(&[(1, 2.0), (2, 4.0)]);
        let (avg_x, avg_y) = (3.0, 3.0);

        let numerator = (1.0 - 3.0) * (2.0 - 3.0) + (3.0 - 3.0) * (4.0 - 3.0);
        let denom_x: f64 = 4.0 + 0.0 + 4.0;
        let denom_y: f64 = 1.0 + 1.0;
        let expected = numerator / (denom_x * denom_y).sqrt();

        let score = pearson(&x, avg_x, &y, avg_y);
        assert!((score - expected).abs() < 1e-12);
        assert!((score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_is_symmetric() {
        let x = row(&[(1, 10.0), (4, 70.0), (5, 30.0), (9, 90.0)]);
        let y = row(&[(2, 50.0), (4, 20.0), (5, 60.0), (7, 10.0), (9, 100.0)]);
        let forward = pearson(&x, mean(&x), &y, mean(&y));
        let backward = pearson(&y, mean(&y), &x, mean(&x));
        assert!((forward - backward).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_disjoint_rows() {
        let x = row(&[(1, 10.0), (2, 20.0)]);
        let y = row(&[(3, 30.0), (4, 50.0)]);
        assert_eq!(pearson(&x, 15.0, &y, 40.0), 0.0);
    }

    #[test]
    fn test_top_k_keeps_best() {
        let mut top = TopK::new(3);
        for (id, score) in [(1, 0.1), (2, 0.9), (3, -0.5), (4, 0.4), (5, 0.95), (6, 0.2)] {
            top.offer(id, score);
        }
        assert_eq!(top.len(), 3);
        let ids: Vec<_> = top.into_sorted_vec().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![5, 2, 4]);
    }

    #[test]
    fn test_top_k_ignores_equal_to_minimum() {
        let mut top = TopK::new(1);
        top.offer(1, 0.5);
        top.offer(2, 0.5);
        assert_eq!(top.into_sorted_vec()[0].id, 1);
    }

    #[test]
    fn test_top_k_zero_capacity() {
        let mut top = TopK::new(0);
        top.offer(1, 1.0);
        assert!(top.is_empty());
    }

    fn ratings() -> RatingMatrix {
        SparseMatrix::new(vec![
            Entry::new(1, 1, 10.0),
            Entry::new(1, 2, 50.0),
            Entry::new(1, 3, 90.0),
            Entry::new(2, 1, 20.0),
            Entry::new(2, 2, 60.0),
            Entry::new(2, 3, 80.0),
            Entry::new(3, 1, 90.0),
            Entry::new(3, 2, 40.0),
            Entry::new(3, 3, 10.0),
            Entry::new(4, 1, 30.0),
            Entry::new(4, 3, 70.0),
        ])
    }

    #[test]
    fn test_neighbor_map_bounded_and_sorted() {
        let matrix = ratings();
        let averages = RowAverages::by_row(&matrix);
        let map = build_neighbor_map(&matrix, 2, &averages, 100);

        assert_eq!(map.len(), 4);
        for (row, neighbors) in map.iter() {
            assert!(neighbors.len() <= 2);
            assert!(neighbors.iter().all(|n| n.id != row));
            assert!(neighbors
                .windows(2)
                .all(|w| w[0].similarity >= w[1].similarity));
        }

        // user 3 rates opposite to everyone else
        assert!(map.get(1).iter().all(|n| n.id != 3));
    }

    #[test]
    fn test_neighbor_map_scores_are_symmetric() {
        let matrix = ratings();
        let averages = RowAverages::by_row(&matrix);
        let map = build_neighbor_map(&matrix, 10, &averages, 100);

        for (row, neighbors) in map.iter() {
            assert_eq!(neighbors.len(), 3);
            for n in neighbors {
                let back = map
                    .get(n.id)
                    .iter()
                    .find(|m| m.id == row)
                    .map(|m| m.similarity);
                assert_eq!(back, Some(n.similarity));
            }
        }
    }

    #[test]
    fn test_neighbor_map_single_row() {
        let matrix = SparseMatrix::new(vec![Entry::new(1, 1, 10.0), Entry::new(1, 2, 20.0)]);
        let averages = RowAverages::by_row(&matrix);
        let map = build_neighbor_map(&matrix, 5, &averages, 100);
        assert!(map.is_empty());
        assert!(map.get(1).is_empty());
    }
}
