//! Cached rating averages
//!
//! Computed once per training matrix and passed by reference into the
//! similarity and prediction passes.

use crate::error::{PredictError, Result};
use crate::sparse_matrix::RatingMatrix;
use std::collections::BTreeMap;

/// Mean value of every populated row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowAverages {
    averages: BTreeMap<usize, f64>,
}

impl RowAverages {
    /// Average each row listed in `row_indexes()`; those rows are never empty
    pub fn by_row(matrix: &RatingMatrix) -> Self {
        let averages = matrix
            .rows()
            .map(|(row, entries)| {
                let sum: f64 = entries.iter().map(|e| e.value).sum();
                (row, sum / entries.len() as f64)
            })
            .collect();
        Self { averages }
    }

    pub fn get(&self, row: usize) -> Option<f64> {
        self.averages.get(&row).copied()
    }

    pub fn len(&self) -> usize {
        self.averages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.averages.is_empty()
    }
}

/// Mean of every value in the matrix
pub fn global_average(matrix: &RatingMatrix) -> Result<f64> {
    if matrix.is_empty() {
        return Err(PredictError::EmptyMatrix("ratings matrix"));
    }
    let sum: f64 = matrix.get_all().iter().map(|e| e.value).sum();
    Ok(sum / matrix.len() as f64)
}

/// Global, per-user and per-item averages of a training matrix
#[derive(Debug, Clone)]
pub struct Statistics {
    pub global: f64,
    pub users: RowAverages,
    pub items: RowAverages,
}

impl Statistics {
    /// `items` is averaged over the transpose of `ratings`
    pub fn compute(ratings: &RatingMatrix, items: &RatingMatrix) -> Result<Self> {
        Ok(Self {
            global: global_average(ratings)?,
            users: RowAverages::by_row(ratings),
            items: RowAverages::by_row(items),
        })
    }

    /// Deviation of a user's mean from the global mean, zero for unseen users
    pub fn user_bias(&self, user: usize) -> f64 {
        self.users.get(user).map_or(0.0, |avg| avg - self.global)
    }

    /// Deviation of an item's mean from the global mean, zero for unseen items
    pub fn item_bias(&self, item: usize) -> f64 {
        self.items.get(item).map_or(0.0, |avg| avg - self.global)
    }

    /// `global + (user_avg - global) + (item_avg - global)`
    ///
    /// An id missing from training counts as average, not as a zero mean, so an
    /// online query for an unseen user and item scores exactly `global`.
    pub fn baseline(&self, user: usize, item: usize) -> f64 {
        self.global + self.user_bias(user) + self.item_bias(item)
    }
}
