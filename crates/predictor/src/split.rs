//! Deterministic per-user train/test split for offline evaluation

use crate::sparse_matrix::{Entry, RatingMatrix};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Hold out `test_count` ratings of every user with more than `test_count` ratings
///
/// One offset is drawn from `seed`; for a user with `n` ratings the held-out
/// entries are the circular window of length `test_count` starting at
/// `offset % n`. Users with `n <= test_count` keep all ratings in train.
pub fn make_train_test(
    matrix: &RatingMatrix,
    test_count: usize,
    seed: u64,
) -> (RatingMatrix, RatingMatrix) {
    let offset: usize = StdRng::seed_from_u64(seed).gen();

    let mut train: Vec<Entry<f64>> = Vec::with_capacity(matrix.len());
    let mut test: Vec<Entry<f64>> = Vec::new();
    let mut skipped_users = 0usize;

    for (_, row) in matrix.rows() {
        let n = row.len();
        if n <= test_count {
            train.extend_from_slice(row);
            skipped_users += 1;
            continue;
        }

        let start = offset % n;
        for (i, entry) in row.iter().enumerate() {
            // distance from the window start, walking forward with wrap-around
            let distance = (i + n - start) % n;
            if distance < test_count {
                test.push(*entry);
            } else {
                train.push(*entry);
            }
        }
    }

    info!(
        train = train.len(),
        test = test.len(),
        skipped_users,
        test_count,
        "Split ratings"
    );

    (RatingMatrix::new(train), RatingMatrix::new(test))
}
