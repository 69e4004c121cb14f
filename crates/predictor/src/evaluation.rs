use crate::error::{PredictError, Result};
use crate::sparse_matrix::RatingMatrix;

/// Root-mean-square error between two matrices over identical keys
///
/// # Errors
///
/// Both matrices must hold the same number of entries with the same `(row, col)`
/// at every position, and must not be empty.
pub fn rmse(predicted: &RatingMatrix, actual: &RatingMatrix) -> Result<f64> {
    let predicted = predicted.get_all();
    let actual = actual.get_all();

    if predicted.len() != actual.len() {
        return Err(PredictError::SizeMismatch {
            predicted: predicted.len(),
            actual: actual.len(),
        });
    }
    if predicted.is_empty() {
        return Err(PredictError::EmptyMatrix("evaluation matrix"));
    }

    let mut sum = 0.0;
    for (index, (p, a)) in predicted.iter().zip(actual).enumerate() {
        if (p.row, p.col) != (a.row, a.col) {
            return Err(PredictError::KeyMismatch {
                index,
                predicted: (p.row, p.col),
                actual: (a.row, a.col),
            });
        }
        sum += (p.value - a.value).powi(2);
    }

    Ok((sum / predicted.len() as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse_matrix::{Entry, SparseMatrix};

    fn matrix(entries: &[(usize, usize, f64)]) -> RatingMatrix {
        SparseMatrix::new(
            entries
                .iter()
                .map(|&(r, c, v)| Entry::new(r, c, v))
                .collect(),
        )
    }

    #[test]
    fn test_rmse_identical_is_zero() {
        let m = matrix(&[(1, 10, 5.0), (1, 20, 3.0), (2, 10, 4.0)]);
        assert_eq!(rmse(&m, &m).unwrap(), 0.0);
    }

    #[test]
    fn test_rmse_value() {
        let predicted = matrix(&[(1, 10, 50.0), (2, 20, 70.0)]);
        let actual = matrix(&[(1, 10, 40.0), (2, 20, 80.0)]);
        assert!((rmse(&predicted, &actual).unwrap() - 10.0).abs() < 1e-12);

        let predicted = matrix(&[(1, 1, 3.0), (1, 2, 0.0)]);
        let actual = matrix(&[(1, 1, 0.0), (1, 2, 4.0)]);
        assert!((rmse(&predicted, &actual).unwrap() - 12.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_rmse_size_mismatch() {
        let predicted = matrix(&[(1, 10, 5.0)]);
        let actual = matrix(&[(1, 10, 5.0), (1, 20, 3.0)]);
        assert!(matches!(
            rmse(&predicted, &actual),
            Err(PredictError::SizeMismatch {
                predicted: 1,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_rmse_key_mismatch() {
        let predicted = matrix(&[(1, 10, 5.0), (1, 30, 3.0)]);
        let actual = matrix(&[(1, 10, 5.0), (1, 20, 3.0)]);
        match rmse(&predicted, &actual) {
            Err(PredictError::KeyMismatch {
                index,
                predicted,
                actual,
            }) => {
                assert_eq!(index, 1);
                assert_eq!(predicted, (1, 30));
                assert_eq!(actual, (1, 20));
            }
            other => panic!("Expected KeyMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_rmse_empty() {
        let empty = SparseMatrix::empty();
        assert!(matches!(
            rmse(&empty, &empty),
            Err(PredictError::EmptyMatrix(_))
        ));
    }
}
