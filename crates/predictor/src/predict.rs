//! Neighborhood rating prediction with attribute fallback
//!
//! A rating is the user's baseline plus the similarity-weighted deviations of
//! neighbors who rated the item. When fewer than two neighbors contribute, the
//! item's attribute siblings are averaged instead, predicting any sibling the
//! user has not rated with a second, non-falling-back pass.

use crate::config::PredictorConfig;
use crate::error::{PredictError, Result};
use crate::progress::ProgressReporter;
use crate::similarity::{build_neighbor_map, NeighborMap};
use crate::sparse_matrix::{AttributeMatrix, Entry, RatingMatrix};
use crate::stats::Statistics;
use serde::Serialize;
use tracing::info;

/// Lowest valid rating
pub const RATING_MIN: f64 = 0.0;
/// Highest valid rating
pub const RATING_MAX: f64 = 100.0;

/// Switches for the attribute fallback
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeatureFlags {
    use_attribute: bool,
    use_weight: bool,
}

impl FeatureFlags {
    /// `use_weight` only applies to the attribute fallback and requires `use_attribute`
    pub fn new(use_attribute: bool, use_weight: bool) -> Result<Self> {
        if use_weight && !use_attribute {
            return Err(PredictError::InvalidFlags(
                "use-weight requires use-attribute".to_string(),
            ));
        }
        Ok(Self {
            use_attribute,
            use_weight,
        })
    }

    pub fn use_attribute(&self) -> bool {
        self.use_attribute
    }

    pub fn use_weight(&self) -> bool {
        self.use_weight
    }
}

/// Item -> attributes plus the reverse attribute -> items lookup
#[derive(Debug, Clone)]
pub struct AttributeIndex<'a> {
    by_item: &'a AttributeMatrix,
    by_attribute: AttributeMatrix,
}

impl<'a> AttributeIndex<'a> {
    pub fn new(by_item: &'a AttributeMatrix) -> Self {
        Self {
            by_item,
            by_attribute: by_item.transpose(),
        }
    }

    /// For each attribute of `item`, every item carrying it (`item` included)
    pub fn groups(&self, item: usize) -> impl Iterator<Item = &[Entry<u8>]> + '_ {
        self.by_item
            .get_row(item)
            .iter()
            .map(move |attr| self.by_attribute.get_row(attr.col))
    }
}

/// Answers rating queries against a trained neighborhood
pub struct Predictor<'a> {
    ratings: &'a RatingMatrix,
    stats: &'a Statistics,
    neighbors: &'a NeighborMap,
    attributes: &'a AttributeIndex<'a>,
    flags: FeatureFlags,
}

impl<'a> Predictor<'a> {
    pub fn new(
        ratings: &'a RatingMatrix,
        stats: &'a Statistics,
        neighbors: &'a NeighborMap,
        attributes: &'a AttributeIndex<'a>,
        flags: FeatureFlags,
    ) -> Self {
        Self {
            ratings,
            stats,
            neighbors,
            attributes,
            flags,
        }
    }

    /// Predict `user`'s rating of `item`, clamped to `[RATING_MIN, RATING_MAX]`
    ///
    /// Returns `None` only when neighbor evidence is insufficient and
    /// `allow_attribute_fallback` is false.
    pub fn predict_rating(
        &self,
        user: usize,
        item: usize,
        allow_attribute_fallback: bool,
    ) -> Option<f64> {
        let item_bias = self.stats.item_bias(item);
        let base = self.stats.global + self.stats.user_bias(user) + item_bias;

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        let mut count = 0usize;
        for neighbor in self.neighbors.get(user) {
            let Some(rating) = self.ratings.get(neighbor.id, item) else {
                continue;
            };
            let neighbor_base = self.stats.global + self.stats.user_bias(neighbor.id) + item_bias;
            numerator += neighbor.similarity * (rating - neighbor_base);
            denominator += neighbor.similarity.abs();
            count += 1;
        }

        let score = if denominator < f64::EPSILON || count <= 1 {
            if !allow_attribute_fallback {
                return None;
            }
            if self.flags.use_attribute() {
                self.attribute_score(user, item).unwrap_or(base)
            } else {
                base
            }
        } else {
            base + numerator / denominator
        };

        Some(score.clamp(RATING_MIN, RATING_MAX))
    }

    /// Top-level query: fallback allowed, so a score always exists
    pub fn predict(&self, user: usize, item: usize) -> f64 {
        self.predict_rating(user, item, true)
            .unwrap_or_else(|| self.stats.baseline(user, item).clamp(RATING_MIN, RATING_MAX))
    }

    /// Average of the user's scores for items sharing an attribute with `item`
    fn attribute_score(&self, user: usize, item: usize) -> Option<f64> {
        let mut numerator = 0.0;
        let mut denominator = 0.0;

        for group in self.attributes.groups(item) {
            let siblings = group.len().saturating_sub(1);
            if siblings == 0 {
                continue;
            }
            let weight = if self.flags.use_weight() {
                1.0 / siblings as f64
            } else {
                1.0
            };

            for entry in group.iter().filter(|e| e.col != item) {
                let sibling = entry.col;
                let score = self
                    .ratings
                    .get(user, sibling)
                    .or_else(|| self.predict_rating(user, sibling, false));
                if let Some(score) = score {
                    numerator += weight * score;
                    denominator += weight;
                }
            }
        }

        (denominator > f64::EPSILON).then(|| numerator / denominator)
    }
}

/// Predict every `(user, item)` of `query` from `train` using `k` neighbors
pub fn predict(
    train: &RatingMatrix,
    query: &RatingMatrix,
    item_attr: &AttributeMatrix,
    k: usize,
    flags: FeatureFlags,
) -> Result<RatingMatrix> {
    let config = PredictorConfig {
        neighbors: k,
        ..PredictorConfig::default()
    };
    predict_with_config(train, query, item_attr, flags, &config)
}

/// Same as [`predict`] with neighbor count and progress cadence from `config`
pub fn predict_with_config(
    train: &RatingMatrix,
    query: &RatingMatrix,
    item_attr: &AttributeMatrix,
    flags: FeatureFlags,
    config: &PredictorConfig,
) -> Result<RatingMatrix> {
    let items = train.transpose();
    let stats = Statistics::compute(train, &items)?;
    info!(
        users = stats.users.len(),
        items = stats.items.len(),
        ratings = train.len(),
        global_average = stats.global,
        "Statistics computed"
    );

    let neighbors = build_neighbor_map(
        train,
        config.neighbors,
        &stats.users,
        config.train_progress_interval,
    );
    let attributes = AttributeIndex::new(item_attr);
    let predictor = Predictor::new(train, &stats, &neighbors, &attributes, flags);

    info!(
        queries = query.len(),
        use_attribute = flags.use_attribute(),
        use_weight = flags.use_weight(),
        "Predicting ratings"
    );
    let mut progress =
        ProgressReporter::new("predict", query.len(), config.predict_progress_interval);
    let mut predictions = Vec::with_capacity(query.len());
    for entry in query.get_all() {
        let score = predictor.predict(entry.row, entry.col);
        predictions.push(Entry::new(entry.row, entry.col, score));
        progress.tick();
    }

    Ok(RatingMatrix::new(predictions))
}
