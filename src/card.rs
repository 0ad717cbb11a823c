use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Number of rank classes: Ace, Two..Nine, plus a single ten-valued class.
pub const NUM_RANKS: usize = 10;

/// Cards of each rank in a full deck, by value index.
/// Index 0=Ace, 1=Two, ..., 8=Nine, 9=Ten/J/Q/K.
const SINGLE_DECK_COUNTS: [f64; NUM_RANKS] =
    [4.0, 4.0, 4.0, 4.0, 4.0, 4.0, 4.0, 4.0, 4.0, 16.0];

const SUM_TOLERANCE: f64 = 1e-6;

/// Probability of drawing each of the ten rank classes.
///
/// Ranks are 1..=10 where 1 is the ace and 10 stands for any ten-valued
/// card. The distribution is fixed at construction; every derived table is
/// recomputed from scratch for a different distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardDistribution {
    probs: [f64; NUM_RANKS],
}

impl CardDistribution {
    /// Build a distribution from explicit per-rank probabilities.
    /// Rejects negative mass and vectors that don't sum to 1.
    pub fn new(probs: [f64; NUM_RANKS]) -> Result<Self, AnalysisError> {
        for (i, &p) in probs.iter().enumerate() {
            if p < 0.0 {
                return Err(AnalysisError::NegativeProbability {
                    rank: (i + 1) as u8,
                    prob: p,
                });
            }
        }
        let sum: f64 = probs.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(AnalysisError::UnnormalizedDistribution { sum });
        }
        Ok(Self { probs })
    }

    /// Full single deck: 4 cards of each rank 1-9, 16 ten-valued cards.
    pub fn single_deck() -> Self {
        Self::from_counts(SINGLE_DECK_COUNTS)
    }

    /// Single deck with one card of the given rank removed (51 cards).
    /// The basis of effect-of-removal analysis.
    pub fn single_deck_less_one(rank: u8) -> Result<Self, AnalysisError> {
        if !(1..=10).contains(&rank) {
            return Err(AnalysisError::InvalidRank(rank));
        }
        let mut counts = SINGLE_DECK_COUNTS;
        counts[(rank - 1) as usize] -= 1.0;
        Ok(Self::from_counts(counts))
    }

    fn from_counts(counts: [f64; NUM_RANKS]) -> Self {
        let total: f64 = counts.iter().sum();
        Self {
            probs: counts.map(|c| c / total),
        }
    }

    /// Probability of drawing the given rank (1 = ace, 10 = any ten-valued card).
    pub fn prob(&self, rank: u8) -> f64 {
        debug_assert!((1..=10).contains(&rank));
        self.probs[(rank - 1) as usize]
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.probs
            .iter()
            .enumerate()
            .map(|(i, &p)| ((i + 1) as u8, p))
    }
}
