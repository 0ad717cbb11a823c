use std::fmt;

use serde::Serialize;

use crate::error::AnalysisError;

/// 11 useable-ace states (sum 1..=11) plus 23 plain states (sum 0..=22).
pub const NUM_STATES: usize = 34;
/// States reachable with exactly one card; the dealer up-card index.
pub const NUM_UPCARDS: usize = 10;
/// States reachable as two identical cards; the split-table row index.
pub const NUM_PAIRS: usize = 10;

/// All sums above 21 fold into this bucket: past 21 only bust matters.
pub const BUST_SUM: u8 = 22;

/// A simple hand state: the running sum counting every ace as 1, plus a flag
/// for whether one ace can currently be counted as 11 without busting.
///
/// This pair is the minimal sufficient statistic for future play. The flag
/// can only be set while the sum is at most 11; the displayed score is
/// `sum + 10 * ace`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct HandState {
    sum: u8,
    useable_ace: bool,
}

impl HandState {
    /// Construct a state, rejecting (sum, ace) pairs outside the 34 legal states.
    pub fn new(sum: u8, useable_ace: bool) -> Result<Self, AnalysisError> {
        let legal = if useable_ace {
            (1..=11).contains(&sum)
        } else {
            sum <= BUST_SUM
        };
        if !legal {
            return Err(AnalysisError::InvalidState {
                sum,
                ace: useable_ace,
            });
        }
        Ok(Self { sum, useable_ace })
    }

    pub(crate) fn new_unchecked(sum: u8, useable_ace: bool) -> Self {
        debug_assert!(Self::new(sum, useable_ace).is_ok());
        Self { sum, useable_ace }
    }

    /// Decode a `"sum,aceFlag"` key, e.g. `"16,0"` or `"2,1"`.
    pub fn decode(key: &str) -> Result<Self, AnalysisError> {
        let malformed = || AnalysisError::MalformedKey(key.to_string());
        let (sum_part, ace_part) = key.split_once(',').ok_or_else(malformed)?;
        let sum: u8 = sum_part.trim().parse().map_err(|_| malformed())?;
        let ace = match ace_part.trim() {
            "0" => false,
            "1" => true,
            _ => return Err(malformed()),
        };
        Self::new(sum, ace)
    }

    /// The canonical `"sum,aceFlag"` key for this state.
    pub fn key(&self) -> String {
        self.to_string()
    }

    pub fn sum(&self) -> u8 {
        self.sum
    }

    pub fn useable_ace(&self) -> bool {
        self.useable_ace
    }

    /// Displayed score: the sum with a useable ace counted as 11.
    pub fn score(&self) -> u8 {
        self.sum + if self.useable_ace { 10 } else { 0 }
    }

    pub fn is_bust(&self) -> bool {
        self.score() > 21
    }

    /// The state after drawing one card of the given rank. Sums past 21 fold
    /// into the bust bucket; an ace stays useable only while promoting it to
    /// 11 doesn't bust.
    pub fn with_card(&self, rank: u8) -> HandState {
        debug_assert!((1..=10).contains(&rank));
        let useable_ace = (rank == 1 || self.useable_ace) && self.sum + rank + 10 <= 21;
        HandState {
            sum: (self.sum + rank).min(BUST_SUM),
            useable_ace,
        }
    }

    /// Dense index into the 34-state tables.
    pub fn index(&self) -> usize {
        if self.useable_ace {
            (self.sum - 1) as usize
        } else {
            11 + self.sum as usize
        }
    }

    pub(crate) fn from_index(index: usize) -> HandState {
        debug_assert!(index < NUM_STATES);
        if index < 11 {
            HandState {
                sum: (index + 1) as u8,
                useable_ace: true,
            }
        } else {
            HandState {
                sum: (index - 11) as u8,
                useable_ace: false,
            }
        }
    }

    /// Every legal state, in dense index order.
    pub fn all() -> Vec<HandState> {
        (0..NUM_STATES).map(Self::from_index).collect()
    }

    /// Every legal state ordered by (sum, ace) descending.
    ///
    /// Hitting strictly increases the sum, so the one-card transition graph is
    /// a DAG in this order: visiting states this way guarantees every
    /// successor is already resolved. Every recursion over "final" values
    /// iterates in this order.
    pub fn descending() -> Vec<HandState> {
        let mut states = Self::all();
        states.sort_by(|a, b| {
            (b.sum, b.useable_ace).cmp(&(a.sum, a.useable_ace))
        });
        states
    }

    /// The 10 states reachable with exactly one card, in up-card column order:
    /// `"1,1"`, `"2,0"`, ..., `"10,0"`.
    pub fn single_card_states() -> [HandState; NUM_UPCARDS] {
        std::array::from_fn(|i| {
            let rank = (i + 1) as u8;
            HandState {
                sum: rank,
                useable_ace: rank == 1,
            }
        })
    }

    /// The single-card state for a rank (what the dealer shows).
    pub fn single_card(rank: u8) -> Result<HandState, AnalysisError> {
        if !(1..=10).contains(&rank) {
            return Err(AnalysisError::InvalidRank(rank));
        }
        Ok(HandState {
            sum: rank,
            useable_ace: rank == 1,
        })
    }

    /// Column index if this is a single-card state.
    pub fn upcard_index(&self) -> Option<usize> {
        match (self.sum, self.useable_ace) {
            (1, true) => Some(0),
            (s @ 2..=10, false) => Some((s - 1) as usize),
            _ => None,
        }
    }

    /// The 10 states reachable as two identical cards, in split-row order:
    /// `"2,1"` (two aces), `"4,0"`, ..., `"20,0"`.
    pub fn pair_states() -> [HandState; NUM_PAIRS] {
        std::array::from_fn(|i| {
            let rank = (i + 1) as u8;
            HandState {
                sum: 2 * rank,
                useable_ace: rank == 1,
            }
        })
    }

    /// Row index if this is a pair state.
    pub fn pair_index(&self) -> Option<usize> {
        match (self.sum, self.useable_ace) {
            (2, true) => Some(0),
            (s, false) if (4..=20).contains(&s) && s % 2 == 0 => Some((s / 2 - 1) as usize),
            _ => None,
        }
    }

    /// One of the two hands a pair state splits into, before its new card.
    pub(crate) fn half(&self) -> HandState {
        debug_assert!(self.pair_index().is_some());
        HandState {
            sum: self.sum / 2,
            useable_ace: self.useable_ace,
        }
    }
}

impl fmt::Display for HandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.sum, self.useable_ace as u8)
    }
}
