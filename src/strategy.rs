use serde_json::{json, Map, Value};

use crate::error::AnalysisError;
use crate::hand::{HandState, NUM_PAIRS, NUM_STATES, NUM_UPCARDS};
use crate::player::{PairTable, StateTable};

/// Tolerance for the hit/hold comparison. Near-ties go to hitting: when the
/// one-step values are indistinguishable, hitting keeps the option of hitting
/// again, so it is never strictly worse.
pub const HIT_EPSILON: f64 = 1e-9;

/// Boolean decisions indexed by (player state, dealer up-card).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionTable {
    rows: [[bool; NUM_UPCARDS]; NUM_STATES],
}

impl DecisionTable {
    pub fn get(&self, state: HandState, upcard: usize) -> bool {
        self.rows[state.index()][upcard]
    }

    pub fn keyed_json(&self) -> Value {
        keyed_bool_rows(HandState::all().iter(), &self.rows)
    }
}

/// Boolean decisions indexed by (pair state, dealer up-card).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairDecisionTable {
    rows: [[bool; NUM_UPCARDS]; NUM_PAIRS],
}

impl PairDecisionTable {
    pub fn get(&self, pair: usize, upcard: usize) -> bool {
        self.rows[pair][upcard]
    }

    pub fn keyed_json(&self) -> Value {
        keyed_bool_rows(HandState::pair_states().iter(), &self.rows)
    }
}

fn keyed_bool_rows<'a>(
    states: impl Iterator<Item = &'a HandState>,
    rows: &[[bool; NUM_UPCARDS]],
) -> Value {
    let upcards = HandState::single_card_states();
    let mut out = Map::new();
    for (state, row) in states.zip(rows.iter()) {
        let mut cols = Map::new();
        for (u, up) in upcards.iter().enumerate() {
            cols.insert(up.key(), Value::from(row[u]));
        }
        out.insert(state.key(), Value::Object(cols));
    }
    Value::Object(out)
}

/// The three basic-strategy decision tables.
///
/// A read-only oracle: the trainers look actions up by the `"sum,ace"` keys
/// of the player's hand and the dealer's up-card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strategy {
    pub hit: DecisionTable,
    pub double_down: DecisionTable,
    pub split: PairDecisionTable,
}

impl Strategy {
    /// Whether to hit rather than stand, by state keys.
    pub fn should_hit(&self, player: &str, upcard: &str) -> Result<bool, AnalysisError> {
        let state = HandState::decode(player)?;
        Ok(self.hit.get(state, decode_upcard(upcard)?))
    }

    /// Whether to double down, by state keys.
    pub fn should_double(&self, player: &str, upcard: &str) -> Result<bool, AnalysisError> {
        let state = HandState::decode(player)?;
        Ok(self.double_down.get(state, decode_upcard(upcard)?))
    }

    /// Whether to split the pair, by state keys. The player key must be one of
    /// the ten pair states.
    pub fn should_split(&self, pair: &str, upcard: &str) -> Result<bool, AnalysisError> {
        let state = HandState::decode(pair)?;
        let pi = state
            .pair_index()
            .ok_or_else(|| AnalysisError::NotAPair(pair.to_string()))?;
        Ok(self.split.get(pi, decode_upcard(upcard)?))
    }

    pub fn keyed_json(&self) -> Value {
        json!({
            "hit_matrix": self.hit.keyed_json(),
            "dd_matrix": self.double_down.keyed_json(),
            "split_matrix": self.split.keyed_json(),
        })
    }
}

fn decode_upcard(key: &str) -> Result<usize, AnalysisError> {
    HandState::decode(key)?
        .upcard_index()
        .ok_or_else(|| AnalysisError::NotAnUpcard(key.to_string()))
}

/// Hit when hitting once is at least as good as holding, within tolerance.
pub(crate) fn derive_hit(hit: &StateTable, hold: &StateTable) -> DecisionTable {
    let mut rows = [[false; NUM_UPCARDS]; NUM_STATES];
    for i in 0..NUM_STATES {
        for u in 0..NUM_UPCARDS {
            rows[i][u] = hit.rows[i][u] >= hold.rows[i][u] - HIT_EPSILON;
        }
    }
    DecisionTable { rows }
}

/// Double only when strictly better than following the hit/stand policy.
pub(crate) fn derive_double(double_down: &StateTable, optimal: &StateTable) -> DecisionTable {
    let mut rows = [[false; NUM_UPCARDS]; NUM_STATES];
    for i in 0..NUM_STATES {
        for u in 0..NUM_UPCARDS {
            rows[i][u] = double_down.rows[i][u] > optimal.rows[i][u];
        }
    }
    DecisionTable { rows }
}

/// Split only when strictly better than playing the pair as one hand.
pub(crate) fn derive_split(split: &PairTable, no_split: &PairTable) -> PairDecisionTable {
    let mut rows = [[false; NUM_UPCARDS]; NUM_PAIRS];
    for pi in 0..NUM_PAIRS {
        for u in 0..NUM_UPCARDS {
            rows[pi][u] = split.rows[pi][u] > no_split.rows[pi][u];
        }
    }
    PairDecisionTable { rows }
}
