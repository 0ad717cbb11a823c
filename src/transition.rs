use serde_json::{Map, Value};

use crate::card::CardDistribution;
use crate::hand::{HandState, NUM_STATES};

/// One-card-draw stochastic matrix over the 34 hand states.
///
/// Cell `[from][to]` is the probability that hitting once from `from` lands
/// on `to`, under the distribution the matrix was built from. Each row sums
/// to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrix {
    rows: [[f64; NUM_STATES]; NUM_STATES],
}

impl TransitionMatrix {
    pub fn build(cards: &CardDistribution) -> Self {
        let mut rows = [[0.0; NUM_STATES]; NUM_STATES];
        for state in HandState::all() {
            for (rank, p) in cards.iter() {
                let next = state.with_card(rank);
                rows[state.index()][next.index()] += p;
            }
        }
        let tm = Self { rows };
        debug_assert!(tm.rows_stochastic(1e-9));
        tm
    }

    pub fn prob(&self, from: HandState, to: HandState) -> f64 {
        self.rows[from.index()][to.index()]
    }

    pub fn row(&self, from: HandState) -> &[f64; NUM_STATES] {
        &self.rows[from.index()]
    }

    /// States reachable in one hit, with their probabilities.
    pub(crate) fn successors(
        &self,
        from: HandState,
    ) -> impl Iterator<Item = (HandState, f64)> + '_ {
        self.rows[from.index()]
            .iter()
            .enumerate()
            .filter_map(|(j, &p)| (p > 0.0).then(|| (HandState::from_index(j), p)))
    }

    fn rows_stochastic(&self, tol: f64) -> bool {
        self.rows
            .iter()
            .all(|row| (row.iter().sum::<f64>() - 1.0).abs() <= tol)
    }

    /// Row- and column-keyed export form.
    pub fn keyed_json(&self) -> Value {
        let states = HandState::all();
        let mut rows = Map::new();
        for from in &states {
            let mut cols = Map::new();
            for to in &states {
                cols.insert(to.key(), Value::from(self.prob(*from, *to)));
            }
            rows.insert(from.key(), Value::Object(cols));
        }
        Value::Object(rows)
    }
}
