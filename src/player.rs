use serde_json::{Map, Value};

use crate::dealer::DealerOutcomes;
use crate::hand::{HandState, NUM_PAIRS, NUM_STATES, NUM_UPCARDS};
use crate::strategy::DecisionTable;
use crate::transition::TransitionMatrix;

/// Expected values indexed by (player state, dealer up-card).
#[derive(Debug, Clone, PartialEq)]
pub struct StateTable {
    pub(crate) rows: [[f64; NUM_UPCARDS]; NUM_STATES],
}

impl StateTable {
    pub(crate) fn zeroed() -> Self {
        Self {
            rows: [[0.0; NUM_UPCARDS]; NUM_STATES],
        }
    }

    pub fn get(&self, state: HandState, upcard: usize) -> f64 {
        self.rows[state.index()][upcard]
    }

    pub(crate) fn scaled(&self, factor: f64) -> StateTable {
        let mut out = self.clone();
        for row in out.rows.iter_mut() {
            for v in row.iter_mut() {
                *v *= factor;
            }
        }
        out
    }

    pub fn keyed_json(&self) -> Value {
        keyed_rows(HandState::all().iter(), &self.rows)
    }
}

/// Expected values indexed by (pair state, dealer up-card).
#[derive(Debug, Clone, PartialEq)]
pub struct PairTable {
    pub(crate) rows: [[f64; NUM_UPCARDS]; NUM_PAIRS],
}

impl PairTable {
    pub(crate) fn zeroed() -> Self {
        Self {
            rows: [[0.0; NUM_UPCARDS]; NUM_PAIRS],
        }
    }

    pub fn get(&self, pair: usize, upcard: usize) -> f64 {
        self.rows[pair][upcard]
    }

    pub fn keyed_json(&self) -> Value {
        keyed_rows(HandState::pair_states().iter(), &self.rows)
    }
}

fn keyed_rows<'a>(
    states: impl Iterator<Item = &'a HandState>,
    rows: &[[f64; NUM_UPCARDS]],
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

/// The full family of value tables for one outcome moment.
///
/// `Analysis` carries two of these: one for plain expectations and one for
/// expected squared outcomes, so variance falls out of E[X^2] - E[X]^2
/// without a separate recursion.
#[derive(Debug, Clone, PartialEq)]
pub struct Expectations {
    /// Standing on the current hand.
    pub hold: StateTable,
    /// Hitting exactly once, then standing.
    pub hit: StateTable,
    /// Following the optimal hit/stand policy to the end.
    pub optimal: StateTable,
    /// Doubling down: twice the bet, one forced card, then stand.
    pub double_down: StateTable,
    /// Splitting a pair into two hands, each played out independently.
    pub split: PairTable,
    /// Playing the pair as a normal hand under the double/policy decisions.
    pub no_split: PairTable,
}

/// Value of standing pat, resolved against the dealer's non-natural terminal
/// distribution. Outcomes are +1/0/-1, so the squared variant is
/// P(win) + P(lose).
pub(crate) fn hold_values(dealer: &DealerOutcomes, squared: bool) -> StateTable {
    let mut table = StateTable::zeroed();
    for state in HandState::all() {
        let score = state.score();
        let row = &mut table.rows[state.index()];
        if score > 21 {
            // busting loses outright before the dealer even plays
            let v = if squared { 1.0 } else { -1.0 };
            *row = [v; NUM_UPCARDS];
            continue;
        }
        for (u, cell) in row.iter_mut().enumerate() {
            let p_dealer_bust = dealer.bust_prob(u);
            // no dealer terminal score is below 17, so only 18+ can outscore one
            let p_player_more = if score >= 18 {
                dealer.cumulative_through(u, score - 1)
            } else {
                0.0
            };
            // a dealer who doesn't bust always beats 16 or less
            let p_dealer_more = if score <= 16 {
                1.0 - p_dealer_bust
            } else {
                1.0 - p_dealer_bust - dealer.cumulative_through(u, score)
            };
            let p_win = p_dealer_bust + p_player_more;
            *cell = if squared {
                p_win + p_dealer_more
            } else {
                p_win - p_dealer_more
            };
        }
    }
    table
}

/// One-step lookahead: the hold value averaged over every one-card successor.
pub(crate) fn hit_values(transitions: &TransitionMatrix, hold: &StateTable) -> StateTable {
    let mut table = StateTable::zeroed();
    for state in HandState::all() {
        let i = state.index();
        for (next, p) in transitions.successors(state) {
            let next_row = &hold.rows[next.index()];
            for u in 0..NUM_UPCARDS {
                table.rows[i][u] += p * next_row[u];
            }
        }
    }
    table
}

/// Value of playing out the hit/stand policy, by DP in descending-sum order.
/// `bust_value` is -1 for plain expectations and +1 for squared.
pub(crate) fn policy_values(
    transitions: &TransitionMatrix,
    hold: &StateTable,
    hit_decisions: &DecisionTable,
    bust_value: f64,
) -> StateTable {
    let mut table = StateTable::zeroed();
    for state in HandState::descending() {
        let i = state.index();
        if state.is_bust() {
            table.rows[i] = [bust_value; NUM_UPCARDS];
            continue;
        }
        let mut row = [0.0; NUM_UPCARDS];
        for (u, cell) in row.iter_mut().enumerate() {
            if !hit_decisions.get(state, u) {
                *cell = hold.rows[i][u];
            }
        }
        // hitting columns average the already-resolved successor values
        for (next, p) in transitions.successors(state) {
            let next_row = table.rows[next.index()];
            for (u, cell) in row.iter_mut().enumerate() {
                if hit_decisions.get(state, u) {
                    *cell += p * next_row[u];
                }
            }
        }
        table.rows[i] = row;
    }
    table
}

/// Value of splitting: each half-hand takes one card, then follows the
/// double/policy decisions already derived for ordinary hands. Split aces
/// are dealt exactly one card and must stand. Both hands are doubled in.
pub(crate) fn split_values(
    transitions: &TransitionMatrix,
    double_decisions: &DecisionTable,
    hold: &StateTable,
    double_down: &StateTable,
    optimal: &StateTable,
) -> PairTable {
    let mut table = PairTable::zeroed();
    for (pi, pair) in HandState::pair_states().iter().enumerate() {
        let aces = pair.useable_ace();
        for (next, p) in transitions.successors(pair.half()) {
            let j = next.index();
            for u in 0..NUM_UPCARDS {
                let branch = if aces {
                    hold.rows[j][u]
                } else if double_decisions.get(next, u) {
                    double_down.rows[j][u]
                } else {
                    optimal.rows[j][u]
                };
                table.rows[pi][u] += 2.0 * p * branch;
            }
        }
    }
    table
}

/// Squared-outcome counterpart of [`split_values`].
///
/// The two post-split hands X and Y are i.i.d., so the squared total is
/// E[(X+Y)^2] = E[X^2 + 2XY + Y^2] = 2E[X^2] + 4E[X] per drawn card, not
/// 4E[X^2], which would treat the two hands as a single doubled hand.
#[allow(clippy::too_many_arguments)]
pub(crate) fn split_values_squared(
    transitions: &TransitionMatrix,
    double_decisions: &DecisionTable,
    hold: &StateTable,
    hold_sq: &StateTable,
    double_down: &StateTable,
    double_down_sq: &StateTable,
    optimal: &StateTable,
    optimal_sq: &StateTable,
) -> PairTable {
    let mut table = PairTable::zeroed();
    for (pi, pair) in HandState::pair_states().iter().enumerate() {
        let aces = pair.useable_ace();
        for (next, p) in transitions.successors(pair.half()) {
            let j = next.index();
            for u in 0..NUM_UPCARDS {
                let (plain, sq) = if aces {
                    (hold.rows[j][u], hold_sq.rows[j][u])
                } else if double_decisions.get(next, u) {
                    (double_down.rows[j][u], double_down_sq.rows[j][u])
                } else {
                    (optimal.rows[j][u], optimal_sq.rows[j][u])
                };
                table.rows[pi][u] += p * (2.0 * sq + 4.0 * plain);
            }
        }
    }
    table
}

/// Value of declining the split: play the pair as one hand, doubling where
/// the double decision says to, following the policy otherwise.
pub(crate) fn no_split_values(
    double_decisions: &DecisionTable,
    double_down: &StateTable,
    optimal: &StateTable,
) -> PairTable {
    let mut table = PairTable::zeroed();
    for (pi, pair) in HandState::pair_states().iter().enumerate() {
        let i = pair.index();
        for u in 0..NUM_UPCARDS {
            table.rows[pi][u] = if double_decisions.get(*pair, u) {
                double_down.rows[i][u]
            } else {
                optimal.rows[i][u]
            };
        }
    }
    table
}
