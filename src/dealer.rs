use serde_json::{json, Map, Value};

use crate::card::CardDistribution;
use crate::hand::{HandState, NUM_STATES, NUM_UPCARDS};
use crate::transition::TransitionMatrix;

/// Terminal dealer buckets, in order: 17, 18, 19, 20, 21, bust.
pub const NUM_BUCKETS: usize = 6;
const BUCKET_BUST: usize = NUM_BUCKETS - 1;
const BUCKET_KEYS: [&str; NUM_BUCKETS] = ["17", "18", "19", "20", "21", "bust"];

type BucketRow = [f64; NUM_BUCKETS];

/// Where the dealer ends up from each up-card under the fixed house policy:
/// stand once the displayed score reaches 17, hit below.
///
/// Holds the full absorption matrix over hand states, the 6-bucket terminal
/// distribution per up-card, the closed-form natural probability per up-card,
/// and the terminal distribution conditioned on no natural along with its
/// cumulative form.
#[derive(Debug, Clone, PartialEq)]
pub struct DealerOutcomes {
    absorption: [[f64; NUM_STATES]; NUM_STATES],
    by_upcard: [BucketRow; NUM_UPCARDS],
    natural: [f64; NUM_UPCARDS],
    non_natural: [BucketRow; NUM_UPCARDS],
    cumulative: [BucketRow; NUM_UPCARDS],
}

impl DealerOutcomes {
    pub fn solve(cards: &CardDistribution, transitions: &TransitionMatrix) -> Self {
        let absorption = Self::absorption(transitions);
        let by_upcard = Self::fold_to_buckets(&absorption);

        // A dealer natural needs exactly ace + ten-valued card, so it has a
        // closed form per up-card rather than coming out of the DP.
        let mut natural = [0.0; NUM_UPCARDS];
        natural[0] = cards.prob(10); // ace showing, ten in the hole
        natural[NUM_UPCARDS - 1] = cards.prob(1); // ten showing, ace in the hole

        let mut non_natural = [[0.0; NUM_BUCKETS]; NUM_UPCARDS];
        let mut cumulative = [[0.0; NUM_BUCKETS]; NUM_UPCARDS];
        for u in 0..NUM_UPCARDS {
            let scale = 1.0 - natural[u];
            for b in 0..NUM_BUCKETS {
                let mass = if b == BUCKET_BUST - 1 {
                    // the plain-21 bucket includes naturals; take them out
                    by_upcard[u][b] - natural[u]
                } else {
                    by_upcard[u][b]
                };
                non_natural[u][b] = mass / scale;
            }
            let mut running = 0.0;
            for b in 0..NUM_BUCKETS {
                running += non_natural[u][b];
                cumulative[u][b] = running;
            }
            debug_assert!((cumulative[u][BUCKET_BUST] - 1.0).abs() < 1e-9);
        }

        Self {
            absorption,
            by_upcard,
            natural,
            non_natural,
            cumulative,
        }
    }

    /// Absorption DP: terminal-state distribution from every state.
    ///
    /// States scoring 17 or more are self-absorbing. Every other row is the
    /// probability-weighted sum of its one-hit successors' rows, which are
    /// already final because sums only go up and we visit in descending order.
    fn absorption(transitions: &TransitionMatrix) -> [[f64; NUM_STATES]; NUM_STATES] {
        let mut absorption = [[0.0; NUM_STATES]; NUM_STATES];
        for state in HandState::descending() {
            let i = state.index();
            if state.score() >= 17 {
                absorption[i][i] = 1.0;
                continue;
            }
            for (next, p) in transitions.successors(state) {
                let next_row = absorption[next.index()];
                for k in 0..NUM_STATES {
                    absorption[i][k] += p * next_row[k];
                }
            }
            debug_assert!(
                (absorption[i].iter().sum::<f64>() - 1.0).abs() < 1e-9,
                "absorption row {} not stochastic",
                state
            );
        }
        absorption
    }

    /// Restrict to the 10 single-card rows and fold terminal states into the
    /// 6 buckets. A displayed sum can be reached two ways, directly or as
    /// sum-10 with a useable ace; everything past 21 collapses into bust.
    fn fold_to_buckets(
        absorption: &[[f64; NUM_STATES]; NUM_STATES],
    ) -> [BucketRow; NUM_UPCARDS] {
        let mut by_upcard = [[0.0; NUM_BUCKETS]; NUM_UPCARDS];
        for (u, up) in HandState::single_card_states().iter().enumerate() {
            let row = &absorption[up.index()];
            for (b, score) in (17..=21u8).enumerate() {
                let plain = HandState::new_unchecked(score, false);
                let soft = HandState::new_unchecked(score - 10, true);
                by_upcard[u][b] = row[plain.index()] + row[soft.index()];
            }
            let bust = HandState::new_unchecked(22, false);
            by_upcard[u][BUCKET_BUST] = row[bust.index()];
            debug_assert!((by_upcard[u].iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
        by_upcard
    }

    /// P(dealer busts | up-card, no natural).
    pub fn bust_prob(&self, upcard: usize) -> f64 {
        self.non_natural[upcard][BUCKET_BUST]
    }

    /// P(dealer is dealt a natural | up-card).
    pub fn natural_prob(&self, upcard: usize) -> f64 {
        self.natural[upcard]
    }

    /// Unconditional terminal distribution over {17..21, bust}.
    pub fn outcome_probs(&self, upcard: usize) -> &BucketRow {
        &self.by_upcard[upcard]
    }

    /// Terminal distribution over {17..21, bust} given no natural.
    pub fn non_natural_probs(&self, upcard: usize) -> &BucketRow {
        &self.non_natural[upcard]
    }

    /// P(dealer's final score <= `score` and dealer doesn't bust | no natural),
    /// for scores 17..=21.
    pub fn cumulative_through(&self, upcard: usize, score: u8) -> f64 {
        debug_assert!((17..=21).contains(&score));
        self.cumulative[upcard][(score - 17) as usize]
    }

    pub fn keyed_json(&self) -> Value {
        json!({
            "absorption": self.absorption_json(),
            "by_upcard": Self::bucket_rows_json(&self.by_upcard),
            "natural": Self::upcard_keyed(self.natural.iter().map(|&p| Value::from(p))),
            "non_natural": Self::bucket_rows_json(&self.non_natural),
            "cumulative": Self::bucket_rows_json(&self.cumulative),
        })
    }

    fn absorption_json(&self) -> Value {
        let states = HandState::all();
        let mut rows = Map::new();
        for from in &states {
            let mut cols = Map::new();
            for to in &states {
                cols.insert(
                    to.key(),
                    Value::from(self.absorption[from.index()][to.index()]),
                );
            }
            rows.insert(from.key(), Value::Object(cols));
        }
        Value::Object(rows)
    }

    fn bucket_rows_json(rows: &[BucketRow; NUM_UPCARDS]) -> Value {
        Self::upcard_keyed(rows.iter().map(|row| {
            let mut cols = Map::new();
            for (b, key) in BUCKET_KEYS.iter().enumerate() {
                cols.insert((*key).to_string(), Value::from(row[b]));
            }
            Value::Object(cols)
        }))
    }

    fn upcard_keyed(values: impl Iterator<Item = Value>) -> Value {
        let mut map = Map::new();
        for (up, value) in HandState::single_card_states().iter().zip(values) {
            map.insert(up.key(), value);
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solved() -> DealerOutcomes {
        let cards = CardDistribution::single_deck();
        let tm = TransitionMatrix::build(&cards);
        DealerOutcomes::solve(&cards, &tm)
    }

    #[test]
    fn test_non_natural_rows_sum_to_one() {
        let dealer = solved();
        for u in 0..NUM_UPCARDS {
            let sum: f64 = dealer.non_natural_probs(u).iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "upcard {} sums to {}", u, sum);
        }
    }

    #[test]
    fn test_cumulative_monotone_and_ends_at_one() {
        let dealer = solved();
        for u in 0..NUM_UPCARDS {
            let mut prev = 0.0;
            for b in 0..NUM_BUCKETS {
                let c = dealer.cumulative[u][b];
                assert!(c >= prev - 1e-12, "upcard {} bucket {} decreases", u, b);
                prev = c;
            }
            assert!((prev - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_natural_probs_closed_form() {
        let dealer = solved();
        assert!((dealer.natural_prob(0) - 16.0 / 52.0).abs() < 1e-12);
        assert!((dealer.natural_prob(9) - 4.0 / 52.0).abs() < 1e-12);
        for u in 1..9 {
            assert_eq!(dealer.natural_prob(u), 0.0);
        }
    }

    #[test]
    fn test_seventeen_stands_pat() {
        let cards = CardDistribution::single_deck();
        let tm = TransitionMatrix::build(&cards);
        let dealer = DealerOutcomes::solve(&cards, &tm);
        // a dealer already on hard 17 never moves
        let s17 = HandState::decode("17,0").unwrap();
        assert!((dealer.absorption[s17.index()][s17.index()] - 1.0).abs() < 1e-12);
        // soft 17 also stands under the fixed policy
        let soft17 = HandState::decode("7,1").unwrap();
        assert!((dealer.absorption[soft17.index()][soft17.index()] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_small_upcards_bust_more() {
        let dealer = solved();
        // dealer 6 busts more often than dealer 10
        assert!(dealer.bust_prob(5) > dealer.bust_prob(9));
        // and more often than dealer ace
        assert!(dealer.bust_prob(5) > dealer.bust_prob(0));
    }

    #[test]
    fn test_natural_conditioning_renormalizes() {
        let dealer = solved();
        // conditioning on no natural removes 21-mass for an ace up-card
        let plain = dealer.outcome_probs(0);
        let nn = dealer.non_natural_probs(0);
        assert!(nn[4] < plain[4]);
        // and renormalizes the rest upward
        assert!(nn[0] > plain[0]);
    }
}
