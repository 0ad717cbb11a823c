use serde_json::{json, Map, Value};

use crate::card::CardDistribution;
use crate::dealer::DealerOutcomes;
use crate::hand::{HandState, NUM_PAIRS, NUM_STATES, NUM_UPCARDS};
use crate::player::{self, Expectations};
use crate::strategy::{self, Strategy};
use crate::transition::TransitionMatrix;

/// Where the first two cards land: a natural, one of the ten pairs, or an
/// ordinary hand state. Derived by enumerating the 100 ordered two-card
/// draws under independent per-card probabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct HoleDistribution {
    /// P(two-card 21).
    pub natural: f64,
    /// Pair mass by pair-state row, naturals excluded.
    pub pairs: [f64; NUM_PAIRS],
    /// Remaining non-pair, non-natural mass by hand state.
    pub hands: [f64; NUM_STATES],
}

impl HoleDistribution {
    fn from_cards(cards: &CardDistribution) -> Self {
        let mut natural = 0.0;
        let mut pairs = [0.0; NUM_PAIRS];
        let mut hands = [0.0; NUM_STATES];
        for (c1, p1) in cards.iter() {
            for (c2, p2) in cards.iter() {
                let p = p1 * p2;
                let ace = c1 == 1 || c2 == 1;
                let sum = c1 + c2;
                // with an ace aboard the sum is at most 11, so the ace is
                // always useable on two cards
                if ace && sum == 11 {
                    natural += p;
                } else if c1 == c2 {
                    pairs[(c1 - 1) as usize] += p;
                } else {
                    hands[HandState::new_unchecked(sum, ace).index()] += p;
                }
            }
        }
        Self {
            natural,
            pairs,
            hands,
        }
    }

    pub fn keyed_json(&self) -> Value {
        let mut pair_map = Map::new();
        for (pi, pair) in HandState::pair_states().iter().enumerate() {
            pair_map.insert(pair.key(), Value::from(self.pairs[pi]));
        }
        let mut hand_map = Map::new();
        for state in HandState::all() {
            hand_map.insert(state.key(), Value::from(self.hands[state.index()]));
        }
        json!({
            "natural_prob": self.natural,
            "pair_probs": pair_map,
            "hand_probs": hand_map,
        })
    }
}

/// A fully computed analysis of one hand of blackjack under a fixed card
/// distribution.
///
/// Construction *is* computation: a value of this type only exists once every
/// table has been derived, so there is no partially-valid state to guard.
/// Re-analysis under a different distribution means building a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    cards: CardDistribution,
    transitions: TransitionMatrix,
    dealer: DealerOutcomes,
    values: Expectations,
    squared: Expectations,
    strategy: Strategy,
    hole: HoleDistribution,
    ev_by_upcard: [f64; NUM_UPCARDS],
    ev: f64,
    variance: f64,
}

impl Analysis {
    /// Compute the full analysis, deriving the basic strategy along the way.
    pub fn compute(cards: CardDistribution) -> Self {
        Self::run(cards, None)
    }

    /// Compute all value tables under `cards` while reading every decision
    /// from an existing strategy instead of re-deriving one. This is what
    /// effect-of-removal analysis wants: the player keeps playing the
    /// baseline strategy while the deck composition shifts under them.
    pub fn compute_with_strategy(cards: CardDistribution, strategy: &Strategy) -> Self {
        Self::run(cards, Some(strategy))
    }

    fn run(cards: CardDistribution, imported: Option<&Strategy>) -> Self {
        log::debug!("building transition matrix");
        let transitions = TransitionMatrix::build(&cards);

        log::debug!("solving dealer outcomes");
        let dealer = DealerOutcomes::solve(&cards, &transitions);

        log::debug!("computing player value tables");
        let hold = player::hold_values(&dealer, false);
        let hit = player::hit_values(&transitions, &hold);
        let hit_decisions = match imported {
            Some(s) => s.hit.clone(),
            None => strategy::derive_hit(&hit, &hold),
        };
        let optimal = player::policy_values(&transitions, &hold, &hit_decisions, -1.0);
        // doubling forces one card then stands, at twice the stake
        let double_down = hit.scaled(2.0);
        let double_decisions = match imported {
            Some(s) => s.double_down.clone(),
            None => strategy::derive_double(&double_down, &optimal),
        };
        let split = player::split_values(
            &transitions,
            &double_decisions,
            &hold,
            &double_down,
            &optimal,
        );
        let no_split = player::no_split_values(&double_decisions, &double_down, &optimal);
        let split_decisions = match imported {
            Some(s) => s.split.clone(),
            None => strategy::derive_split(&split, &no_split),
        };

        log::debug!("computing squared-outcome tables");
        let hold_sq = player::hold_values(&dealer, true);
        let hit_sq = player::hit_values(&transitions, &hold_sq);
        let optimal_sq = player::policy_values(&transitions, &hold_sq, &hit_decisions, 1.0);
        // E[(2X)^2] = 4 E[X^2]: the doubled outcome is a deterministic scaling
        let double_down_sq = hit_sq.scaled(4.0);
        let split_sq = player::split_values_squared(
            &transitions,
            &double_decisions,
            &hold,
            &hold_sq,
            &double_down,
            &double_down_sq,
            &optimal,
            &optimal_sq,
        );
        let no_split_sq =
            player::no_split_values(&double_decisions, &double_down_sq, &optimal_sq);

        let strategy = Strategy {
            hit: hit_decisions,
            double_down: double_decisions,
            split: split_decisions,
        };
        let values = Expectations {
            hold,
            hit,
            optimal,
            double_down,
            split,
            no_split,
        };
        let squared = Expectations {
            hold: hold_sq,
            hit: hit_sq,
            optimal: optimal_sq,
            double_down: double_down_sq,
            split: split_sq,
            no_split: no_split_sq,
        };

        log::debug!("aggregating game statistics");
        let hole = HoleDistribution::from_cards(&cards);
        let ev_by_upcard = upcard_values(&values, &strategy, &hole, &dealer, false);
        let ex2_by_upcard = upcard_values(&squared, &strategy, &hole, &dealer, true);

        // the dealer's up-card itself follows the unconditional distribution
        let mut ev = 0.0;
        let mut ex2 = 0.0;
        for u in 0..NUM_UPCARDS {
            let p = cards.prob((u + 1) as u8);
            ev += p * ev_by_upcard[u];
            ex2 += p * ex2_by_upcard[u];
        }
        let variance = ex2 - ev * ev;
        log::debug!("ev = {ev:+.6}, variance = {variance:.6}");

        Self {
            cards,
            transitions,
            dealer,
            values,
            squared,
            strategy,
            hole,
            ev_by_upcard,
            ev,
            variance,
        }
    }

    pub fn cards(&self) -> &CardDistribution {
        &self.cards
    }

    pub fn transitions(&self) -> &TransitionMatrix {
        &self.transitions
    }

    pub fn dealer(&self) -> &DealerOutcomes {
        &self.dealer
    }

    /// Expected-value tables.
    pub fn values(&self) -> &Expectations {
        &self.values
    }

    /// Expected-squared-outcome tables.
    pub fn squared_values(&self) -> &Expectations {
        &self.squared
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn hole(&self) -> &HoleDistribution {
        &self.hole
    }

    /// Expected value per unit bet conditioned on each dealer up-card.
    pub fn ev_by_upcard(&self) -> &[f64; NUM_UPCARDS] {
        &self.ev_by_upcard
    }

    /// Expected value of one hand per unit bet. Negative is the house edge.
    pub fn ev(&self) -> f64 {
        self.ev
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Every intermediate table, keyed by state strings, for audit/export.
    pub fn results_json(&self) -> Value {
        let mut card_probs = Map::new();
        for (rank, p) in self.cards.iter() {
            card_probs.insert(rank.to_string(), Value::from(p));
        }
        let mut evd = Map::new();
        for (u, up) in HandState::single_card_states().iter().enumerate() {
            evd.insert(up.key(), Value::from(self.ev_by_upcard[u]));
        }
        json!({
            "card_probs": card_probs,
            "hit_transition_matrix": self.transitions.keyed_json(),
            "dealer": self.dealer.keyed_json(),
            "hold_ev": self.values.hold.keyed_json(),
            "hit_ev": self.values.hit.keyed_json(),
            "policy_ev": self.values.optimal.keyed_json(),
            "double_ev": self.values.double_down.keyed_json(),
            "split_ev": self.values.split.keyed_json(),
            "no_split_ev": self.values.no_split.keyed_json(),
            "hold_ex2": self.squared.hold.keyed_json(),
            "hit_ex2": self.squared.hit.keyed_json(),
            "policy_ex2": self.squared.optimal.keyed_json(),
            "double_ex2": self.squared.double_down.keyed_json(),
            "split_ex2": self.squared.split.keyed_json(),
            "no_split_ex2": self.squared.no_split.keyed_json(),
            "hole": self.hole.keyed_json(),
            "strategy": self.strategy.keyed_json(),
            "ev_by_upcard": evd,
            "ev": self.ev,
            "variance": self.variance,
        })
    }
}

/// Per-up-card expected outcome of the whole game for one moment (plain or
/// squared): the natural payout, pair hands routed through the split
/// decision, other hands through the double decision, all conditioned on no
/// dealer natural and then mixed with the outright loss to one.
fn upcard_values(
    values: &Expectations,
    strategy: &Strategy,
    hole: &HoleDistribution,
    dealer: &DealerOutcomes,
    squared: bool,
) -> [f64; NUM_UPCARDS] {
    // a natural pays 3:2; against a dealer natural the player pushes with a
    // natural of their own and loses outright otherwise
    let natural_payoff = if squared { 1.5 * 1.5 } else { 1.5 };
    let vs_dealer_natural = if squared { 1.0 } else { -1.0 };

    let pair_states = HandState::pair_states();
    let mut out = [0.0; NUM_UPCARDS];
    for (u, cell) in out.iter_mut().enumerate() {
        let mut no_natural = natural_payoff * hole.natural;
        for (pi, _) in pair_states.iter().enumerate() {
            let v = if strategy.split.get(pi, u) {
                values.split.get(pi, u)
            } else {
                values.no_split.get(pi, u)
            };
            no_natural += hole.pairs[pi] * v;
        }
        for state in HandState::all() {
            let p = hole.hands[state.index()];
            if p == 0.0 {
                continue;
            }
            let v = if strategy.double_down.get(state, u) {
                values.double_down.get(state, u)
            } else {
                values.optimal.get(state, u)
            };
            no_natural += p * v;
        }
        let p_dealer_natural = dealer.natural_prob(u);
        *cell = p_dealer_natural * vs_dealer_natural * (1.0 - hole.natural)
            + (1.0 - p_dealer_natural) * no_natural;
    }
    out
}

#[cfg(test)]
mod tests;
