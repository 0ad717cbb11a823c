use serde::Serialize;

use crate::analysis::Analysis;
use crate::card::{CardDistribution, NUM_RANKS};

/// How much removing one card of each rank moves the overall EV.
///
/// The perturbed games are replayed with the baseline strategy held fixed:
/// the sensitivity being measured is the deck composition shifting under a
/// player who keeps playing book, which is exactly what a running count
/// tracks.
#[derive(Debug, Clone, Serialize)]
pub struct RemovalEffects {
    /// EV of the full single deck.
    pub baseline_ev: f64,
    /// EV(one card of rank i+1 removed) - baseline EV.
    pub effects: [f64; NUM_RANKS],
}

impl RemovalEffects {
    pub fn compute() -> Self {
        let baseline = Analysis::compute(CardDistribution::single_deck());
        let strategy = baseline.strategy().clone();
        let baseline_ev = baseline.ev();

        let mut effects = [0.0; NUM_RANKS];
        for (i, effect) in effects.iter_mut().enumerate() {
            let rank = (i + 1) as u8;
            log::debug!("removing one card of rank {rank}");
            // rank is always 1..=10 here
            let cards = CardDistribution::single_deck_less_one(rank)
                .unwrap_or_else(|_| unreachable!());
            let perturbed = Analysis::compute_with_strategy(cards, &strategy);
            *effect = perturbed.ev() - baseline_ev;
        }

        Self {
            baseline_ev,
            effects,
        }
    }

    /// Integer counting tags per rank: round(-effect / baseline EV).
    /// These are what a running-count trainer adds up card by card.
    pub fn count_tags(&self) -> [i32; NUM_RANKS] {
        self.effects
            .map(|e| (-e / self.baseline_ev).round() as i32)
    }
}
