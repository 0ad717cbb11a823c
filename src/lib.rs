//! Exact basic-strategy and EV/variance analysis of a single blackjack hand
//! over an arbitrary distribution of the ten card ranks. No sampling: the 34
//! simple hand states form a DAG under hitting, and every table is solved by
//! dynamic programming over it.

mod analysis;
mod card;
mod dealer;
mod error;
mod hand;
mod player;
mod removal;
mod strategy;
mod transition;

pub use analysis::{Analysis, HoleDistribution};
pub use card::{CardDistribution, NUM_RANKS};
pub use dealer::{DealerOutcomes, NUM_BUCKETS};
pub use error::AnalysisError;
pub use hand::{HandState, BUST_SUM, NUM_PAIRS, NUM_STATES, NUM_UPCARDS};
pub use player::{Expectations, PairTable, StateTable};
pub use removal::RemovalEffects;
pub use strategy::{DecisionTable, PairDecisionTable, Strategy, HIT_EPSILON};
pub use transition::TransitionMatrix;
