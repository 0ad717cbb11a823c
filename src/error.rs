use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("card probabilities sum to {sum}, expected 1")]
    UnnormalizedDistribution { sum: f64 },

    #[error("negative probability {prob} for rank {rank}")]
    NegativeProbability { rank: u8, prob: f64 },

    #[error("invalid rank {0}, expected 1..=10")]
    InvalidRank(u8),

    #[error("invalid hand state ({sum}, ace={ace})")]
    InvalidState { sum: u8, ace: bool },

    #[error("malformed state key '{0}'")]
    MalformedKey(String),

    #[error("'{0}' is not a dealer up-card state")]
    NotAnUpcard(String),

    #[error("'{0}' is not a pair state")]
    NotAPair(String),
}
