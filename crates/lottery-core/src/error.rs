// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BLOCK-HASH LOTTERY - ERRORS
//
// Every mutating call either commits completely or returns one of these
// with no state change observable.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub type LotteryResult<T> = Result<T, LotteryError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LotteryError {
    #[error("Invalid stake: expected exactly {expected}, got {got}")]
    InvalidStake { expected: u128, got: u128 },

    #[error("Wager not found: index {index} >= length {len}")]
    NotFound { index: usize, len: usize },

    #[error("Block hash unavailable for height {height}")]
    OracleUnavailable { height: u64 },

    #[error("Transfer of {amount} to {to} failed: {reason}")]
    TransferFailed {
        to: String,
        amount: u128,
        reason: String,
    },

    #[error("Wager queue is drained: no head to advance")]
    QueueDrained,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid challenge: {0}")]
    InvalidChallenge(String),

    #[error("Invalid block hash: {0}")]
    InvalidBlockHash(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(
        "Conservation audit failed: pot {pot} + unresolved {unresolved} + paid {paid_out} != deposited {deposited}"
    )]
    ConservationViolation {
        pot: u128,
        unresolved: u128,
        paid_out: u128,
        deposited: u128,
    },

    #[error("State encoding error: {0}")]
    Encoding(String),
}

impl LotteryError {
    /// Errors the caller can fix by retrying with different input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LotteryError::InvalidStake { .. }
                | LotteryError::NotFound { .. }
                | LotteryError::TransferFailed { .. }
                | LotteryError::InvalidChallenge(_)
                | LotteryError::InvalidBlockHash(_)
        )
    }
}
