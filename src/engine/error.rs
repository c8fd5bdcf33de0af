use thiserror::Error;

/// Engine-level failures that must reach the caller.
///
/// Model/scaler faults are deliberately absent: those are contained inside
/// the estimator, which logs and falls back to the heuristic path.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Missing or malformed input (empty player list, bad player count).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Bracket structure violates the round-halving contract.
    #[error("bracket structure error: {0}")]
    Structure(String),
}
