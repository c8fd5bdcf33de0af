pub mod analyzer;
pub mod bracket;
pub mod error;
pub mod estimator;
pub mod features;
pub mod power;
pub mod runner;
pub mod simulator;

pub use bracket::{Bracket, Player, TennisMatch};
pub use error::EngineError;
pub use estimator::WinProbabilityEstimator;
