//! Round-by-round tournament orchestration.
//!
//! The runner simulates every populated match in a round, then explicitly
//! advances winners into the next round's slots before touching it. The
//! champion is the winner of the single final-round match.

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::engine::bracket::{Bracket, Player, TennisMatch};
use crate::engine::error::EngineError;
use crate::engine::estimator::WinProbabilityEstimator;
use crate::engine::simulator::{decide_winner, generate_score};

/// Score differential at or below which a match counts as close.
const CLOSE_SCORE_MARGIN: u32 = 2;

#[derive(Debug, Clone, Serialize)]
pub struct SimulationStats {
    pub total_matches: usize,
    pub total_points: u32,
    pub close_matches: usize,
    pub close_match_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    pub champion: Player,
    /// Simulated rounds in order; index 0 is round 1.
    pub results: Vec<Vec<TennisMatch>>,
    pub stats: SimulationStats,
}

/// Simulate a full tournament.
///
/// When `bracket` is absent or its first round is unpopulated, a fresh
/// randomized bracket is built from `players`. Matches missing a player are
/// skipped; a skipped feeder leaves the downstream slot empty, which
/// surfaces as a structural error if it reaches the final.
pub fn run<R: Rng + ?Sized>(
    estimator: &WinProbabilityEstimator,
    players: &[Player],
    bracket: Option<Bracket>,
    rng: &mut R,
) -> Result<SimulationResult, EngineError> {
    let mut bracket = match bracket {
        Some(b) if b.has_populated_first_round() => b,
        _ => Bracket::build(players, rng)?,
    };

    let round_count = bracket.round_count();
    for round_idx in 0..round_count {
        let round_number = (round_idx + 1) as u32;
        let mut simulated = 0usize;
        for m in bracket.rounds[round_idx].iter_mut() {
            let (p1, p2) = match (&m.player1, &m.player2) {
                (Some(p1), Some(p2)) => (p1.clone(), p2.clone()),
                _ => continue,
            };
            let winner = decide_winner(estimator, &p1, &p2, round_number, rng);
            let (score1, score2) = generate_score(&p1, &p2, winner.id == p1.id, rng);
            m.score1 = Some(score1);
            m.score2 = Some(score2);
            m.winner = Some(winner);
            m.completed = true;
            simulated += 1;
        }
        debug!(round = round_number, matches = simulated, "Round simulated");

        if round_idx + 1 < round_count {
            bracket.advance(round_idx)?;
        }
    }

    let final_round = bracket
        .rounds
        .last()
        .ok_or_else(|| EngineError::Structure("bracket has no rounds".into()))?;
    if final_round.len() != 1 {
        return Err(EngineError::Structure(format!(
            "final round must hold exactly one match, found {}",
            final_round.len()
        )));
    }
    let champion = final_round[0]
        .winner
        .clone()
        .ok_or_else(|| EngineError::Structure("final match was never completed".into()))?;

    let stats = compute_stats(&bracket.rounds);
    info!(
        champion = %champion.name,
        matches = stats.total_matches,
        close_pct = stats.close_match_percentage,
        "Tournament simulation complete"
    );

    Ok(SimulationResult {
        champion,
        results: bracket.rounds,
        stats,
    })
}

/// Aggregate statistics over all completed matches.
fn compute_stats(rounds: &[Vec<TennisMatch>]) -> SimulationStats {
    let mut total_matches = 0usize;
    let mut total_points = 0u32;
    let mut close_matches = 0usize;

    for m in rounds.iter().flatten().filter(|m| m.completed) {
        let (s1, s2) = match (m.score1, m.score2) {
            (Some(s1), Some(s2)) => (s1, s2),
            _ => continue,
        };
        total_matches += 1;
        total_points += s1 + s2;
        if s1.abs_diff(s2) <= CLOSE_SCORE_MARGIN {
            close_matches += 1;
        }
    }

    let close_match_percentage = if total_matches > 0 {
        close_matches as f64 / total_matches as f64 * 100.0
    } else {
        0.0
    };

    SimulationStats {
        total_matches,
        total_points,
        close_matches,
        close_match_percentage,
    }
}
