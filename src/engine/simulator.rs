//! Single-match simulation: winner decision and scoreline generation.
//!
//! The winner comes from the trained classifier when available; otherwise a
//! power comparison with round-scaled noise decides. Noise is widest in
//! round 1 and shrinks toward the final, so upsets get rarer as the
//! tournament progresses.

use rand::Rng;

use crate::engine::bracket::Player;
use crate::engine::estimator::WinProbabilityEstimator;
use crate::engine::power::power;

/// Power gap below which a pairing counts as evenly matched.
const CLOSE_POWER_GAP: f64 = 10.0;

/// Score sets for evenly matched pairings.
const CLOSE_WINNER_SCORES: [u32; 3] = [7, 6, 7];
const CLOSE_LOSER_SCORES: [u32; 3] = [5, 4, 6];
/// Score sets for one-sided pairings.
const DECISIVE_WINNER_SCORES: [u32; 3] = [6, 6, 7];
const DECISIVE_LOSER_SCORES: [u32; 3] = [2, 3, 4];

/// Decide the winner of one match in round `round` (1-based).
pub fn decide_winner<R: Rng + ?Sized>(
    estimator: &WinProbabilityEstimator,
    player1: &Player,
    player2: &Player,
    round: u32,
    rng: &mut R,
) -> Player {
    match estimator.trained_decision(player1, player2) {
        Some(true) => player1.clone(),
        Some(false) => player2.clone(),
        None => power_noise_winner(player1, player2, round, rng),
    }
}

/// Fallback rule: higher power wins, perturbed by noise that shrinks with
/// the round number (`uniform(-0.15, 0.15) * (4 - round)`, floor factor 1).
fn power_noise_winner<R: Rng + ?Sized>(
    player1: &Player,
    player2: &Player,
    round: u32,
    rng: &mut R,
) -> Player {
    let factor = (4i64 - i64::from(round)).max(1) as f64;
    let noise = rng.gen_range(-0.15..0.15) * factor;
    if power(player1) + noise > power(player2) {
        player1.clone()
    } else {
        player2.clone()
    }
}

/// Generate a set-style scoreline `(score1, score2)` for a decided match.
///
/// Evenly matched pairings (power gap < 10) draw narrow scores; one-sided
/// pairings draw heavy ones. Each side's value is drawn independently from
/// its discrete set, and the winner's set never drops below the loser's.
pub fn generate_score<R: Rng + ?Sized>(
    player1: &Player,
    player2: &Player,
    winner_is_player1: bool,
    rng: &mut R,
) -> (u32, u32) {
    let close = (power(player1) - power(player2)).abs() < CLOSE_POWER_GAP;
    let (winner_set, loser_set) = if close {
        (CLOSE_WINNER_SCORES, CLOSE_LOSER_SCORES)
    } else {
        (DECISIVE_WINNER_SCORES, DECISIVE_LOSER_SCORES)
    };

    let winner_score = winner_set[rng.gen_range(0..winner_set.len())];
    let loser_score = loser_set[rng.gen_range(0..loser_set.len())];
    if winner_is_player1 {
        (winner_score, loser_score)
    } else {
        (loser_score, winner_score)
    }
}
