//! Field analysis: strength ranking, matchup balance, seeding, and
//! championship contenders.

use std::cmp::Ordering;

use rand::Rng;
use serde::Serialize;

use crate::engine::bracket::Player;
use crate::engine::estimator::{WinProbabilityEstimator, MAX_PROBABILITY, MIN_PROBABILITY};
use crate::engine::power::power;

/// How many contenders `top_contenders` reports.
const CONTENDER_LIMIT: usize = 5;

/// A championship candidate with its adjusted win probability (percent).
#[derive(Debug, Clone, Serialize)]
pub struct Contender {
    pub name: String,
    pub country: String,
    pub style: String,
    pub probability: f64,
}

/// Players sorted by power, strongest first. Ties keep input order.
pub fn rank_by_strength(players: &[Player]) -> Vec<Player> {
    let mut ranked = players.to_vec();
    ranked.sort_by(|a, b| power(b).partial_cmp(&power(a)).unwrap_or(Ordering::Equal));
    ranked
}

/// The pair of players with the smallest power gap, plus that gap.
///
/// Exhaustive O(n²) scan; the first minimal pair in iteration order wins
/// ties. `None` with fewer than two players.
pub fn most_balanced_pair(players: &[Player]) -> Option<(Player, Player, f64)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for i in 0..players.len() {
        for j in (i + 1)..players.len() {
            let diff = (power(&players[i]) - power(&players[j])).abs();
            if best.map(|(_, _, d)| diff < d).unwrap_or(true) {
                best = Some((i, j, diff));
            }
        }
    }
    best.map(|(i, j, diff)| (players[i].clone(), players[j].clone(), diff))
}

/// First-round pairings that protect the seeds: rank `i` meets rank
/// `n-1-i`, so the strongest players can only collide in later rounds.
pub fn optimal_seeding(players: &[Player]) -> Vec<(Player, Player)> {
    let ranked = rank_by_strength(players);
    let n = ranked.len();
    (0..n / 2)
        .map(|i| (ranked[i].clone(), ranked[n - 1 - i].clone()))
        .collect()
}

/// Top contenders by adjusted win probability.
///
/// Each player's field-wide probability is perturbed by a bounded
/// bracket-position nudge in `[-5, 5]` (a stand-in until real seeding-aware
/// adjustment exists) and clamped back to `[5, 95]`.
pub fn top_contenders<R: Rng + ?Sized>(
    estimator: &WinProbabilityEstimator,
    players: &[Player],
    rng: &mut R,
) -> Vec<Contender> {
    let mut contenders: Vec<Contender> = players
        .iter()
        .map(|p| {
            let base = estimator.predict_probability(p, players);
            let nudge = rng.gen_range(-5.0..=5.0);
            Contender {
                name: p.name.clone(),
                country: p.country.clone(),
                style: p.style.clone().unwrap_or_else(|| "All-court".into()),
                probability: (base + nudge).clamp(MIN_PROBABILITY, MAX_PROBABILITY),
            }
        })
        .collect();

    contenders.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(Ordering::Equal)
    });
    contenders.truncate(CONTENDER_LIMIT);
    contenders
}
