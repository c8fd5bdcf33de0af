//! Tournament data model and single-elimination bracket construction.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::error::EngineError;

/// A tournament entrant. Attributes are scores on a 0–100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub country: String,
    pub speed: f64,
    pub serve: f64,
    pub endurance: f64,
    pub technique: f64,
    /// Playing style label, e.g. "Aggressive baseliner". Display-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

/// One match slot in the bracket. Later-round slots start with both players
/// empty and are filled by [`Bracket::advance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TennisMatch {
    /// Bracket-position id, `r{round}m{index}` (1-based).
    pub id: String,
    #[serde(default)]
    pub player1: Option<Player>,
    #[serde(default)]
    pub player2: Option<Player>,
    #[serde(default)]
    pub score1: Option<u32>,
    #[serde(default)]
    pub score2: Option<u32>,
    #[serde(default)]
    pub winner: Option<Player>,
    #[serde(default)]
    pub completed: bool,
}

impl TennisMatch {
    fn placeholder(round: usize, index: usize) -> Self {
        TennisMatch {
            id: format!("r{}m{}", round, index),
            player1: None,
            player2: None,
            score1: None,
            score2: None,
            winner: None,
            completed: false,
        }
    }
}

/// A single-elimination bracket: `rounds[0]` is round 1; each subsequent
/// round holds half the match slots of the previous one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub rounds: Vec<Vec<TennisMatch>>,
}

impl Bracket {
    /// Build a randomized bracket from `players`.
    ///
    /// The player list must be a power of two with at least two entries.
    /// Round 1 pairs a uniform shuffle of the players; later rounds are
    /// placeholders filled by [`Bracket::advance`].
    pub fn build<R: Rng + ?Sized>(players: &[Player], rng: &mut R) -> Result<Bracket, EngineError> {
        if players.len() < 2 || !players.len().is_power_of_two() {
            return Err(EngineError::InvalidInput(format!(
                "bracket requires a power-of-two player count >= 2, got {}",
                players.len()
            )));
        }

        let mut shuffled: Vec<Player> = players.to_vec();
        shuffled.shuffle(rng);

        let mut rounds = Vec::new();
        let mut round1 = Vec::with_capacity(shuffled.len() / 2);
        for (i, pair) in shuffled.chunks(2).enumerate() {
            round1.push(TennisMatch {
                id: format!("r1m{}", i + 1),
                player1: Some(pair[0].clone()),
                player2: Some(pair[1].clone()),
                score1: None,
                score2: None,
                winner: None,
                completed: false,
            });
        }
        rounds.push(round1);

        let mut slots = shuffled.len() / 4;
        let mut round = 2;
        while slots >= 1 {
            rounds.push((1..=slots).map(|i| TennisMatch::placeholder(round, i)).collect());
            slots /= 2;
            round += 1;
        }

        Ok(Bracket { rounds })
    }

    /// Number of rounds in the bracket.
    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    /// True if round 1 exists and has at least one match with both players set.
    pub fn has_populated_first_round(&self) -> bool {
        self.rounds
            .first()
            .map(|r| r.iter().any(|m| m.player1.is_some() && m.player2.is_some()))
            .unwrap_or(false)
    }

    /// Propagate winners of round `completed_round` (0-based) into the next
    /// round: slot `m` receives the winners of feeder matches `2m` and
    /// `2m + 1`. Feeders without a recorded winner leave their slot empty.
    pub fn advance(&mut self, completed_round: usize) -> Result<(), EngineError> {
        if completed_round + 1 >= self.rounds.len() {
            return Err(EngineError::Structure(format!(
                "cannot advance past round {} of {}",
                completed_round + 1,
                self.rounds.len()
            )));
        }
        let expected = self.rounds[completed_round].len() / 2;
        if self.rounds[completed_round + 1].len() != expected {
            return Err(EngineError::Structure(format!(
                "round {} has {} slots, expected {}",
                completed_round + 2,
                self.rounds[completed_round + 1].len(),
                expected
            )));
        }

        for slot in 0..expected {
            let w1 = self.rounds[completed_round][2 * slot].winner.clone();
            let w2 = self.rounds[completed_round][2 * slot + 1].winner.clone();
            let next = &mut self.rounds[completed_round + 1][slot];
            next.player1 = w1;
            next.player2 = w2;
        }
        Ok(())
    }
}
