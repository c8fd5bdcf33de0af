//! Feature construction for the win-probability model.
//!
//! A pairing is encoded as 7 features: the four attribute differences
//! (player1 − player2), the absolute speed gap, and each player's composite
//! attribute average. The label is 1 when player1 won.

use serde::{Deserialize, Serialize};

use crate::engine::bracket::Player;

pub const FEATURE_COUNT: usize = 7;

/// One historical match rendered as a training row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingExample {
    pub features: [f64; FEATURE_COUNT],
    /// 1 = player1 won, 0 = player2 won.
    pub label: u8,
}

/// Encode a (player, opponent) pairing as the model's feature vector.
pub fn pairing_features(player: &Player, opponent: &Player) -> [f64; FEATURE_COUNT] {
    [
        player.speed - opponent.speed,
        player.serve - opponent.serve,
        player.endurance - opponent.endurance,
        player.technique - opponent.technique,
        (player.speed - opponent.speed).abs(),
        composite(player),
        composite(opponent),
    ]
}

fn composite(p: &Player) -> f64 {
    (p.speed + p.serve + p.endurance + p.technique) / 4.0
}

/// Built-in historical matches used to train the model at startup.
///
/// Each row is (player1 stats, player2 stats, winner) with stats ordered
/// (speed, serve, endurance, technique). Curated rather than measured; the
/// set only needs to teach the model that attribute edges correlate with
/// winning.
pub fn seed_examples() -> Vec<TrainingExample> {
    const ROWS: [([f64; 4], [f64; 4], u8); 16] = [
        ([92.0, 88.0, 95.0, 94.0], [90.0, 89.0, 96.0, 96.0], 0),
        ([88.0, 92.0, 87.0, 98.0], [91.0, 86.0, 89.0, 90.0], 1),
        ([95.0, 90.0, 92.0, 89.0], [84.0, 82.0, 80.0, 85.0], 1),
        ([78.0, 75.0, 82.0, 79.0], [90.0, 93.0, 88.0, 91.0], 0),
        ([85.0, 96.0, 84.0, 88.0], [86.0, 84.0, 90.0, 87.0], 1),
        ([70.0, 72.0, 75.0, 71.0], [88.0, 85.0, 86.0, 89.0], 0),
        ([93.0, 91.0, 90.0, 95.0], [80.0, 79.0, 83.0, 81.0], 1),
        ([82.0, 80.0, 85.0, 84.0], [94.0, 92.0, 91.0, 93.0], 0),
        ([89.0, 94.0, 86.0, 90.0], [87.0, 88.0, 85.0, 86.0], 1),
        ([76.0, 74.0, 80.0, 77.0], [92.0, 90.0, 89.0, 94.0], 0),
        ([91.0, 87.0, 93.0, 92.0], [83.0, 85.0, 81.0, 80.0], 1),
        ([79.0, 81.0, 78.0, 82.0], [90.0, 94.0, 87.0, 91.0], 0),
        ([96.0, 93.0, 94.0, 97.0], [85.0, 86.0, 88.0, 84.0], 1),
        ([74.0, 77.0, 73.0, 76.0], [89.0, 91.0, 90.0, 92.0], 0),
        ([90.0, 95.0, 88.0, 93.0], [82.0, 81.0, 84.0, 83.0], 1),
        ([81.0, 78.0, 79.0, 80.0], [93.0, 96.0, 92.0, 95.0], 0),
    ];

    ROWS.iter()
        .map(|(p1, p2, winner)| TrainingExample {
            features: [
                p1[0] - p2[0],
                p1[1] - p2[1],
                p1[2] - p2[2],
                p1[3] - p2[3],
                (p1[0] - p2[0]).abs(),
                p1.iter().sum::<f64>() / 4.0,
                p2.iter().sum::<f64>() / 4.0,
            ],
            label: *winner,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn player(id: u32, speed: f64, serve: f64, endurance: f64, technique: f64) -> Player {
        Player {
            id,
            name: format!("P{}", id),
            country: "SRB".into(),
            speed,
            serve,
            endurance,
            technique,
            style: None,
        }
    }

    #[test]
    fn pairing_features_layout() {
        let p1 = player(1, 90.0, 80.0, 70.0, 60.0);
        let p2 = player(2, 85.0, 84.0, 75.0, 66.0);
        let f = pairing_features(&p1, &p2);
        assert_relative_eq!(f[0], 5.0);
        assert_relative_eq!(f[1], -4.0);
        assert_relative_eq!(f[2], -5.0);
        assert_relative_eq!(f[3], -6.0);
        assert_relative_eq!(f[4], 5.0);
        assert_relative_eq!(f[5], 75.0);
        assert_relative_eq!(f[6], 77.5);
    }

    #[test]
    fn seed_set_has_both_outcomes() {
        let examples = seed_examples();
        assert!(examples.iter().any(|e| e.label == 1));
        assert!(examples.iter().any(|e| e.label == 0));
        assert!(examples.len() >= 8);
    }
}
