//! Player strength scoring.
//!
//! `power` is the heuristic strength proxy used everywhere a quick, explainable
//! number is needed: the serve carries the most weight, endurance the least.
//! `consistency` rewards players whose four attributes sit close together.

use crate::engine::bracket::Player;

/// Weighted composite of the four core attributes (0–100 scale).
pub fn power(player: &Player) -> f64 {
    player.speed * 0.25 + player.serve * 0.30 + player.endurance * 0.20 + player.technique * 0.25
}

/// Consistency score: `max(0, 100 - 10 * stdev(attrs))`.
///
/// A player with identical attributes scores 100; large spread drives the
/// score toward 0 (clamped).
pub fn consistency(player: &Player) -> f64 {
    let stats = [player.speed, player.serve, player.endurance, player.technique];
    (100.0 - 10.0 * stdev(&stats)).max(0.0)
}

/// Name of the player's highest-rated attribute. Ties resolve to the first
/// attribute in (speed, serve, endurance, technique) order.
pub fn dominant_attribute(player: &Player) -> &'static str {
    let attrs = [
        ("speed", player.speed),
        ("serve", player.serve),
        ("endurance", player.endurance),
        ("technique", player.technique),
    ];
    let mut best = attrs[0];
    for a in &attrs[1..] {
        if a.1 > best.1 {
            best = *a;
        }
    }
    best.0
}

/// Population standard deviation (N denominator) of a fixed attribute set.
fn stdev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn player(speed: f64, serve: f64, endurance: f64, technique: f64) -> Player {
        Player {
            id: 1,
            name: "Test".into(),
            country: "ESP".into(),
            speed,
            serve,
            endurance,
            technique,
            style: None,
        }
    }

    #[test]
    fn power_is_weighted_sum() {
        let p = player(80.0, 90.0, 70.0, 85.0);
        let expected = 80.0 * 0.25 + 90.0 * 0.30 + 70.0 * 0.20 + 85.0 * 0.25;
        assert_relative_eq!(power(&p), expected, epsilon = 1e-9);
    }

    #[test]
    fn power_monotone_in_each_attribute() {
        let base = player(70.0, 70.0, 70.0, 70.0);
        let p0 = power(&base);
        for i in 0..4 {
            let mut bumped = base.clone();
            match i {
                0 => bumped.speed += 5.0,
                1 => bumped.serve += 5.0,
                2 => bumped.endurance += 5.0,
                _ => bumped.technique += 5.0,
            }
            assert!(
                power(&bumped) >= p0,
                "raising attribute {} lowered power",
                i
            );
        }
    }

    #[test]
    fn consistency_of_uniform_player_is_100() {
        let p = player(85.0, 85.0, 85.0, 85.0);
        assert_relative_eq!(consistency(&p), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn consistency_clamps_at_zero() {
        // Spread large enough that 100 - 10*stdev goes negative.
        let p = player(100.0, 0.0, 100.0, 0.0);
        assert_relative_eq!(consistency(&p), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn dominant_attribute_picks_largest() {
        let p = player(70.0, 95.0, 60.0, 80.0);
        assert_eq!(dominant_attribute(&p), "serve");
    }
}
