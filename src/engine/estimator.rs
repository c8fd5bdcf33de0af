//! Trainable win-probability estimator with a deterministic fallback.
//!
//! The trained path is a logistic regression over the 7-feature pairing
//! vector, fit by gradient descent on standardized features. The untrained
//! path is a closed-form heuristic on [`power`] scores. Both paths always
//! produce a value; model faults are logged and absorbed, never surfaced.
//!
//! Training builds a complete scaler + model snapshot and installs it with a
//! single write, so concurrent readers always observe a consistent pair.
//! Once trained, the estimator never reverts to the heuristic state.

use std::sync::RwLock;

use tracing::{info, warn};

use crate::engine::bracket::Player;
use crate::engine::features::{pairing_features, TrainingExample, FEATURE_COUNT};
use crate::engine::power::power;

/// Lower bound on returned percentages; no pairing is ever hopeless.
pub const MIN_PROBABILITY: f64 = 5.0;
/// Upper bound on returned percentages; no pairing is ever certain.
pub const MAX_PROBABILITY: f64 = 95.0;

/// Threshold below which a feature's standard deviation is treated as zero.
const STDEV_EPSILON: f64 = 1e-9;

/// Per-feature standardization: zero mean, unit variance over the fit set.
#[derive(Debug, Clone, Copy)]
pub struct StandardScaler {
    mean: [f64; FEATURE_COUNT],
    stdev: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    fn fit(examples: &[TrainingExample]) -> StandardScaler {
        let n = examples.len() as f64;
        let mut mean = [0.0; FEATURE_COUNT];
        let mut stdev = [0.0; FEATURE_COUNT];
        for ex in examples {
            for (m, f) in mean.iter_mut().zip(ex.features.iter()) {
                *m += f;
            }
        }
        for m in mean.iter_mut() {
            *m /= n;
        }
        for ex in examples {
            for i in 0..FEATURE_COUNT {
                stdev[i] += (ex.features[i] - mean[i]).powi(2);
            }
        }
        for s in stdev.iter_mut() {
            *s = (*s / n).sqrt();
        }
        StandardScaler { mean, stdev }
    }

    fn transform(&self, features: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            out[i] = if self.stdev[i] < STDEV_EPSILON {
                0.0
            } else {
                (features[i] - self.mean[i]) / self.stdev[i]
            };
        }
        out
    }
}

/// Binary logistic-regression classifier on scaled features.
#[derive(Debug, Clone, Copy)]
pub struct LogisticModel {
    weights: [f64; FEATURE_COUNT],
    bias: f64,
}

impl LogisticModel {
    /// Fit by gradient descent with decaying learning rate and L2 on the
    /// weights. Returns `None` for degenerate input: no rows, single-class
    /// labels, or a fit that diverges to non-finite parameters.
    fn fit(rows: &[[f64; FEATURE_COUNT]], labels: &[f64]) -> Option<LogisticModel> {
        if rows.is_empty() || rows.len() != labels.len() {
            return None;
        }
        let positives = labels.iter().filter(|y| **y > 0.5).count();
        if positives == 0 || positives == rows.len() {
            return None;
        }

        let n = rows.len() as f64;
        let mut weights = [0.0f64; FEATURE_COUNT];
        let mut bias = 0.0f64;
        let l2 = 1e-3;

        for iter in 0..500 {
            let lr = 0.3 / (1.0 + 0.01 * iter as f64);
            let mut grad_w = [0.0f64; FEATURE_COUNT];
            let mut grad_b = 0.0f64;
            for (x, y) in rows.iter().zip(labels.iter()) {
                let p = sigmoid(dot(&weights, x) + bias);
                let err = p - y;
                for (g, xi) in grad_w.iter_mut().zip(x.iter()) {
                    *g += err * xi;
                }
                grad_b += err;
            }
            for (w, g) in weights.iter_mut().zip(grad_w.iter()) {
                *w -= lr * (g / n + l2 * *w);
            }
            bias -= lr * grad_b / n;
            if !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
                return None;
            }
        }

        Some(LogisticModel { weights, bias })
    }

    /// P(player1 wins) for a scaled feature vector, in (0, 1).
    fn probability(&self, scaled: &[f64; FEATURE_COUNT]) -> f64 {
        sigmoid(dot(&self.weights, scaled) + self.bias)
    }
}

/// A consistent scaler + model pair produced by one training run.
#[derive(Debug, Clone, Copy)]
struct Snapshot {
    scaler: StandardScaler,
    model: LogisticModel,
}

/// Which prediction path is active.
#[derive(Debug, Clone, Copy)]
enum EstimatorState {
    Heuristic,
    Trained(Snapshot),
}

/// Win-probability estimator shared across all request handlers.
pub struct WinProbabilityEstimator {
    state: RwLock<EstimatorState>,
}

impl Default for WinProbabilityEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl WinProbabilityEstimator {
    /// Start on the heuristic path; `train` switches to the model path.
    pub fn new() -> Self {
        WinProbabilityEstimator {
            state: RwLock::new(EstimatorState::Heuristic),
        }
    }

    pub fn is_trained(&self) -> bool {
        matches!(*self.read_state(), EstimatorState::Trained(_))
    }

    /// Fit the scaler and classifier on `examples` and install the snapshot.
    ///
    /// Degenerate input (empty set, single-class labels, diverging fit) is
    /// logged and leaves the current state untouched; training is never
    /// fatal to the host process.
    pub fn train(&self, examples: &[TrainingExample]) {
        if examples.is_empty() {
            warn!("Training skipped: no examples provided");
            return;
        }
        let scaler = StandardScaler::fit(examples);
        let rows: Vec<[f64; FEATURE_COUNT]> =
            examples.iter().map(|ex| scaler.transform(&ex.features)).collect();
        let labels: Vec<f64> = examples.iter().map(|ex| ex.label as f64).collect();

        match LogisticModel::fit(&rows, &labels) {
            Some(model) => {
                *self.write_state() = EstimatorState::Trained(Snapshot { scaler, model });
                info!("Win-probability model trained on {} examples", examples.len());
            }
            None => {
                warn!(
                    "Training failed on {} examples (degenerate input); keeping current state",
                    examples.len()
                );
            }
        }
    }

    /// Estimated probability (percent, clamped to `[5, 95]`) that `player`
    /// beats a field of `opponents`, averaged over pairings.
    ///
    /// Trained path: classifier probability per opponent, averaged. The
    /// heuristic path (untrained, empty field, or a model fault) is
    /// `power / max_power * 70 + 15`.
    pub fn predict_probability(&self, player: &Player, opponents: &[Player]) -> f64 {
        if let EstimatorState::Trained(snap) = *self.read_state() {
            let probs: Vec<f64> = opponents
                .iter()
                .filter(|o| o.id != player.id)
                .map(|o| snap.model.probability(&snap.scaler.transform(&pairing_features(player, o))))
                .collect();
            if !probs.is_empty() {
                let avg = probs.iter().sum::<f64>() / probs.len() as f64 * 100.0;
                if avg.is_finite() {
                    return avg.clamp(MIN_PROBABILITY, MAX_PROBABILITY);
                }
                warn!("Model produced a non-finite probability; using heuristic");
            }
        }
        heuristic_probability(player, opponents)
    }

    /// Classifier decision for a single pairing: `Some(true)` means player1
    /// wins. `None` when untrained or on a model fault, in which case the
    /// caller applies the power-plus-noise rule.
    pub fn trained_decision(&self, player1: &Player, player2: &Player) -> Option<bool> {
        if let EstimatorState::Trained(snap) = *self.read_state() {
            let p = snap
                .model
                .probability(&snap.scaler.transform(&pairing_features(player1, player2)));
            if p.is_finite() {
                return Some(p >= 0.5);
            }
            warn!("Model produced a non-finite decision score; using fallback");
        }
        None
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, EstimatorState> {
        // A poisoned lock still holds a consistent snapshot (installs are a
        // single assignment), so recover rather than propagate the panic.
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, EstimatorState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Closed-form fallback: normalize the player's power against the strongest
/// power in the field (the player included) and rescale to `[15, 85]`.
fn heuristic_probability(player: &Player, opponents: &[Player]) -> f64 {
    let own = power(player);
    let max_power = opponents
        .iter()
        .map(power)
        .fold(own, f64::max);
    let base = if max_power > 0.0 { own / max_power } else { 1.0 };
    (base * 70.0 + 15.0).clamp(MIN_PROBABILITY, MAX_PROBABILITY)
}

fn dot(a: &[f64; FEATURE_COUNT], b: &[f64; FEATURE_COUNT]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Numerically stable logistic sigmoid.
fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::engine::features::seed_examples;

    fn player(id: u32, speed: f64, serve: f64, endurance: f64, technique: f64) -> Player {
        Player {
            id,
            name: format!("P{}", id),
            country: "ITA".into(),
            speed,
            serve,
            endurance,
            technique,
            style: None,
        }
    }

    fn strong() -> Player {
        player(1, 94.0, 92.0, 90.0, 93.0)
    }

    fn weak() -> Player {
        player(2, 64.0, 62.0, 68.0, 61.0)
    }

    #[test]
    fn untrained_prediction_is_deterministic() {
        let est = WinProbabilityEstimator::new();
        let field = vec![strong(), weak(), player(3, 80.0, 80.0, 80.0, 80.0)];
        let a = est.predict_probability(&field[1], &field);
        let b = est.predict_probability(&field[1], &field);
        assert_relative_eq!(a, b, epsilon = 1e-12);
    }

    #[test]
    fn heuristic_matches_closed_form() {
        let est = WinProbabilityEstimator::new();
        let field = vec![strong(), weak()];
        let p = est.predict_probability(&weak(), &field);
        let expected = power(&weak()) / power(&strong()) * 70.0 + 15.0;
        assert_relative_eq!(p, expected, epsilon = 1e-9);
    }

    #[test]
    fn strongest_player_heuristic_is_85() {
        // The field maximum is the player's own power: base = 1.0.
        let est = WinProbabilityEstimator::new();
        let p = est.predict_probability(&strong(), &[weak()]);
        assert_relative_eq!(p, 85.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_opponents_falls_back_without_panicking() {
        let est = WinProbabilityEstimator::new();
        let p = est.predict_probability(&strong(), &[]);
        assert_relative_eq!(p, 85.0, epsilon = 1e-9);
    }

    #[test]
    fn predictions_stay_clamped_trained_and_untrained() {
        let est = WinProbabilityEstimator::new();
        let lopsided = vec![player(9, 100.0, 100.0, 100.0, 100.0), player(10, 1.0, 1.0, 1.0, 1.0)];
        for trained in [false, true] {
            if trained {
                est.train(&seed_examples());
                assert!(est.is_trained());
            }
            for p in &lopsided {
                let prob = est.predict_probability(p, &lopsided);
                assert!(
                    (MIN_PROBABILITY..=MAX_PROBABILITY).contains(&prob),
                    "probability {} out of range (trained={})",
                    prob,
                    trained
                );
            }
        }
    }

    #[test]
    fn training_on_seed_set_learns_attribute_edge() {
        let est = WinProbabilityEstimator::new();
        est.train(&seed_examples());
        assert!(est.is_trained());

        // A large attribute edge should dominate the decision.
        assert_eq!(est.trained_decision(&strong(), &weak()), Some(true));
        assert_eq!(est.trained_decision(&weak(), &strong()), Some(false));

        let p = est.predict_probability(&strong(), &[weak()]);
        assert!(p > 50.0, "strong player got {}% against weak field", p);
    }

    #[test]
    fn single_class_training_set_stays_heuristic() {
        let est = WinProbabilityEstimator::new();
        let mut examples = seed_examples();
        for ex in examples.iter_mut() {
            ex.label = 1;
        }
        est.train(&examples);
        assert!(!est.is_trained());
        assert_eq!(est.trained_decision(&strong(), &weak()), None);
    }

    #[test]
    fn empty_training_set_stays_heuristic() {
        let est = WinProbabilityEstimator::new();
        est.train(&[]);
        assert!(!est.is_trained());
    }

    #[test]
    fn logistic_fit_separates_simple_data() {
        // One informative feature, rest zero.
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..40 {
            let x = if i % 2 == 0 { 1.0 } else { -1.0 };
            let mut row = [0.0; FEATURE_COUNT];
            row[0] = x;
            rows.push(row);
            labels.push(if x > 0.0 { 1.0 } else { 0.0 });
        }
        let model = LogisticModel::fit(&rows, &labels).expect("fit should succeed");
        let mut pos = [0.0; FEATURE_COUNT];
        pos[0] = 1.0;
        let mut neg = [0.0; FEATURE_COUNT];
        neg[0] = -1.0;
        assert!(model.probability(&pos) > 0.8);
        assert!(model.probability(&neg) < 0.2);
    }

    #[test]
    fn scaler_standardizes_and_guards_constant_features() {
        let examples = vec![
            TrainingExample { features: [1.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0], label: 1 },
            TrainingExample { features: [3.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0], label: 0 },
        ];
        let scaler = StandardScaler::fit(&examples);
        let t = scaler.transform(&examples[0].features);
        assert_relative_eq!(t[0], -1.0, epsilon = 1e-9);
        // Constant feature maps to 0 instead of dividing by ~zero stdev.
        assert_relative_eq!(t[1], 0.0, epsilon = 1e-9);
    }
}
