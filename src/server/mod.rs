//! HTTP surface: thin JSON handlers over the simulation engine.

pub mod report;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::engine::analyzer::{self, Contender};
use crate::engine::bracket::{Bracket, Player, TennisMatch};
use crate::engine::error::EngineError;
use crate::engine::estimator::WinProbabilityEstimator;
use crate::engine::power::{consistency, dominant_attribute, power};
use crate::engine::runner::{self, SimulationStats};

#[derive(Clone)]
pub struct AppState {
    pub estimator: Arc<WinProbabilityEstimator>,
    /// When set, every request draws from a freshly seeded RNG, making
    /// responses reproducible.
    pub rng_seed: Option<u64>,
}

impl AppState {
    fn request_rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Build the Axum router for the prediction API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/analyze", post(analyze_handler))
        .route("/predict", post(predict_handler))
        .route("/simulate", post(simulate_handler))
        .route("/report", post(report_handler))
        .route("/optimize", post(optimize_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

// ── Error shaping ────────────────────────────────────────────────────────────

/// Request-level failure rendered as `{"status":"error","message":...}`.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let status = match err {
            EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            EngineError::Structure(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request failed: {}", self.message);
        }
        (
            self.status,
            Json(json!({ "status": "error", "message": self.message })),
        )
            .into_response()
    }
}

fn require_players(players: &[Player]) -> Result<(), ApiError> {
    if players.is_empty() {
        return Err(ApiError::bad_request("players must not be empty"));
    }
    Ok(())
}

// ── Request / response records ───────────────────────────────────────────────

/// Caller-supplied tournament context: present fields enrich analysis and
/// report text, absent ones are simply skipped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TournamentContext {
    pub champion: Option<Player>,
    pub stats: Option<TournamentHighlights>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TournamentHighlights {
    #[serde(alias = "fastestPlayer")]
    pub fastest_player: Option<Player>,
    #[serde(alias = "bestServer")]
    pub best_server: Option<Player>,
    #[serde(alias = "longestMatch")]
    pub longest_match: Option<TennisMatch>,
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    #[serde(default)]
    players: Vec<Player>,
    #[serde(default)]
    tournament: TournamentContext,
}

#[derive(Serialize)]
struct Insight {
    title: String,
    content: String,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    status: &'static str,
    summary: String,
    insights: Vec<Insight>,
    recommendations: Vec<String>,
}

#[derive(Deserialize)]
struct PredictRequest {
    #[serde(default)]
    players: Vec<Player>,
    // Accepted for interface compatibility; the bracket nudge does not yet
    // read real bracket positions.
    #[serde(default, rename = "current_bracket")]
    _current_bracket: Option<Bracket>,
}

#[derive(Serialize)]
struct PredictResponse {
    status: &'static str,
    top_contenders: Vec<Contender>,
    insight: String,
    confidence: f64,
}

#[derive(Deserialize)]
struct SimulateRequest {
    #[serde(default)]
    players: Vec<Player>,
    #[serde(default)]
    bracket: Option<Bracket>,
}

#[derive(Serialize)]
struct SimulateResponse {
    status: &'static str,
    champion: Player,
    results: Vec<Vec<TennisMatch>>,
    stats: SimulationStats,
}

#[derive(Deserialize)]
struct ReportRequest {
    #[serde(default)]
    players: Vec<Player>,
    #[serde(default)]
    tournament: TournamentContext,
}

#[derive(Deserialize)]
struct OptimizeRequest {
    #[serde(default)]
    players: Vec<Player>,
}

#[derive(Serialize)]
struct SeededPair {
    strong: Player,
    weak: Player,
}

#[derive(Serialize)]
struct OptimizeResponse {
    status: &'static str,
    pairs: Vec<SeededPair>,
    explanation: &'static str,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /health
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "online",
        "service": "Courtside Tennis AI",
        "version": env!("CARGO_PKG_VERSION"),
        "model_trained": state.estimator.is_trained(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// POST /analyze
async fn analyze_handler(
    State(_state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    require_players(&req.players)?;

    let ranked = analyzer::rank_by_strength(&req.players);
    let strongest = &ranked[0];
    let strongest_line = format!(
        "{} has the best overall form ({:.1}/100) with {:.1}% consistency",
        strongest.name,
        power(strongest),
        consistency(strongest)
    );

    let (matchup_line, matchup_insight) = match analyzer::most_balanced_pair(&req.players) {
        Some((p1, p2, diff)) => (
            format!("{} vs {}", p1.name, p2.name),
            format!(
                "This would be the most evenly matched contest (power gap {:.1})",
                diff
            ),
        ),
        None => (
            "N/A".to_string(),
            "Not enough players for a matchup read".to_string(),
        ),
    };

    let (trend_summary, trend_insight) = match &req.tournament.champion {
        Some(champion) => (
            format!("Tournament complete; {} took the title. ", champion.name),
            format!(
                "Champion {} built the run on superior {}",
                champion.name,
                dominant_attribute(champion)
            ),
        ),
        None => (
            "Tournament in progress.".to_string(),
            "The opening matches will set the tournament's dynamic".to_string(),
        ),
    };

    let summary = format!(
        "{} shows the strongest profile. Key matchup: {}. {}",
        strongest.name, matchup_line, trend_summary
    );

    let most_consistent = req
        .players
        .iter()
        .max_by(|a, b| consistency(a).total_cmp(&consistency(b)));
    let best_server = req.players.iter().max_by(|a, b| a.serve.total_cmp(&b.serve));
    let fastest = req.players.iter().max_by(|a, b| a.speed.total_cmp(&b.speed));

    let mut recommendations = vec![format!("{}: strong title candidate", strongest.name)];
    if let Some(p) = most_consistent {
        recommendations.push(format!("Most consistent player: {}", p.name));
    }
    if let Some(p) = best_server {
        recommendations.push(format!("Best serve: {}", p.name));
    }
    if let Some(p) = fastest {
        recommendations.push(format!("Fastest on court: {}", p.name));
    }

    Ok(Json(AnalyzeResponse {
        status: "success",
        summary,
        insights: vec![
            Insight {
                title: "Standout player".into(),
                content: strongest_line,
            },
            Insight {
                title: "Critical matchup".into(),
                content: matchup_insight,
            },
            Insight {
                title: "Tournament trend".into(),
                content: trend_insight,
            },
            Insight {
                title: "Recommendation".into(),
                content: "Watch defensive players closely in the late rounds".into(),
            },
        ],
        recommendations,
    }))
}

/// POST /predict
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    require_players(&req.players)?;

    let mut rng = state.request_rng();
    let contenders = analyzer::top_contenders(&state.estimator, &req.players, &mut rng);
    let insight = contenders
        .first()
        .map(|top| {
            format!(
                "{} ({}) shows the most complete winning profile with a {} game",
                top.name, top.country, top.style
            )
        })
        .unwrap_or_default();

    Ok(Json(PredictResponse {
        status: "success",
        top_contenders: contenders,
        insight,
        // Fixed headline figure for the UI; the model is a heuristic, not a
        // calibrated probability.
        confidence: 87.5,
    }))
}

/// POST /simulate
async fn simulate_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SimulateRequest>,
) -> Result<Json<SimulateResponse>, ApiError> {
    let mut rng = state.request_rng();
    let result = runner::run(&state.estimator, &req.players, req.bracket, &mut rng)?;
    Ok(Json(SimulateResponse {
        status: "success",
        champion: result.champion,
        results: result.results,
        stats: result.stats,
    }))
}

/// POST /report
async fn report_handler(
    Json(req): Json<ReportRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_players(&req.players)?;
    let content = report::build_report(&req.players, &req.tournament);
    Ok(Json(json!({
        "status": "success",
        "content": content,
        "generated_at": Utc::now().to_rfc3339(),
    })))
}

/// POST /optimize
async fn optimize_handler(
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, ApiError> {
    require_players(&req.players)?;
    let pairs = analyzer::optimal_seeding(&req.players)
        .into_iter()
        .map(|(strong, weak)| SeededPair { strong, weak })
        .collect();
    Ok(Json(OptimizeResponse {
        status: "success",
        pairs,
        explanation: "Bracket designed to keep top seeds apart until the late rounds",
    }))
}
