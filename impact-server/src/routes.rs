use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use impact_core::{
    Assessment, FactPolicy, ImpactEngine, ImpactError, MetricResult, PartialAssessment,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

pub type SharedEngine = Arc<ImpactEngine>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Http { status: StatusCode, message: String },
    #[error(transparent)]
    Impact(#[from] ImpactError),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self::Http {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::Http {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Http { status, .. } => *status,
            ApiError::Impact(err) if err.is_invalid_input() => StatusCode::BAD_REQUEST,
            ApiError::Impact(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Splits a request body into incident facts and an optional seed.
///
/// Accepts `{"incident": {...}, "initialAssessment": {...}}` or a bare facts
/// object.
pub fn parse_evaluation_request(
    mut payload: serde_json::Value,
) -> Result<(serde_json::Value, Option<PartialAssessment>), ImpactError> {
    let Some(obj) = payload.as_object_mut() else {
        return Ok((payload, None));
    };
    let Some(incident) = obj.remove("incident") else {
        return Ok((payload, None));
    };

    let seed = match obj.remove("initialAssessment") {
        None | Some(serde_json::Value::Null) => None,
        Some(raw) => Some(PartialAssessment::from_json(raw)?),
    };
    Ok((incident, seed))
}

pub fn impact_router(engine: SharedEngine) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/config", get(config_view))
        .route("/v1/impact/evaluate", post(evaluate))
        .route("/v1/impact/metrics/:name", post(evaluate_metric))
        .fallback(unknown_route)
        .with_state(engine)
}

#[derive(Debug, Clone, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "impact-server",
    })
}

/// Effective engine settings, in the same camelCase as every other body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigView<'a> {
    evaluation_metrics: &'a [String],
    severity_levels: &'a [String],
    notification_thresholds: BTreeMap<&'a str, ThresholdView>,
    fact_policy: FactPolicy,
    registered_metrics: Vec<&'a str>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThresholdView {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    escalation_time: Option<u32>,
}

async fn config_view(State(engine): State<SharedEngine>) -> Response {
    let config = engine.config();
    let view = ConfigView {
        evaluation_metrics: &config.evaluation_metrics,
        severity_levels: config.severity_levels.levels(),
        notification_thresholds: config
            .notification_thresholds
            .iter()
            .map(|(level, threshold)| {
                let timing = ThresholdView {
                    response_time: threshold.response_time,
                    escalation_time: threshold.escalation_time,
                };
                (level, timing)
            })
            .collect(),
        fact_policy: config.fact_policy,
        registered_metrics: engine.registry().names(),
    };
    Json(view).into_response()
}

async fn evaluate(
    State(engine): State<SharedEngine>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<Assessment>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let (incident, seed) = parse_evaluation_request(payload)?;
    Ok(Json(engine.evaluate_json(&incident, seed)?))
}

async fn evaluate_metric(
    Path(name): Path<String>,
    State(engine): State<SharedEngine>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<MetricResult>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let facts = engine.parse_facts(&payload)?;
    Ok(Json(engine.evaluate_metric(&name, &facts)))
}

async fn unknown_route() -> ApiError {
    ApiError::not_found("no such route")
}
