use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Map, Value};

use super::domain::{InputError, RawApplication};
use super::gateway::Classifier;
use super::service::RiskScoringService;

/// Router builder exposing the form, JSON, and statistics endpoints.
pub fn risk_router<C>(service: Arc<RiskScoringService<C>>) -> Router
where
    C: Classifier + 'static,
{
    Router::new()
        .route("/predict", post(form_predict_handler::<C>))
        .route("/api/v1/risk/predictions", post(json_predict_handler::<C>))
        .route("/api/v1/risk/stats", get(stats_handler::<C>))
        .with_state(service)
}

/// Form submission path. Input errors surface as raw text, mirroring the legacy page.
pub(crate) async fn form_predict_handler<C>(
    State(service): State<Arc<RiskScoringService<C>>>,
    Form(fields): Form<HashMap<String, String>>,
) -> Response
where
    C: Classifier + 'static,
{
    match service.score(&RawApplication::new(fields)) {
        Ok(assessment) => Html(render_result_page(assessment.risk.label())).into_response(),
        Err(error) => (
            StatusCode::BAD_REQUEST,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("An error occurred: {error}"),
        )
            .into_response(),
    }
}

pub(crate) async fn json_predict_handler<C>(
    State(service): State<Arc<RiskScoringService<C>>>,
    Json(payload): Json<Map<String, Value>>,
) -> Response
where
    C: Classifier + 'static,
{
    let scored = raw_from_json(payload).and_then(|raw| service.score(&raw));
    match scored {
        Ok(assessment) => (StatusCode::OK, Json(assessment)).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn stats_handler<C>(
    State(service): State<Arc<RiskScoringService<C>>>,
) -> Response
where
    C: Classifier + 'static,
{
    (StatusCode::OK, Json(service.stats())).into_response()
}

/// JSON clients may send numbers directly; everything else must be a string.
pub fn raw_from_json(payload: Map<String, Value>) -> Result<RawApplication, InputError> {
    let mut raw = RawApplication::default();
    for (field, value) in payload {
        let text = match value {
            Value::String(text) => text,
            Value::Number(number) => number.to_string(),
            _ => return Err(InputError::UnsupportedValue { field }),
        };
        raw.insert(field, text);
    }
    Ok(raw)
}

fn render_result_page(risk: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Loan Risk Prediction</title></head>\n\
         <body>\n<h1>Prediction Result</h1>\n<p>Predicted loan risk: <strong>{risk}</strong></p>\n\
         </body>\n</html>\n"
    )
}
