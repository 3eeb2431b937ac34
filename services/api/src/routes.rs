use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use loan_risk::scoring::{risk_router, Classifier, RiskScoringService};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_operational_routes<C>(service: Arc<RiskScoringService<C>>) -> axum::Router
where
    C: Classifier + 'static,
{
    risk_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/model", axum::routing::get(model_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Acquire);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready", "model": state.model.name })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn model_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.model.as_ref().clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::Utc;
    use loan_risk::scoring::{ClassifierError, EncodedFeatureVector, FeatureColumn, ModelInfo};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    struct MediumRisk;

    impl Classifier for MediumRisk {
        fn predict(&self, rows: &[EncodedFeatureVector]) -> Result<Vec<i64>, ClassifierError> {
            Ok(vec![1; rows.len()])
        }
    }

    fn state(ready: bool) -> AppState {
        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
            model: Arc::new(ModelInfo {
                name: "stub-forest".to_string(),
                tree_count: 3,
                max_depth: 4,
                classes: vec![0, 1, 2],
                feature_names: FeatureColumn::ALL
                    .iter()
                    .map(|column| column.name().to_string())
                    .collect(),
                source: Some("model/predictor.json".to_string()),
                loaded_at: Utc::now(),
            }),
        }
    }

    fn app(ready: bool) -> axum::Router {
        let service = Arc::new(RiskScoringService::with_standard_mappings(Arc::new(
            MediumRisk,
        )));
        with_operational_routes(service).layer(Extension(state(ready)))
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    #[tokio::test]
    async fn readiness_reflects_listener_state() {
        let response = app(false)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app(true)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["model"], "stub-forest");
    }

    #[tokio::test]
    async fn model_endpoint_describes_the_loaded_artifact() {
        let response = app(true)
            .oneshot(
                Request::get("/api/v1/model")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["tree_count"], 3);
        assert_eq!(body["feature_names"][0], "Age");
        assert_eq!(body["feature_names"][18], "Marital_Status_change");
    }

    #[tokio::test]
    async fn health_and_scoring_routes_share_the_router() {
        let response = app(true)
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app(true)
            .oneshot(
                Request::get("/api/v1/risk/stats")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router responds");
        assert_eq!(json_body(response).await["predictions"], 0);
    }
}
