use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use h2_verify::verification::{
    verification_router, CreditLedger, VerificationRepository, VerificationService,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_verification_routes<R, L>(
    service: Arc<VerificationService<R, L>>,
) -> axum::Router
where
    R: VerificationRepository + 'static,
    L: CreditLedger + 'static,
{
    verification_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{InMemoryCreditLedger, InMemoryVerificationRepository};
    use axum::body::Body;
    use axum::http::Request;
    use h2_verify::verification::{ProductionMethod, ProductionSubmission, VerificationEngine};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app(ready: bool) -> (axum::Router, InMemoryCreditLedger) {
        let ledger = InMemoryCreditLedger::default();
        let service = Arc::new(VerificationService::new(
            Arc::new(InMemoryVerificationRepository::default()),
            Arc::new(ledger.clone()),
            VerificationEngine::standard(),
            2.5,
        ));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        let router = with_verification_routes(service).layer(Extension(state));
        (router, ledger)
    }

    fn submission(key: &str) -> ProductionSubmission {
        ProductionSubmission {
            submission_key: key.to_string(),
            producer_id: "fjord-hydrogen".to_string(),
            energy_mwh: 50.0,
            h2_kg: 1000.0,
            production_method: ProductionMethod::Wind,
            production_date: Some("2025-02-10".to_string()),
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_tracks_startup_flag() {
        let (router, _) = app(false);
        let response = router
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let (router, _) = app(true);
        let response = router
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ready");
    }

    #[tokio::test]
    async fn metrics_render_as_prometheus_text() {
        let (router, _) = app(true);
        let response = router
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn duplicate_submissions_mint_one_credit() {
        let (router, ledger) = app(true);

        let mut verification_ids = Vec::new();
        for _ in 0..2 {
            let response = router
                .clone()
                .oneshot(
                    Request::post("/api/v1/verifications")
                        .header(header::CONTENT_TYPE, "application/json")
                        .body(Body::from(
                            serde_json::to_vec(&submission("fjord-2025-02")).unwrap(),
                        ))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body = body_json(response).await;
            verification_ids.push(body["verification_id"].clone());
        }

        assert_eq!(verification_ids[0], verification_ids[1]);
        let issued = ledger.issued();
        assert_eq!(issued.len(), 1);
        assert!(issued[0].credit_id.0.starts_with("CREDIT-"));
        assert_eq!(issued[0].name, "Wind H₂ Credit - 1000kg");
    }
}
