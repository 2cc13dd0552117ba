use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;

use super::domain::{ProductionSubmission, VerificationId};
use super::evaluation::VerificationVerdict;
use super::repository::{
    CreditLedger, IssuedCredit, RepositoryError, VerificationRepository, VerificationStatusView,
};
use super::service::{VerificationService, VerificationServiceError};

/// Router builder exposing HTTP endpoints for submission, preview, and status lookups.
pub fn verification_router<R, L>(service: Arc<VerificationService<R, L>>) -> Router
where
    R: VerificationRepository + 'static,
    L: CreditLedger + 'static,
{
    Router::new()
        .route("/api/v1/verifications", post(submit_handler::<R, L>))
        .route(
            "/api/v1/verifications/preview",
            post(preview_handler::<R, L>),
        )
        .route(
            "/api/v1/verifications/:verification_id",
            get(status_handler::<R, L>),
        )
        .route(
            "/api/v1/producers/:producer_id/verifications",
            get(producer_handler::<R, L>),
        )
        .with_state(service)
}

#[derive(Debug, Serialize)]
struct SubmissionResponse<'a> {
    verification_id: &'a VerificationId,
    status: &'static str,
    credit_created: bool,
    replayed: bool,
    credit: Option<&'a IssuedCredit>,
    verdict: &'a VerificationVerdict,
}

#[derive(Debug, Serialize)]
struct PreviewResponse<'a> {
    #[serde(flatten)]
    verdict: &'a VerificationVerdict,
    recommendation: &'static str,
}

pub(crate) async fn submit_handler<R, L>(
    State(service): State<Arc<VerificationService<R, L>>>,
    axum::Json(submission): axum::Json<ProductionSubmission>,
) -> Response
where
    R: VerificationRepository + 'static,
    L: CreditLedger + 'static,
{
    match service.submit(submission) {
        Ok(outcome) => {
            let record = &outcome.record;
            let body = SubmissionResponse {
                verification_id: &record.verification_id,
                status: record.status.label(),
                credit_created: outcome.credit_created,
                replayed: outcome.replayed,
                credit: record.credit.as_ref(),
                verdict: &record.verdict,
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn preview_handler<R, L>(
    State(service): State<Arc<VerificationService<R, L>>>,
    axum::Json(submission): axum::Json<ProductionSubmission>,
) -> Response
where
    R: VerificationRepository + 'static,
    L: CreditLedger + 'static,
{
    match service.preview(&submission) {
        Ok(verdict) => {
            let recommendation = if verdict.is_valid {
                "APPROVED"
            } else {
                "REJECTED"
            };
            let body = PreviewResponse {
                verdict: &verdict,
                recommendation,
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R, L>(
    State(service): State<Arc<VerificationService<R, L>>>,
    Path(verification_id): Path<String>,
) -> Response
where
    R: VerificationRepository + 'static,
    L: CreditLedger + 'static,
{
    let id = VerificationId(verification_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(VerificationServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "error": "verification not found",
                "verification_id": id.0,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => error_response(other),
    }
}

pub(crate) async fn producer_handler<R, L>(
    State(service): State<Arc<VerificationService<R, L>>>,
    Path(producer_id): Path<String>,
) -> Response
where
    R: VerificationRepository + 'static,
    L: CreditLedger + 'static,
{
    match service.for_producer(&producer_id) {
        Ok(records) => {
            let views: Vec<VerificationStatusView> =
                records.iter().map(|record| record.status_view()).collect();
            let payload = json!({
                "producer_id": producer_id,
                "total": views.len(),
                "verifications": views,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: VerificationServiceError) -> Response {
    let status = if error.is_invalid_submission() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
