use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    AgencyId, Alert, AlertFilter, AlertId, CareOperation, CarerId, ClientId, ManagerId,
    ReviewAction, SymptomId, UserRole, VisitId, VisitRecord, Vitals,
};
use super::repository::{CareStore, Clock, IdGenerator};
use super::service::{CareMonitoringService, CareServiceError, VisitSubmission};

/// Router builder exposing the care monitoring endpoints.
pub fn care_router<S, C, G>(service: Arc<CareMonitoringService<S, C, G>>) -> Router
where
    S: CareStore + 'static,
    C: Clock + 'static,
    G: IdGenerator + 'static,
{
    Router::new()
        .route("/api/v1/care/visits", post(record_visit_handler::<S, C, G>))
        .route(
            "/api/v1/care/visits/:visit_id",
            get(visit_handler::<S, C, G>),
        )
        .route(
            "/api/v1/care/visits/:visit_id/corrections",
            post(correction_handler::<S, C, G>),
        )
        .route(
            "/api/v1/care/clients/:client_id/visits",
            get(client_visits_handler::<S, C, G>),
        )
        .route("/api/v1/care/alerts", get(list_alerts_handler::<S, C, G>))
        .route(
            "/api/v1/care/alerts/unreviewed-count",
            get(unreviewed_count_handler::<S, C, G>),
        )
        .route(
            "/api/v1/care/alerts/:alert_id",
            get(alert_handler::<S, C, G>),
        )
        .route(
            "/api/v1/care/alerts/:alert_id/review",
            post(review_alert_handler::<S, C, G>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecordVisitRequest {
    pub(crate) actor_role: UserRole,
    pub(crate) client_id: String,
    pub(crate) carer_id: String,
    pub(crate) agency_id: String,
    #[serde(default)]
    pub(crate) selected_symptoms: Vec<String>,
    #[serde(default)]
    pub(crate) vitals: Vitals,
    #[serde(default)]
    pub(crate) note: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CorrectionRequest {
    pub(crate) actor_role: UserRole,
    pub(crate) carer_id: String,
    pub(crate) text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewAlertRequest {
    pub(crate) actor_role: UserRole,
    pub(crate) agency_id: String,
    pub(crate) manager_id: String,
    pub(crate) action_taken: ReviewAction,
    #[serde(default)]
    pub(crate) note: Option<String>,
}

/// Identity supplied on read endpoints; trusted as given per the session
/// contract with the identity layer.
#[derive(Debug, Deserialize)]
pub(crate) struct ReadScope {
    pub(crate) actor_role: UserRole,
    pub(crate) agency_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlertListScope {
    pub(crate) actor_role: UserRole,
    pub(crate) agency_id: String,
    #[serde(default)]
    pub(crate) filter: AlertFilter,
}

/// Visit record as rendered to API consumers.
#[derive(Debug, Serialize)]
pub struct VisitView {
    pub id: String,
    pub client_id: String,
    pub carer_id: String,
    pub agency_id: String,
    pub selected_symptoms: Vec<String>,
    pub vitals: Vitals,
    pub note: String,
    pub score: u32,
    pub risk_level: &'static str,
    pub reasons: Vec<String>,
    pub recorded_at: DateTime<Utc>,
    pub corrections: Vec<CorrectionView>,
}

#[derive(Debug, Serialize)]
pub struct CorrectionView {
    pub id: String,
    pub carer_id: String,
    pub text: String,
    pub added_at: DateTime<Utc>,
}

impl From<&VisitRecord> for VisitView {
    fn from(record: &VisitRecord) -> Self {
        Self {
            id: record.id.0.clone(),
            client_id: record.client_id.0.clone(),
            carer_id: record.carer_id.0.clone(),
            agency_id: record.agency_id.0.clone(),
            selected_symptoms: record
                .selected_symptoms
                .iter()
                .map(|id| id.0.clone())
                .collect(),
            vitals: record.vitals,
            note: record.note.clone(),
            score: record.score,
            risk_level: record.risk_level.label(),
            reasons: record.reasons.clone(),
            recorded_at: record.recorded_at,
            corrections: record
                .corrections
                .iter()
                .map(|note| CorrectionView {
                    id: note.id.0.clone(),
                    carer_id: note.carer_id.0.clone(),
                    text: note.text.clone(),
                    added_at: note.added_at,
                })
                .collect(),
        }
    }
}

/// Alert as rendered to API consumers.
#[derive(Debug, Serialize)]
pub struct AlertView {
    pub id: String,
    pub visit_id: String,
    pub client_id: String,
    pub carer_id: String,
    pub agency_id: String,
    pub risk_level: &'static str,
    pub is_reviewed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_taken: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Alert> for AlertView {
    fn from(alert: &Alert) -> Self {
        Self {
            id: alert.id.0.clone(),
            visit_id: alert.visit_id.0.clone(),
            client_id: alert.client_id.0.clone(),
            carer_id: alert.carer_id.0.clone(),
            agency_id: alert.agency_id.0.clone(),
            risk_level: alert.risk_level.label(),
            is_reviewed: alert.is_reviewed(),
            reviewed_by: alert
                .review
                .as_ref()
                .map(|review| review.reviewed_by.0.clone()),
            reviewed_at: alert.review.as_ref().map(|review| review.reviewed_at),
            action_taken: alert
                .review
                .as_ref()
                .map(|review| review.action_taken.label()),
            manager_note: alert.review.as_ref().and_then(|review| review.note.clone()),
            created_at: alert.created_at,
        }
    }
}

pub(crate) async fn record_visit_handler<S, C, G>(
    State(service): State<Arc<CareMonitoringService<S, C, G>>>,
    axum::Json(request): axum::Json<RecordVisitRequest>,
) -> Response
where
    S: CareStore + 'static,
    C: Clock + 'static,
    G: IdGenerator + 'static,
{
    if let Err(response) = authorize(request.actor_role, CareOperation::RecordVisit) {
        return response;
    }

    let submission = VisitSubmission {
        client_id: ClientId(request.client_id),
        carer_id: CarerId(request.carer_id),
        agency_id: AgencyId(request.agency_id),
        selected_symptoms: request.selected_symptoms.into_iter().map(SymptomId).collect(),
        vitals: request.vitals,
        note: request.note,
    };

    match service.record_visit(submission) {
        Ok(record) => {
            let view = VisitView::from(&record);
            (StatusCode::CREATED, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn visit_handler<S, C, G>(
    State(service): State<Arc<CareMonitoringService<S, C, G>>>,
    Path(visit_id): Path<String>,
    Query(scope): Query<ReadScope>,
) -> Response
where
    S: CareStore + 'static,
    C: Clock + 'static,
    G: IdGenerator + 'static,
{
    if let Err(response) = authorize(scope.actor_role, CareOperation::ViewVisits) {
        return response;
    }

    match service.visit(&AgencyId(scope.agency_id), &VisitId(visit_id)) {
        Ok(record) => {
            let view = VisitView::from(&record);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn correction_handler<S, C, G>(
    State(service): State<Arc<CareMonitoringService<S, C, G>>>,
    Path(visit_id): Path<String>,
    axum::Json(request): axum::Json<CorrectionRequest>,
) -> Response
where
    S: CareStore + 'static,
    C: Clock + 'static,
    G: IdGenerator + 'static,
{
    if let Err(response) = authorize(request.actor_role, CareOperation::AmendVisit) {
        return response;
    }

    match service.add_correction_note(
        &VisitId(visit_id),
        &CarerId(request.carer_id),
        &request.text,
    ) {
        Ok(record) => {
            let view = VisitView::from(&record);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn client_visits_handler<S, C, G>(
    State(service): State<Arc<CareMonitoringService<S, C, G>>>,
    Path(client_id): Path<String>,
    Query(scope): Query<ReadScope>,
) -> Response
where
    S: CareStore + 'static,
    C: Clock + 'static,
    G: IdGenerator + 'static,
{
    if let Err(response) = authorize(scope.actor_role, CareOperation::ViewVisits) {
        return response;
    }

    match service.visits_for_client(&AgencyId(scope.agency_id), &ClientId(client_id)) {
        Ok(records) => {
            let views: Vec<VisitView> = records.iter().map(VisitView::from).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_alerts_handler<S, C, G>(
    State(service): State<Arc<CareMonitoringService<S, C, G>>>,
    Query(scope): Query<AlertListScope>,
) -> Response
where
    S: CareStore + 'static,
    C: Clock + 'static,
    G: IdGenerator + 'static,
{
    if let Err(response) = authorize(scope.actor_role, CareOperation::ViewAlerts) {
        return response;
    }

    match service.list_alerts(&AgencyId(scope.agency_id), scope.filter) {
        Ok(alerts) => {
            let views: Vec<AlertView> = alerts.iter().map(AlertView::from).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn unreviewed_count_handler<S, C, G>(
    State(service): State<Arc<CareMonitoringService<S, C, G>>>,
    Query(scope): Query<ReadScope>,
) -> Response
where
    S: CareStore + 'static,
    C: Clock + 'static,
    G: IdGenerator + 'static,
{
    if let Err(response) = authorize(scope.actor_role, CareOperation::ViewAlerts) {
        return response;
    }

    match service.unreviewed_count(&AgencyId(scope.agency_id)) {
        Ok(count) => (StatusCode::OK, axum::Json(json!({ "unreviewed": count }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn alert_handler<S, C, G>(
    State(service): State<Arc<CareMonitoringService<S, C, G>>>,
    Path(alert_id): Path<String>,
    Query(scope): Query<ReadScope>,
) -> Response
where
    S: CareStore + 'static,
    C: Clock + 'static,
    G: IdGenerator + 'static,
{
    if let Err(response) = authorize(scope.actor_role, CareOperation::ViewAlerts) {
        return response;
    }

    match service.alert(&AgencyId(scope.agency_id), &AlertId(alert_id)) {
        Ok(alert) => {
            let view = AlertView::from(&alert);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn review_alert_handler<S, C, G>(
    State(service): State<Arc<CareMonitoringService<S, C, G>>>,
    Path(alert_id): Path<String>,
    axum::Json(request): axum::Json<ReviewAlertRequest>,
) -> Response
where
    S: CareStore + 'static,
    C: Clock + 'static,
    G: IdGenerator + 'static,
{
    if let Err(response) = authorize(request.actor_role, CareOperation::ReviewAlert) {
        return response;
    }

    match service.review_alert(
        &AgencyId(request.agency_id),
        &AlertId(alert_id),
        &ManagerId(request.manager_id),
        request.action_taken,
        request.note,
    ) {
        Ok(alert) => {
            let view = AlertView::from(&alert);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

/// Exhaustive role gate applied before any service call.
fn authorize(role: UserRole, operation: CareOperation) -> Result<(), Response> {
    if role.permits(operation) {
        return Ok(());
    }

    let payload = json!({
        "error": format!("role '{:?}' may not perform this operation", role),
    });
    Err((StatusCode::FORBIDDEN, axum::Json(payload)).into_response())
}

fn error_response(error: CareServiceError) -> Response {
    match error {
        CareServiceError::Validation(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        CareServiceError::NotFound { kind, id } => {
            let payload = json!({
                "error": format!("{kind} '{id}' not found"),
                "kind": kind.to_string(),
                "id": id,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        CareServiceError::AlreadyReviewed(alert_id) => {
            let payload = json!({
                "error": format!("alert '{alert_id}' has already been reviewed"),
                "alert_id": alert_id.0,
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
