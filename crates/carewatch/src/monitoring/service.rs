use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{
    AgencyId, Alert, AlertFilter, AlertId, AlertReview, CarerId, ClientId, CorrectionNote,
    ManagerId, ReviewAction, SymptomId, VisitId, VisitRecord, Vitals,
};
use super::repository::{CareStore, Clock, IdGenerator, StoreError};
use super::scoring::RiskScorer;

/// What a carer submits at the end of one visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitSubmission {
    pub client_id: ClientId,
    pub carer_id: CarerId,
    pub agency_id: AgencyId,
    #[serde(default)]
    pub selected_symptoms: Vec<SymptomId>,
    #[serde(default)]
    pub vitals: Vitals,
    #[serde(default)]
    pub note: String,
}

/// Entity kinds named in NotFound errors so callers can render a specific
/// message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Client,
    Carer,
    Visit,
    Alert,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Client => "client",
            ResourceKind::Carer => "carer",
            ResourceKind::Visit => "visit",
            ResourceKind::Alert => "alert",
        };
        f.write_str(name)
    }
}

/// Input rejected before any state is written.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{vital} reading {value} is outside the plausible range {min}..={max}")]
    ImplausibleVital {
        vital: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("correction note text must not be empty")]
    EmptyCorrectionNote,
}

/// Error raised by the care monitoring service.
#[derive(Debug, thiserror::Error)]
pub enum CareServiceError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: ResourceKind, id: String },
    #[error("alert '{0}' has already been reviewed")]
    AlreadyReviewed(AlertId),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CareServiceError {
    fn not_found(kind: ResourceKind, id: impl fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Service composing the risk scorer and the injected store, clock, and id
/// source. Owns visit intake and the alert review lifecycle.
pub struct CareMonitoringService<S, C, G> {
    store: Arc<S>,
    scorer: Arc<RiskScorer>,
    clock: Arc<C>,
    ids: Arc<G>,
}

impl<S, C, G> CareMonitoringService<S, C, G>
where
    S: CareStore + 'static,
    C: Clock + 'static,
    G: IdGenerator + 'static,
{
    pub fn new(store: Arc<S>, scorer: Arc<RiskScorer>, clock: Arc<C>, ids: Arc<G>) -> Self {
        Self {
            store,
            scorer,
            clock,
            ids,
        }
    }

    /// Score and persist one completed observation. Raises an open alert
    /// for the agency's managers if and only if the tier is amber or red.
    /// This is the sole creation path for alerts.
    pub fn record_visit(
        &self,
        submission: VisitSubmission,
    ) -> Result<VisitRecord, CareServiceError> {
        validate_vitals(&submission.vitals)?;
        self.require_client(&submission.agency_id, &submission.client_id)?;
        self.require_carer(&submission.agency_id, &submission.carer_id)?;

        let assessment = self
            .scorer
            .assess(&submission.selected_symptoms, &submission.vitals);
        let recorded_at = self.clock.now();

        let record = VisitRecord {
            id: self.ids.visit_id(),
            client_id: submission.client_id,
            carer_id: submission.carer_id,
            agency_id: submission.agency_id,
            selected_symptoms: submission.selected_symptoms,
            vitals: submission.vitals,
            note: submission.note,
            score: assessment.score,
            risk_level: assessment.risk_level,
            reasons: assessment.reasons,
            recorded_at,
            corrections: Vec::new(),
        };
        let stored = self.store.insert_visit(record)?;

        if stored.risk_level.requires_review() {
            let alert = Alert {
                id: self.ids.alert_id(),
                visit_id: stored.id.clone(),
                client_id: stored.client_id.clone(),
                carer_id: stored.carer_id.clone(),
                agency_id: stored.agency_id.clone(),
                risk_level: stored.risk_level,
                created_at: recorded_at,
                review: None,
            };
            let alert = self.store.insert_alert(alert)?;
            info!(
                alert_id = %alert.id,
                client_id = %alert.client_id,
                tier = alert.risk_level.label(),
                "visit observation raised an alert"
            );
        }

        Ok(stored)
    }

    /// Append a carer-authored correction note to an existing visit record.
    /// The recorded score, tier, and reasons are never altered.
    pub fn add_correction_note(
        &self,
        visit_id: &VisitId,
        carer_id: &CarerId,
        text: &str,
    ) -> Result<VisitRecord, CareServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyCorrectionNote.into());
        }

        let visit = self
            .store
            .fetch_visit(visit_id)?
            .ok_or_else(|| CareServiceError::not_found(ResourceKind::Visit, visit_id))?;
        self.require_carer(&visit.agency_id, carer_id)?;

        let note = CorrectionNote {
            id: self.ids.note_id(),
            carer_id: carer_id.clone(),
            text: text.to_string(),
            added_at: self.clock.now(),
        };

        match self.store.append_correction(visit_id, note) {
            Ok(record) => Ok(record),
            Err(StoreError::NotFound) => {
                Err(CareServiceError::not_found(ResourceKind::Visit, visit_id))
            }
            Err(other) => Err(other.into()),
        }
    }

    pub fn visit(
        &self,
        agency_id: &AgencyId,
        visit_id: &VisitId,
    ) -> Result<VisitRecord, CareServiceError> {
        self.store
            .fetch_visit(visit_id)?
            .filter(|record| &record.agency_id == agency_id)
            .ok_or_else(|| CareServiceError::not_found(ResourceKind::Visit, visit_id))
    }

    /// A client's visit history, most recent first.
    pub fn visits_for_client(
        &self,
        agency_id: &AgencyId,
        client_id: &ClientId,
    ) -> Result<Vec<VisitRecord>, CareServiceError> {
        self.require_client(agency_id, client_id)?;
        let mut records = self.store.visits_for_client(client_id)?;
        records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(records)
    }

    /// One-shot transition of an open alert to reviewed. A second review of
    /// the same alert is an error, not a no-op, regardless of the action
    /// supplied.
    pub fn review_alert(
        &self,
        agency_id: &AgencyId,
        alert_id: &AlertId,
        manager_id: &ManagerId,
        action_taken: ReviewAction,
        note: Option<String>,
    ) -> Result<Alert, CareServiceError> {
        self.store
            .fetch_alert(alert_id)?
            .filter(|alert| &alert.agency_id == agency_id)
            .ok_or_else(|| CareServiceError::not_found(ResourceKind::Alert, alert_id))?;

        let review = AlertReview {
            reviewed_by: manager_id.clone(),
            reviewed_at: self.clock.now(),
            action_taken,
            note: note.filter(|text| !text.trim().is_empty()),
        };

        match self.store.apply_review(alert_id, review) {
            Ok(alert) => {
                info!(
                    alert_id = %alert.id,
                    reviewed_by = %manager_id,
                    action = action_taken.label(),
                    "alert reviewed"
                );
                Ok(alert)
            }
            Err(StoreError::NotFound) => {
                Err(CareServiceError::not_found(ResourceKind::Alert, alert_id))
            }
            Err(StoreError::InvalidTransition) => {
                Err(CareServiceError::AlreadyReviewed(alert_id.clone()))
            }
            Err(other) => Err(other.into()),
        }
    }

    pub fn alert(&self, agency_id: &AgencyId, alert_id: &AlertId) -> Result<Alert, CareServiceError> {
        self.store
            .fetch_alert(alert_id)?
            .filter(|alert| &alert.agency_id == agency_id)
            .ok_or_else(|| CareServiceError::not_found(ResourceKind::Alert, alert_id))
    }

    /// The agency's alerts, newest first. The filter narrows the set but
    /// never changes the ordering.
    pub fn list_alerts(
        &self,
        agency_id: &AgencyId,
        filter: AlertFilter,
    ) -> Result<Vec<Alert>, CareServiceError> {
        let mut alerts = self.store.alerts_for_agency(agency_id)?;
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        alerts.retain(|alert| filter.admits(alert));
        Ok(alerts)
    }

    /// Open-alert count backing the manager dashboard badge.
    pub fn unreviewed_count(&self, agency_id: &AgencyId) -> Result<usize, CareServiceError> {
        Ok(self.list_alerts(agency_id, AlertFilter::Unreviewed)?.len())
    }

    fn require_client(
        &self,
        agency_id: &AgencyId,
        client_id: &ClientId,
    ) -> Result<(), CareServiceError> {
        // A client owned by another agency is reported exactly like a
        // missing one, so ids cannot be probed across tenants.
        self.store
            .fetch_client(client_id)?
            .filter(|client| &client.agency_id == agency_id)
            .map(|_| ())
            .ok_or_else(|| CareServiceError::not_found(ResourceKind::Client, client_id))
    }

    fn require_carer(
        &self,
        agency_id: &AgencyId,
        carer_id: &CarerId,
    ) -> Result<(), CareServiceError> {
        self.store
            .fetch_carer(carer_id)?
            .filter(|carer| &carer.agency_id == agency_id)
            .map(|_| ())
            .ok_or_else(|| CareServiceError::not_found(ResourceKind::Carer, carer_id))
    }
}

const TEMPERATURE_RANGE: (f32, f32) = (25.0, 45.0);
const PULSE_RANGE: (u16, u16) = (20, 250);
const SYSTOLIC_RANGE: (u16, u16) = (50, 300);
const DIASTOLIC_RANGE: (u16, u16) = (20, 200);
const OXYGEN_RANGE: (u8, u8) = (50, 100);
const RESPIRATORY_RANGE: (u16, u16) = (4, 60);

fn validate_vitals(vitals: &Vitals) -> Result<(), ValidationError> {
    if let Some(value) = vitals.temperature {
        check_range("temperature", value, TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1)?;
    }
    if let Some(value) = vitals.pulse {
        check_range("pulse", value as f32, PULSE_RANGE.0 as f32, PULSE_RANGE.1 as f32)?;
    }
    if let Some(value) = vitals.systolic_bp {
        check_range(
            "systolic blood pressure",
            value as f32,
            SYSTOLIC_RANGE.0 as f32,
            SYSTOLIC_RANGE.1 as f32,
        )?;
    }
    if let Some(value) = vitals.diastolic_bp {
        check_range(
            "diastolic blood pressure",
            value as f32,
            DIASTOLIC_RANGE.0 as f32,
            DIASTOLIC_RANGE.1 as f32,
        )?;
    }
    if let Some(value) = vitals.oxygen_saturation {
        check_range(
            "oxygen saturation",
            value as f32,
            OXYGEN_RANGE.0 as f32,
            OXYGEN_RANGE.1 as f32,
        )?;
    }
    if let Some(value) = vitals.respiratory_rate {
        check_range(
            "respiratory rate",
            value as f32,
            RESPIRATORY_RANGE.0 as f32,
            RESPIRATORY_RANGE.1 as f32,
        )?;
    }
    Ok(())
}

fn check_range(vital: &'static str, value: f32, min: f32, max: f32) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::ImplausibleVital {
            vital,
            value,
            min,
            max,
        });
    }
    Ok(())
}
