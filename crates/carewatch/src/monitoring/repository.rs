use chrono::{DateTime, Utc};

use super::domain::{
    AgencyId, Alert, AlertId, AlertReview, Carer, CarerId, Client, ClientId, CorrectionNote,
    NoteId, VisitId, VisitRecord,
};

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record is not in a state that permits this change")]
    InvalidTransition,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction injected into the monitoring and directory services.
///
/// Implementations must execute each method as one isolated transaction:
/// reads observe a consistent snapshot, and the read-modify-write methods
/// (`append_correction`, `apply_review`) are atomic: two concurrent
/// `apply_review` calls on the same alert must not both succeed.
pub trait CareStore: Send + Sync {
    fn insert_client(&self, client: Client) -> Result<Client, StoreError>;
    fn update_client(&self, client: Client) -> Result<(), StoreError>;
    fn fetch_client(&self, id: &ClientId) -> Result<Option<Client>, StoreError>;
    fn clients_for_agency(&self, agency_id: &AgencyId) -> Result<Vec<Client>, StoreError>;

    fn insert_carer(&self, carer: Carer) -> Result<Carer, StoreError>;
    fn update_carer(&self, carer: Carer) -> Result<(), StoreError>;
    fn fetch_carer(&self, id: &CarerId) -> Result<Option<Carer>, StoreError>;
    fn carers_for_agency(&self, agency_id: &AgencyId) -> Result<Vec<Carer>, StoreError>;

    fn insert_visit(&self, record: VisitRecord) -> Result<VisitRecord, StoreError>;
    fn fetch_visit(&self, id: &VisitId) -> Result<Option<VisitRecord>, StoreError>;
    /// Atomically append a correction note to an existing visit record.
    fn append_correction(
        &self,
        visit_id: &VisitId,
        note: CorrectionNote,
    ) -> Result<VisitRecord, StoreError>;
    fn visits_for_client(&self, client_id: &ClientId) -> Result<Vec<VisitRecord>, StoreError>;

    fn insert_alert(&self, alert: Alert) -> Result<Alert, StoreError>;
    fn fetch_alert(&self, id: &AlertId) -> Result<Option<Alert>, StoreError>;
    /// Atomically transition an open alert to reviewed. Returns
    /// `InvalidTransition` when the alert has already been reviewed.
    fn apply_review(&self, alert_id: &AlertId, review: AlertReview) -> Result<Alert, StoreError>;
    fn alerts_for_agency(&self, agency_id: &AgencyId) -> Result<Vec<Alert>, StoreError>;
}

/// Time source for record and review timestamps, injectable so tests run
/// against a fixed instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of unique identifiers for newly created entities. Uniqueness must
/// hold for the lifetime of an agency's dataset.
pub trait IdGenerator: Send + Sync {
    fn client_id(&self) -> ClientId;
    fn carer_id(&self) -> CarerId;
    fn visit_id(&self) -> VisitId;
    fn alert_id(&self) -> AlertId;
    fn note_id(&self) -> NoteId;
}
