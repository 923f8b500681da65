use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::monitoring::catalog::SymptomCatalog;
use crate::monitoring::domain::{
    AgencyId, Alert, AlertId, AlertReview, Carer, CarerId, Client, ClientId, CorrectionNote,
    NoteId, SymptomId, VisitId, VisitRecord, Vitals,
};
use crate::monitoring::repository::{CareStore, Clock, IdGenerator, StoreError};
use crate::monitoring::scoring::{RiskScorer, ScoringConfig};
use crate::monitoring::service::{CareMonitoringService, VisitSubmission};
use crate::monitoring::DirectoryService;

pub(super) type TestService = CareMonitoringService<MemoryStore, SteppingClock, SequentialIds>;
pub(super) type TestDirectory = DirectoryService<MemoryStore, SteppingClock, SequentialIds>;

pub(super) fn agency() -> AgencyId {
    AgencyId("agency-1".to_string())
}

pub(super) fn other_agency() -> AgencyId {
    AgencyId("agency-2".to_string())
}

/// Store, clock, and id fixtures shared by every service-level test.
pub(super) fn build_services() -> (Arc<TestService>, Arc<TestDirectory>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let clock = Arc::new(SteppingClock::starting_at(base_time(), Duration::minutes(1)));
    let ids = Arc::new(SequentialIds::default());
    let scorer = Arc::new(RiskScorer::standard());

    let service = Arc::new(CareMonitoringService::new(
        store.clone(),
        scorer,
        clock.clone(),
        ids.clone(),
    ));
    let directory = Arc::new(DirectoryService::new(store.clone(), clock, ids));
    (service, directory, store)
}

/// Register an active client and an active carer under the default agency.
pub(super) fn seed_agency(directory: &TestDirectory) -> (AgencyId, ClientId, CarerId) {
    let agency = agency();
    let client = directory
        .register_client(&agency, "Margaret H.", Some("MH-104".to_string()))
        .expect("client registers");
    let carer = directory
        .register_carer(&agency, "Priya Sharma", "priya@agency-one.example")
        .expect("carer registers");
    let carer = directory.activate_carer(&carer.id).expect("carer activates");
    (agency, client.id, carer.id)
}

pub(super) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 3, 9, 0, 0).single().expect("valid base time")
}

pub(super) fn submission(
    agency_id: &AgencyId,
    client_id: &ClientId,
    carer_id: &CarerId,
) -> VisitSubmission {
    VisitSubmission {
        client_id: client_id.clone(),
        carer_id: carer_id.clone(),
        agency_id: agency_id.clone(),
        selected_symptoms: Vec::new(),
        vitals: Vitals::default(),
        note: "Routine morning call".to_string(),
    }
}

pub(super) fn symptom_ids(ids: &[&str]) -> Vec<SymptomId> {
    ids.iter().map(|id| SymptomId::new(*id)).collect()
}

/// Minimal catalog with known point values for boundary tests.
pub(super) fn test_catalog() -> SymptomCatalog {
    use crate::monitoring::catalog::{Symptom, SymptomCategory};

    SymptomCatalog::new(vec![SymptomCategory {
        id: "test".to_string(),
        name: "Test".to_string(),
        symptoms: vec![
            Symptom {
                id: SymptomId::new("s-1"),
                label: "One point".to_string(),
                points: 1,
            },
            Symptom {
                id: SymptomId::new("s-2"),
                label: "Two points".to_string(),
                points: 2,
            },
            Symptom {
                id: SymptomId::new("s-3"),
                label: "Three points".to_string(),
                points: 3,
            },
        ],
    }])
}

pub(super) fn test_scorer() -> RiskScorer {
    RiskScorer::new(Arc::new(test_catalog()), ScoringConfig::default())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Clock returning a strictly advancing timestamp per call so creation
/// times are distinct and ordering assertions are meaningful.
pub(super) struct SteppingClock {
    next: Mutex<DateTime<Utc>>,
    step: Duration,
}

impl SteppingClock {
    pub(super) fn starting_at(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            next: Mutex::new(start),
            step,
        }
    }

}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut guard = self.next.lock().expect("clock mutex poisoned");
        let current = *guard;
        *guard = current + self.step;
        current
    }
}

/// Prefixed sequence ids, unique per generator instance.
#[derive(Default)]
pub(super) struct SequentialIds {
    counter: AtomicU64,
}

impl SequentialIds {
    fn next(&self, prefix: &str) -> String {
        let id = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}-{id:06}")
    }
}

impl IdGenerator for SequentialIds {
    fn client_id(&self) -> ClientId {
        ClientId(self.next("client"))
    }

    fn carer_id(&self) -> CarerId {
        CarerId(self.next("carer"))
    }

    fn visit_id(&self) -> VisitId {
        VisitId(self.next("visit"))
    }

    fn alert_id(&self) -> AlertId {
        AlertId(self.next("alert"))
    }

    fn note_id(&self) -> NoteId {
        NoteId(self.next("note"))
    }
}

#[derive(Default)]
struct StoreState {
    clients: HashMap<ClientId, Client>,
    carers: HashMap<CarerId, Carer>,
    visits: HashMap<VisitId, VisitRecord>,
    alerts: HashMap<AlertId, Alert>,
}

/// Mutex-backed in-memory store; a single lock keeps every operation an
/// isolated transaction.
#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub(super) fn visit_count(&self) -> usize {
        self.state.lock().expect("store mutex poisoned").visits.len()
    }

    pub(super) fn alert_count(&self) -> usize {
        self.state.lock().expect("store mutex poisoned").alerts.len()
    }
}

impl CareStore for MemoryStore {
    fn insert_client(&self, client: Client) -> Result<Client, StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if state.clients.contains_key(&client.id) {
            return Err(StoreError::Conflict);
        }
        state.clients.insert(client.id.clone(), client.clone());
        Ok(client)
    }

    fn update_client(&self, client: Client) -> Result<(), StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if !state.clients.contains_key(&client.id) {
            return Err(StoreError::NotFound);
        }
        state.clients.insert(client.id.clone(), client);
        Ok(())
    }

    fn fetch_client(&self, id: &ClientId) -> Result<Option<Client>, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.clients.get(id).cloned())
    }

    fn clients_for_agency(&self, agency_id: &AgencyId) -> Result<Vec<Client>, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .clients
            .values()
            .filter(|client| &client.agency_id == agency_id)
            .cloned()
            .collect())
    }

    fn insert_carer(&self, carer: Carer) -> Result<Carer, StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if state.carers.contains_key(&carer.id) {
            return Err(StoreError::Conflict);
        }
        state.carers.insert(carer.id.clone(), carer.clone());
        Ok(carer)
    }

    fn update_carer(&self, carer: Carer) -> Result<(), StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if !state.carers.contains_key(&carer.id) {
            return Err(StoreError::NotFound);
        }
        state.carers.insert(carer.id.clone(), carer);
        Ok(())
    }

    fn fetch_carer(&self, id: &CarerId) -> Result<Option<Carer>, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.carers.get(id).cloned())
    }

    fn carers_for_agency(&self, agency_id: &AgencyId) -> Result<Vec<Carer>, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .carers
            .values()
            .filter(|carer| &carer.agency_id == agency_id)
            .cloned()
            .collect())
    }

    fn insert_visit(&self, record: VisitRecord) -> Result<VisitRecord, StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if state.visits.contains_key(&record.id) {
            return Err(StoreError::Conflict);
        }
        state.visits.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch_visit(&self, id: &VisitId) -> Result<Option<VisitRecord>, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.visits.get(id).cloned())
    }

    fn append_correction(
        &self,
        visit_id: &VisitId,
        note: CorrectionNote,
    ) -> Result<VisitRecord, StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        let record = state.visits.get_mut(visit_id).ok_or(StoreError::NotFound)?;
        record.corrections.push(note);
        Ok(record.clone())
    }

    fn visits_for_client(&self, client_id: &ClientId) -> Result<Vec<VisitRecord>, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .visits
            .values()
            .filter(|record| &record.client_id == client_id)
            .cloned()
            .collect())
    }

    fn insert_alert(&self, alert: Alert) -> Result<Alert, StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if state.alerts.contains_key(&alert.id) {
            return Err(StoreError::Conflict);
        }
        state.alerts.insert(alert.id.clone(), alert.clone());
        Ok(alert)
    }

    fn fetch_alert(&self, id: &AlertId) -> Result<Option<Alert>, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.alerts.get(id).cloned())
    }

    fn apply_review(&self, alert_id: &AlertId, review: AlertReview) -> Result<Alert, StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        let alert = state.alerts.get_mut(alert_id).ok_or(StoreError::NotFound)?;
        if alert.review.is_some() {
            return Err(StoreError::InvalidTransition);
        }
        alert.review = Some(review);
        Ok(alert.clone())
    }

    fn alerts_for_agency(&self, agency_id: &AgencyId) -> Result<Vec<Alert>, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .alerts
            .values()
            .filter(|alert| &alert.agency_id == agency_id)
            .cloned()
            .collect())
    }
}

/// Store whose every method fails, for exercising the 500 path.
pub(super) struct UnavailableStore;

impl CareStore for UnavailableStore {
    fn insert_client(&self, _client: Client) -> Result<Client, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn update_client(&self, _client: Client) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn fetch_client(&self, _id: &ClientId) -> Result<Option<Client>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn clients_for_agency(&self, _agency_id: &AgencyId) -> Result<Vec<Client>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn insert_carer(&self, _carer: Carer) -> Result<Carer, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn update_carer(&self, _carer: Carer) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn fetch_carer(&self, _id: &CarerId) -> Result<Option<Carer>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn carers_for_agency(&self, _agency_id: &AgencyId) -> Result<Vec<Carer>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn insert_visit(&self, _record: VisitRecord) -> Result<VisitRecord, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn fetch_visit(&self, _id: &VisitId) -> Result<Option<VisitRecord>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn append_correction(
        &self,
        _visit_id: &VisitId,
        _note: CorrectionNote,
    ) -> Result<VisitRecord, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn visits_for_client(&self, _client_id: &ClientId) -> Result<Vec<VisitRecord>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn insert_alert(&self, _alert: Alert) -> Result<Alert, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn fetch_alert(&self, _id: &AlertId) -> Result<Option<Alert>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn apply_review(&self, _alert_id: &AlertId, _review: AlertReview) -> Result<Alert, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn alerts_for_agency(&self, _agency_id: &AgencyId) -> Result<Vec<Alert>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }
}
