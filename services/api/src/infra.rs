use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use carewatch::monitoring::{
    AgencyId, Alert, AlertId, AlertReview, CareMonitoringService, CareStore, Carer, CarerId,
    Client, ClientId, Clock, CorrectionNote, DirectoryService, IdGenerator, NoteId, RiskScorer,
    StoreError, VisitId, VisitRecord,
};
use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type CareService = CareMonitoringService<InMemoryCareStore, SystemClock, SequenceIds>;
pub(crate) type CareDirectory = DirectoryService<InMemoryCareStore, SystemClock, SequenceIds>;

/// Wire the default in-process infrastructure: one shared in-memory store,
/// the system clock, and prefixed sequence ids.
pub(crate) fn build_services() -> (Arc<CareService>, Arc<CareDirectory>) {
    let store = Arc::new(InMemoryCareStore::default());
    let clock = Arc::new(SystemClock);
    let ids = Arc::new(SequenceIds::default());
    let scorer = Arc::new(RiskScorer::standard());

    let service = Arc::new(CareMonitoringService::new(
        store.clone(),
        scorer,
        clock.clone(),
        ids.clone(),
    ));
    let directory = Arc::new(DirectoryService::new(store, clock, ids));
    (service, directory)
}

/// Seed the in-memory directory with the development fixture agency so the
/// HTTP surface is exercisable straight after boot.
pub(crate) fn seed_development_data(
    directory: &Arc<CareDirectory>,
) -> Result<(), carewatch::monitoring::DirectoryError> {
    let agency = AgencyId("agency-1".to_string());

    let margaret = directory.register_client(&agency, "Margaret H.", Some("MH-001".to_string()))?;
    let robert = directory.register_client(&agency, "Robert P.", Some("RP-002".to_string()))?;
    let dorothy = directory.register_client(&agency, "Dorothy M.", Some("DM-003".to_string()))?;
    let william = directory.register_client(&agency, "William T.", Some("WT-004".to_string()))?;

    let emma = directory.register_carer(&agency, "Emma Wilson", "emma.wilson@sunrisecare.co.uk")?;
    let emma = directory.activate_carer(&emma.id)?;
    let james = directory.register_carer(&agency, "James Taylor", "james.taylor@sunrisecare.co.uk")?;
    let james = directory.activate_carer(&james.id)?;

    for client in [&margaret.id, &robert.id, &dorothy.id] {
        directory.assign_carer(client, &emma.id)?;
    }
    for client in [&robert.id, &william.id] {
        directory.assign_carer(client, &james.id)?;
    }

    Ok(())
}

pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Prefixed sequence ids, unique for the process lifetime, which is also
/// the lifetime of the in-memory dataset.
#[derive(Default)]
pub(crate) struct SequenceIds {
    counter: AtomicU64,
}

impl SequenceIds {
    fn next(&self, prefix: &str) -> String {
        let id = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}-{id:06}")
    }
}

impl IdGenerator for SequenceIds {
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

/// In-memory store. One mutex serializes every operation, which keeps each
/// method an isolated transaction and makes the review transition a true
/// check-and-set.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCareStore {
    state: Arc<Mutex<StoreState>>,
}

impl CareStore for InMemoryCareStore {
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
