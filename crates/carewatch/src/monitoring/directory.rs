use std::fmt;
use std::sync::Arc;

use tracing::info;

use super::domain::{
    AgencyId, Carer, CarerDeactivation, CarerDeactivationReason, CarerId, CarerStatus, Client,
    ClientDeactivation, ClientDeactivationReason, ClientId, ClientStatus,
};
use super::repository::{CareStore, Clock, IdGenerator, StoreError};
use super::service::ResourceKind;

/// Error raised by the directory service.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: ResourceKind, id: String },
    #[error("{field} must not be empty")]
    MissingField { field: &'static str },
    #[error("email '{0}' is not a valid address")]
    InvalidEmail(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DirectoryError {
    fn not_found(kind: ResourceKind, id: impl fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Registry of the clients an agency cares for and the carers it employs.
/// Shares the store with the monitoring service; visit and alert flows
/// validate their references against the entities registered here.
pub struct DirectoryService<S, C, G> {
    store: Arc<S>,
    clock: Arc<C>,
    ids: Arc<G>,
}

impl<S, C, G> DirectoryService<S, C, G>
where
    S: CareStore + 'static,
    C: Clock + 'static,
    G: IdGenerator + 'static,
{
    pub fn new(store: Arc<S>, clock: Arc<C>, ids: Arc<G>) -> Self {
        Self { store, clock, ids }
    }

    pub fn register_client(
        &self,
        agency_id: &AgencyId,
        display_name: &str,
        internal_reference: Option<String>,
    ) -> Result<Client, DirectoryError> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(DirectoryError::MissingField {
                field: "display name",
            });
        }

        let client = Client {
            id: self.ids.client_id(),
            display_name: display_name.to_string(),
            internal_reference: internal_reference.filter(|value| !value.trim().is_empty()),
            agency_id: agency_id.clone(),
            status: ClientStatus::Active,
            deactivation: None,
            created_at: self.clock.now(),
        };
        let client = self.store.insert_client(client)?;
        info!(client_id = %client.id, agency_id = %agency_id, "client registered");
        Ok(client)
    }

    pub fn deactivate_client(
        &self,
        client_id: &ClientId,
        reason: ClientDeactivationReason,
        note: Option<String>,
    ) -> Result<Client, DirectoryError> {
        let mut client = self.require_client(client_id)?;
        client.status = ClientStatus::Inactive;
        client.deactivation = Some(ClientDeactivation {
            reason,
            note: note.filter(|text| !text.trim().is_empty()),
            deactivated_at: self.clock.now(),
        });
        self.store.update_client(client.clone())?;
        Ok(client)
    }

    pub fn reactivate_client(&self, client_id: &ClientId) -> Result<Client, DirectoryError> {
        let mut client = self.require_client(client_id)?;
        client.status = ClientStatus::Active;
        client.deactivation = None;
        self.store.update_client(client.clone())?;
        Ok(client)
    }

    pub fn client(
        &self,
        agency_id: &AgencyId,
        client_id: &ClientId,
    ) -> Result<Client, DirectoryError> {
        self.store
            .fetch_client(client_id)?
            .filter(|client| &client.agency_id == agency_id)
            .ok_or_else(|| DirectoryError::not_found(ResourceKind::Client, client_id))
    }

    pub fn clients(&self, agency_id: &AgencyId) -> Result<Vec<Client>, DirectoryError> {
        Ok(self.store.clients_for_agency(agency_id)?)
    }

    pub fn register_carer(
        &self,
        agency_id: &AgencyId,
        full_name: &str,
        email: &str,
    ) -> Result<Carer, DirectoryError> {
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(DirectoryError::MissingField { field: "full name" });
        }
        let email = email.trim();
        if email.is_empty() {
            return Err(DirectoryError::MissingField { field: "email" });
        }
        if !email.contains('@') {
            return Err(DirectoryError::InvalidEmail(email.to_string()));
        }

        // New carers stay pending until a manager activates them.
        let carer = Carer {
            id: self.ids.carer_id(),
            full_name: full_name.to_string(),
            email: email.to_string(),
            agency_id: agency_id.clone(),
            status: CarerStatus::Pending,
            assigned_clients: Vec::new(),
            deactivation: None,
            created_at: self.clock.now(),
        };
        let carer = self.store.insert_carer(carer)?;
        info!(carer_id = %carer.id, agency_id = %agency_id, "carer registered");
        Ok(carer)
    }

    pub fn activate_carer(&self, carer_id: &CarerId) -> Result<Carer, DirectoryError> {
        let mut carer = self.require_carer(carer_id)?;
        carer.status = CarerStatus::Active;
        carer.deactivation = None;
        self.store.update_carer(carer.clone())?;
        Ok(carer)
    }

    pub fn deactivate_carer(
        &self,
        carer_id: &CarerId,
        reason: CarerDeactivationReason,
    ) -> Result<Carer, DirectoryError> {
        let mut carer = self.require_carer(carer_id)?;
        carer.status = CarerStatus::Inactive;
        carer.deactivation = Some(CarerDeactivation {
            reason,
            deactivated_at: self.clock.now(),
        });
        self.store.update_carer(carer.clone())?;
        Ok(carer)
    }

    pub fn active_carers(&self, agency_id: &AgencyId) -> Result<Vec<Carer>, DirectoryError> {
        let carers = self.store.carers_for_agency(agency_id)?;
        Ok(carers.into_iter().filter(Carer::is_active).collect())
    }

    /// Assign a carer to a client's care rota. Idempotent: assigning an
    /// already-assigned pair changes nothing.
    pub fn assign_carer(
        &self,
        client_id: &ClientId,
        carer_id: &CarerId,
    ) -> Result<Carer, DirectoryError> {
        let client = self.require_client(client_id)?;
        let mut carer = self.require_carer(carer_id)?;
        if carer.agency_id != client.agency_id {
            return Err(DirectoryError::not_found(ResourceKind::Client, client_id));
        }

        if !carer.is_assigned_to(client_id) {
            carer.assigned_clients.push(client_id.clone());
            self.store.update_carer(carer.clone())?;
        }
        Ok(carer)
    }

    pub fn unassign_carer(
        &self,
        client_id: &ClientId,
        carer_id: &CarerId,
    ) -> Result<Carer, DirectoryError> {
        let mut carer = self.require_carer(carer_id)?;
        carer.assigned_clients.retain(|id| id != client_id);
        self.store.update_carer(carer.clone())?;
        Ok(carer)
    }

    /// The active clients on a carer's rota, in assignment order.
    pub fn clients_for_carer(&self, carer_id: &CarerId) -> Result<Vec<Client>, DirectoryError> {
        let carer = self.require_carer(carer_id)?;
        let mut clients = Vec::with_capacity(carer.assigned_clients.len());
        for client_id in &carer.assigned_clients {
            if let Some(client) = self.store.fetch_client(client_id)? {
                if client.is_active() {
                    clients.push(client);
                }
            }
        }
        Ok(clients)
    }

    fn require_client(&self, client_id: &ClientId) -> Result<Client, DirectoryError> {
        self.store
            .fetch_client(client_id)?
            .ok_or_else(|| DirectoryError::not_found(ResourceKind::Client, client_id))
    }

    fn require_carer(&self, carer_id: &CarerId) -> Result<Carer, DirectoryError> {
        self.store
            .fetch_carer(carer_id)?
            .ok_or_else(|| DirectoryError::not_found(ResourceKind::Carer, carer_id))
    }
}
