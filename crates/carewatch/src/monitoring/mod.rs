//! Visit observation intake, risk scoring, and alert lifecycle.
//!
//! A carer submits one [`VisitSubmission`] per visit; the [`RiskScorer`]
//! turns its symptom set and vitals into a deterministic score, tier, and
//! reason trail; amber and red tiers raise an [`Alert`] that a manager
//! closes with a one-time review. All state lives behind the [`CareStore`]
//! port, so the same lifecycle runs against the bundled in-memory store or
//! a real database.

pub mod catalog;
pub mod directory;
pub mod domain;
pub mod repository;
pub mod router;
pub(crate) mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{Symptom, SymptomCatalog, SymptomCategory};
pub use directory::{DirectoryError, DirectoryService};
pub use domain::{
    AgencyId, Alert, AlertFilter, AlertId, AlertReview, CareOperation, Carer, CarerDeactivation,
    CarerDeactivationReason, CarerId, CarerStatus, Client, ClientDeactivation,
    ClientDeactivationReason, ClientId, ClientStatus, CorrectionNote, ManagerId, NoteId,
    ReviewAction, RiskLevel, SymptomId, UserRole, VisitId, VisitRecord, Vitals,
};
pub use repository::{CareStore, Clock, IdGenerator, StoreError};
pub use router::{care_router, AlertView, CorrectionView, VisitView};
pub use scoring::{RiskAssessment, RiskScorer, ScoringConfig};
pub use service::{
    CareMonitoringService, CareServiceError, ResourceKind, ValidationError, VisitSubmission,
};
