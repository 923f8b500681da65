use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for care agencies. Every entity is owned by exactly
/// one agency and every query is scoped by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgencyId(pub String);

impl fmt::Display for AgencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for clients receiving care.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub String);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for care workers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CarerId(pub String);

impl fmt::Display for CarerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for agency managers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManagerId(pub String);

impl fmt::Display for ManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for visit records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisitId(pub String);

impl fmt::Display for VisitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for alerts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertId(pub String);

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for correction notes appended to a visit record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteId(pub String);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable key of a catalog symptom (e.g. `gc-2`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymptomId(pub String);

impl fmt::Display for SymptomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl SymptomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Risk classification derived from a visit's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Green,
    Amber,
    Red,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Green => "green",
            RiskLevel::Amber => "amber",
            RiskLevel::Red => "red",
        }
    }

    /// Amber and red observations raise an alert a manager must close out.
    pub const fn requires_review(self) -> bool {
        matches!(self, RiskLevel::Amber | RiskLevel::Red)
    }
}

/// Snapshot of the numeric readings taken during one visit. Every field is
/// independently optional; absence means "not measured" and is never scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub systolic_bp: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diastolic_bp: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oxygen_saturation: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<u16>,
}

/// Carer-authored addendum to an already-submitted visit record. Appending
/// one never alters the recorded score, tier, or reasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionNote {
    pub id: NoteId,
    pub carer_id: CarerId,
    pub text: String,
    pub added_at: DateTime<Utc>,
}

/// The atomic unit of observation: one carer's structured report on one
/// client at one point in time, with the scorer's output frozen in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub id: VisitId,
    pub client_id: ClientId,
    pub carer_id: CarerId,
    pub agency_id: AgencyId,
    pub selected_symptoms: Vec<SymptomId>,
    pub vitals: Vitals,
    pub note: String,
    pub score: u32,
    pub risk_level: RiskLevel,
    pub reasons: Vec<String>,
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub corrections: Vec<CorrectionNote>,
}

/// Closed vocabulary for the action a manager records when closing an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Monitor,
    CalledFamily,
    InformedGp,
    CommunityNurse,
    EmergencyEscalation,
}

impl ReviewAction {
    pub const fn label(self) -> &'static str {
        match self {
            ReviewAction::Monitor => "monitor",
            ReviewAction::CalledFamily => "called_family",
            ReviewAction::InformedGp => "informed_gp",
            ReviewAction::CommunityNurse => "community_nurse",
            ReviewAction::EmergencyEscalation => "emergency_escalation",
        }
    }
}

/// The one-time transition that closes an alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertReview {
    pub reviewed_by: ManagerId,
    pub reviewed_at: DateTime<Utc>,
    pub action_taken: ReviewAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Manager-facing task generated from an amber or red visit record.
///
/// The tier is denormalized from the originating record at creation time and
/// never recomputed. `review` is `None` while the alert is open; applying a
/// review is the only permitted mutation and is not reversible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub visit_id: VisitId,
    pub client_id: ClientId,
    pub carer_id: CarerId,
    pub agency_id: AgencyId,
    pub risk_level: RiskLevel,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub review: Option<AlertReview>,
}

impl Alert {
    pub fn is_reviewed(&self) -> bool {
        self.review.is_some()
    }
}

/// Filters accepted by the alerts dashboard. Filtering never changes the
/// sort order: results are always newest-first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertFilter {
    Unreviewed,
    Reviewed,
    Amber,
    Red,
    #[default]
    All,
}

impl AlertFilter {
    pub fn admits(self, alert: &Alert) -> bool {
        match self {
            AlertFilter::Unreviewed => !alert.is_reviewed(),
            AlertFilter::Reviewed => alert.is_reviewed(),
            AlertFilter::Amber => alert.risk_level == RiskLevel::Amber,
            AlertFilter::Red => alert.risk_level == RiskLevel::Red,
            AlertFilter::All => true,
        }
    }
}

/// Roles the identity layer can present to the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Manager,
    Carer,
    PlatformAdmin,
}

/// Operations the HTTP boundary gates on the caller's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CareOperation {
    RecordVisit,
    AmendVisit,
    ViewVisits,
    ReviewAlert,
    ViewAlerts,
}

impl UserRole {
    /// Exhaustive role/operation matrix. Platform admins administer
    /// agencies and never touch clinical data.
    pub const fn permits(self, operation: CareOperation) -> bool {
        match (self, operation) {
            (UserRole::Carer, CareOperation::RecordVisit)
            | (UserRole::Carer, CareOperation::AmendVisit)
            | (UserRole::Carer, CareOperation::ViewVisits) => true,
            (UserRole::Carer, CareOperation::ReviewAlert)
            | (UserRole::Carer, CareOperation::ViewAlerts) => false,
            (UserRole::Manager, CareOperation::ReviewAlert)
            | (UserRole::Manager, CareOperation::ViewAlerts)
            | (UserRole::Manager, CareOperation::ViewVisits) => true,
            (UserRole::Manager, CareOperation::RecordVisit)
            | (UserRole::Manager, CareOperation::AmendVisit) => false,
            (UserRole::PlatformAdmin, _) => false,
        }
    }
}

/// Whether a client is currently receiving care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Active,
    Inactive,
}

/// Closed vocabulary for why a client left the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientDeactivationReason {
    MovedToAnotherProvider,
    Deceased,
    NoLongerReceivingService,
    Other,
}

/// Deactivation metadata kept alongside an inactive client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDeactivation {
    pub reason: ClientDeactivationReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub deactivated_at: DateTime<Utc>,
}

/// A person receiving domiciliary care, owned by one agency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_reference: Option<String>,
    pub agency_id: AgencyId,
    pub status: ClientStatus,
    #[serde(default)]
    pub deactivation: Option<ClientDeactivation>,
    pub created_at: DateTime<Utc>,
}

impl Client {
    pub fn is_active(&self) -> bool {
        self.status == ClientStatus::Active
    }
}

/// Employment status of a care worker. New carers start `pending` until a
/// manager activates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarerStatus {
    Active,
    Inactive,
    Pending,
}

/// Closed vocabulary for why a carer was deactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarerDeactivationReason {
    LeftOrganisation,
    OnLongTermLeave,
    InternalDecision,
}

/// Deactivation metadata kept alongside an inactive carer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarerDeactivation {
    pub reason: CarerDeactivationReason,
    pub deactivated_at: DateTime<Utc>,
}

/// A care worker employed by one agency, with their client assignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Carer {
    pub id: CarerId,
    pub full_name: String,
    pub email: String,
    pub agency_id: AgencyId,
    pub status: CarerStatus,
    #[serde(default)]
    pub assigned_clients: Vec<ClientId>,
    #[serde(default)]
    pub deactivation: Option<CarerDeactivation>,
    pub created_at: DateTime<Utc>,
}

impl Carer {
    pub fn is_active(&self) -> bool {
        self.status == CarerStatus::Active
    }

    pub fn is_assigned_to(&self, client_id: &ClientId) -> bool {
        self.assigned_clients.iter().any(|id| id == client_id)
    }
}
