use super::common::*;
use crate::monitoring::directory::DirectoryError;
use crate::monitoring::domain::{
    CarerDeactivationReason, CarerStatus, ClientDeactivationReason, ClientStatus,
};
use crate::monitoring::service::ResourceKind;

#[test]
fn new_carers_start_pending() {
    let (_service, directory, _store) = build_services();

    let carer = directory
        .register_carer(&agency(), "Tomasz Nowak", "tomasz@agency-one.example")
        .expect("carer registers");

    assert_eq!(carer.status, CarerStatus::Pending);
    assert!(carer.assigned_clients.is_empty());

    let active = directory.active_carers(&agency()).expect("active carers");
    assert!(active.is_empty());

    let activated = directory.activate_carer(&carer.id).expect("carer activates");
    assert_eq!(activated.status, CarerStatus::Active);
    assert_eq!(directory.active_carers(&agency()).expect("active carers").len(), 1);
}

#[test]
fn carer_deactivation_records_reason() {
    let (_service, directory, _store) = build_services();
    let (_agency, _client, carer_id) = seed_agency(&directory);

    let carer = directory
        .deactivate_carer(&carer_id, CarerDeactivationReason::OnLongTermLeave)
        .expect("carer deactivates");

    assert_eq!(carer.status, CarerStatus::Inactive);
    let deactivation = carer.deactivation.expect("deactivation recorded");
    assert_eq!(deactivation.reason, CarerDeactivationReason::OnLongTermLeave);
}

#[test]
fn register_carer_validates_contact_details() {
    let (_service, directory, _store) = build_services();

    let blank_name = directory.register_carer(&agency(), "  ", "x@example.org");
    assert!(matches!(
        blank_name,
        Err(DirectoryError::MissingField { field: "full name" })
    ));

    let bad_email = directory.register_carer(&agency(), "Sam Field", "not-an-address");
    assert!(matches!(bad_email, Err(DirectoryError::InvalidEmail(_))));
}

#[test]
fn client_deactivation_and_reactivation_round_trip() {
    let (_service, directory, _store) = build_services();
    let (_agency, client_id, _carer) = seed_agency(&directory);

    let client = directory
        .deactivate_client(
            &client_id,
            ClientDeactivationReason::MovedToAnotherProvider,
            Some("Transferred to Harbour Care".to_string()),
        )
        .expect("client deactivates");

    assert_eq!(client.status, ClientStatus::Inactive);
    let deactivation = client.deactivation.expect("deactivation recorded");
    assert_eq!(
        deactivation.reason,
        ClientDeactivationReason::MovedToAnotherProvider
    );
    assert_eq!(deactivation.note.as_deref(), Some("Transferred to Harbour Care"));

    let restored = directory
        .reactivate_client(&client_id)
        .expect("client reactivates");
    assert_eq!(restored.status, ClientStatus::Active);
    assert!(restored.deactivation.is_none());
}

#[test]
fn register_client_requires_display_name() {
    let (_service, directory, _store) = build_services();

    let result = directory.register_client(&agency(), "", None);
    assert!(matches!(
        result,
        Err(DirectoryError::MissingField {
            field: "display name"
        })
    ));
}

#[test]
fn assignment_is_idempotent() {
    let (_service, directory, _store) = build_services();
    let (_agency, client_id, carer_id) = seed_agency(&directory);

    directory
        .assign_carer(&client_id, &carer_id)
        .expect("assignment succeeds");
    let carer = directory
        .assign_carer(&client_id, &carer_id)
        .expect("repeat assignment succeeds");

    assert_eq!(carer.assigned_clients.len(), 1);

    let carer = directory
        .unassign_carer(&client_id, &carer_id)
        .expect("unassignment succeeds");
    assert!(carer.assigned_clients.is_empty());
}

#[test]
fn cross_agency_assignment_reads_as_missing_client() {
    let (_service, directory, _store) = build_services();
    let (_agency, client_id, _carer) = seed_agency(&directory);

    let outsider = directory
        .register_carer(&other_agency(), "Outside Carer", "out@elsewhere.example")
        .expect("carer registers");

    let result = directory.assign_carer(&client_id, &outsider.id);
    match result {
        Err(DirectoryError::NotFound { kind, .. }) => assert_eq!(kind, ResourceKind::Client),
        other => panic!("expected cross-agency client to read as missing, got {other:?}"),
    }
}

#[test]
fn rota_lists_only_active_clients() {
    let (_service, directory, _store) = build_services();
    let (agency, first_client, carer_id) = seed_agency(&directory);

    let second_client = directory
        .register_client(&agency, "Arthur B.", None)
        .expect("client registers");

    directory
        .assign_carer(&first_client, &carer_id)
        .expect("assignment succeeds");
    directory
        .assign_carer(&second_client.id, &carer_id)
        .expect("assignment succeeds");

    directory
        .deactivate_client(&first_client, ClientDeactivationReason::Deceased, None)
        .expect("client deactivates");

    let rota = directory.clients_for_carer(&carer_id).expect("rota lists");
    assert_eq!(rota.len(), 1);
    assert_eq!(rota[0].id, second_client.id);
}
