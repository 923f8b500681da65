use std::sync::Arc;

use carewatch::error::AppError;
use carewatch::monitoring::{
    AgencyId, AlertFilter, CarerId, ClientId, ManagerId, ReviewAction, SymptomCatalog, SymptomId,
    VisitRecord, VisitSubmission, Vitals,
};
use clap::Args;

use crate::infra::{build_services, CareDirectory, CareService};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the symptom catalog before the walkthrough
    #[arg(long)]
    pub(crate) show_catalog: bool,
    /// Skip the manager review portion of the demo
    #[arg(long)]
    pub(crate) skip_review: bool,
}

pub(crate) fn run_catalog() -> Result<(), AppError> {
    print_catalog(SymptomCatalog::standard());
    Ok(())
}

fn print_catalog(catalog: &SymptomCatalog) {
    println!("Symptom catalog");
    for category in catalog.categories() {
        println!("\n{} ({})", category.name, category.id);
        for symptom in &category.symptoms {
            println!("  - [{}] {} (+{})", symptom.id, symptom.label, symptom.points);
        }
    }
}

struct DemoCast {
    agency: AgencyId,
    margaret: ClientId,
    robert: ClientId,
    dorothy: ClientId,
    emma: CarerId,
    james: CarerId,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    if args.show_catalog {
        print_catalog(SymptomCatalog::standard());
        println!();
    }

    println!("CareWatch demo: one shift at Sunrise Care Services");

    let (service, directory) = build_services();
    let cast = match seed_demo_directory(&directory) {
        Ok(cast) => cast,
        Err(err) => {
            println!("  directory seeding failed: {err}");
            return Ok(());
        }
    };

    println!("\nVisits");
    let green = record_and_print(
        &service,
        "Robert P.",
        VisitSubmission {
            client_id: cast.robert.clone(),
            carer_id: cast.james.clone(),
            agency_id: cast.agency.clone(),
            selected_symptoms: Vec::new(),
            vitals: Vitals {
                temperature: Some(36.8),
                pulse: Some(72),
                ..Vitals::default()
            },
            note: "Usual self, watched the cricket over tea.".to_string(),
        },
    );

    record_and_print(
        &service,
        "Dorothy M.",
        VisitSubmission {
            client_id: cast.dorothy.clone(),
            carer_id: cast.emma.clone(),
            agency_id: cast.agency.clone(),
            selected_symptoms: vec![SymptomId::new("gc-1")],
            vitals: Vitals {
                oxygen_saturation: Some(94),
                ..Vitals::default()
            },
            note: "Quieter than usual, oximeter reading low.".to_string(),
        },
    );

    record_and_print(
        &service,
        "Margaret H.",
        VisitSubmission {
            client_id: cast.margaret.clone(),
            carer_id: cast.emma.clone(),
            agency_id: cast.agency.clone(),
            selected_symptoms: vec![SymptomId::new("gc-2"), SymptomId::new("gc-3")],
            vitals: Vitals {
                temperature: Some(38.5),
                pulse: Some(96),
                ..Vitals::default()
            },
            note: "Very drowsy, did not recognise me at first.".to_string(),
        },
    );

    print_dashboard(&service, &cast.agency);

    if !args.skip_review {
        review_walkthrough(&service, &cast.agency);
    }

    if let Some(record) = green {
        println!("\nCorrection notes");
        match service.add_correction_note(
            &record.id,
            &cast.james,
            "Forgot to note: district nurse visit booked for Thursday.",
        ) {
            Ok(amended) => println!(
                "- {} now carries {} correction note(s); score unchanged at {}",
                amended.id,
                amended.corrections.len(),
                amended.score
            ),
            Err(err) => println!("  correction rejected: {err}"),
        }
    }

    print_dashboard(&service, &cast.agency);
    Ok(())
}

fn seed_demo_directory(directory: &Arc<CareDirectory>) -> Result<DemoCast, AppError> {
    let agency = AgencyId("agency-1".to_string());

    let margaret = directory
        .register_client(&agency, "Margaret H.", Some("MH-001".to_string()))
        .map(|client| client.id);
    let robert = directory
        .register_client(&agency, "Robert P.", Some("RP-002".to_string()))
        .map(|client| client.id);
    let dorothy = directory
        .register_client(&agency, "Dorothy M.", Some("DM-003".to_string()))
        .map(|client| client.id);

    let (margaret, robert, dorothy) = match (margaret, robert, dorothy) {
        (Ok(m), Ok(r), Ok(d)) => (m, r, d),
        (Err(err), ..) | (_, Err(err), _) | (.., Err(err)) => {
            println!("  client registration failed: {err}");
            return Err(AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, "demo seeding failed")));
        }
    };

    let emma = register_carer(directory, &agency, "Emma Wilson", "emma.wilson@sunrisecare.co.uk")?;
    let james = register_carer(directory, &agency, "James Taylor", "james.taylor@sunrisecare.co.uk")?;

    for (client, carer) in [
        (&margaret, &emma),
        (&dorothy, &emma),
        (&robert, &james),
    ] {
        if let Err(err) = directory.assign_carer(client, carer) {
            println!("  assignment failed: {err}");
        }
    }

    println!("\nDirectory");
    match directory.clients(&agency) {
        Ok(clients) => {
            for client in clients {
                println!(
                    "- {} {} ({})",
                    client.id,
                    client.display_name,
                    client.internal_reference.as_deref().unwrap_or("no ref")
                );
            }
        }
        Err(err) => println!("  directory unavailable: {err}"),
    }
    match directory.active_carers(&agency) {
        Ok(carers) => {
            for carer in carers {
                println!(
                    "- {} {} covering {} client(s)",
                    carer.id,
                    carer.full_name,
                    carer.assigned_clients.len()
                );
            }
        }
        Err(err) => println!("  directory unavailable: {err}"),
    }

    Ok(DemoCast {
        agency,
        margaret,
        robert,
        dorothy,
        emma,
        james,
    })
}

fn register_carer(
    directory: &Arc<CareDirectory>,
    agency: &AgencyId,
    name: &str,
    email: &str,
) -> Result<CarerId, AppError> {
    let carer = directory
        .register_carer(agency, name, email)
        .and_then(|carer| directory.activate_carer(&carer.id));
    match carer {
        Ok(carer) => Ok(carer.id),
        Err(err) => {
            println!("  carer registration failed: {err}");
            Err(AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, "demo seeding failed")))
        }
    }
}

fn record_and_print(
    service: &Arc<CareService>,
    who: &str,
    submission: VisitSubmission,
) -> Option<VisitRecord> {
    match service.record_visit(submission) {
        Ok(record) => {
            println!(
                "- {} {}: score {} -> {}",
                record.id,
                who,
                record.score,
                record.risk_level.label()
            );
            for reason in &record.reasons {
                println!("    * {reason}");
            }
            Some(record)
        }
        Err(err) => {
            println!("  visit submission rejected: {err}");
            None
        }
    }
}

fn print_dashboard(service: &Arc<CareService>, agency: &AgencyId) {
    println!("\nAlerts dashboard");
    match service.unreviewed_count(agency) {
        Ok(count) => println!("- unreviewed: {count}"),
        Err(err) => println!("  count unavailable: {err}"),
    }
    match service.list_alerts(agency, AlertFilter::All) {
        Ok(alerts) => {
            for alert in alerts {
                let status = match &alert.review {
                    Some(review) => format!(
                        "reviewed by {} ({})",
                        review.reviewed_by,
                        review.action_taken.label()
                    ),
                    None => "open".to_string(),
                };
                println!(
                    "- [{}] {} for {} raised {} | {}",
                    alert.risk_level.label(),
                    alert.id,
                    alert.client_id,
                    alert.created_at.format("%H:%M"),
                    status
                );
            }
        }
        Err(err) => println!("  alerts unavailable: {err}"),
    }
}

fn review_walkthrough(service: &Arc<CareService>, agency: &AgencyId) {
    println!("\nManager review");
    let manager = ManagerId("manager-1".to_string());

    let alert = match service.list_alerts(agency, AlertFilter::Red) {
        Ok(mut alerts) if !alerts.is_empty() => alerts.remove(0),
        Ok(_) => {
            println!("- no red alerts to review");
            return;
        }
        Err(err) => {
            println!("  alerts unavailable: {err}");
            return;
        }
    };

    match service.review_alert(
        agency,
        &alert.id,
        &manager,
        ReviewAction::InformedGp,
        Some("GP surgery called; home visit requested for this afternoon.".to_string()),
    ) {
        Ok(reviewed) => println!(
            "- {} closed with action '{}'",
            reviewed.id,
            ReviewAction::InformedGp.label()
        ),
        Err(err) => println!("  review failed: {err}"),
    }

    // The state machine is one-way; show the second attempt bouncing off it.
    match service.review_alert(agency, &alert.id, &manager, ReviewAction::Monitor, None) {
        Ok(_) => println!("- unexpected: second review succeeded"),
        Err(err) => println!("- second review rejected: {err}"),
    }
}
