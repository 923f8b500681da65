use std::collections::HashSet;

use crate::monitoring::catalog::SymptomCatalog;
use crate::monitoring::domain::SymptomId;

#[test]
fn standard_catalog_covers_all_categories() {
    let catalog = SymptomCatalog::standard();

    assert_eq!(catalog.categories().len(), 8);
    assert_eq!(catalog.all_symptoms().count(), 31);
}

#[test]
fn symptom_ids_are_unique() {
    let catalog = SymptomCatalog::standard();
    let ids: HashSet<_> = catalog.all_symptoms().map(|symptom| &symptom.id).collect();

    assert_eq!(ids.len(), catalog.all_symptoms().count());
}

#[test]
fn lookup_returns_configured_points() {
    let catalog = SymptomCatalog::standard();

    let confusion = catalog
        .symptom(&SymptomId::new("gc-2"))
        .expect("catalog entry");
    assert_eq!(confusion.label, "Increased confusion");
    assert_eq!(confusion.points, 2);

    let low_mood = catalog
        .symptom(&SymptomId::new("mw-1"))
        .expect("catalog entry");
    assert_eq!(low_mood.points, 1);
}

#[test]
fn lookup_misses_return_none() {
    let catalog = SymptomCatalog::standard();
    assert!(catalog.symptom(&SymptomId::new("zz-99")).is_none());
    assert!(catalog.category_for(&SymptomId::new("zz-99")).is_none());
}

#[test]
fn category_lookup_by_symptom_id() {
    let catalog = SymptomCatalog::standard();

    let category = catalog
        .category_for(&SymptomId::new("bc-3"))
        .expect("category present");
    assert_eq!(category.id, "breathing-circulation");
    assert_eq!(category.name, "Breathing & Circulation");
}
