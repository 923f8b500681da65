//! Static symptom reference data.
//!
//! The catalog is defined once at process start and never mutated. Grouping
//! into categories exists for presentation only; scoring reads nothing but
//! the per-symptom point value.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::domain::SymptomId;

/// One observable symptom a carer can tick during a visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symptom {
    pub id: SymptomId,
    pub label: String,
    pub points: u32,
}

/// A named presentation grouping of symptoms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomCategory {
    pub id: String,
    pub name: String,
    pub symptoms: Vec<Symptom>,
}

/// Immutable lookup structure over the configured symptom set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomCatalog {
    categories: Vec<SymptomCategory>,
}

fn symptom(id: &str, label: &str, points: u32) -> Symptom {
    Symptom {
        id: SymptomId::new(id),
        label: label.to_string(),
        points,
    }
}

fn category(id: &str, name: &str, symptoms: Vec<Symptom>) -> SymptomCategory {
    SymptomCategory {
        id: id.to_string(),
        name: name.to_string(),
        symptoms,
    }
}

impl SymptomCatalog {
    pub fn new(categories: Vec<SymptomCategory>) -> Self {
        Self { categories }
    }

    /// The production symptom set, shared process-wide.
    pub fn standard() -> &'static SymptomCatalog {
        static CATALOG: OnceLock<SymptomCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| {
            SymptomCatalog::new(vec![
                category(
                    "general-condition",
                    "General Condition",
                    vec![
                        symptom("gc-1", "Client not themselves / unusual behaviour", 1),
                        symptom("gc-2", "Increased confusion", 2),
                        symptom("gc-3", "Reduced alertness / drowsy", 2),
                        symptom("gc-4", "Agitation or restlessness", 1),
                        symptom("gc-5", "Appears weaker than usual", 1),
                    ],
                ),
                category(
                    "eating-drinking",
                    "Eating & Drinking",
                    vec![
                        symptom("ed-1", "Reduced food intake", 1),
                        symptom("ed-2", "Reduced fluid intake", 1),
                        symptom("ed-3", "Refusing meals", 2),
                        symptom("ed-4", "Difficulty swallowing", 2),
                    ],
                ),
                category(
                    "mobility-falls",
                    "Mobility & Falls",
                    vec![
                        symptom("mf-1", "Reduced mobility", 1),
                        symptom("mf-2", "Unsteady on feet", 1),
                        symptom("mf-3", "Recent fall", 2),
                        symptom("mf-4", "New difficulty transferring (bed/chair)", 1),
                    ],
                ),
                category(
                    "breathing-circulation",
                    "Breathing & Circulation",
                    vec![
                        symptom("bc-1", "Shortness of breath", 2),
                        symptom("bc-2", "Cough", 1),
                        symptom("bc-3", "Chest discomfort", 2),
                        symptom("bc-4", "Cold or clammy skin", 2),
                    ],
                ),
                category(
                    "pain-discomfort",
                    "Pain & Discomfort",
                    vec![
                        symptom("pd-1", "Complaining of pain", 1),
                        symptom("pd-2", "Appears in pain", 1),
                        symptom("pd-3", "New or worsening pain", 2),
                    ],
                ),
                category(
                    "infection-signs",
                    "Infection Signs",
                    vec![
                        symptom("is-1", "Feverish / hot to touch", 2),
                        symptom("is-2", "Shivering or chills", 2),
                        symptom("is-3", "New or worsening wound", 1),
                        symptom("is-4", "Signs of infection (general)", 2),
                    ],
                ),
                category(
                    "toileting-continence",
                    "Toileting & Continence",
                    vec![
                        symptom("tc-1", "Reduced urine output", 1),
                        symptom("tc-2", "Dark or strong-smelling urine", 1),
                        symptom("tc-3", "New incontinence", 1),
                        symptom("tc-4", "Constipation", 1),
                        symptom("tc-5", "Diarrhoea", 1),
                    ],
                ),
                category(
                    "mental-wellbeing",
                    "Mental Wellbeing",
                    vec![
                        symptom("mw-1", "Low mood", 1),
                        symptom("mw-2", "Anxiety", 1),
                        symptom("mw-3", "Withdrawal / not engaging", 1),
                    ],
                ),
            ])
        })
    }

    pub fn categories(&self) -> &[SymptomCategory] {
        &self.categories
    }

    pub fn symptom(&self, id: &SymptomId) -> Option<&Symptom> {
        self.categories
            .iter()
            .flat_map(|category| category.symptoms.iter())
            .find(|symptom| &symptom.id == id)
    }

    pub fn category_for(&self, id: &SymptomId) -> Option<&SymptomCategory> {
        self.categories
            .iter()
            .find(|category| category.symptoms.iter().any(|symptom| &symptom.id == id))
    }

    pub fn all_symptoms(&self) -> impl Iterator<Item = &Symptom> {
        self.categories
            .iter()
            .flat_map(|category| category.symptoms.iter())
    }
}
