mod config;
mod rules;

pub use config::ScoringConfig;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::catalog::SymptomCatalog;
use super::domain::{RiskLevel, SymptomId, Vitals};

/// Stateless scorer mapping one observation to a deterministic risk
/// classification. Safe to share across threads; it reads nothing but the
/// immutable catalog and threshold table it was built with.
pub struct RiskScorer {
    catalog: Arc<SymptomCatalog>,
    config: ScoringConfig,
}

impl RiskScorer {
    pub fn new(catalog: Arc<SymptomCatalog>, config: ScoringConfig) -> Self {
        Self { catalog, config }
    }

    /// Scorer over the production catalog with default thresholds.
    pub fn standard() -> Self {
        Self::new(
            Arc::new(SymptomCatalog::standard().clone()),
            ScoringConfig::default(),
        )
    }

    pub fn catalog(&self) -> &SymptomCatalog {
        &self.catalog
    }

    pub fn assess(&self, selected: &[SymptomId], vitals: &Vitals) -> RiskAssessment {
        let (score, reasons) = rules::score_observation(&self.catalog, &self.config, selected, vitals);

        let risk_level = if score >= self.config.red_threshold {
            RiskLevel::Red
        } else if score >= self.config.amber_threshold {
            RiskLevel::Amber
        } else {
            RiskLevel::Green
        };

        RiskAssessment {
            score,
            risk_level,
            reasons,
        }
    }
}

/// Scorer output frozen into the visit record at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u32,
    pub risk_level: RiskLevel,
    pub reasons: Vec<String>,
}
