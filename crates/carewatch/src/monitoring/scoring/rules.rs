use tracing::warn;

use super::super::catalog::SymptomCatalog;
use super::super::domain::{SymptomId, Vitals};
use super::config::ScoringConfig;

/// Accumulate the point total and the human-readable reason trail for one
/// observation.
///
/// Symptom ids are scored in the order the caller supplied them, then the
/// vitals in a fixed order: temperature, pulse, oxygen saturation,
/// respiratory rate, blood pressure. Each vital contributes at most once.
pub(crate) fn score_observation(
    catalog: &SymptomCatalog,
    config: &ScoringConfig,
    selected: &[SymptomId],
    vitals: &Vitals,
) -> (u32, Vec<String>) {
    let mut score: u32 = 0;
    let mut reasons = Vec::new();

    for symptom_id in selected {
        match catalog.symptom(symptom_id) {
            Some(symptom) => {
                score += symptom.points;
                reasons.push(symptom.label.clone());
            }
            // Stale references from an older client build are skipped, not
            // failed; the warning keeps them visible in the logs.
            None => warn!(%symptom_id, "skipping symptom id not present in catalog"),
        }
    }

    if let Some(temperature) = vitals.temperature {
        if temperature >= config.high_temperature {
            score += 2;
            reasons.push(format!("High temperature ({temperature}°C)"));
        } else if temperature < config.low_temperature {
            score += 1;
            reasons.push(format!("Low temperature ({temperature}°C)"));
        }
    }

    if let Some(pulse) = vitals.pulse {
        if pulse > config.pulse_upper || pulse < config.pulse_lower {
            score += 1;
            reasons.push(format!("Abnormal pulse ({pulse} bpm)"));
        }
    }

    if let Some(saturation) = vitals.oxygen_saturation {
        if saturation < config.oxygen_saturation_floor {
            score += 2;
            reasons.push(format!("Low oxygen saturation ({saturation}%)"));
        }
    }

    if let Some(rate) = vitals.respiratory_rate {
        if rate > config.respiratory_upper || rate < config.respiratory_lower {
            score += 1;
            reasons.push(format!("Abnormal respiratory rate ({rate}/min)"));
        }
    }

    // Blood pressure needs the full reading; a lone systolic or diastolic
    // value is never scored.
    if let (Some(systolic), Some(diastolic)) = (vitals.systolic_bp, vitals.diastolic_bp) {
        if systolic > config.systolic_upper || systolic < config.systolic_lower {
            score += 1;
            reasons.push(format!("Abnormal blood pressure ({systolic}/{diastolic})"));
        }
    }

    (score, reasons)
}
