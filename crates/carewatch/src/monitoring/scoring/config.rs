use serde::{Deserialize, Serialize};

/// Clinical threshold table backing the risk rules, plus the tier cut-offs.
///
/// Tier thresholds are inclusive lower bounds: a score equal to
/// `amber_threshold` is already amber, equal to `red_threshold` already red.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub high_temperature: f32,
    pub low_temperature: f32,
    pub pulse_upper: u16,
    pub pulse_lower: u16,
    pub oxygen_saturation_floor: u8,
    pub respiratory_upper: u16,
    pub respiratory_lower: u16,
    pub systolic_upper: u16,
    pub systolic_lower: u16,
    pub amber_threshold: u32,
    pub red_threshold: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            high_temperature: 38.0,
            low_temperature: 36.0,
            pulse_upper: 100,
            pulse_lower: 50,
            oxygen_saturation_floor: 95,
            respiratory_upper: 20,
            respiratory_lower: 12,
            systolic_upper: 140,
            systolic_lower: 90,
            amber_threshold: 3,
            red_threshold: 5,
        }
    }
}
