use crate::model::RiskProfile;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RiskError {
    /// Unknown treatments must never degrade to a zero/default profile.
    #[error("no adverse-event profile for treatment '{0}'")]
    UnknownTreatment(String),
}

/// Static irAE lookup based on published rates for checkpoint inhibitors.
/// Matching is case-insensitive on the treatment identifier.
pub fn assess(treatment: &str) -> Result<RiskProfile, RiskError> {
    let key = treatment.trim().to_lowercase();
    match key.as_str() {
        "pembrolizumab" => Ok(profile(
            treatment,
            0.58,
            0.18,
            &[
                ("endocrine", 0.42),
                ("pneumonitis", 0.07),
                ("colitis", 0.04),
                ("hepatitis", 0.06),
            ],
            "Initiate thyroid function monitoring at baseline and every 6 weeks",
        )),
        "nivolumab" => Ok(profile(
            treatment,
            0.44,
            0.12,
            &[
                ("endocrine", 0.31),
                ("pneumonitis", 0.05),
                ("colitis", 0.03),
                ("hepatitis", 0.04),
            ],
            "Initiate thyroid function monitoring at baseline and every 6 weeks",
        )),
        "ipilimumab" => Ok(profile(
            treatment,
            0.72,
            0.27,
            &[
                ("endocrine", 0.34),
                ("pneumonitis", 0.02),
                ("colitis", 0.12),
                ("hepatitis", 0.07),
            ],
            "Screen for colitis and hypophysitis before each cycle",
        )),
        _ => Err(RiskError::UnknownTreatment(treatment.to_string())),
    }
}

fn profile(
    treatment: &str,
    any_grade: f64,
    severe: f64,
    named: &[(&str, f64)],
    note: &str,
) -> RiskProfile {
    let named_event_rates: BTreeMap<String, f64> =
        named.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    RiskProfile {
        treatment: treatment.to_string(),
        any_grade_rate: any_grade,
        severe_grade_rate: severe,
        named_event_rates,
        monitoring_note: note.to_string(),
    }
}
