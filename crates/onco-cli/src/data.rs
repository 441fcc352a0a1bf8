use onco_stats::{ArmData, Observation};

/// Bundled two-arm demo comparison (advanced melanoma, simulated follow-up in
/// months). Used when no external data source is wired in.
pub fn demo_trial_data() -> Vec<ArmData> {
    vec![
        arm(
            "pembrolizumab",
            &[6.0, 8.0, 10.0, 12.0, 15.0, 18.0, 20.0, 24.0, 28.0, 36.0],
            &[true, true, false, true, false, false, false, false, true, false],
        ),
        arm(
            "nivolumab",
            &[2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 12.0],
            &[true, true, true, true, true, true, true, true, false, false],
        ),
    ]
}

fn arm(treatment: &str, durations: &[f64], events: &[bool]) -> ArmData {
    ArmData {
        treatment: treatment.to_string(),
        observations: durations
            .iter()
            .zip(events)
            .map(|(&duration, &event_observed)| Observation {
                duration,
                event_observed,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_data_is_a_valid_two_arm_comparison() {
        let arms = demo_trial_data();
        assert_eq!(arms.len(), 2);
        for arm in &arms {
            assert_eq!(arm.observations.len(), 10);
            assert!(arm.observations.iter().any(|o| o.event_observed));
        }
        let result = onco_stats::evaluate(&arms[0], &arms[1]).unwrap();
        assert!(result.p_value < 0.01);
    }
}
