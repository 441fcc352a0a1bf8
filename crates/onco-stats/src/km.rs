use onco_core::CurvePoint;
use serde::{Deserialize, Serialize};

/// One time-to-event sample. `event_observed = false` means censored: the
/// subject left the risk set without the event occurring.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub duration: f64,
    pub event_observed: bool,
}

#[derive(Debug, Clone)]
pub struct KmCurve {
    pub points: Vec<CurvePoint>,
    /// First time where S(t) <= 0.5; None when the median is not reached.
    pub median: Option<f64>,
}

const Z_95: f64 = 1.96;
const TIME_EPS: f64 = 1e-9;

/// Product-limit (Kaplan-Meier) estimator.
///
/// At each distinct time, simultaneous observations pool their risk set
/// before the survival update; events multiply S by (1 - d/n), censored
/// observations only shrink the risk set. Confidence bands use Greenwood's
/// variance. Invariant to input row order.
pub fn fit(observations: &[Observation]) -> KmCurve {
    if observations.is_empty() {
        return KmCurve {
            points: vec![],
            median: None,
        };
    }

    let mut data: Vec<Observation> = observations.to_vec();
    data.sort_by(|a, b| {
        a.duration
            .partial_cmp(&b.duration)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut points = Vec::new();
    let mut survival = 1.0f64;
    let mut at_risk = data.len();
    let mut greenwood = 0.0f64;
    let mut median = None;

    let mut i = 0;
    while i < data.len() {
        let time = data[i].duration;
        let mut events = 0usize;
        let mut censored = 0usize;

        while i < data.len() && (data[i].duration - time).abs() < TIME_EPS {
            if data[i].event_observed {
                events += 1;
            } else {
                censored += 1;
            }
            i += 1;
        }

        if at_risk > 0 && events > 0 {
            survival *= 1.0 - events as f64 / at_risk as f64;
            if at_risk > events {
                greenwood += events as f64 / (at_risk as f64 * (at_risk - events) as f64);
            }
        }

        let se = survival * greenwood.sqrt();
        points.push(CurvePoint {
            time,
            survival,
            lower: (survival - Z_95 * se).clamp(0.0, 1.0),
            upper: (survival + Z_95 * se).clamp(0.0, 1.0),
        });

        if median.is_none() && survival <= 0.5 {
            median = Some(time);
        }

        at_risk = at_risk.saturating_sub(events + censored);
    }

    KmCurve { points, median }
}
