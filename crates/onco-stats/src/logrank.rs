use crate::km::Observation;
use crate::special::chi_square_sf_1df;

#[derive(Debug, Clone)]
pub struct LogRankResult {
    pub chi_square: f64,
    pub p_value: f64,
    /// (observed, expected) event totals for group A and group B.
    pub observed_expected_a: (f64, f64),
    pub observed_expected_b: (f64, f64),
}

/// Two-group log-rank test.
///
/// At each distinct pooled event time: observed-vs-expected events for group A
/// under the hypergeometric null, aggregated into a chi-square statistic with
/// one degree of freedom. Simultaneous event times pool their risk sets.
/// Callers must ensure each group has at least one observed event.
pub fn log_rank(group_a: &[Observation], group_b: &[Observation]) -> LogRankResult {
    let mut event_times: Vec<f64> = group_a
        .iter()
        .chain(group_b.iter())
        .filter(|o| o.event_observed)
        .map(|o| o.duration)
        .collect();
    event_times.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    event_times.dedup();

    let mut observed_minus_expected = 0.0f64;
    let mut variance = 0.0f64;
    let mut expected_a = 0.0f64;
    let mut expected_b = 0.0f64;

    for &t in &event_times {
        let n_a = at_risk(group_a, t) as f64;
        let n_b = at_risk(group_b, t) as f64;
        let d_a = events_at(group_a, t) as f64;
        let d_b = events_at(group_b, t) as f64;
        let n = n_a + n_b;
        let d = d_a + d_b;
        if n < 1.0 || d == 0.0 {
            continue;
        }

        let e_a = d * n_a / n;
        expected_a += e_a;
        expected_b += d - e_a;
        observed_minus_expected += d_a - e_a;

        if n > 1.0 {
            variance += d * (n_a / n) * (1.0 - n_a / n) * (n - d) / (n - 1.0);
        }
    }

    let observed_a: f64 = group_a.iter().filter(|o| o.event_observed).count() as f64;
    let observed_b: f64 = group_b.iter().filter(|o| o.event_observed).count() as f64;

    let chi_square = if variance > 0.0 {
        observed_minus_expected * observed_minus_expected / variance
    } else {
        0.0
    };

    LogRankResult {
        chi_square,
        p_value: chi_square_sf_1df(chi_square),
        observed_expected_a: (observed_a, expected_a),
        observed_expected_b: (observed_b, expected_b),
    }
}

fn at_risk(group: &[Observation], t: f64) -> usize {
    group.iter().filter(|o| o.duration >= t).count()
}

fn events_at(group: &[Observation], t: f64) -> usize {
    group
        .iter()
        .filter(|o| o.event_observed && o.duration == t)
        .count()
}
