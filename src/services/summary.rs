// src/services/summary.rs
use crate::models::{ReturnSeries, SummaryStats};

pub fn summarize(returns: &ReturnSeries) -> SummaryStats {
    summarize_values(&returns.values())
}

pub fn summarize_values(values: &[f64]) -> SummaryStats {
    if values.is_empty() {
        return SummaryStats::no_data();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    SummaryStats {
        count: values.len(),
        mean: mean(values),
        std: sample_std(values),
        min: sorted.first().copied(),
        q25: quantile(&sorted, 0.25),
        q50: quantile(&sorted, 0.50),
        q75: quantile(&sorted, 0.75),
        max: sorted.last().copied(),
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Standard deviation with the n-1 denominator; undefined below two samples.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let m = mean(values)?;
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - m;
            diff * diff
        })
        .sum::<f64>()
        / (values.len() as f64 - 1.0);

    Some(variance.sqrt())
}

/// Linear interpolation between closest ranks. `sorted` must be ascending.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_is_no_data() {
        let stats = summarize(&ReturnSeries::default());
        assert_eq!(stats, SummaryStats::no_data());
    }

    #[test]
    fn single_value_has_no_std() {
        let stats = summarize_values(&[0.05]);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, Some(0.05));
        assert_eq!(stats.std, None);
        assert_eq!(stats.min, Some(0.05));
        assert_eq!(stats.q50, Some(0.05));
        assert_eq!(stats.max, Some(0.05));
    }

    #[test]
    fn worked_example_statistics() {
        let values = [0.10, 99.0 / 110.0 - 1.0];
        let stats = summarize_values(&values);
        assert_eq!(stats.count, 2);
        let mean = stats.mean.unwrap();
        assert!((mean - (-0.00909090909)).abs() < 1e-9, "mean was {}", mean);
        let expected_std = (values[0] - values[1]).abs() / 2f64.sqrt();
        assert!((stats.std.unwrap() - expected_std).abs() < 1e-12);
    }

    #[test]
    fn quartiles_interpolate_linearly() {
        let stats = summarize_values(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.q25, Some(1.75));
        assert_eq!(stats.q50, Some(2.5));
        assert_eq!(stats.q75, Some(3.25));
        assert_eq!(stats.max, Some(4.0));
    }

    #[test]
    fn summary_is_deterministic() {
        let values = [0.01, -0.02, 0.003, 0.04, -0.015];
        assert_eq!(summarize_values(&values), summarize_values(&values));
    }
}
