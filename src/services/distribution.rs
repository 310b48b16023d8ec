// src/services/distribution.rs
use std::f64::consts::PI;

use crate::models::{CurvePoint, HistogramBin, NormalCurve, ReturnSeries};
use crate::services::summary::{mean, sample_std};

pub const NORMAL_CURVE_POINTS: usize = 100;
pub const HISTOGRAM_BINS: usize = 50;
pub const DENSITY_GRID_POINTS: usize = 200;

/// Normal density with the sample mean and std, evaluated on `num_points`
/// evenly spaced values over the observed range. Empty when the std is not
/// usable (fewer than two samples, zero or non-finite).
pub fn fit_normal_curve(returns: &ReturnSeries, num_points: usize) -> NormalCurve {
    let values = returns.values();
    let mu = mean(&values);
    let sigma = sample_std(&values);

    let points = match (mu, sigma, value_range(&values)) {
        (Some(mu), Some(sigma), Some((min, max))) if sigma > 0.0 && sigma.is_finite() => {
            linspace(min, max, num_points)
                .into_iter()
                .map(|x| CurvePoint {
                    x,
                    density: normal_pdf(x, mu, sigma),
                })
                .collect()
        }
        _ => Vec::new(),
    };

    NormalCurve {
        mean: mu,
        std: sigma,
        points,
    }
}

pub fn normal_pdf(x: f64, mu: f64, sigma: f64) -> f64 {
    let z = (x - mu) / sigma;
    (-0.5 * z * z).exp() / (sigma * (2.0 * PI).sqrt())
}

/// Equal-width bins over [min, max] in density units, so the bar areas sum to one.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let (min, max) = match value_range(values) {
        Some(range) => range,
        None => return Vec::new(),
    };
    if bins == 0 || min == max {
        return Vec::new();
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in values.iter().filter(|v| v.is_finite()) {
        // The maximum lands in the last bin, which is closed on the right.
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let total = counts.iter().sum::<usize>() as f64;
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + width * i as f64,
            end: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            density: count as f64 / (total * width),
        })
        .collect()
}

/// Gaussian kernel density estimate clipped to the data range.
/// Bandwidth follows Scott's rule: std * n^(-1/5).
pub fn kernel_density(values: &[f64], num_points: usize) -> Vec<CurvePoint> {
    let clean: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (std, (min, max)) = match (sample_std(&clean), value_range(&clean)) {
        (Some(std), Some(range)) => (std, range),
        _ => return Vec::new(),
    };

    let n = clean.len() as f64;
    let bandwidth = std * n.powf(-0.2);
    if bandwidth <= 0.0 || !bandwidth.is_finite() {
        return Vec::new();
    }

    linspace(min, max, num_points)
        .into_iter()
        .map(|x| {
            let density = clean
                .iter()
                .map(|xi| {
                    let u = (x - xi) / bandwidth;
                    (-0.5 * u * u).exp()
                })
                .sum::<f64>()
                / (n * bandwidth * (2.0 * PI).sqrt());
            CurvePoint { x, density }
        })
        .collect()
}

fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.iter().filter(|v| v.is_finite()) {
        min = min.min(*v);
        max = max.max(*v);
    }

    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

/// `count` evenly spaced values with both ends included exactly.
fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i + 1 == count { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReturnPoint;
    use chrono::NaiveDate;

    fn returns(values: &[f64]) -> ReturnSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ReturnSeries {
            points: values
                .iter()
                .enumerate()
                .map(|(i, v)| ReturnPoint {
                    date: start + chrono::Duration::days(i as i64),
                    value: *v,
                })
                .collect(),
        }
    }

    #[test]
    fn curve_spans_observed_range_with_100_points() {
        let series = returns(&[0.02, -0.01, 0.035, -0.04, 0.0, 0.011]);
        let curve = fit_normal_curve(&series, NORMAL_CURVE_POINTS);

        assert!(curve.is_plottable());
        assert_eq!(curve.points.len(), 100);
        assert_eq!(curve.points.first().unwrap().x, -0.04);
        assert_eq!(curve.points.last().unwrap().x, 0.035);
        assert!(curve.points.windows(2).all(|w| w[0].x <= w[1].x));
        assert!(curve.points.iter().all(|p| p.density > 0.0));
    }

    #[test]
    fn curve_density_matches_closed_form() {
        let series = returns(&[-1.0, 1.0]);
        let curve = fit_normal_curve(&series, 3);
        let sigma = 2f64.sqrt();

        assert_eq!(curve.mean, Some(0.0));
        assert_eq!(curve.std, Some(sigma));
        let peak = curve.points[1];
        assert_eq!(peak.x, 0.0);
        assert!((peak.density - 1.0 / (sigma * (2.0 * PI).sqrt())).abs() < 1e-12);
    }

    #[test]
    fn degenerate_series_is_not_plottable() {
        assert!(!fit_normal_curve(&returns(&[]), NORMAL_CURVE_POINTS).is_plottable());
        assert!(!fit_normal_curve(&returns(&[0.01]), NORMAL_CURVE_POINTS).is_plottable());

        let flat = fit_normal_curve(&returns(&[0.01, 0.01, 0.01]), NORMAL_CURVE_POINTS);
        assert!(!flat.is_plottable());
        assert_eq!(flat.std, Some(0.0));
    }

    #[test]
    fn curve_is_idempotent() {
        let series = returns(&[0.013, -0.007, 0.021, -0.018]);
        assert_eq!(
            fit_normal_curve(&series, NORMAL_CURVE_POINTS),
            fit_normal_curve(&series, NORMAL_CURVE_POINTS)
        );
    }

    #[test]
    fn histogram_area_sums_to_one() {
        let values = [0.0, 0.1, 0.2, 0.2, 0.3, 0.9, 1.0];
        let bins = histogram(&values, 10);
        assert_eq!(bins.len(), 10);
        let area: f64 = bins.iter().map(|b| b.density * (b.end - b.start)).sum();
        assert!((area - 1.0).abs() < 1e-9, "area was {}", area);
        assert_eq!(bins.last().unwrap().end, 1.0);
    }

    #[test]
    fn histogram_of_flat_values_is_empty() {
        assert!(histogram(&[], HISTOGRAM_BINS).is_empty());
        assert!(histogram(&[0.5, 0.5], HISTOGRAM_BINS).is_empty());
    }

    #[test]
    fn kernel_density_stays_on_data_range() {
        let values: Vec<f64> = (0..50).map(|i| (i as f64 - 25.0) / 1000.0).collect();
        let kde = kernel_density(&values, DENSITY_GRID_POINTS);
        assert_eq!(kde.len(), DENSITY_GRID_POINTS);
        assert_eq!(kde.first().unwrap().x, -0.025);
        assert_eq!(kde.last().unwrap().x, 0.024);
        assert!(kde.iter().all(|p| p.density.is_finite() && p.density > 0.0));
        assert!(kernel_density(&[0.1], DENSITY_GRID_POINTS).is_empty());
    }
}
