// src/services/returns.rs
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::models::{Granularity, PricePoint, PriceSeries, ReturnPoint, ReturnSeries};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReturnSet {
    pub daily: ReturnSeries,
    pub weekly: ReturnSeries,
    pub monthly: ReturnSeries,
}

impl ReturnSet {
    pub fn get(&self, granularity: Granularity) -> &ReturnSeries {
        match granularity {
            Granularity::Daily => &self.daily,
            Granularity::Weekly => &self.weekly,
            Granularity::Monthly => &self.monthly,
        }
    }
}

pub fn compute_returns(prices: &PriceSeries) -> ReturnSet {
    if prices.len() < 2 {
        return ReturnSet::default();
    }

    ReturnSet {
        daily: pct_change(prices.points()),
        weekly: pct_change(&resample(prices, Cadence::Weekly)),
        monthly: pct_change(&resample(prices, Cadence::Monthly)),
    }
}

/// Percentage change between consecutive closes. The first point has no
/// predecessor and is dropped.
fn pct_change(points: &[PricePoint]) -> ReturnSeries {
    let points = points
        .windows(2)
        .map(|pair| ReturnPoint {
            date: pair[1].date,
            value: pair[1].close / pair[0].close - 1.0,
        })
        .collect();

    ReturnSeries { points }
}

/// Calendar periods a daily series can be sampled down to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Weekly,
    Monthly,
}

/// Closes sampled at every period end between the first and last observation.
/// Each period end takes the last close at or before it, so a period with no
/// trading repeats the previous close.
pub fn resample(prices: &PriceSeries, cadence: Cadence) -> Vec<PricePoint> {
    let points = prices.points();
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (first.date, last.date),
        _ => return Vec::new(),
    };

    let final_label = period_end(last, cadence);
    let mut label = period_end(first, cadence);
    let mut cursor = 0;
    let mut resampled = Vec::new();

    while label <= final_label {
        while cursor + 1 < points.len() && points[cursor + 1].date <= label {
            cursor += 1;
        }
        resampled.push(PricePoint {
            date: label,
            close: points[cursor].close,
        });
        label = next_period_end(label, cadence);
    }

    resampled
}

/// Calendar weeks end on Sunday; months on their last day.
fn period_end(date: NaiveDate, cadence: Cadence) -> NaiveDate {
    match cadence {
        Cadence::Weekly => date + Duration::days(6 - date.weekday().num_days_from_monday() as i64),
        Cadence::Monthly => month_end(date),
    }
}

fn next_period_end(label: NaiveDate, cadence: Cadence) -> NaiveDate {
    match cadence {
        Cadence::Weekly => label + Duration::days(7),
        Cadence::Monthly => month_end(label + Duration::days(1)),
    }
}

fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(date)
}
