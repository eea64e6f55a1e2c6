//! Monthly climate normals and the qualitative labels derived from them

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::source::TierRow;

/// Long-run averages for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyNormal {
    /// Calendar month, 1-12
    pub month: u32,
    /// Mean of daily maximum temperatures in Celsius
    pub temp_max: Option<f64>,
    /// Mean of daily minimum temperatures in Celsius
    pub temp_min: Option<f64>,
    /// Mean monthly precipitation total in mm
    pub precipitation: Option<f64>,
}

/// Qualitative condition for an average monthly precipitation total
#[must_use]
pub fn condition_for_precipitation(precipitation: Option<f64>) -> &'static str {
    match precipitation {
        None => "average climate",
        Some(mm) if mm < 50.0 => "mostly clear",
        Some(mm) if mm < 150.0 => "mostly cloudy",
        Some(_) => "frequently rainy",
    }
}

/// Whole calendar years `(first, last)` ending the year before `reference`
#[must_use]
pub fn normals_years(reference: NaiveDate, years: u32) -> (i32, i32) {
    let last = reference.year() - 1;
    let span = i32::try_from(years.max(1)).unwrap_or(1);
    (last - span + 1, last)
}

/// Reduce daily history to twelve monthly normals.
///
/// Temperatures are averaged over all days of the month; precipitation is
/// summed per (year, month) and the sums are averaged across years. Months
/// with no data at all are returned with null fields.
#[must_use]
pub fn monthly_normals_from_daily(rows: &[TierRow]) -> Vec<MonthlyNormal> {
    let mut max_by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    let mut min_by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    let mut precipitation_totals: BTreeMap<(i32, u32), f64> = BTreeMap::new();

    for row in rows {
        let month = row.date.month();
        if let Some(temp_max) = row.temp_max {
            max_by_month.entry(month).or_default().push(temp_max);
        }
        if let Some(temp_min) = row.temp_min {
            min_by_month.entry(month).or_default().push(temp_min);
        }
        if let Some(precipitation) = row.precipitation {
            *precipitation_totals
                .entry((row.date.year(), month))
                .or_insert(0.0) += precipitation;
        }
    }

    let mut precipitation_by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for ((_, month), total) in precipitation_totals {
        precipitation_by_month.entry(month).or_default().push(total);
    }

    (1..=12)
        .map(|month| MonthlyNormal {
            month,
            temp_max: mean(max_by_month.get(&month)),
            temp_min: mean(min_by_month.get(&month)),
            precipitation: mean(precipitation_by_month.get(&month)),
        })
        .collect()
}

fn mean(values: Option<&Vec<f64>>) -> Option<f64> {
    let values = values.filter(|v| !v.is_empty())?;
    #[allow(clippy::cast_precision_loss)]
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
