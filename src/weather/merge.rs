//! Tier-priority merge of daily weather rows
//!
//! The merge is keyed by calendar date and filled in strict tier order. A
//! lower-priority tier may only write a date that is still absent or whose
//! record has a null `temp_max`.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::codes::{CLIMATE_PLACEHOLDER, describe};
use super::source::TierRow;
use super::tier::{Tier, dates_between};
use crate::models::DailyWeather;

/// Rows a single tier contributed
#[derive(Debug, Clone)]
pub struct TierContribution {
    pub tier: Tier,
    pub rows: Vec<TierRow>,
}

/// Merged series plus the dates nothing covered
#[derive(Debug, Clone, PartialEq)]
pub struct MergedSeries {
    /// One record per date of the requested range, ascending
    pub days: Vec<DailyWeather>,
    /// Dates represented by gap records
    pub gaps: Vec<NaiveDate>,
}

/// Merge contributions into one record per date of `[start, end]`
#[must_use]
pub fn merge_tiers(
    start: NaiveDate,
    end: NaiveDate,
    contributions: &[TierContribution],
) -> MergedSeries {
    let mut ordered: Vec<&TierContribution> = contributions.iter().collect();
    ordered.sort_by_key(|contribution| contribution.tier);

    let mut by_date: BTreeMap<NaiveDate, DailyWeather> = BTreeMap::new();
    for contribution in ordered {
        for row in &contribution.rows {
            if row.date < start || row.date > end {
                continue;
            }
            let writable = by_date
                .get(&row.date)
                .is_none_or(|existing| existing.temp_max.is_none());
            if writable {
                by_date.insert(row.date, to_daily(contribution.tier, row));
            }
        }
    }

    let mut days = Vec::new();
    let mut gaps = Vec::new();
    for date in dates_between(start, end) {
        match by_date.remove(&date) {
            Some(day) => days.push(day),
            None => {
                gaps.push(date);
                days.push(DailyWeather::gap(date));
            }
        }
    }

    MergedSeries { days, gaps }
}

fn to_daily(tier: Tier, row: &TierRow) -> DailyWeather {
    let condition = if tier.includes_weather_code() {
        describe(row.weather_code)
    } else {
        CLIMATE_PLACEHOLDER.to_string()
    };

    DailyWeather {
        date: row.date,
        source: Some(tier.source()),
        temp_max: row.temp_max,
        temp_min: row.temp_min,
        precipitation: row.precipitation,
        condition,
    }
}
