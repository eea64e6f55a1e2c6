//! Collaborator traits for raw weather data

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Tier;
use super::climate::MonthlyNormal;
use crate::Result;
use crate::models::Coordinates;

/// One raw daily row as reported by a tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierRow {
    pub date: NaiveDate,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub precipitation: Option<f64>,
    pub weather_code: Option<i64>,
}

/// Tiered daily weather queries
#[async_trait]
pub trait DailySource: Send + Sync {
    /// Fetch raw daily rows for `tier` over the inclusive window `[start, end]`
    async fn fetch_daily(
        &self,
        tier: Tier,
        coordinates: Coordinates,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TierRow>>;
}

/// Long-run monthly averages for a location
#[async_trait]
pub trait ClimateNormalsSource: Send + Sync {
    /// Monthly normals computed over the whole calendar years `first_year..=last_year`
    async fn monthly_normals(
        &self,
        coordinates: Coordinates,
        first_year: i32,
        last_year: i32,
    ) -> Result<Vec<MonthlyNormal>>;
}
