//! Outcome type for operations that can partially succeed

use chrono::NaiveDate;
use serde::Serialize;

use crate::weather::Tier;

/// Something that went wrong while assembling a result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DataIssue {
    /// A tier (or the climate-normals lookup) failed or returned nothing usable
    LookupFailure { tier: Tier, message: String },
    /// Dates that no source could supply; they carry null values
    PartialDataGap { dates: Vec<NaiveDate> },
}

impl std::fmt::Display for DataIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataIssue::LookupFailure { tier, message } => {
                write!(f, "{} lookup failed: {message}", tier.name())
            }
            DataIssue::PartialDataGap { dates } => {
                let dates: Vec<String> = dates.iter().map(ToString::to_string).collect();
                write!(f, "no data for {}", dates.join(", "))
            }
        }
    }
}

/// Result of a multi-source fetch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FetchOutcome<T> {
    Success(T),
    PartialFailure { data: T, issues: Vec<DataIssue> },
    TotalFailure { issues: Vec<DataIssue> },
}

impl<T> FetchOutcome<T> {
    /// Build an outcome from data and the issues collected while producing it
    pub fn from_parts(data: T, issues: Vec<DataIssue>) -> Self {
        if issues.is_empty() {
            FetchOutcome::Success(data)
        } else {
            FetchOutcome::PartialFailure { data, issues }
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        match self {
            FetchOutcome::Success(data) | FetchOutcome::PartialFailure { data, .. } => Some(data),
            FetchOutcome::TotalFailure { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            FetchOutcome::Success(data) | FetchOutcome::PartialFailure { data, .. } => Some(data),
            FetchOutcome::TotalFailure { .. } => None,
        }
    }

    #[must_use]
    pub fn issues(&self) -> &[DataIssue] {
        match self {
            FetchOutcome::Success(_) => &[],
            FetchOutcome::PartialFailure { issues, .. } | FetchOutcome::TotalFailure { issues } => {
                issues
            }
        }
    }
}
