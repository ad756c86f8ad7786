//! Retention timeframes for the audit trail purge

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Retention window used to bulk-purge old audit records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupTimeframe {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TenYears,
}

impl CleanupTimeframe {
    /// Cutoff timestamp: records strictly older than this are purged
    ///
    /// Months are approximated as 30 days and years as 365, matching the
    /// coarse retention buckets rather than calendar arithmetic.
    pub fn cutoff_from(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let days = match self {
            Self::OneMonth => 30,
            Self::ThreeMonths => 90,
            Self::SixMonths => 180,
            Self::OneYear => 365,
            Self::TenYears => 3650,
        };
        now - Duration::days(days)
    }
}

impl std::fmt::Display for CleanupTimeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::OneMonth => "one_month",
            Self::ThreeMonths => "three_months",
            Self::SixMonths => "six_months",
            Self::OneYear => "one_year",
            Self::TenYears => "ten_years",
        };
        write!(f, "{name}")
    }
}
