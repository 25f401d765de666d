//! Tenant and daily data-usage figures shown on the dashboard.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::Date;

const MIB_PER_GIB: f64 = 1024.0;
const KIB_PER_GIB: f64 = 1024.0 * 1024.0;

/// Usage of one tenant. `data_used` is in MiB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantUsage {
    pub id: String,
    pub tenant_id: String,
    pub data_used: f64,
}

impl TenantUsage {
    pub fn gigabytes(&self) -> f64 {
        self.data_used / MIB_PER_GIB
    }
}

/// Traffic recorded on one calendar day. `total_data_used` is in KiB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyUsage {
    pub recorded_on: Date,
    pub total_data_used: f64,
}

impl DailyUsage {
    /// Whole gigabytes, the unit the daily chart is drawn in.
    pub fn rounded_gigabytes(&self) -> f64 {
        (self.total_data_used / KIB_PER_GIB).round()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeakDay {
    pub recorded_on: Date,
    pub gigabytes: f64,
}

/// Headline numbers for the dashboard cards.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageSummary {
    pub total_gigabytes: f64,
    pub tenant_count: usize,
    pub days_recorded: usize,
    pub peak_day: Option<PeakDay>,
}

impl UsageSummary {
    pub fn compute(tenants: &[TenantUsage], daily: &[DailyUsage]) -> Self {
        let total_gigabytes = tenants
            .iter()
            .map(TenantUsage::gigabytes)
            .filter(|value| value.is_finite())
            .sum();
        let tenant_count = tenants
            .iter()
            .map(|row| row.tenant_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        // First maximum wins so ties resolve to the earliest day.
        let peak_day = daily.iter().fold(None::<&DailyUsage>, |best, day| match best {
            Some(current) if current.total_data_used >= day.total_data_used => Some(current),
            _ => Some(day),
        });

        Self {
            total_gigabytes,
            tenant_count,
            days_recorded: daily.len(),
            peak_day: peak_day.map(|day| PeakDay {
                recorded_on: day.recorded_on,
                gigabytes: day.total_data_used / KIB_PER_GIB,
            }),
        }
    }
}

/// Scale each day against the busiest one, in whole percent, for bar widths.
pub fn bar_percentages(daily: &[DailyUsage]) -> Vec<u8> {
    let max = daily
        .iter()
        .map(|day| day.total_data_used)
        .fold(0.0_f64, f64::max);
    daily
        .iter()
        .map(|day| {
            if max <= 0.0 || !day.total_data_used.is_finite() {
                0
            } else {
                ((day.total_data_used / max) * 100.0).round().clamp(0.0, 100.0) as u8
            }
        })
        .collect()
}
