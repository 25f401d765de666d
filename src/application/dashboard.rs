//! Usage overview shown on the dashboard.

use std::sync::Arc;

use crate::application::repos::{RepoError, UsageRepo};
use crate::domain::usage::{DailyUsage, TenantUsage, UsageSummary};

/// Outcome of loading one dashboard panel. Panels fail independently.
#[derive(Debug)]
pub enum PanelState<T> {
    Loaded(Vec<T>),
    Empty,
    Failed(RepoError),
}

impl<T> PanelState<T> {
    fn from_result(result: Result<Vec<T>, RepoError>) -> Self {
        match result {
            Ok(rows) if rows.is_empty() => Self::Empty,
            Ok(rows) => Self::Loaded(rows),
            Err(err) => Self::Failed(err),
        }
    }

    pub fn rows(&self) -> &[T] {
        match self {
            Self::Loaded(rows) => rows,
            Self::Empty | Self::Failed(_) => &[],
        }
    }
}

#[derive(Debug)]
pub struct DashboardOverview {
    pub tenants: PanelState<TenantUsage>,
    pub daily: PanelState<DailyUsage>,
    pub summary: UsageSummary,
}

#[derive(Clone)]
pub struct DashboardService {
    usage: Arc<dyn UsageRepo>,
}

impl DashboardService {
    pub fn new(usage: Arc<dyn UsageRepo>) -> Self {
        Self { usage }
    }

    /// Fetch both usage series concurrently.
    pub async fn overview(&self) -> DashboardOverview {
        let (tenants, daily) = tokio::join!(self.usage.tenant_usage(), self.usage.daily_usage());

        let tenants = PanelState::from_result(tenants);
        let daily = PanelState::from_result(daily);
        let summary = UsageSummary::compute(tenants.rows(), daily.rows());

        DashboardOverview {
            tenants,
            daily,
            summary,
        }
    }
}
