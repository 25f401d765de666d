use axum::{extract::State, http::StatusCode, response::Response};
use time::{Date, macros::format_description};
use tracing::warn;

use crate::application::dashboard::{DashboardOverview, PanelState};
use crate::application::repos::RepoError;
use crate::domain::usage::{DailyUsage, TenantUsage, bar_percentages};
use crate::infra::http::{repo_error_summary, session::CurrentUser};
use crate::presentation::{admin::views as admin_views, views::render_template_response};
use crate::util::bytes::{format_fixed2, format_gigabytes};

use super::AdminState;

pub(super) async fn admin_dashboard(
    State(state): State<AdminState>,
    CurrentUser(user): CurrentUser,
) -> Response {
    let chrome = state.chrome.load("/dashboard", Some(&user));
    let overview = state.dashboard.overview().await;
    let content = dashboard_view(overview);

    let view = admin_views::AdminLayout::new(chrome, content);
    render_template_response(admin_views::AdminDashboardTemplate { view }, StatusCode::OK)
}

fn dashboard_view(overview: DashboardOverview) -> admin_views::AdminDashboardView {
    let summary = &overview.summary;
    let peak = summary.peak_day.as_ref().map_or_else(
        || "n/a".to_string(),
        |peak| format!("{} GB", format_fixed2(peak.gigabytes)),
    );
    let peak_hint = summary.peak_day.as_ref().map(|peak| format_date(peak.recorded_on));

    let metrics = vec![
        admin_views::AdminMetricView {
            label: "Total Data Exchanged".to_string(),
            value: format_gigabytes(summary.total_gigabytes),
            hint: Some("Across all tenants".to_string()),
        },
        admin_views::AdminMetricView {
            label: "Active Tenants".to_string(),
            value: summary.tenant_count.to_string(),
            hint: None,
        },
        admin_views::AdminMetricView {
            label: "Days Recorded".to_string(),
            value: summary.days_recorded.to_string(),
            hint: None,
        },
        admin_views::AdminMetricView {
            label: "Peak Day".to_string(),
            value: peak,
            hint: peak_hint,
        },
    ];

    admin_views::AdminDashboardView {
        title: "Dashboard".to_string(),
        metrics,
        tenants: tenant_panel(overview.tenants),
        daily: daily_panel(overview.daily),
    }
}

fn tenant_panel(
    state: PanelState<TenantUsage>,
) -> admin_views::AdminDashboardPanelView<admin_views::AdminTenantUsageRowView> {
    let (rows, error) = match state {
        PanelState::Loaded(rows) => (rows, None),
        PanelState::Empty => (Vec::new(), None),
        PanelState::Failed(err) => {
            log_panel_failure("tenants", &err);
            (Vec::new(), Some(format!(
                "Error loading tenant data: {}",
                repo_error_summary(&err)
            )))
        }
    };

    admin_views::AdminDashboardPanelView {
        title: "Data Usage by Tenant".to_string(),
        rows: rows
            .iter()
            .map(|row| admin_views::AdminTenantUsageRowView {
                tenant_id: row.tenant_id.clone(),
                gigabytes: format_fixed2(row.gigabytes()),
            })
            .collect(),
        error,
        empty_message: "No tenant data available".to_string(),
    }
}

fn daily_panel(
    state: PanelState<DailyUsage>,
) -> admin_views::AdminDashboardPanelView<admin_views::AdminDailyUsageBarView> {
    let (rows, error) = match state {
        PanelState::Loaded(rows) => (rows, None),
        PanelState::Empty => (Vec::new(), None),
        PanelState::Failed(err) => {
            log_panel_failure("daily", &err);
            (Vec::new(), Some(format!(
                "Error loading usage data: {}",
                repo_error_summary(&err)
            )))
        }
    };

    let percents = bar_percentages(&rows);
    admin_views::AdminDashboardPanelView {
        title: "Daily Data Usage".to_string(),
        rows: rows
            .iter()
            .zip(percents)
            .map(|(day, percent)| admin_views::AdminDailyUsageBarView {
                date: format_date(day.recorded_on),
                gigabytes: format!("{} GB", day.rounded_gigabytes()),
                percent,
            })
            .collect(),
        error,
        empty_message: "No data available for chart".to_string(),
    }
}

fn log_panel_failure(panel: &'static str, err: &RepoError) {
    warn!(
        target = "rudra::http::admin::dashboard",
        panel = panel,
        error = %err,
        "dashboard panel failed to load"
    );
}

fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::usage::UsageSummary;
    use time::macros::date;

    fn overview(tenants: PanelState<TenantUsage>, daily: PanelState<DailyUsage>) -> DashboardOverview {
        let summary = UsageSummary::compute(tenants.rows(), daily.rows());
        DashboardOverview {
            tenants,
            daily,
            summary,
        }
    }

    #[test]
    fn panels_fail_independently() {
        let view = dashboard_view(overview(
            PanelState::Failed(RepoError::Timeout),
            PanelState::Loaded(vec![DailyUsage {
                recorded_on: date!(2025 - 03 - 04),
                total_data_used: 3.0 * 1024.0 * 1024.0,
            }]),
        ));

        assert_eq!(
            view.tenants.error.as_deref(),
            Some("Error loading tenant data: the data service timed out")
        );
        assert!(!view.tenants.is_empty());
        assert!(view.daily.error.is_none());
        assert_eq!(view.daily.rows[0].date, "2025-03-04");
        assert_eq!(view.daily.rows[0].gigabytes, "3 GB");
        assert_eq!(view.daily.rows[0].percent, 100);
    }

    #[test]
    fn empty_panels_use_their_own_messages() {
        let view = dashboard_view(overview(PanelState::Empty, PanelState::Empty));
        assert!(view.tenants.is_empty());
        assert_eq!(view.tenants.empty_message, "No tenant data available");
        assert_eq!(view.daily.empty_message, "No data available for chart");
        let peak = view
            .metrics
            .iter()
            .find(|metric| metric.label == "Peak Day")
            .expect("peak card");
        assert_eq!(peak.value, "n/a");
        assert!(peak.hint.is_none());
    }

    #[test]
    fn tenant_rows_are_shown_in_gigabytes() {
        let view = dashboard_view(overview(
            PanelState::Loaded(vec![TenantUsage {
                id: "1".into(),
                tenant_id: "acme".into(),
                data_used: 2048.0,
            }]),
            PanelState::Empty,
        ));
        assert_eq!(view.tenants.rows[0].tenant_id, "acme");
        assert_eq!(view.tenants.rows[0].gigabytes, "2.00");
        assert_eq!(view.metrics[0].value, "2.00 GB");
        assert_eq!(view.metrics[1].value, "1");
    }
}
