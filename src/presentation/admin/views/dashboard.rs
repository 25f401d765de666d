use askama::Template;

use super::AdminLayout;

#[derive(Clone)]
pub struct AdminMetricView {
    pub label: String,
    pub value: String,
    pub hint: Option<String>,
}

#[derive(Clone)]
pub struct AdminTenantUsageRowView {
    pub tenant_id: String,
    pub gigabytes: String,
}

#[derive(Clone)]
pub struct AdminDailyUsageBarView {
    pub date: String,
    pub gigabytes: String,
    pub percent: u8,
}

/// Table panel with its own error/empty state.
#[derive(Clone)]
pub struct AdminDashboardPanelView<T> {
    pub title: String,
    pub rows: Vec<T>,
    pub error: Option<String>,
    pub empty_message: String,
}

impl<T> AdminDashboardPanelView<T> {
    pub fn is_empty(&self) -> bool {
        self.error.is_none() && self.rows.is_empty()
    }
}

#[derive(Clone)]
pub struct AdminDashboardView {
    pub title: String,
    pub metrics: Vec<AdminMetricView>,
    pub tenants: AdminDashboardPanelView<AdminTenantUsageRowView>,
    pub daily: AdminDashboardPanelView<AdminDailyUsageBarView>,
}

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct AdminDashboardTemplate {
    pub view: AdminLayout<AdminDashboardView>,
}
