use askama::Template;

use super::AdminLayout;

/// Single audit trail row.
#[derive(Clone)]
pub struct AdminAuditRowView {
    pub time: String,
    pub description: String,
    pub event_type: String,
    pub category: String,
    pub performed_by: String,
}

/// Drop-down option built from the values present in the trail.
#[derive(Clone)]
pub struct AdminAuditOptionView {
    pub value: String,
    pub label: String,
    pub is_selected: bool,
}

#[derive(Clone)]
pub struct AdminRowsPerPageOption {
    pub value: u32,
    pub is_selected: bool,
}

#[derive(Clone)]
pub struct AdminPageLinkView {
    pub number: u32,
    pub href: String,
    pub is_current: bool,
}

#[derive(Clone)]
pub struct AdminAuditPaginationView {
    pub current_page: u32,
    pub total_pages: u32,
    pub summary: String,
    pub previous_href: Option<String>,
    pub next_href: Option<String>,
    pub pages: Vec<AdminPageLinkView>,
}

#[derive(Clone)]
pub struct AdminAuditListView {
    pub heading: String,
    pub entries: Vec<AdminAuditRowView>,
    pub category_options: Vec<AdminAuditOptionView>,
    pub action_options: Vec<AdminAuditOptionView>,
    pub rows_options: Vec<AdminRowsPerPageOption>,

    // Current filter values
    pub filter_user: String,
    pub filter_start: String,
    pub filter_end: String,
    pub rows_per_page: u32,

    pub total_matching: usize,
    pub total_events: usize,
    pub pagination: AdminAuditPaginationView,
    pub export_href: String,
    pub clear_href: String,
    pub timezone: String,
    pub notice: Option<String>,
    pub error: Option<String>,
    pub empty_message: String,
}

impl AdminAuditListView {
    pub fn has_entries(&self) -> bool {
        !self.entries.is_empty()
    }
}

#[derive(Template)]
#[template(path = "admin/audit.html")]
pub struct AdminAuditTemplate {
    pub view: AdminLayout<AdminAuditListView>,
}
