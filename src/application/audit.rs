//! Audit trail browsing and CSV export.

use std::num::NonZeroU32;
use std::sync::Arc;

use chrono_tz::Tz;
use metrics::counter;
use tracing::debug;

use crate::application::repos::{AuditRepo, RepoError};
use crate::domain::audit::{AuditCriteria, AuditEvent, AuditFacets, AuditView, filter_events};
use crate::domain::paging::{PageState, paginate, rows_per_page_or};
use crate::util::timezone;

const CSV_HEADER: &str = "Time,Description,Event,Category,Performed By";

/// Page selection as requested by the caller; unset fields use defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditPageRequest {
    pub page: Option<u32>,
    pub rows_per_page: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct AuditTrailPage {
    pub rows: Vec<AuditEvent>,
    pub total_events: usize,
    pub total_matching: usize,
    pub page: PageState,
    pub criteria: AuditCriteria,
    pub facets: AuditFacets,
    /// Set when the requested page was outside the result and page 1 was served instead.
    pub rejected_page: Option<u32>,
}

impl AuditTrailPage {
    pub fn total_pages(&self) -> u32 {
        self.page.total_pages(self.total_matching)
    }

    pub fn has_next(&self) -> bool {
        self.page.has_next(self.total_matching)
    }

    pub fn has_previous(&self) -> bool {
        self.page.has_previous()
    }

    /// 1-based index range of the visible rows, `None` when nothing matches.
    pub fn showing(&self) -> Option<(usize, usize)> {
        let range = self.page.range(self.total_matching);
        (!range.is_empty()).then(|| (range.start + 1, range.end))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditExport {
    pub filename: String,
    pub rows: usize,
    pub body: String,
}

#[derive(Clone)]
pub struct AuditTrailService {
    repo: Arc<dyn AuditRepo>,
    timezone: Tz,
    default_rows_per_page: NonZeroU32,
}

impl AuditTrailService {
    pub fn new(repo: Arc<dyn AuditRepo>, timezone: Tz, default_rows_per_page: NonZeroU32) -> Self {
        Self {
            repo,
            timezone,
            default_rows_per_page,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn default_rows_per_page(&self) -> NonZeroU32 {
        self.default_rows_per_page
    }

    pub async fn load(
        &self,
        criteria: AuditCriteria,
        request: AuditPageRequest,
    ) -> Result<AuditTrailPage, RepoError> {
        let events = self.repo.list_events().await?;
        Ok(self.build_page(&events, criteria, request))
    }

    fn build_page(
        &self,
        events: &[AuditEvent],
        criteria: AuditCriteria,
        request: AuditPageRequest,
    ) -> AuditTrailPage {
        let mut view = AuditView::new(rows_per_page_or(
            request.rows_per_page,
            self.default_rows_per_page,
        ));
        view.update_criteria(criteria);

        let matching = filter_events(events, view.criteria(), self.timezone);

        let mut rejected_page = None;
        if let Some(page) = request.page
            && let Err(err) = view.go_to_page(page, matching.len())
        {
            debug!(
                target = "rudra::application::audit",
                error = %err,
                "ignoring out-of-range page request"
            );
            rejected_page = Some(page);
        }

        let rows = paginate(&matching, view.page())
            .iter()
            .map(|event| (*event).clone())
            .collect();

        AuditTrailPage {
            rows,
            total_events: events.len(),
            total_matching: matching.len(),
            page: *view.page(),
            criteria: view.criteria().clone(),
            facets: AuditFacets::collect(events),
            rejected_page,
        }
    }

    /// Every event matching `criteria`, rendered as CSV.
    pub async fn export_csv(&self, criteria: &AuditCriteria) -> Result<AuditExport, RepoError> {
        let events = self.repo.list_events().await?;
        let matching = filter_events(&events, criteria, self.timezone);
        let body = write_csv(&matching, self.timezone);

        counter!("rudra_audit_export_total").increment(1);

        Ok(AuditExport {
            filename: export_filename(timezone::today(self.timezone)),
            rows: matching.len(),
            body,
        })
    }
}

pub fn export_filename(date: time::Date) -> String {
    format!(
        "audit_trail_{:04}-{:02}-{:02}.csv",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Serialize events as CSV with `\n` line endings.
pub fn write_csv(events: &[&AuditEvent], tz: Tz) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + events.len() * 96);
    out.push_str(CSV_HEADER);
    out.push('\n');

    for event in events {
        let fields = [
            csv_field(&timezone::format_rfc3339(event.timestamp, tz)),
            quoted(&event.description),
            csv_field(&event.event_type),
            csv_field(&event.category),
            csv_field(&event.performed_by),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

// Descriptions are free text and always quoted; the other columns only when needed.
fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        quoted(value)
    } else {
        value.to_string()
    }
}
