use std::num::NonZeroU32;

use axum::{
    extract::{Query, State},
    http::{
        HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use chrono_tz::Tz;
use rudra_api_types::parse_calendar_date;
use serde::Deserialize;
use time::{Date, macros::format_description};
use tracing::info;
use url::form_urlencoded::Serializer;

use crate::application::audit::{AuditPageRequest, AuditTrailPage};
use crate::application::error::ErrorReport;
use crate::application::repos::RepoError;
use crate::domain::audit::{AuditCriteria, AuditFacets, FacetCount};
use crate::domain::paging::{PageState, ROWS_PER_PAGE_OPTIONS, rows_per_page_or};
use crate::infra::http::session::CurrentUser;
use crate::infra::http::{repo_error_status, repo_error_summary, repo_error_to_http};
use crate::presentation::{admin::views as admin_views, views::render_template_response};
use crate::util::timezone;

use super::AdminState;

const AUDIT_PATH: &str = "/audit-trail";
const EXPORT_PATH: &str = "/audit-trail/export";
const PAGE_WINDOW: u32 = 7;

/// Raw query values. Everything is a string so a malformed field is ignored
/// with a notice instead of failing the whole request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct AdminAuditQuery {
    category: Option<String>,
    action: Option<String>,
    user: Option<String>,
    start: Option<String>,
    end: Option<String>,
    page: Option<String>,
    rows: Option<String>,
}

struct ParsedAuditQuery {
    criteria: AuditCriteria,
    request: AuditPageRequest,
    notices: Vec<String>,
}

fn parse_date_field(raw: Option<&str>, label: &str, notices: &mut Vec<String>) -> Option<Date> {
    let raw = raw.map(str::trim).filter(|value| !value.is_empty())?;
    match parse_calendar_date(raw) {
        Ok(date) => Some(date),
        Err(_) => {
            notices.push(format!("Ignored invalid {label} date \"{raw}\"."));
            None
        }
    }
}

fn parse_number_field(raw: Option<&str>, label: &str, notices: &mut Vec<String>) -> Option<u32> {
    let raw = raw.map(str::trim).filter(|value| !value.is_empty())?;
    match raw.parse::<u32>() {
        Ok(value) => Some(value),
        Err(_) => {
            notices.push(format!("Ignored invalid {label} \"{raw}\"."));
            None
        }
    }
}

fn parse_audit_query(query: AdminAuditQuery) -> ParsedAuditQuery {
    let mut notices = Vec::new();
    let start = parse_date_field(query.start.as_deref(), "start", &mut notices);
    let end = parse_date_field(query.end.as_deref(), "end", &mut notices);
    let page = parse_number_field(query.page.as_deref(), "page", &mut notices);
    let rows_per_page = parse_number_field(query.rows.as_deref(), "rows per page", &mut notices);

    ParsedAuditQuery {
        criteria: AuditCriteria::from_parts(query.category, query.action, query.user, start, end),
        request: AuditPageRequest {
            page,
            rows_per_page,
        },
        notices,
    }
}

fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

fn build_audit_filter_query(criteria: &AuditCriteria) -> String {
    let mut serializer = Serializer::new(String::new());

    if let Some(category) = criteria.category.as_deref() {
        serializer.append_pair("category", category);
    }

    if let Some(action) = criteria.action.as_deref() {
        serializer.append_pair("action", action);
    }

    if let Some(user) = criteria.user_search.as_deref() {
        serializer.append_pair("user", user);
    }

    if let Some(start) = criteria.start_date {
        serializer.append_pair("start", &format_date(start));
    }

    if let Some(end) = criteria.end_date {
        serializer.append_pair("end", &format_date(end));
    }

    serializer.finish()
}

fn page_href(filter_query: &str, rows_per_page: u32, page: u32) -> String {
    let mut href = format!("{AUDIT_PATH}?");
    if !filter_query.is_empty() {
        href.push_str(filter_query);
        href.push('&');
    }
    href.push_str(&format!("rows={rows_per_page}&page={page}"));
    href
}

fn with_query(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

/// Up to `PAGE_WINDOW` consecutive page numbers centred on `current`.
fn page_window(current: u32, total: u32) -> std::ops::RangeInclusive<u32> {
    if total == 0 {
        return 1..=0;
    }
    let half = PAGE_WINDOW / 2;
    let end = current.saturating_add(half).max(PAGE_WINDOW).min(total);
    let start = end.saturating_sub(PAGE_WINDOW - 1).max(1);
    start..=end
}

fn facet_options(
    facets: &[FacetCount],
    selected: Option<&str>,
) -> Vec<admin_views::AdminAuditOptionView> {
    let mut options: Vec<_> = facets
        .iter()
        .map(|facet| admin_views::AdminAuditOptionView {
            value: facet.value.clone(),
            label: format!("{} ({})", facet.value, facet.count),
            is_selected: selected == Some(facet.value.as_str()),
        })
        .collect();

    // Keep a filter for a value absent from the trail visible in the form.
    if let Some(value) = selected
        && !facets.iter().any(|facet| facet.value == value)
    {
        options.push(admin_views::AdminAuditOptionView {
            value: value.to_string(),
            label: format!("{value} (0)"),
            is_selected: true,
        });
    }
    options
}

fn pagination_view(
    page: &AuditTrailPage,
    filter_query: &str,
) -> admin_views::AdminAuditPaginationView {
    let current = page.page.current_page();
    let total_pages = page.total_pages();
    let rows_per_page = page.page.rows_per_page();

    let summary = match page.showing() {
        Some((first, last)) => {
            format!("Showing {first}-{last} of {} records", page.total_matching)
        }
        None => format!("Showing 0 of {} records", page.total_matching),
    };

    admin_views::AdminAuditPaginationView {
        current_page: current,
        total_pages,
        summary,
        previous_href: page
            .has_previous()
            .then(|| page_href(filter_query, rows_per_page, current - 1)),
        next_href: page
            .has_next()
            .then(|| page_href(filter_query, rows_per_page, current + 1)),
        pages: page_window(current, total_pages)
            .map(|number| admin_views::AdminPageLinkView {
                number,
                href: page_href(filter_query, rows_per_page, number),
                is_current: number == current,
            })
            .collect(),
    }
}

fn audit_list_view(
    page: &AuditTrailPage,
    tz: Tz,
    mut notices: Vec<String>,
    error: Option<String>,
) -> admin_views::AdminAuditListView {
    if let Some(rejected) = page.rejected_page {
        notices.push(format!("Page {rejected} does not exist; showing page 1."));
    }

    let criteria = &page.criteria;
    let filter_query = build_audit_filter_query(criteria);
    let rows_per_page = page.page.rows_per_page();

    let entries = page
        .rows
        .iter()
        .map(|event| admin_views::AdminAuditRowView {
            time: timezone::format_display(event.timestamp, tz),
            description: event.description.clone(),
            event_type: event.event_type.clone(),
            category: event.category.clone(),
            performed_by: event.performed_by.clone(),
        })
        .collect();

    admin_views::AdminAuditListView {
        heading: "Audit Trail".to_string(),
        entries,
        category_options: facet_options(&page.facets.categories, criteria.category.as_deref()),
        action_options: facet_options(&page.facets.event_types, criteria.action.as_deref()),
        rows_options: ROWS_PER_PAGE_OPTIONS
            .iter()
            .map(|&value| admin_views::AdminRowsPerPageOption {
                value,
                is_selected: value == rows_per_page,
            })
            .collect(),
        filter_user: criteria.user_search.clone().unwrap_or_default(),
        filter_start: criteria.start_date.map(format_date).unwrap_or_default(),
        filter_end: criteria.end_date.map(format_date).unwrap_or_default(),
        rows_per_page,
        total_matching: page.total_matching,
        total_events: page.total_events,
        pagination: pagination_view(page, &filter_query),
        export_href: with_query(EXPORT_PATH, &filter_query),
        clear_href: AUDIT_PATH.to_string(),
        timezone: tz.name().to_string(),
        notice: (!notices.is_empty()).then(|| notices.join(" ")),
        error,
        empty_message: "No audit records found".to_string(),
    }
}

/// Page shown when the trail could not be fetched: filters kept, no rows.
fn unavailable_page(
    criteria: AuditCriteria,
    request: AuditPageRequest,
    default_rows: NonZeroU32,
) -> AuditTrailPage {
    AuditTrailPage {
        rows: Vec::new(),
        total_events: 0,
        total_matching: 0,
        page: PageState::new(rows_per_page_or(request.rows_per_page, default_rows)),
        criteria,
        facets: AuditFacets::default(),
        rejected_page: None,
    }
}

pub(super) async fn admin_audit(
    State(state): State<AdminState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<AdminAuditQuery>,
) -> Response {
    let chrome = state.chrome.load(AUDIT_PATH, Some(&user));
    let tz = state.audit.timezone();
    let ParsedAuditQuery {
        criteria,
        request,
        notices,
    } = parse_audit_query(query);

    let (content, status, failure) = match state.audit.load(criteria.clone(), request).await {
        Ok(page) => (audit_list_view(&page, tz, notices, None), StatusCode::OK, None),
        Err(err) => {
            let status = repo_error_status(&err);
            let page = unavailable_page(criteria, request, state.audit.default_rows_per_page());
            let message = format!("Error loading audit trail: {}", repo_error_summary(&err));
            (
                audit_list_view(&page, tz, notices, Some(message)),
                status,
                Some(err),
            )
        }
    };

    let view = admin_views::AdminLayout::new(chrome, content);
    let mut response = render_template_response(admin_views::AdminAuditTemplate { view }, status);
    if let Some(err) = failure {
        attach_repo_report(&mut response, &err);
    }
    response
}

fn attach_repo_report(response: &mut Response, err: &RepoError) {
    ErrorReport::from_error("infra::http::admin_audit", err).attach(response);
}

pub(super) async fn admin_audit_export(
    State(state): State<AdminState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<AdminAuditQuery>,
) -> Response {
    let ParsedAuditQuery { criteria, .. } = parse_audit_query(query);

    let export = match state.audit.export_csv(&criteria).await {
        Ok(export) => export,
        Err(err) => {
            return repo_error_to_http("infra::http::admin_audit_export", err).into_response();
        }
    };

    info!(
        target = "rudra::http::admin::audit",
        user_id = %user.id,
        rows = export.rows,
        filename = %export.filename,
        "audit trail exported"
    );

    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    let mut response = export.body.into_response();
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(CONTENT_DISPOSITION, value);
    }
    response
}
