mod support;

use rudra::application::audit::AuditPageRequest;
use rudra::application::repos::RepoError;
use rudra::domain::audit::AuditCriteria;
use time::macros::date;

use support::{InMemoryBackend, at, audit_service, event};

fn twelve_events() -> Vec<rudra::domain::audit::AuditEvent> {
    (0..12u8)
        .map(|i| {
            let category = if i % 3 == 0 { "Router" } else { "Tenant" };
            let action = if i % 2 == 0 { "Created" } else { "Updated" };
            event(
                at(date!(2025 - 03 - 01), i, 0),
                &format!("event {i}"),
                action,
                category,
                if i < 6 { "asha@future.konnect" } else { "ravi@future.konnect" },
            )
        })
        .collect()
}

#[tokio::test]
async fn twelve_events_split_into_ten_and_two() {
    let backend = InMemoryBackend::with_events(twelve_events());
    let service = audit_service(&backend, chrono_tz::UTC);

    let first = service
        .load(AuditCriteria::default(), AuditPageRequest::default())
        .await
        .expect("page 1");
    assert_eq!(first.rows.len(), 10);
    assert_eq!(first.total_pages(), 2);
    assert_eq!(first.showing(), Some((1, 10)));
    assert!(first.has_next());

    let second = service
        .load(
            AuditCriteria::default(),
            AuditPageRequest {
                page: Some(2),
                rows_per_page: None,
            },
        )
        .await
        .expect("page 2");
    assert_eq!(second.rows.len(), 2);
    assert_eq!(second.rows[0].description, "event 10");
    assert!(!second.has_next());

    let third = service
        .load(
            AuditCriteria::default(),
            AuditPageRequest {
                page: Some(3),
                rows_per_page: None,
            },
        )
        .await
        .expect("page 3 falls back");
    assert_eq!(third.rejected_page, Some(3));
    assert_eq!(third.page.current_page(), 1);
    assert_eq!(third.rows.len(), 10);
}

#[tokio::test]
async fn category_filter_only_returns_that_category() {
    let backend = InMemoryBackend::with_events(twelve_events());
    let service = audit_service(&backend, chrono_tz::UTC);

    let criteria = AuditCriteria::from_parts(Some("Router".into()), None, None, None, None);
    let page = service
        .load(criteria, AuditPageRequest::default())
        .await
        .expect("filtered");

    assert_eq!(page.total_matching, 4);
    assert_eq!(page.total_events, 12);
    assert!(page.rows.iter().all(|row| row.category == "Router"));
    assert_eq!(page.facets.categories.len(), 2);
}

#[tokio::test]
async fn user_search_and_rows_per_page_combine() {
    let backend = InMemoryBackend::with_events(twelve_events());
    let service = audit_service(&backend, chrono_tz::UTC);

    let criteria = AuditCriteria::from_parts(None, None, Some("RAVI".into()), None, None);
    let page = service
        .load(
            criteria,
            AuditPageRequest {
                page: Some(2),
                rows_per_page: Some(5),
            },
        )
        .await
        .expect("filtered");

    assert_eq!(page.total_matching, 6);
    assert_eq!(page.page.rows_per_page(), 5);
    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.rows[0].description, "event 11");
}

#[tokio::test]
async fn date_range_uses_display_zone_days() {
    // 2025-03-01 20:00 UTC is already 2025-03-02 in Kolkata.
    let backend = InMemoryBackend::with_events(vec![
        event(at(date!(2025 - 03 - 01), 10, 0), "morning", "Created", "Router", "asha"),
        event(at(date!(2025 - 03 - 01), 20, 0), "evening", "Created", "Router", "asha"),
    ]);
    let service = audit_service(&backend, chrono_tz::Asia::Kolkata);

    let criteria = AuditCriteria::from_parts(
        None,
        None,
        None,
        Some(date!(2025 - 03 - 02)),
        Some(date!(2025 - 03 - 02)),
    );
    let page = service
        .load(criteria, AuditPageRequest::default())
        .await
        .expect("filtered");

    let descriptions: Vec<&str> = page.rows.iter().map(|row| row.description.as_str()).collect();
    assert_eq!(descriptions, ["evening"]);
}

#[tokio::test]
async fn export_writes_header_and_one_line_per_match() {
    let backend = InMemoryBackend::with_events(vec![
        event(at(date!(2025 - 02 - 28), 23, 0), "Late report", "Created", "Tenant", "ravi"),
        event(
            at(date!(2025 - 03 - 01), 9, 30),
            "Router \"edge-1\" rebooted",
            "Reboot",
            "Router",
            "asha@future.konnect",
        ),
        event(at(date!(2025 - 03 - 01), 10, 0), "Tenant added", "Created", "Tenant", "ravi"),
        event(
            at(date!(2025 - 03 - 01), 11, 15),
            "Firewall template applied",
            "Applied",
            "Firewall, Template",
            "ravi",
        ),
        event(at(date!(2025 - 03 - 02), 0, 5), "Fleet synced", "Synced", "Fleet", "asha"),
        event(at(date!(2025 - 03 - 03), 8, 0), "Billing run", "Created", "Billing", "ravi"),
    ]);
    let service = audit_service(&backend, chrono_tz::UTC);

    let criteria = AuditCriteria::from_parts(
        None,
        None,
        None,
        Some(date!(2025 - 03 - 01)),
        Some(date!(2025 - 03 - 01)),
    );
    let export = service.export_csv(&criteria).await.expect("export");

    assert_eq!(export.rows, 3);
    assert!(export.filename.starts_with("audit_trail_"));
    assert!(export.filename.ends_with(".csv"));
    insta::assert_snapshot!(export.body, @r#"
    Time,Description,Event,Category,Performed By
    2025-03-01T09:30:00Z,"Router ""edge-1"" rebooted",Reboot,Router,asha@future.konnect
    2025-03-01T10:00:00Z,"Tenant added",Created,Tenant,ravi
    2025-03-01T11:15:00Z,"Firewall template applied",Applied,"Firewall, Template",ravi
    "#);
}

#[tokio::test]
async fn empty_result_rests_on_page_one() {
    let backend = InMemoryBackend::with_events(vec![event(
        at(date!(2025 - 03 - 01), 9, 0),
        "edge-1 rebooted",
        "Reboot",
        "Router",
        "asha",
    )]);
    let service = audit_service(&backend, chrono_tz::UTC);

    let criteria = AuditCriteria::from_parts(Some("Nope".into()), None, None, None, None);
    let page = service
        .load(
            criteria.clone(),
            AuditPageRequest {
                page: Some(1),
                rows_per_page: None,
            },
        )
        .await
        .expect("empty page");

    assert_eq!(page.total_matching, 0);
    assert!(page.rows.is_empty());
    assert_eq!(page.rejected_page, None);
    assert_eq!(page.page.current_page(), 1);

    let beyond = service
        .load(
            criteria,
            AuditPageRequest {
                page: Some(2),
                rows_per_page: None,
            },
        )
        .await
        .expect("falls back");
    assert_eq!(beyond.rejected_page, Some(2));
}

#[tokio::test]
async fn upstream_failure_is_reported() {
    let backend = InMemoryBackend::with_events(twelve_events());
    backend.fail_with("connection refused").await;
    let service = audit_service(&backend, chrono_tz::UTC);

    let err = service
        .load(AuditCriteria::default(), AuditPageRequest::default())
        .await
        .expect_err("outage");
    assert!(matches!(err, RepoError::Persistence(message) if message == "connection refused"));
}
