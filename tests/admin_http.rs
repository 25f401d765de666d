mod support;

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use time::macros::date;
use tower::ServiceExt;

use rudra::domain::usage::{DailyUsage, TenantUsage};
use rudra::infra::http::build_admin_router;

use support::{InMemoryBackend, admin_state, at, event};

const SESSION_COOKIE: &str = "token=1";

fn router(backend: &Arc<InMemoryBackend>) -> Router {
    build_admin_router(admin_state(backend))
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

fn post_form(uri: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .expect("request")
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn protected_pages_redirect_to_login_without_a_session() {
    let backend = Arc::new(InMemoryBackend::default());

    for path in ["/dashboard", "/audit-trail", "/audit-trail/export"] {
        let response = router(&backend).oneshot(get(path, None)).await.expect("response");
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), "/login", "{path}");
    }
}

#[tokio::test]
async fn root_follows_the_session_token() {
    let backend = Arc::new(InMemoryBackend::default());

    let anonymous = router(&backend).oneshot(get("/", None)).await.expect("response");
    assert_eq!(location(&anonymous), "/login");

    let signed_in = router(&backend)
        .oneshot(get("/", Some(SESSION_COOKIE)))
        .await
        .expect("response");
    assert_eq!(location(&signed_in), "/dashboard");

    let login_page = router(&backend)
        .oneshot(get("/login", Some(SESSION_COOKIE)))
        .await
        .expect("response");
    assert_eq!(location(&login_page), "/dashboard");
}

#[tokio::test]
async fn unknown_email_gets_generic_error_and_no_cookies() {
    let backend = Arc::new(InMemoryBackend::default());
    backend
        .add_user("1", "Asha", "asha@future.konnect", "correct-horse")
        .await;

    let response = router(&backend)
        .oneshot(post_form(
            "/login",
            "email=nobody%40future.konnect&password=whatever1",
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());
    let body = body_text(response).await;
    assert!(body.contains("Invalid email or password"));
}

#[tokio::test]
async fn wrong_password_gets_the_same_error() {
    let backend = Arc::new(InMemoryBackend::default());
    backend
        .add_user("1", "Asha", "asha@future.konnect", "correct-horse")
        .await;

    let response = router(&backend)
        .oneshot(post_form(
            "/login",
            "email=asha%40future.konnect&password=wrong-horse",
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());
    assert!(body_text(response).await.contains("Invalid email or password"));
}

#[tokio::test]
async fn successful_login_sets_session_cookies() {
    let backend = Arc::new(InMemoryBackend::default());
    backend
        .add_user("1", "Asha", "asha@future.konnect", "correct-horse")
        .await;

    let response = router(&backend)
        .oneshot(post_form(
            "/login",
            "email=asha%40future.konnect&password=correct-horse",
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|cookie| cookie.starts_with("token=1;")));
    assert!(cookies.iter().any(|cookie| cookie.starts_with("user=")));
    assert!(cookies.iter().all(|cookie| cookie.contains("HttpOnly")));
}

#[tokio::test]
async fn blank_login_reports_field_errors() {
    let backend = Arc::new(InMemoryBackend::default());

    let response = router(&backend)
        .oneshot(post_form("/login", "email=&password="))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_text(response).await;
    assert!(body.contains("Email is required"));
    assert!(body.contains("Password is required"));
}

#[tokio::test]
async fn login_outage_is_not_reported_as_bad_credentials() {
    let backend = Arc::new(InMemoryBackend::default());
    backend.fail_with("connection refused").await;

    let response = router(&backend)
        .oneshot(post_form(
            "/login",
            "email=asha%40future.konnect&password=correct-horse",
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_text(response).await;
    assert!(body.contains("Login failed. Please try again."));
    assert!(!body.contains("Invalid email or password"));
}

#[tokio::test]
async fn signup_then_duplicate_signup() {
    let backend = Arc::new(InMemoryBackend::default());
    let form = "name=Ravi&email=ravi%40future.konnect&password=long-enough&confirm_password=long-enough";

    let created = router(&backend)
        .oneshot(post_form("/signup", form))
        .await
        .expect("response");
    assert_eq!(created.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&created), "/login?registered=1");
    assert_eq!(backend.users.lock().await.len(), 1);

    let duplicate = router(&backend)
        .oneshot(post_form("/signup", form))
        .await
        .expect("response");
    assert_eq!(duplicate.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        body_text(duplicate)
            .await
            .contains("An account with this email already exists")
    );

    let notice = router(&backend)
        .oneshot(get("/login?registered=1", None))
        .await
        .expect("response");
    assert!(body_text(notice).await.contains("Account created. Please sign in."));
}

#[tokio::test]
async fn signup_rejects_mismatched_passwords() {
    let backend = Arc::new(InMemoryBackend::default());

    let response = router(&backend)
        .oneshot(post_form(
            "/signup",
            "name=Ravi&email=ravi%40future.konnect&password=long-enough&confirm_password=different1",
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("Passwords do not match"));
    assert!(backend.users.lock().await.is_empty());
}

#[tokio::test]
async fn forgot_password_always_confirms_valid_addresses() {
    let backend = Arc::new(InMemoryBackend::default());

    let response = router(&backend)
        .oneshot(post_form("/forgot-password", "email=ghost%40future.konnect"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Password reset link sent!"));

    let invalid = router(&backend)
        .oneshot(post_form("/forgot-password", "email=not-an-email"))
        .await
        .expect("response");
    assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        body_text(invalid)
            .await
            .contains("Please enter a valid email address")
    );
}

#[tokio::test]
async fn logout_expires_both_cookies() {
    let backend = Arc::new(InMemoryBackend::default());

    let request = Request::builder()
        .method("POST")
        .uri("/logout")
        .header(header::COOKIE, "token=1; user=abc")
        .body(Body::empty())
        .expect("request");
    let response = router(&backend).oneshot(request).await.expect("response");

    assert_eq!(location(&response), "/login");
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|cookie| cookie.contains("Max-Age=0")));
}

#[tokio::test]
async fn dashboard_renders_usage_panels() {
    let backend = Arc::new(InMemoryBackend::default());
    *backend.tenants.lock().await = vec![TenantUsage {
        id: "1".into(),
        tenant_id: "acme-isp".into(),
        data_used: 2048.0,
    }];
    *backend.daily.lock().await = vec![DailyUsage {
        recorded_on: date!(2025 - 03 - 04),
        total_data_used: 5.0 * 1024.0 * 1024.0,
    }];

    let response = router(&backend)
        .oneshot(get("/dashboard", Some(SESSION_COOKIE)))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Total Data Exchanged"));
    assert!(body.contains("acme-isp"));
    assert!(body.contains("2025-03-04"));
    assert!(body.contains("width: 100%"));
}

#[tokio::test]
async fn dashboard_shows_panel_errors_inline() {
    let backend = Arc::new(InMemoryBackend::default());
    backend.fail_with("connection refused").await;

    let response = router(&backend)
        .oneshot(get("/dashboard", Some(SESSION_COOKIE)))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Error loading tenant data: the data service is unavailable"));
    assert!(body.contains("Error loading usage data: the data service is unavailable"));
    assert!(!body.contains("connection refused"));
}

#[tokio::test]
async fn audit_trail_pages_and_rejects_missing_pages() {
    let events = (0..12u8)
        .map(|i| {
            event(
                at(date!(2025 - 03 - 01), i, 0),
                &format!("entry number {i}"),
                "Created",
                "Router",
                "asha",
            )
        })
        .collect();
    let backend = InMemoryBackend::with_events(events);

    let page_two = router(&backend)
        .oneshot(get("/audit-trail?page=2", Some(SESSION_COOKIE)))
        .await
        .expect("response");
    assert_eq!(page_two.status(), StatusCode::OK);
    let body = body_text(page_two).await;
    assert!(body.contains("entry number 11"));
    assert!(!body.contains("entry number 9<"));
    assert!(body.contains("Showing 11-12 of 12 records"));

    let missing = router(&backend)
        .oneshot(get("/audit-trail?page=3", Some(SESSION_COOKIE)))
        .await
        .expect("response");
    let body = body_text(missing).await;
    assert!(body.contains("Page 3 does not exist; showing page 1."));
    assert!(body.contains("Showing 1-10 of 12 records"));
}

#[tokio::test]
async fn audit_trail_outage_renders_inline_error() {
    let backend = Arc::new(InMemoryBackend::default());
    backend.fail_with("connection refused").await;

    let response = router(&backend)
        .oneshot(get("/audit-trail", Some(SESSION_COOKIE)))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_text(response).await;
    assert!(body.contains("Error loading audit trail: the data service is unavailable"));
    assert!(!body.contains("connection refused"));
}

#[tokio::test]
async fn audit_trail_filter_without_matches_stays_on_page_one() {
    let backend = InMemoryBackend::with_events(vec![event(
        at(date!(2025 - 03 - 01), 9, 0),
        "edge-1 rebooted",
        "Reboot",
        "Router",
        "asha",
    )]);

    let response = router(&backend)
        .oneshot(get("/audit-trail?category=Nope&page=1", Some(SESSION_COOKIE)))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("No audit records found"));
    assert!(!body.contains("does not exist"));
}

#[tokio::test]
async fn audit_export_downloads_filtered_csv() {
    let backend = InMemoryBackend::with_events(vec![
        event(at(date!(2025 - 03 - 01), 9, 0), "Router added", "Created", "Router", "asha"),
        event(at(date!(2025 - 03 - 01), 10, 0), "Tenant added", "Created", "Tenant", "asha"),
    ]);

    let response = router(&backend)
        .oneshot(get("/audit-trail/export?category=Router", Some(SESSION_COOKIE)))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).expect("type"),
        "text/csv; charset=utf-8"
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .expect("disposition")
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"audit_trail_"));

    let body = body_text(response).await;
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("\"Router added\""));
}

#[tokio::test]
async fn health_reflects_upstream() {
    let backend = Arc::new(InMemoryBackend::default());

    let healthy = router(&backend).oneshot(get("/_health", None)).await.expect("response");
    assert_eq!(healthy.status(), StatusCode::NO_CONTENT);

    backend.fail_with("connection refused").await;
    let down = router(&backend).oneshot(get("/_health", None)).await.expect("response");
    assert_eq!(down.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn stylesheet_is_served() {
    let backend = Arc::new(InMemoryBackend::default());

    let response = router(&backend)
        .oneshot(get("/static/admin.css", None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).expect("type"),
        "text/css"
    );

    let missing = router(&backend)
        .oneshot(get("/static/../Cargo.toml", None))
        .await
        .expect("response");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
