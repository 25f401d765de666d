use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{error, info};

use crate::application::auth::{AuthError, LOGIN_UNAVAILABLE_MESSAGE, SIGNUP_UNAVAILABLE_MESSAGE};
use crate::application::error::ErrorReport;
use crate::domain::users::{FieldErrors, FormField, LoginForm, ResetForm, SignupForm};
use crate::infra::http::session::{LOGIN_PATH, end_session, has_session, start_session};
use crate::presentation::{admin::views as admin_views, views::render_template_response};

use super::AdminState;

const DASHBOARD_PATH: &str = "/dashboard";
const REGISTERED_NOTICE: &str = "Account created. Please sign in.";

fn field_error(errors: &FieldErrors, field: FormField) -> Option<String> {
    errors.get(field).map(str::to_string)
}

pub(super) async fn admin_root(jar: CookieJar) -> Redirect {
    if has_session(&jar) {
        Redirect::to(DASHBOARD_PATH)
    } else {
        Redirect::to(LOGIN_PATH)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct AdminLoginQuery {
    registered: Option<String>,
}

pub(super) async fn admin_login(
    State(state): State<AdminState>,
    jar: CookieJar,
    Query(query): Query<AdminLoginQuery>,
) -> Response {
    if has_session(&jar) {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }

    let content = admin_views::AdminLoginView {
        notice: query
            .registered
            .is_some()
            .then(|| REGISTERED_NOTICE.to_string()),
        ..Default::default()
    };
    render_login(&state, content, StatusCode::OK)
}

pub(super) async fn admin_login_submit(
    State(state): State<AdminState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let mut content = admin_views::AdminLoginView {
        email: form.email.trim().to_string(),
        ..Default::default()
    };

    match state.auth.login(&form).await {
        Ok(user) => {
            let jar = start_session(jar, &user, state.secure_cookies);
            (jar, Redirect::to(DASHBOARD_PATH)).into_response()
        }
        Err(AuthError::Invalid(errors)) => {
            content.email_error = field_error(&errors, FormField::Email);
            content.password_error = field_error(&errors, FormField::Password);
            render_login(&state, content, StatusCode::UNPROCESSABLE_ENTITY)
        }
        Err(err @ AuthError::InvalidCredentials) => {
            content.form_error = Some(err.to_string());
            let mut response = render_login(&state, content, StatusCode::UNAUTHORIZED);
            ErrorReport::from_error("infra::http::admin_login_submit", &err)
                .attach(&mut response);
            response
        }
        Err(err) => {
            let status = unavailable_status(&err);
            content.form_error = Some(LOGIN_UNAVAILABLE_MESSAGE.to_string());
            let mut response = render_login(&state, content, status);
            ErrorReport::from_error("infra::http::admin_login_submit", &err)
                .attach(&mut response);
            response
        }
    }
}

fn render_login(
    state: &AdminState,
    content: admin_views::AdminLoginView,
    status: StatusCode,
) -> Response {
    let view = admin_views::AdminAuthLayout::new(state.chrome.brand_title(), "Sign in", content);
    render_template_response(admin_views::AdminLoginTemplate { view }, status)
}

pub(super) async fn admin_signup(State(state): State<AdminState>) -> Response {
    render_signup(&state, admin_views::AdminSignupView::default(), StatusCode::OK)
}

pub(super) async fn admin_signup_submit(
    State(state): State<AdminState>,
    Form(form): Form<SignupForm>,
) -> Response {
    let mut content = admin_views::AdminSignupView {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        ..Default::default()
    };

    match state.auth.signup(&form).await {
        Ok(_) => Redirect::to(&format!("{LOGIN_PATH}?registered=1")).into_response(),
        Err(AuthError::Invalid(errors)) => {
            content.name_error = field_error(&errors, FormField::Name);
            content.email_error = field_error(&errors, FormField::Email);
            content.password_error = field_error(&errors, FormField::Password);
            content.confirm_password_error = field_error(&errors, FormField::ConfirmPassword);
            render_signup(&state, content, StatusCode::UNPROCESSABLE_ENTITY)
        }
        Err(err) => {
            let status = unavailable_status(&err);
            error!(
                target = "rudra::http::admin::auth",
                error = %err,
                "operator sign-up failed"
            );
            content.form_error = Some(SIGNUP_UNAVAILABLE_MESSAGE.to_string());
            let mut response = render_signup(&state, content, status);
            ErrorReport::from_error("infra::http::admin_signup_submit", &err)
                .attach(&mut response);
            response
        }
    }
}

fn render_signup(
    state: &AdminState,
    content: admin_views::AdminSignupView,
    status: StatusCode,
) -> Response {
    let view = admin_views::AdminAuthLayout::new(state.chrome.brand_title(), "Sign up", content);
    render_template_response(admin_views::AdminSignupTemplate { view }, status)
}

pub(super) async fn admin_forgot_password(State(state): State<AdminState>) -> Response {
    render_forgot_password(
        &state,
        admin_views::AdminForgotPasswordView::default(),
        StatusCode::OK,
    )
}

pub(super) async fn admin_forgot_password_submit(
    State(state): State<AdminState>,
    Form(form): Form<ResetForm>,
) -> Response {
    let mut content = admin_views::AdminForgotPasswordView {
        email: form.email.trim().to_string(),
        ..Default::default()
    };

    match state.auth.request_password_reset(&form) {
        Ok(confirmation) => {
            content.confirmation = Some(confirmation.to_string());
            render_forgot_password(&state, content, StatusCode::OK)
        }
        Err(errors) => {
            content.email_error = field_error(&errors, FormField::Email);
            render_forgot_password(&state, content, StatusCode::UNPROCESSABLE_ENTITY)
        }
    }
}

fn render_forgot_password(
    state: &AdminState,
    content: admin_views::AdminForgotPasswordView,
    status: StatusCode,
) -> Response {
    let view =
        admin_views::AdminAuthLayout::new(state.chrome.brand_title(), "Reset password", content);
    render_template_response(admin_views::AdminForgotPasswordTemplate { view }, status)
}

pub(super) async fn admin_logout(jar: CookieJar) -> (CookieJar, Redirect) {
    info!(target = "rudra::http::admin::auth", "operator signed out");
    (end_session(jar), Redirect::to(LOGIN_PATH))
}

fn unavailable_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    }
}
