use askama::Template;

use super::AdminAuthLayout;

#[derive(Clone, Default)]
pub struct AdminLoginView {
    pub email: String,
    pub email_error: Option<String>,
    pub password_error: Option<String>,
    pub form_error: Option<String>,
    pub notice: Option<String>,
}

#[derive(Clone, Default)]
pub struct AdminSignupView {
    pub name: String,
    pub email: String,
    pub name_error: Option<String>,
    pub email_error: Option<String>,
    pub password_error: Option<String>,
    pub confirm_password_error: Option<String>,
    pub form_error: Option<String>,
}

#[derive(Clone, Default)]
pub struct AdminForgotPasswordView {
    pub email: String,
    pub email_error: Option<String>,
    pub confirmation: Option<String>,
}

#[derive(Template)]
#[template(path = "admin/login.html")]
pub struct AdminLoginTemplate {
    pub view: AdminAuthLayout<AdminLoginView>,
}

#[derive(Template)]
#[template(path = "admin/signup.html")]
pub struct AdminSignupTemplate {
    pub view: AdminAuthLayout<AdminSignupView>,
}

#[derive(Template)]
#[template(path = "admin/forgot_password.html")]
pub struct AdminForgotPasswordTemplate {
    pub view: AdminAuthLayout<AdminForgotPasswordView>,
}
