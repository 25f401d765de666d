//! Admin user records, sessions and the validation rules of the auth forms.

use serde::{Deserialize, Serialize};

/// Row of the users table as fetched for login.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Identity kept in the browser after a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<&UserRecord> for UserSession {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id.clone(),
            username: record.username.clone(),
            email: record.email.clone(),
        }
    }
}

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    Password,
    ConfirmPassword,
}

impl FormField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirm_password",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FormField,
    pub message: &'static str,
}

/// Per-field validation failures; at most one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn push(&mut self, field: FormField, message: &'static str) {
        if self.get(field).is_none() {
            self.errors.push(FieldError { field, message });
        }
    }

    pub fn get(&self, field: FormField) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResetForm {
    #[serde(default)]
    pub email: String,
}

pub fn validate_login(form: &LoginForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if form.email.trim().is_empty() {
        errors.push(FormField::Email, "Email is required");
    }
    if form.password.is_empty() {
        errors.push(FormField::Password, "Password is required");
    }
    errors.into_result()
}

pub fn validate_signup(form: &SignupForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if form.name.trim().is_empty() {
        errors.push(FormField::Name, "Name is required");
    }

    let email = form.email.trim();
    if email.is_empty() {
        errors.push(FormField::Email, "Email is required");
    } else if !is_valid_email(email) {
        errors.push(FormField::Email, "Email is invalid");
    }

    if form.password.is_empty() {
        errors.push(FormField::Password, "Password is required");
    } else if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FormField::Password, "Password must be at least 8 characters");
    }

    if form.password != form.confirm_password {
        errors.push(FormField::ConfirmPassword, "Passwords do not match");
    }
    errors.into_result()
}

pub fn validate_reset(form: &ResetForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    let email = form.email.trim();
    if email.is_empty() {
        errors.push(FormField::Email, "Email is required");
    } else if !is_valid_email(email) {
        errors.push(FormField::Email, "Please enter a valid email address");
    }
    errors.into_result()
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
