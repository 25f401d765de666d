//! Operator sign-in, sign-up and password reset requests.

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use metrics::counter;
use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::repos::{NewUser, RepoError, UsersRepo};
use crate::config::{AuthSettings, PasswordScheme};
use crate::domain::users::{
    FieldErrors, FormField, LoginForm, ResetForm, SignupForm, UserSession, validate_login,
    validate_reset, validate_signup,
};

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";
pub const LOGIN_UNAVAILABLE_MESSAGE: &str = "Login failed. Please try again.";
pub const SIGNUP_UNAVAILABLE_MESSAGE: &str = "Sign up failed. Please try again.";
pub const RESET_CONFIRMATION_MESSAGE: &str = "Password reset link sent! Please check your email.";
const DUPLICATE_EMAIL_MESSAGE: &str = "An account with this email already exists";
const DUMMY_PASSWORD: &str = "rudra-timing-equaliser";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    InvalidCredentials,
    #[error("form validation failed")]
    Invalid(FieldErrors),
    #[error("user directory unavailable")]
    Unavailable(#[source] RepoError),
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Hashing parameters for newly created hashes.
#[derive(Debug, Clone, Copy)]
pub struct PasswordPolicy {
    pub scheme: PasswordScheme,
    pub bcrypt_cost: u32,
}

impl From<&AuthSettings> for PasswordPolicy {
    fn from(settings: &AuthSettings) -> Self {
        Self {
            scheme: settings.password_scheme,
            bcrypt_cost: settings.bcrypt_cost,
        }
    }
}

/// Hash `password` with the policy's scheme.
pub fn hash_password(password: &str, policy: PasswordPolicy) -> Result<String, AuthError> {
    match policy.scheme {
        PasswordScheme::Bcrypt => bcrypt::hash(password, policy.bcrypt_cost)
            .map_err(|err| AuthError::Hashing(err.to_string())),
        PasswordScheme::Argon2 => {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|err| AuthError::Hashing(format!("failed to hash password: {err}")))
        }
    }
}

/// Check `password` against a stored bcrypt (`$2a$`/`$2b$`/`$2y$`) or argon2 PHC hash.
///
/// `Ok(false)` means a well-formed hash that does not match; `Err` means the
/// stored value could not be interpreted.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, String> {
    if stored.starts_with("$argon2") {
        let parsed = PasswordHash::new(stored).map_err(|err| err.to_string())?;
        return match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(err.to_string()),
        };
    }

    if stored.starts_with("$2") {
        return bcrypt::verify(password, stored).map_err(|err| err.to_string());
    }

    Err("unrecognised password hash format".to_string())
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UsersRepo>,
    policy: PasswordPolicy,
    dummy_hash: Arc<OnceCell<String>>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UsersRepo>, policy: PasswordPolicy) -> Self {
        Self {
            users,
            policy,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub async fn login(&self, form: &LoginForm) -> Result<UserSession, AuthError> {
        validate_login(form).map_err(AuthError::Invalid)?;
        let email = form.email.trim();

        let candidates = match self.users.find_by_email(email).await {
            Ok(candidates) => candidates,
            Err(err) => {
                counter!("rudra_login_total", "outcome" => "unavailable").increment(1);
                return Err(AuthError::Unavailable(err));
            }
        };

        let Some(record) = candidates.into_iter().next() else {
            // Spend the same hashing work as a real comparison before refusing.
            self.burn_dummy_verification(&form.password).await;
            counter!("rudra_login_total", "outcome" => "invalid").increment(1);
            return Err(AuthError::InvalidCredentials);
        };

        let password = form.password.clone();
        let stored = record.password_hash.clone();
        let verdict = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(|err| AuthError::Hashing(err.to_string()))?;

        match verdict {
            Ok(true) => {
                counter!("rudra_login_total", "outcome" => "success").increment(1);
                info!(
                    target = "rudra::application::auth",
                    user_id = %record.id,
                    "operator signed in"
                );
                Ok(UserSession::from(&record))
            }
            Ok(false) => {
                counter!("rudra_login_total", "outcome" => "invalid").increment(1);
                Err(AuthError::InvalidCredentials)
            }
            Err(reason) => {
                counter!("rudra_login_total", "outcome" => "invalid").increment(1);
                warn!(
                    target = "rudra::application::auth",
                    user_id = %record.id,
                    reason = %reason,
                    "stored password hash could not be checked"
                );
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    async fn burn_dummy_verification(&self, password: &str) {
        let policy = self.policy;
        let cell = Arc::clone(&self.dummy_hash);
        let password = password.to_string();
        let _ = tokio::task::spawn_blocking(move || {
            let Ok(hash) = cell.get_or_try_init(|| hash_password(DUMMY_PASSWORD, policy)) else {
                return;
            };
            let _ = verify_password(&password, hash);
        })
        .await;
    }

    pub async fn signup(&self, form: &SignupForm) -> Result<UserSession, AuthError> {
        validate_signup(form).map_err(AuthError::Invalid)?;

        let policy = self.policy;
        let password = form.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, policy))
            .await
            .map_err(|err| AuthError::Hashing(err.to_string()))??;

        let new_user = NewUser {
            username: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            password_hash,
        };

        match self.users.insert_user(new_user).await {
            Ok(user) => {
                info!(
                    target = "rudra::application::auth",
                    user_id = %user.id,
                    "operator account created"
                );
                Ok(user)
            }
            Err(RepoError::Duplicate { .. }) => {
                let mut errors = FieldErrors::default();
                errors.push(FormField::Email, DUPLICATE_EMAIL_MESSAGE);
                Err(AuthError::Invalid(errors))
            }
            Err(err) => Err(AuthError::Unavailable(err)),
        }
    }

    /// Validate a reset request. Known and unknown addresses get the same answer.
    pub fn request_password_reset(&self, form: &ResetForm) -> Result<&'static str, FieldErrors> {
        validate_reset(form)?;
        info!(
            target = "rudra::application::auth",
            email = %form.email.trim(),
            "password reset requested"
        );
        Ok(RESET_CONFIRMATION_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST_BCRYPT: PasswordPolicy = PasswordPolicy {
        scheme: PasswordScheme::Bcrypt,
        bcrypt_cost: 4,
    };

    #[test]
    fn bcrypt_hashes_verify() {
        let hash = hash_password("correct horse", FAST_BCRYPT).expect("hash");
        assert!(hash.starts_with("$2"));
        assert_eq!(verify_password("correct horse", &hash), Ok(true));
        assert_eq!(verify_password("wrong horse", &hash), Ok(false));
    }

    #[test]
    fn argon2_hashes_verify() {
        let policy = PasswordPolicy {
            scheme: PasswordScheme::Argon2,
            bcrypt_cost: 4,
        };
        let hash = hash_password("correct horse", policy).expect("hash");
        assert!(hash.starts_with("$argon2"));
        assert_eq!(verify_password("correct horse", &hash), Ok(true));
        assert_eq!(verify_password("wrong horse", &hash), Ok(false));
    }

    #[test]
    fn legacy_2a_prefix_is_accepted() {
        let hash = hash_password("secret-pass", FAST_BCRYPT).expect("hash");
        let legacy = hash.replacen("$2b$", "$2a$", 1);
        assert_eq!(verify_password("secret-pass", &legacy), Ok(true));
    }

    #[test]
    fn plain_text_is_not_a_hash() {
        assert!(verify_password("secret", "secret").is_err());
    }

    #[test]
    fn invalid_credentials_message_is_generic() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
    }
}
