#![allow(dead_code)]

use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use chrono_tz::Tz;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use tokio::sync::Mutex;

use rudra::application::audit::AuditTrailService;
use rudra::application::auth::{AuthService, PasswordPolicy, hash_password};
use rudra::application::chrome::ChromeService;
use rudra::application::dashboard::DashboardService;
use rudra::application::repos::{
    AuditRepo, HealthRepo, NewUser, RepoError, UsageRepo, UsersRepo,
};
use rudra::config::PasswordScheme;
use rudra::domain::audit::AuditEvent;
use rudra::domain::usage::{DailyUsage, TenantUsage};
use rudra::domain::users::{UserRecord, UserSession};
use rudra::infra::http::AdminState;

pub const FAST_POLICY: PasswordPolicy = PasswordPolicy {
    scheme: PasswordScheme::Bcrypt,
    bcrypt_cost: 4,
};

/// In-memory stand-in for the GraphQL backend.
#[derive(Default)]
pub struct InMemoryBackend {
    pub events: Mutex<Vec<AuditEvent>>,
    pub tenants: Mutex<Vec<TenantUsage>>,
    pub daily: Mutex<Vec<DailyUsage>>,
    pub users: Mutex<Vec<UserRecord>>,
    /// When set, every call fails with `RepoError::Persistence(message)`.
    pub outage: Mutex<Option<String>>,
}

impl InMemoryBackend {
    pub fn with_events(events: Vec<AuditEvent>) -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(events),
            ..Default::default()
        })
    }

    pub async fn fail_with(&self, message: &str) {
        *self.outage.lock().await = Some(message.to_string());
    }

    pub async fn add_user(&self, id: &str, name: &str, email: &str, password: &str) {
        let password_hash = hash_password(password, FAST_POLICY).expect("hash password");
        self.users.lock().await.push(UserRecord {
            id: id.to_string(),
            username: name.to_string(),
            email: email.to_string(),
            password_hash,
        });
    }

    async fn check_outage(&self) -> Result<(), RepoError> {
        match self.outage.lock().await.as_ref() {
            Some(message) => Err(RepoError::Persistence(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AuditRepo for InMemoryBackend {
    async fn list_events(&self) -> Result<Vec<AuditEvent>, RepoError> {
        self.check_outage().await?;
        Ok(self.events.lock().await.clone())
    }
}

#[async_trait]
impl UsageRepo for InMemoryBackend {
    async fn tenant_usage(&self) -> Result<Vec<TenantUsage>, RepoError> {
        self.check_outage().await?;
        Ok(self.tenants.lock().await.clone())
    }

    async fn daily_usage(&self) -> Result<Vec<DailyUsage>, RepoError> {
        self.check_outage().await?;
        Ok(self.daily.lock().await.clone())
    }
}

#[async_trait]
impl UsersRepo for InMemoryBackend {
    async fn find_by_email(&self, email: &str) -> Result<Vec<UserRecord>, RepoError> {
        self.check_outage().await?;
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .filter(|user| user.email == email)
            .cloned()
            .collect())
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserSession, RepoError> {
        self.check_outage().await?;
        let mut users = self.users.lock().await;
        if users.iter().any(|existing| existing.email == user.email) {
            return Err(RepoError::Duplicate {
                constraint: "users_email_key".to_string(),
            });
        }
        let record = UserRecord {
            id: (users.len() + 1).to_string(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
        };
        let session = UserSession::from(&record);
        users.push(record);
        Ok(session)
    }
}

#[async_trait]
impl HealthRepo for InMemoryBackend {
    async fn ping(&self) -> Result<(), RepoError> {
        self.check_outage().await
    }
}

pub fn rows(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).expect("non-zero rows")
}

pub fn at(date: Date, hour: u8, minute: u8) -> OffsetDateTime {
    PrimitiveDateTime::new(date, Time::from_hms(hour, minute, 0).expect("valid time")).assume_utc()
}

pub fn event(
    timestamp: OffsetDateTime,
    description: &str,
    event_type: &str,
    category: &str,
    performed_by: &str,
) -> AuditEvent {
    AuditEvent {
        timestamp,
        description: description.to_string(),
        event_type: event_type.to_string(),
        category: category.to_string(),
        performed_by: performed_by.to_string(),
    }
}

pub fn audit_service(backend: &Arc<InMemoryBackend>, tz: Tz) -> AuditTrailService {
    let repo: Arc<dyn AuditRepo> = backend.clone();
    AuditTrailService::new(repo, tz, rows(10))
}

pub fn admin_state(backend: &Arc<InMemoryBackend>) -> AdminState {
    let usage: Arc<dyn UsageRepo> = backend.clone();
    let users: Arc<dyn UsersRepo> = backend.clone();
    let health: Arc<dyn HealthRepo> = backend.clone();
    AdminState {
        chrome: Arc::new(ChromeService::new("Future Konnect")),
        dashboard: Arc::new(DashboardService::new(usage)),
        audit: Arc::new(audit_service(backend, chrono_tz::Asia::Kolkata)),
        auth: Arc::new(AuthService::new(users, FAST_POLICY)),
        health,
        secure_cookies: false,
    }
}
