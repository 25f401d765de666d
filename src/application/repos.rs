//! Repository traits describing the data adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audit::AuditEvent;
use crate::domain::usage::{DailyUsage, TenantUsage};
use crate::domain::users::{UserRecord, UserSession};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid upstream data: {message}")]
    Integrity { message: String },
    #[error("upstream timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[async_trait]
pub trait AuditRepo: Send + Sync {
    /// Full audit list in upstream order.
    async fn list_events(&self) -> Result<Vec<AuditEvent>, RepoError>;
}

#[async_trait]
pub trait UsageRepo: Send + Sync {
    async fn tenant_usage(&self) -> Result<Vec<TenantUsage>, RepoError>;

    /// Daily totals, ascending by date.
    async fn daily_usage(&self) -> Result<Vec<DailyUsage>, RepoError>;
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Vec<UserRecord>, RepoError>;

    async fn insert_user(&self, user: NewUser) -> Result<UserSession, RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
