use async_trait::async_trait;
use rudra_api_types::{
    AuditTrailData, AuditTrailRow, DailyUsageData, InsertUserVariables, InsertUsersData,
    NoVariables, TenantUsageData, TypenameData, UserByEmailVariables, UsersData,
};

use super::{GraphQlClient, operations};
use crate::application::repos::{
    AuditRepo, HealthRepo, NewUser, RepoError, UsageRepo, UsersRepo,
};
use crate::domain::audit::AuditEvent;
use crate::domain::usage::{DailyUsage, TenantUsage};
use crate::domain::users::{UserRecord, UserSession};

/// Repository adapters backed by the GraphQL data API.
#[derive(Clone, Debug)]
pub struct HasuraRepositories {
    client: GraphQlClient,
}

impl HasuraRepositories {
    pub fn new(client: GraphQlClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GraphQlClient {
        &self.client
    }
}

fn audit_event(row: AuditTrailRow) -> AuditEvent {
    AuditEvent {
        timestamp: row.timestamp,
        description: row.description,
        event_type: row.event_type,
        category: row.category,
        performed_by: row.performed_by,
    }
}

#[async_trait]
impl AuditRepo for HasuraRepositories {
    async fn list_events(&self) -> Result<Vec<AuditEvent>, RepoError> {
        let data: AuditTrailData = self
            .client
            .execute(operations::AUDIT_TRAIL, NoVariables {})
            .await?;
        Ok(data.audit_trail.into_iter().map(audit_event).collect())
    }
}

#[async_trait]
impl UsageRepo for HasuraRepositories {
    async fn tenant_usage(&self) -> Result<Vec<TenantUsage>, RepoError> {
        let data: TenantUsageData = self
            .client
            .execute(operations::TENANT_USAGE, NoVariables {})
            .await?;
        Ok(data
            .data_usage
            .into_iter()
            .map(|row| TenantUsage {
                id: row.id.into_string(),
                tenant_id: row.tenant_id.into_string(),
                data_used: row.data_used,
            })
            .collect())
    }

    async fn daily_usage(&self) -> Result<Vec<DailyUsage>, RepoError> {
        let data: DailyUsageData = self
            .client
            .execute(operations::DAILY_USAGE, NoVariables {})
            .await?;
        Ok(data
            .daily_data_usage
            .into_iter()
            .map(|row| DailyUsage {
                recorded_on: row.recorded_on,
                total_data_used: row.total_data_used,
            })
            .collect())
    }
}

#[async_trait]
impl UsersRepo for HasuraRepositories {
    async fn find_by_email(&self, email: &str) -> Result<Vec<UserRecord>, RepoError> {
        let data: UsersData = self
            .client
            .execute(operations::USERS_BY_EMAIL, UserByEmailVariables { email })
            .await?;
        Ok(data
            .users
            .into_iter()
            .map(|row| UserRecord {
                id: row.id.into_string(),
                username: row.username,
                email: row.email,
                password_hash: row.password,
            })
            .collect())
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserSession, RepoError> {
        let variables = InsertUserVariables {
            username: &user.username,
            email: &user.email,
            password: &user.password_hash,
        };
        let data: InsertUsersData = self
            .client
            .execute(operations::INSERT_USERS, variables)
            .await?;

        let inserted = data
            .insert_users
            .and_then(|result| result.returning.into_iter().next())
            .ok_or_else(|| RepoError::Integrity {
                message: "insert_users returned no rows".to_string(),
            })?;

        Ok(UserSession {
            id: inserted.id.into_string(),
            username: inserted.username,
            email: inserted.email,
        })
    }
}

#[async_trait]
impl HealthRepo for HasuraRepositories {
    async fn ping(&self) -> Result<(), RepoError> {
        let _: TypenameData = self
            .client
            .execute(operations::HEALTH, NoVariables {})
            .await?;
        Ok(())
    }
}
