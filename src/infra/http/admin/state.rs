use std::sync::Arc;

use crate::application::{
    audit::AuditTrailService, auth::AuthService, chrome::ChromeService,
    dashboard::DashboardService, repos::HealthRepo,
};

#[derive(Clone)]
pub struct AdminState {
    pub chrome: Arc<ChromeService>,
    pub dashboard: Arc<DashboardService>,
    pub audit: Arc<AuditTrailService>,
    pub auth: Arc<AuthService>,
    pub health: Arc<dyn HealthRepo>,
    /// Mark session cookies `Secure`; enable when served over HTTPS.
    pub secure_cookies: bool,
}
