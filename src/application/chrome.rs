use crate::domain::users::UserSession;
use crate::presentation::admin::views::{
    AdminBrandView, AdminChrome, AdminMetaView, AdminNavigationItemView, AdminNavigationView,
    AdminUserView,
};

struct NavEntry {
    href: &'static str,
    label: &'static str,
    enabled: bool,
}

const fn entry(href: &'static str, label: &'static str, enabled: bool) -> NavEntry {
    NavEntry {
        href,
        label,
        enabled,
    }
}

// Disabled entries are modules of the wider platform not served by this console.
const NAV_ITEMS: &[NavEntry] = &[
    entry("/dashboard", "Dashboard", true),
    entry("/tenants", "Tenants", false),
    entry("/fleets", "Fleets", false),
    entry("/routers", "Routers", false),
    entry("/firewall-templates", "Firewall Templates", false),
    entry("/hotspot-users", "Hotspot Users", false),
    entry("/audit-trail", "Audit Trail", true),
    entry("/billing", "Billing", false),
    entry("/admins", "Admins", false),
    entry("/account", "Account", false),
];

/// Builds the sidebar and header shared by every signed-in page.
#[derive(Clone)]
pub struct ChromeService {
    brand_title: String,
}

impl ChromeService {
    pub fn new(brand_title: impl Into<String>) -> Self {
        Self {
            brand_title: brand_title.into(),
        }
    }

    pub fn brand_title(&self) -> &str {
        &self.brand_title
    }

    pub fn load(&self, active_path: &str, user: Option<&UserSession>) -> AdminChrome {
        let items: Vec<AdminNavigationItemView> = NAV_ITEMS
            .iter()
            .map(|item| AdminNavigationItemView {
                label: item.label.to_string(),
                href: item.href.to_string(),
                is_active: is_active(item.href, active_path),
                is_enabled: item.enabled,
            })
            .collect();

        let active_label = items
            .iter()
            .find(|item| item.is_active)
            .map(|item| item.label.as_str())
            .unwrap_or("Dashboard");

        let brand = AdminBrandView {
            title: format!("{} · RUDRA", self.brand_title),
        };
        let meta = AdminMetaView {
            title: format!("{} · {}", active_label, self.brand_title),
            description: "Network management administration".to_string(),
        };

        AdminChrome {
            brand,
            navigation: AdminNavigationView { items },
            meta,
            user: user.map(user_view),
        }
    }
}

fn is_active(href: &str, path: &str) -> bool {
    path == href
        || path
            .strip_prefix(href)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn user_view(user: &UserSession) -> AdminUserView {
    let display = if user.username.trim().is_empty() {
        user.email.as_str()
    } else {
        user.username.as_str()
    };
    AdminUserView {
        username: display.to_string(),
        email: user.email.clone(),
        initial: display
            .chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_default(),
    }
}
