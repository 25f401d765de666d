pub mod audit;
pub mod auth;
pub mod dashboard;

pub use audit::*;
pub use auth::*;
pub use dashboard::*;

#[derive(Clone)]
pub struct AdminBrandView {
    pub title: String,
}

#[derive(Clone)]
pub struct AdminNavigationItemView {
    pub label: String,
    pub href: String,
    pub is_active: bool,
    pub is_enabled: bool,
}

#[derive(Clone)]
pub struct AdminNavigationView {
    pub items: Vec<AdminNavigationItemView>,
}

#[derive(Clone)]
pub struct AdminMetaView {
    pub title: String,
    pub description: String,
}

/// Signed-in operator shown in the header.
#[derive(Clone)]
pub struct AdminUserView {
    pub username: String,
    pub email: String,
    pub initial: String,
}

#[derive(Clone)]
pub struct AdminChrome {
    pub brand: AdminBrandView,
    pub navigation: AdminNavigationView,
    pub meta: AdminMetaView,
    pub user: Option<AdminUserView>,
}

#[derive(Clone)]
pub struct AdminLayout<T> {
    pub chrome: AdminChrome,
    pub asset_version: String,
    pub content: T,
}

impl<T> AdminLayout<T> {
    pub fn new(chrome: AdminChrome, content: T) -> Self {
        Self {
            chrome,
            asset_version: asset_version(),
            content,
        }
    }
}

/// Layout of the signed-out pages (login, signup, password reset).
#[derive(Clone)]
pub struct AdminAuthLayout<T> {
    pub brand_title: String,
    pub page_title: String,
    pub asset_version: String,
    pub content: T,
}

impl<T> AdminAuthLayout<T> {
    pub fn new(brand_title: &str, page_title: &str, content: T) -> Self {
        Self {
            brand_title: brand_title.to_string(),
            page_title: page_title.to_string(),
            asset_version: asset_version(),
            content,
        }
    }
}

fn asset_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
