// Server-rendered pages for the login and dashboard routes
// Askama escapes every interpolated value in .html templates

use askama::Template;
use axum::response::Html;

use crate::auth::AuthError;
use crate::models::{UserInfo, UserRole};

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub title: String,
    pub login_endpoint: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub title: String,
    pub name: String,
    pub role: String,
    pub is_admin: bool,
}

impl LoginTemplate {
    pub fn new() -> Self {
        Self {
            title: "Sign in".to_string(),
            login_endpoint: "/api/auth/login".to_string(),
        }
    }
}

impl Default for LoginTemplate {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardTemplate {
    pub fn new(user: &UserInfo) -> Self {
        Self {
            title: "Dashboard".to_string(),
            name: user.name.clone(),
            role: user.role.to_string(),
            is_admin: user.role == UserRole::Admin,
        }
    }
}

/// Render a template into an HTML response body
pub fn render<T: Template>(template: &T) -> Result<Html<String>, AuthError> {
    template
        .render()
        .map(Html)
        .map_err(|e| AuthError::Internal(format!("Template rendering failed: {}", e)))
}
