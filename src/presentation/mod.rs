//! Server-rendered views and askama templates.

pub mod admin;
pub mod views;
