//! Application services layer.

pub mod audit;
pub mod auth;
pub mod chrome;
pub mod dashboard;
pub mod error;
pub mod repos;
