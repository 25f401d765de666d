//! RUDRA admin console for the Future Konnect network management platform.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
pub mod util;
