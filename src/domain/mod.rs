//! Domain layer types and invariants.

pub mod audit;
pub mod error;
pub mod paging;
pub mod usage;
pub mod users;
