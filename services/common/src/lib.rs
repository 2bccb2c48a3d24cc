//! Shared types, errors and constants for the stockdesk services

pub mod constants;
pub mod errors;
pub mod types;

pub use constants::*;
pub use errors::*;
pub use types::*;
