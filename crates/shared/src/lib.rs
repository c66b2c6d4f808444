//! Shared types for the postboard client and any future server component.

pub mod error;
pub mod models;

pub use error::*;
pub use models::*;
