//! Core business logic for the social API.

pub mod services;

pub use services::*;
