//! Core business logic for the forum backend.

pub mod services;

pub use services::*;
