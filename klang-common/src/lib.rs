//! # Klang Common Library
//!
//! Shared code for the klang workspace:
//! - Error types
//! - Event bus (broadcast with last-state replay)
//! - Configuration loading
//! - UUID utilities

pub mod config;
pub mod error;
pub mod events;
pub mod uuid_utils;

pub use error::{Error, Result};
