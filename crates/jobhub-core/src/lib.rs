//! # jobhub-core
//!
//! Core crate for JobHub. Contains configuration schemas, the response
//! envelope returned by the remote job service, the messenger traits that
//! notification transports implement, feature toggles, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other JobHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
