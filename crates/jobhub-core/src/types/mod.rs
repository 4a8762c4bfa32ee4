//! Core type definitions used across the JobHub workspace.

pub mod response;

pub use response::ApiResponse;
