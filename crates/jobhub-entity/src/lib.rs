//! # jobhub-entity
//!
//! Models exchanged with the remote job service. Jobs, summaries, and job
//! logs are produced by the service and only read here; create requests and
//! log updates are built locally and sent to it. All models derive `Debug`,
//! `Clone`, `Serialize`, and `Deserialize` and use camelCase on the wire.

pub mod job;
