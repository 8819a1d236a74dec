//! Application services - Business logic orchestration

pub mod event_service;

pub use event_service::{BatchSummary, EventService};
