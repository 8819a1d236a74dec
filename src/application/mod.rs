//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Catalog: Canned reply content and menu labels
//! - Services: Event handling orchestration
//! - Errors: Domain-specific errors
//! - Messaging: Intent resolution, state machine, dispatching

pub mod catalog;
pub mod errors;
pub mod services;
pub mod messaging;
