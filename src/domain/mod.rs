//! Domain layer - Core business logic with no external dependencies
//! 
//! This layer contains:
//! - Entities: Core business objects (UserRecord, InboundEvent, Reply)
//! - Traits: Abstractions for infrastructure (UserStore, DeliveryGateway)

pub mod entities;
pub mod traits;
