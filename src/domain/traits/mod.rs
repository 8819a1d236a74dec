//! Domain traits - Abstractions for infrastructure implementations

pub mod gateway;
pub mod store;

pub use gateway::DeliveryGateway;
pub use store::UserStore;
