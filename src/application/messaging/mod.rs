//! Message handling - Event-driven dispatch over the per-user language state

pub mod dispatcher;
pub mod intent;
pub mod state_machine;

pub use dispatcher::EventDispatcher;
pub use intent::{resolve, Intent};
pub use state_machine::{step, Step};
