//! Platform adapters

pub mod console;
pub mod line;

pub use console::ConsoleGateway;
pub use line::LineAdapter;
