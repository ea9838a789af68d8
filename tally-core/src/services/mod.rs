//! Service layer
//!
//! Services sit next to the account model and handle cross-cutting concerns.

pub mod logging;

pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
