//! Logging initialization.

mod logging;

pub use logging::init_logging;
