//! Inbound change-signal utilities.

mod debounce;

pub use debounce::Debouncer;
