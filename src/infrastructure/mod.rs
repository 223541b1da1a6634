//! Concrete snapshot sinks.

pub mod console;
pub mod in_memory;
