//! Infrastructure implementations.
//!
//! Contains the event bus, configuration and port trait implementations for
//! external dependencies.

pub mod clock;
pub mod config;
pub mod event_bus;
pub mod memory;
pub mod ollama;
pub mod ports;
pub mod prompt;
pub mod telnet;
pub mod tool_dispatcher;
