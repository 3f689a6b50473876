//! MudMind Engine library.
//!
//! Subjective perception and reaction pipeline for LLM-driven MUD entities.
//!
//! ## Structure
//!
//! - `use_cases/` - Perception filter, significance monitor, global
//!   observers and reactions
//! - `infrastructure/` - Event bus, configuration, ports and adapters
//! - `app` - Application composition
//! - `demo` - Seed world for running the binary locally

pub mod app;
pub mod demo;
pub mod infrastructure;
pub mod use_cases;

/// Test fixtures shared across unit and end-to-end tests.
#[cfg(test)]
pub mod test_fixtures;

/// End-to-end tests wiring the whole pipeline over in-memory stores.
#[cfg(test)]
mod e2e_tests;

pub use app::App;
