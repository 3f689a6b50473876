//! End-to-end tests of the perception pipeline.
//!
//! These wire a complete `App` over an in-memory world, with a scripted LLM
//! and the real prompt assembler, then drive actions either directly through
//! the use cases or over the event bus.

mod e2e_helpers;

pub use e2e_helpers::*;
