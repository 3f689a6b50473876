//! Use cases - the perception and reaction pipeline.
//!
//! - `perception` - turns an action into one observer's reading of it
//! - `significance` - buffers readings per observer and fires reactions
//! - `global_observer` - accrues influence for race and profession owners
//! - `reaction` - drives an entity's LLM reaction

pub mod global_observer;
pub mod perception;
pub mod reaction;
pub mod significance;

pub use global_observer::{AccrualError, GlobalObserverManager};
pub use perception::{PerceptionError, PerceptionFilter, SignificanceTable};
pub use reaction::{ReactionError, ReactionOutcome, ReactionTrigger, SentientEntityManager};
pub use significance::{ActionBuffer, ActionSignificanceMonitor};
