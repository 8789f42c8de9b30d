//! Unit test synthesis from symbolic execution
//!
//! A [`SynthesisEngine`] listens to a [`SymbolicVm`]: it captures arguments
//! when a tracked method is entered, resolves them against the solved path
//! condition when the call returns or throws, and collects one deduplicated
//! [`TestCase`](symtest_core::TestCase) per concrete scenario. When the run
//! is over the collection is rendered by the configured formatter.

pub mod engine;
pub mod resolver;
pub mod scripted;
pub mod snapshot;
pub mod vm;

pub use engine::{SynthesisEngine, SynthesisStats};
pub use resolver::{ValueResolver, INTEGER_DEFAULT, REAL_DEFAULT};
pub use scripted::ScriptedVm;
pub use snapshot::{CallSnapshot, SnapshotTable};
pub use vm::{
    ActivationId, ArgKind, ArrayRef, ArraySlot, CallEntered, CallExited, Captured, ExceptionThrown, Frame,
    HeapArray, Solution, SymbolicVm, ValueSource, VarId,
};
