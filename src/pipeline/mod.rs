//! The classification-to-sound pipeline.
//!
//! [`InstrumentContext`] owns everything one cycle touches; the
//! [`ClassificationLoop`] feeds it one classifier answer at a time;
//! [`VisualFeed`] lets a presentation layer watch without blocking either.

pub mod context;
pub mod feed;
pub mod runner;

pub use context::{CycleOutcome, InstrumentContext};
pub use feed::{VisualFeed, VisualSample};
pub use runner::{ClassificationLoop, LoopEnd, LoopSummary};
