//! Bounded-concurrency building blocks.
//!
//! A run is assembled from three pieces: a [`source_stream`] that feeds a
//! list of inputs, one or more [`WorkerStage`]s that map each input with a
//! bounded number of invocations in flight, and [`merge`] to fan several
//! stages back into one stream. [`drain`] and [`collect`] gather a stage's
//! two outputs once they close.

mod drain;
mod merge;
mod source;
mod stage;

pub use drain::{collect, drain, Drained};
pub use merge::merge;
pub use source::source_stream;
pub use stage::{StageOutput, WorkerStage};
