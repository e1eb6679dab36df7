// src/core/mod.rs — Review pipeline

pub mod pipeline;

pub use pipeline::{ReviewOutcome, ReviewPipeline};
