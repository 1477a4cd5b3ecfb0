//! Chunked summarization pipeline: chunking, per-segment fan-out, and reduction.
//!
//! Data flows one direction through the pipeline: raw text in, ordered segment list,
//! ordered per-segment summaries (with failure placeholders), merged final summary
//! out. Nothing here survives a single run.

mod chunking;
mod reducer;
mod service;
mod summarizer;
pub mod types;

pub use service::{SummarizationService, SummarizeApi};
pub use types::{
    DocumentSummary, PipelineError, Segment, SegmentOutcome, SegmentSummary, SummarizeOptions,
};
