//! Core data types and error definitions for the summarization pipeline.

use crate::completion::CompletionClientError;
use crate::config::Config;
use thiserror::Error;

/// Default per-segment word budget, matching the upstream service contract.
pub const DEFAULT_SEGMENT_WORDS: usize = 2000;

/// Default number of completion calls issued concurrently within one run.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// One bounded-size slice of the source text, identified by its split position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Zero-based position of this segment in the original split.
    pub index: usize,
    /// Whitespace-joined words carried by this segment.
    pub content: String,
}

/// Per-segment result produced by the fan-out stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentSummary {
    /// Index of the segment this result belongs to.
    pub index: usize,
    /// What the completion call produced for the segment.
    pub outcome: SegmentOutcome,
}

/// Outcome of one segment's completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentOutcome {
    /// The provider returned a summary for the segment.
    Summarized(String),
    /// The completion call failed; carries a human-readable diagnostic.
    Failed(String),
}

impl SegmentOutcome {
    /// Whether this outcome records a failed completion call.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Final product of a pipeline run.
#[derive(Debug, Clone)]
pub struct DocumentSummary {
    /// Merged summary text returned by the reduction call.
    pub text: String,
    /// Per-segment outcomes in ascending index order.
    pub segments: Vec<SegmentSummary>,
}

/// Tunables applied to every run of a [`super::SummarizationService`].
#[derive(Debug, Clone, Copy)]
pub struct SummarizeOptions {
    /// Upper bound on words per segment.
    pub segment_words: usize,
    /// Upper bound on concurrent completion calls within one run.
    pub max_concurrency: usize,
}

impl SummarizeOptions {
    /// Derive options from the loaded configuration, applying defaults.
    pub fn from_config(config: &Config) -> Self {
        Self {
            segment_words: config
                .summary_segment_words
                .unwrap_or(DEFAULT_SEGMENT_WORDS),
            max_concurrency: config
                .summary_max_concurrency
                .unwrap_or(DEFAULT_MAX_CONCURRENCY),
        }
    }
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self {
            segment_words: DEFAULT_SEGMENT_WORDS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// Errors emitted by the summarization pipeline.
///
/// Per-segment provider faults never surface here; they are recorded as
/// [`SegmentOutcome::Failed`] entries so that one bad segment cannot sink the
/// document. Only a failed reduction aborts a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The final merge call failed; terminal for the run.
    #[error(
        "Failed to merge segment summaries ({failed_segments} of {segment_count} segments had already failed): {source}"
    )]
    Reduction {
        /// Total number of segments in the run.
        segment_count: usize,
        /// Segments that had already failed before the merge was attempted.
        failed_segments: usize,
        /// Underlying provider fault.
        #[source]
        source: CompletionClientError,
    },
}
