//! Reduction of ordered segment summaries into one final summary.

use crate::completion::CompletionClient;

use super::types::{PipelineError, SegmentOutcome, SegmentSummary};

/// System instruction sent with the single merge completion call.
pub(crate) const REDUCE_INSTRUCTION: &str = "You are a helpful summarizer. Combine these section \
     summaries into one coherent document summary, preserving structural cues such as headings \
     and lists.";

fn failure_placeholder(index: usize) -> String {
    format!("[Section {} could not be summarized.]", index + 1)
}

/// Concatenate segment outcomes, in the order given, into the reduction payload.
///
/// Failed segments contribute an explicit placeholder rather than being dropped, so
/// the merge call always sees one entry per segment. Entries are separated by a
/// blank line.
pub(crate) fn build_reduction_payload(segments: &[SegmentSummary]) -> String {
    segments
        .iter()
        .map(|segment| match &segment.outcome {
            SegmentOutcome::Summarized(text) => text.clone(),
            SegmentOutcome::Failed(_) => failure_placeholder(segment.index),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Merge the index-ordered segment summaries with a single completion call.
///
/// The provider's response is returned verbatim. There is no fallback reduction: a
/// failed merge aborts the run, because returning unmerged segment text would
/// misrepresent itself as a coherent summary.
pub(crate) async fn reduce_summaries(
    segments: &[SegmentSummary],
    client: &dyn CompletionClient,
) -> Result<String, PipelineError> {
    let payload = build_reduction_payload(segments);
    client
        .complete(REDUCE_INSTRUCTION, &payload)
        .await
        .map_err(|source| PipelineError::Reduction {
            segment_count: segments.len(),
            failed_segments: segments
                .iter()
                .filter(|segment| segment.outcome.is_failed())
                .count(),
            source,
        })
}
