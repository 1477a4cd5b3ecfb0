//! Per-segment summarization with failure isolation.

use crate::completion::CompletionClient;

use super::types::{Segment, SegmentOutcome, SegmentSummary};

/// System instruction sent with every per-segment completion call.
pub(crate) const SEGMENT_INSTRUCTION: &str = "You are a helpful summarizer.";

/// Summarize one segment, converting any provider fault into a `Failed` outcome.
///
/// The call is issued exactly once: no retries, no caching. A fault is recorded in
/// the returned outcome and never propagated, so sibling segments keep processing.
pub(crate) async fn summarize_segment(
    segment: Segment,
    client: &dyn CompletionClient,
) -> SegmentSummary {
    let Segment { index, content } = segment;
    let request = format!("Summarize this section:\n\n{content}");
    match client.complete(SEGMENT_INSTRUCTION, &request).await {
        Ok(summary) => SegmentSummary {
            index,
            outcome: SegmentOutcome::Summarized(summary),
        },
        Err(error) => {
            tracing::warn!(segment = index, error = %error, "Segment summarization failed");
            SegmentSummary {
                index,
                outcome: SegmentOutcome::Failed(error.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionClientError;
    use async_trait::async_trait;

    struct FixedClient {
        result: Result<&'static str, &'static str>,
    }

    #[async_trait]
    impl CompletionClient for FixedClient {
        async fn complete(
            &self,
            _system_instruction: &str,
            _user_content: &str,
        ) -> Result<String, CompletionClientError> {
            self.result
                .map(str::to_string)
                .map_err(|message| CompletionClientError::GenerationFailed(message.to_string()))
        }
    }

    fn segment(index: usize, content: &str) -> Segment {
        Segment {
            index,
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn success_carries_provider_text_untouched() {
        let client = FixedClient {
            result: Ok("  A summary with leading spaces."),
        };
        let summary = summarize_segment(segment(3, "some words"), &client).await;

        assert_eq!(summary.index, 3);
        assert_eq!(
            summary.outcome,
            SegmentOutcome::Summarized("  A summary with leading spaces.".into())
        );
    }

    #[tokio::test]
    async fn provider_fault_becomes_failed_outcome() {
        let client = FixedClient {
            result: Err("connection reset"),
        };
        let summary = summarize_segment(segment(0, "some words"), &client).await;

        assert_eq!(summary.index, 0);
        match summary.outcome {
            SegmentOutcome::Failed(reason) => assert!(reason.contains("connection reset")),
            other => panic!("expected failed outcome, got {other:?}"),
        }
    }
}
