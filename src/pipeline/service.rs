//! Summarization service coordinating chunking, completion fan-out, and reduction.

use crate::{
    completion::CompletionClient,
    metrics::{MetricsSnapshot, SummaryMetrics},
    pipeline::{
        chunking::chunk_text,
        reducer::reduce_summaries,
        summarizer::summarize_segment,
        types::{DocumentSummary, PipelineError, SummarizeOptions},
    },
};
use async_trait::async_trait;
use futures_util::future::join_all;
use std::sync::Arc;
use uuid::Uuid;

/// Coordinates the full summarization pipeline: chunking, per-segment completion
/// fan-out, and the final reduction call.
///
/// The service owns the completion client handle and the metrics registry so that the
/// HTTP surface and tests share the same components. Construct it once near process
/// start and share it through an `Arc`. Runs are independent: nothing but the
/// stateless client handle and the atomic counters is shared between them.
pub struct SummarizationService {
    completion_client: Box<dyn CompletionClient>,
    options: SummarizeOptions,
    metrics: Arc<SummaryMetrics>,
}

/// Abstraction over the summarization pipeline used by external surfaces.
#[async_trait]
pub trait SummarizeApi: Send + Sync {
    /// Run the chunk → summarize → reduce pipeline over extracted document text.
    async fn summarize(
        &self,
        text: String,
        segment_words_override: Option<usize>,
    ) -> Result<DocumentSummary, PipelineError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl SummarizationService {
    /// Build a new summarization service around an already-constructed completion client.
    pub fn new(completion_client: Box<dyn CompletionClient>, options: SummarizeOptions) -> Self {
        Self {
            completion_client,
            options,
            metrics: Arc::new(SummaryMetrics::new()),
        }
    }

    /// Summarize a document body.
    ///
    /// Segments are summarized concurrently in bounded waves; each segment's call is
    /// attempted exactly once, and the reducer only runs after every call has settled.
    /// Results are reassembled by segment index before reduction so that completion
    /// order can never scramble document order.
    pub async fn summarize(
        &self,
        text: String,
        segment_words_override: Option<usize>,
    ) -> Result<DocumentSummary, PipelineError> {
        let run_id = Uuid::new_v4();
        let segment_words = segment_words_override.unwrap_or(self.options.segment_words);
        let segments = chunk_text(&text, segment_words);
        if segments.is_empty() {
            tracing::info!(%run_id, "Document contained no words; skipping completion calls");
            self.metrics.record_document(0, 0);
            return Ok(DocumentSummary {
                text: String::new(),
                segments: Vec::new(),
            });
        }

        let segment_count = segments.len();
        tracing::info!(
            %run_id,
            segments = segment_count,
            segment_words,
            "Summarizing document"
        );

        let concurrency = self.options.max_concurrency.max(1);
        let mut results = Vec::with_capacity(segment_count);
        for batch in segments.chunks(concurrency) {
            let calls: Vec<_> = batch
                .iter()
                .cloned()
                .map(|segment| summarize_segment(segment, self.completion_client.as_ref()))
                .collect();
            results.extend(join_all(calls).await);
        }
        // Reassemble by index: the fan-in is a barrier and the reducer must see
        // document order regardless of completion order.
        results.sort_unstable_by_key(|summary| summary.index);

        let failed_segments = results
            .iter()
            .filter(|summary| summary.outcome.is_failed())
            .count();
        if failed_segments > 0 {
            tracing::warn!(
                %run_id,
                failed = failed_segments,
                segments = segment_count,
                "Some segments failed; placeholders will be merged"
            );
        }

        let text = reduce_summaries(&results, self.completion_client.as_ref()).await?;
        self.metrics
            .record_document(segment_count as u64, failed_segments as u64);
        tracing::info!(
            %run_id,
            segments = segment_count,
            failed = failed_segments,
            "Document summarized"
        );

        Ok(DocumentSummary {
            text,
            segments: results,
        })
    }

    /// Return the current summarization metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl SummarizeApi for SummarizationService {
    async fn summarize(
        &self,
        text: String,
        segment_words_override: Option<usize>,
    ) -> Result<DocumentSummary, PipelineError> {
        SummarizationService::summarize(self, text, segment_words_override).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        SummarizationService::metrics_snapshot(self)
    }
}
