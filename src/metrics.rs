use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing summarization activity.
#[derive(Default)]
pub struct SummaryMetrics {
    documents_summarized: AtomicU64,
    segments_summarized: AtomicU64,
    segments_failed: AtomicU64,
    last_segment_count: AtomicU64,
}

impl SummaryMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed pipeline run with its segment and failure counts.
    pub fn record_document(&self, segment_count: u64, failed_segments: u64) {
        self.documents_summarized.fetch_add(1, Ordering::Relaxed);
        self.segments_summarized
            .fetch_add(segment_count, Ordering::Relaxed);
        self.segments_failed
            .fetch_add(failed_segments, Ordering::Relaxed);
        self.last_segment_count
            .store(segment_count, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let documents_summarized = self.documents_summarized.load(Ordering::Relaxed);
        MetricsSnapshot {
            documents_summarized,
            segments_summarized: self.segments_summarized.load(Ordering::Relaxed),
            segments_failed: self.segments_failed.load(Ordering::Relaxed),
            last_segment_count: (documents_summarized > 0)
                .then(|| self.last_segment_count.load(Ordering::Relaxed)),
        }
    }
}

/// Immutable view of summarization counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of documents summarized since startup.
    pub documents_summarized: u64,
    /// Total segment count produced across all summarized documents.
    pub segments_summarized: u64,
    /// Total number of segments whose completion call failed.
    pub segments_failed: u64,
    /// Segment count of the most recent run, if any run has completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_segment_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_documents_segments_and_failures() {
        let metrics = SummaryMetrics::new();
        metrics.record_document(3, 1);
        metrics.record_document(2, 0);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_summarized, 2);
        assert_eq!(snapshot.segments_summarized, 5);
        assert_eq!(snapshot.segments_failed, 1);
        assert_eq!(snapshot.last_segment_count, Some(2));
    }

    #[test]
    fn snapshot_reports_no_last_run_before_first_document() {
        let metrics = SummaryMetrics::new();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_summarized, 0);
        assert_eq!(snapshot.last_segment_count, None);
    }
}
