use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

pub struct Metrics {
    // Documents
    documents_processed: AtomicUsize,
    documents_failed: AtomicUsize,

    // Pages and records
    pages_seen: AtomicUsize,
    pages_skipped: AtomicUsize,
    records_assembled: AtomicUsize,
    duplicates_dropped: AtomicUsize,
    unresolved_fields: AtomicUsize,

    // Timing (in microseconds)
    total_read_time_us: AtomicU64,
    total_extract_time_us: AtomicU64,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            documents_processed: AtomicUsize::new(0),
            documents_failed: AtomicUsize::new(0),
            pages_seen: AtomicUsize::new(0),
            pages_skipped: AtomicUsize::new(0),
            records_assembled: AtomicUsize::new(0),
            duplicates_dropped: AtomicUsize::new(0),
            unresolved_fields: AtomicUsize::new(0),
            total_read_time_us: AtomicU64::new(0),
            total_extract_time_us: AtomicU64::new(0),
        })
    }

    pub fn record_document(&self, success: bool) {
        if success {
            self.documents_processed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.documents_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_read(&self, duration: Duration, pages: usize) {
        self.total_read_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.pages_seen.fetch_add(pages, Ordering::Relaxed);
    }

    pub fn record_skipped_page(&self) {
        self.pages_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_extract(&self, duration: Duration, unresolved: usize) {
        self.total_extract_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.records_assembled.fetch_add(1, Ordering::Relaxed);
        self.unresolved_fields.fetch_add(unresolved, Ordering::Relaxed);
    }

    pub fn record_duplicates(&self, dropped: usize) {
        self.duplicates_dropped.fetch_add(dropped, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let documents = self.documents_processed.load(Ordering::Relaxed)
            + self.documents_failed.load(Ordering::Relaxed);
        MetricsSnapshot {
            documents_processed: self.documents_processed.load(Ordering::Relaxed),
            documents_failed: self.documents_failed.load(Ordering::Relaxed),
            pages_seen: self.pages_seen.load(Ordering::Relaxed),
            pages_skipped: self.pages_skipped.load(Ordering::Relaxed),
            records_assembled: self.records_assembled.load(Ordering::Relaxed),
            duplicates_dropped: self.duplicates_dropped.load(Ordering::Relaxed),
            unresolved_fields: self.unresolved_fields.load(Ordering::Relaxed),
            avg_read_time_ms: avg_time_ms(&self.total_read_time_us, documents),
            avg_extract_time_ms: avg_time_ms(
                &self.total_extract_time_us,
                self.records_assembled.load(Ordering::Relaxed),
            ),
        }
    }
}

fn avg_time_ms(total_us: &AtomicU64, count: usize) -> f64 {
    let total = total_us.load(Ordering::Relaxed) as f64;
    if count > 0 {
        total / count as f64 / 1000.0 // Convert to ms
    } else {
        0.0
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MetricsSnapshot {
    pub documents_processed: usize,
    pub documents_failed: usize,
    pub pages_seen: usize,
    pub pages_skipped: usize,
    pub records_assembled: usize,
    pub duplicates_dropped: usize,
    pub unresolved_fields: usize,
    pub avg_read_time_ms: f64,
    pub avg_extract_time_ms: f64,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts() {
        let metrics = Metrics::new();
        metrics.record_document(true);
        metrics.record_document(false);
        metrics.record_read(Duration::from_millis(4), 3);
        metrics.record_skipped_page();
        metrics.record_extract(Duration::from_millis(2), 1);
        metrics.record_extract(Duration::from_millis(4), 0);
        metrics.record_duplicates(1);

        let snap = metrics.snapshot();
        assert_eq!(snap.documents_processed, 1);
        assert_eq!(snap.documents_failed, 1);
        assert_eq!(snap.pages_seen, 3);
        assert_eq!(snap.pages_skipped, 1);
        assert_eq!(snap.records_assembled, 2);
        assert_eq!(snap.duplicates_dropped, 1);
        assert_eq!(snap.unresolved_fields, 1);
        assert!((snap.avg_read_time_ms - 2.0).abs() < 1e-9);
        assert!((snap.avg_extract_time_ms - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_snapshot_has_no_nan() {
        let snap = Metrics::new().snapshot();
        assert_eq!(snap.avg_read_time_ms, 0.0);
        assert_eq!(snap.avg_extract_time_ms, 0.0);
    }
}
