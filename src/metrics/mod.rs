//! Basic metrics instrumentation for tracking performance.
//!
//! Provides counters and duration tracking for outbound CRM requests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Metrics collector for tracking CRM API performance.
#[derive(Debug, Clone)]
pub struct Metrics {
    /// Total number of HTTP requests made
    http_requests_total: Arc<AtomicU64>,

    /// Total number of HTTP errors
    http_errors_total: Arc<AtomicU64>,

    /// Total duration of all HTTP requests in milliseconds
    http_duration_total_ms: Arc<AtomicU64>,

    /// Number of lead records fetched by searches
    leads_fetched_total: Arc<AtomicU64>,

    /// Number of lead records created
    leads_created_total: Arc<AtomicU64>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self {
            http_requests_total: Arc::new(AtomicU64::new(0)),
            http_errors_total: Arc::new(AtomicU64::new(0)),
            http_duration_total_ms: Arc::new(AtomicU64::new(0)),
            leads_fetched_total: Arc::new(AtomicU64::new(0)),
            leads_created_total: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record an HTTP request with duration.
    pub fn record_http_request(&self, duration: Duration) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);
        self.http_duration_total_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record an HTTP error.
    pub fn record_http_error(&self) {
        self.http_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record leads fetched.
    pub fn record_leads_fetched(&self, count: usize) {
        self.leads_fetched_total
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record a lead created.
    pub fn record_lead_created(&self) {
        self.leads_created_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total HTTP requests.
    pub fn http_requests_total(&self) -> u64 {
        self.http_requests_total.load(Ordering::Relaxed)
    }

    /// Get total HTTP errors.
    pub fn http_errors_total(&self) -> u64 {
        self.http_errors_total.load(Ordering::Relaxed)
    }

    /// Get total HTTP duration in milliseconds.
    pub fn http_duration_total_ms(&self) -> u64 {
        self.http_duration_total_ms.load(Ordering::Relaxed)
    }

    /// Get average HTTP request duration in milliseconds.
    pub fn http_duration_avg_ms(&self) -> f64 {
        let total = self.http_duration_total_ms.load(Ordering::Relaxed);
        let count = self.http_requests_total.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    /// Get total leads fetched.
    pub fn leads_fetched_total(&self) -> u64 {
        self.leads_fetched_total.load(Ordering::Relaxed)
    }

    /// Get total leads created.
    pub fn leads_created_total(&self) -> u64 {
        self.leads_created_total.load(Ordering::Relaxed)
    }

    /// Get a summary of all metrics.
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            http_requests_total: self.http_requests_total(),
            http_errors_total: self.http_errors_total(),
            http_duration_total_ms: self.http_duration_total_ms(),
            http_duration_avg_ms: self.http_duration_avg_ms(),
            leads_fetched_total: self.leads_fetched_total(),
            leads_created_total: self.leads_created_total(),
        }
    }
}

/// A snapshot of metrics values.
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub http_requests_total: u64,
    pub http_errors_total: u64,
    pub http_duration_total_ms: u64,
    pub http_duration_avg_ms: f64,
    pub leads_fetched_total: u64,
    pub leads_created_total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_requests_and_errors() {
        let metrics = Metrics::new();

        metrics.record_http_request(Duration::from_millis(100));
        metrics.record_http_request(Duration::from_millis(300));
        metrics.record_http_error();

        assert_eq!(metrics.http_requests_total(), 2);
        assert_eq!(metrics.http_errors_total(), 1);
        assert_eq!(metrics.http_duration_total_ms(), 400);
        assert!((metrics.http_duration_avg_ms() - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lead_counters() {
        let metrics = Metrics::new();

        metrics.record_leads_fetched(3);
        metrics.record_lead_created();

        assert_eq!(metrics.leads_fetched_total(), 3);
        assert_eq!(metrics.leads_created_total(), 1);
    }

    #[test]
    fn test_clone_shares_counters() {
        let metrics = Metrics::new();
        let clone = metrics.clone();

        clone.record_leads_fetched(5);

        assert_eq!(metrics.leads_fetched_total(), 5);
    }

    #[test]
    fn test_summary_snapshot() {
        let metrics = Metrics::new();
        metrics.record_http_request(Duration::from_millis(50));

        let summary = metrics.summary();
        assert_eq!(summary.http_requests_total, 1);
        assert_eq!(summary.http_errors_total, 0);
    }
}
