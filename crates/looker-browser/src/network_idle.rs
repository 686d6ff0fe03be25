use std::collections::HashMap;
use std::time::{Duration, Instant};

/// How long the network must stay quiet before a page counts as settled
pub const IDLE_WINDOW: Duration = Duration::from_millis(500);

/// A request that has been sent but has not finished or failed
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub url: String,
    pub started_at: Instant,
}

/// Tracks in-flight requests of one page from Network domain events
#[derive(Debug, Default)]
pub struct InFlightRequests {
    pending: HashMap<String, PendingRequest>,
}

impl InFlightRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request being sent; redirects reuse the request id
    pub fn started(&mut self, request_id: String, url: String) {
        self.pending.insert(
            request_id,
            PendingRequest {
                url,
                started_at: Instant::now(),
            },
        );
    }

    /// Record a request finishing or failing
    pub fn finished(&mut self, request_id: &str) {
        self.pending.remove(request_id);
    }

    /// Idle only with zero pending requests
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn count(&self) -> usize {
        self.pending.len()
    }

    /// The request that has been pending the longest
    pub fn oldest(&self) -> Option<&PendingRequest> {
        self.pending.values().min_by_key(|req| req.started_at)
    }
}
