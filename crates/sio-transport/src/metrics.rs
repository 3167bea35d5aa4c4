use std::sync::atomic::{AtomicU64, Ordering};

/// In-process counters for the ambient observability surface. Not a wire
/// feature and not externally scraped — SPEC_FULL keeps this a plain
/// `AtomicU64` registry rather than pulling in a metrics-export dependency,
/// the same way the teacher's `http/metrics.rs` keeps per-stream counters
/// in-process.
#[derive(Default)]
pub struct GatewayMetrics {
    pub sessions_created: AtomicU64,
    pub sessions_expired: AtomicU64,
    pub frames_encoded: AtomicU64,
    pub frames_decoded: AtomicU64,
    pub transport_attached: AtomicU64,
    pub transport_detached: AtomicU64,
    pub poll_timeouts: AtomicU64,
}

impl GatewayMetrics {
    pub fn snapshot(&self) -> GatewayMetricsSnapshot {
        GatewayMetricsSnapshot {
            sessions_created: self.sessions_created.load(Ordering::Relaxed),
            sessions_expired: self.sessions_expired.load(Ordering::Relaxed),
            frames_encoded: self.frames_encoded.load(Ordering::Relaxed),
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            transport_attached: self.transport_attached.load(Ordering::Relaxed),
            transport_detached: self.transport_detached.load(Ordering::Relaxed),
            poll_timeouts: self.poll_timeouts.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatewayMetricsSnapshot {
    pub sessions_created: u64,
    pub sessions_expired: u64,
    pub frames_encoded: u64,
    pub frames_decoded: u64,
    pub transport_attached: u64,
    pub transport_detached: u64,
    pub poll_timeouts: u64,
}
