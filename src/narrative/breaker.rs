use std::sync::atomic::{AtomicBool, Ordering};

/// One-way switch for the remote narrative tier.
///
/// Owned by the process session and shared (`Arc`) with every generator, so
/// one quota signal silences the remote tier for all chats until `reset`.
#[derive(Debug, Default)]
pub struct CircuitBreaker {
    tripped: AtomicBool,
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the breaker. Returns true only for the call that tripped it.
    pub fn trip(&self) -> bool {
        let first = !self.tripped.swap(true, Ordering::SeqCst);
        if first {
            tracing::warn!("Circuit breaker tripped, remote narrative tier disabled");
        }
        first
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        if self.tripped.swap(false, Ordering::SeqCst) {
            tracing::info!("Circuit breaker reset");
        }
    }
}
