use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-wide request counter shared by all workers
///
/// Only the admin reset endpoint calls `reset`.
#[derive(Debug, Clone, Default)]
pub struct HitCounter {
    hits: Arc<AtomicU64>,
}

impl HitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self) -> u64 {
        self.hits.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_across_clones() {
        let counter = HitCounter::new();
        let clone = counter.clone();

        counter.record();
        clone.record();

        assert_eq!(counter.hits(), 2);
        assert_eq!(clone.hits(), 2);
    }

    #[test]
    fn test_reset() {
        let counter = HitCounter::new();
        counter.record();
        counter.reset();

        assert_eq!(counter.hits(), 0);
    }

    #[test]
    fn test_concurrent_increments() {
        let counter = HitCounter::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = counter.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        counter.record();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.hits(), 8000);
    }
}
