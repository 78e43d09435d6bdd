//! Bounded-concurrency execution of async units of work.
//!
//! Every tier of the pipeline (sections, resources, transfers) runs its work
//! through [`run_bounded`] with its own limit; the limits are independent and
//! never pooled.

use futures::stream::{self, StreamExt};
use std::future::Future;

/// Drives `op` over every item with at most `limit` operations in flight.
///
/// Dispatch starts follow input order as slots free up; completion order is
/// unspecified and the returned outputs are in completion order. The runner
/// never aborts early: callers that need per-item failure encode it in the
/// output type.
pub async fn run_bounded<I, F, Fut>(items: I, limit: usize, op: F) -> Vec<Fut::Output>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future,
{
    assert!(limit > 0, "concurrency limit must be positive");

    stream::iter(items)
        .map(op)
        .buffer_unordered(limit)
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Tracks how many tracked operations are in flight and the highest count
    /// observed at any point.
    #[derive(Default)]
    struct Gauge {
        current: AtomicUsize,
        high: AtomicUsize,
    }

    impl Gauge {
        async fn track<T>(&self, value: T) -> T {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.high.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            value
        }
    }

    #[tokio::test]
    async fn runs_every_item_to_completion() {
        let outputs = run_bounded(0..100u32, 8, |n| async move { n * 2 }).await;
        assert_eq!(outputs.len(), 100);
        assert_eq!(outputs.iter().sum::<u32>(), (0..100u32).map(|n| n * 2).sum::<u32>());
    }

    #[tokio::test]
    async fn never_exceeds_the_limit() {
        let gauge = Arc::new(Gauge::default());
        let g = Arc::clone(&gauge);
        run_bounded(0..50, 7, |n| {
            let g = Arc::clone(&g);
            async move { g.track(n).await }
        })
        .await;
        assert!(
            gauge.high.load(Ordering::SeqCst) <= 7,
            "observed {} in flight with a limit of 7",
            gauge.high.load(Ordering::SeqCst)
        );
    }

    #[tokio::test]
    async fn limit_of_one_serialises_operations() {
        let gauge = Arc::new(Gauge::default());
        let g = Arc::clone(&gauge);
        run_bounded(0..10, 1, |n| {
            let g = Arc::clone(&g);
            async move { g.track(n).await }
        })
        .await;
        assert_eq!(gauge.high.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let outputs: Vec<u32> = run_bounded(std::iter::empty::<u32>(), 3, |n| async move { n }).await;
        assert!(outputs.is_empty());
    }
}
