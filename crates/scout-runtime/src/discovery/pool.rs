use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

use super::observer::{DiscoveryObserver, Stage};

/// Bounded fan-out over independent tasks.
///
/// At most `limit` tasks run at once. The pool waits for every task before
/// returning; there is no early exit.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    limit: usize,
}

impl WorkerPool {
    /// Create a pool. A limit of zero is treated as one.
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    /// Run `task` over every item and collect results in input order.
    ///
    /// A task that panics is logged and its result dropped; the rest of the
    /// stage is unaffected.
    pub async fn run<T, R, F, Fut>(
        &self,
        stage: Stage,
        items: Vec<T>,
        task: F,
        observer: Arc<dyn DiscoveryObserver>,
    ) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut,
        Fut: Future<Output = R> + Send + 'static,
    {
        observer.stage_started(stage, items.len());

        // Semaphore to limit concurrent tasks
        let semaphore = Arc::new(Semaphore::new(self.limit));
        let mut handles = Vec::with_capacity(items.len());

        for item in items {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };
            let fut = task(item);
            let observer = observer.clone();

            handles.push(tokio::spawn(async move {
                let result = fut.await;
                observer.task_finished(stage);
                drop(permit);
                result
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for joined in futures_util::future::join_all(handles).await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => tracing::error!(stage = %stage, error = %e, "Worker task failed"),
            }
        }

        observer.stage_finished(stage);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::discovery::NoopObserver;

    #[derive(Default)]
    struct CountingObserver {
        started: AtomicUsize,
        finished: AtomicUsize,
    }

    impl DiscoveryObserver for CountingObserver {
        fn stage_started(&self, _stage: Stage, total: usize) {
            self.started.store(total, Ordering::SeqCst);
        }

        fn task_finished(&self, _stage: Stage) {
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_results_in_input_order() {
        let pool = WorkerPool::new(3);
        let results = pool
            .run(
                Stage::Probe,
                vec![30u64, 10, 20, 0],
                |ms| async move {
                    tokio::time::sleep(Duration::from_millis(ms)).await;
                    ms
                },
                Arc::new(NoopObserver),
            )
            .await;
        assert_eq!(results, vec![30, 10, 20, 0]);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let pool = WorkerPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let items: Vec<usize> = (0..10).collect();
        let results = pool
            .run(
                Stage::SeedFetch,
                items,
                |i| {
                    let running = running.clone();
                    let peak = peak.clone();
                    async move {
                        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        running.fetch_sub(1, Ordering::SeqCst);
                        i
                    }
                },
                Arc::new(NoopObserver),
            )
            .await;

        assert_eq!(results.len(), 10);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_observer_sees_every_task() {
        let observer = Arc::new(CountingObserver::default());
        let pool = WorkerPool::new(4);
        pool.run(
            Stage::Expansion,
            vec![1, 2, 3, 4, 5],
            |i| async move { i * 2 },
            observer.clone(),
        )
        .await;

        assert_eq!(observer.started.load(Ordering::SeqCst), 5);
        assert_eq!(observer.finished.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let results: Vec<u32> = WorkerPool::new(0)
            .run(Stage::Probe, Vec::<u32>::new(), |i| async move { i }, Arc::new(NoopObserver))
            .await;
        assert!(results.is_empty());
    }

    #[test]
    fn test_zero_limit_clamped() {
        assert_eq!(WorkerPool::new(0).limit, 1);
    }
}
