//! Bounded worker stage: fan-out over a semaphore, fan-in over channels.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::metrics;

/// Channel capacity cap for stages with very large limits.
const MAX_BUFFER: usize = 1024;

/// The two output streams of a stage.
///
/// Both close once the stage has stopped dispatching and every in-flight
/// invocation has finished. Callers must keep draining both until closed.
#[derive(Debug)]
pub struct StageOutput<T, E> {
    pub results: mpsc::Receiver<T>,
    pub errors: mpsc::Receiver<E>,
}

/// A named stage that runs a fallible async mapping over its input with at
/// most `limit` invocations in flight.
#[derive(Debug, Clone)]
pub struct WorkerStage {
    name: String,
    limit: usize,
}

impl WorkerStage {
    /// Create a stage. A limit of zero is treated as one.
    pub fn new(name: impl Into<String>, limit: usize) -> Self {
        Self {
            name: name.into(),
            limit: limit.clamp(1, u32::MAX as usize),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Start the stage on `input`.
    ///
    /// Every completed invocation emits exactly one value, to `results` on
    /// success or to `errors` on failure; a failing item never stops its
    /// siblings. Cancelling `cancel` stops dispatch while waiting for input,
    /// for a permit or to emit. Invocations already running are awaited
    /// before the outputs close.
    pub fn spawn<In, Out, E, F, Fut>(
        &self,
        cancel: CancellationToken,
        mut input: mpsc::Receiver<In>,
        mut map: F,
    ) -> StageOutput<Out, E>
    where
        In: Send + 'static,
        Out: Send + 'static,
        E: Send + 'static,
        F: FnMut(In) -> Fut + Send + 'static,
        Fut: Future<Output = Result<Out, E>> + Send + 'static,
    {
        let capacity = self.limit.min(MAX_BUFFER);
        let (results_tx, results) = mpsc::channel(capacity);
        let (errors_tx, errors) = mpsc::channel(capacity);
        let semaphore = Arc::new(Semaphore::new(self.limit));
        let limit = self.limit as u32;
        let name = self.name.clone();

        tokio::spawn(async move {
            let mut dispatched = 0usize;

            loop {
                let item = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    item = input.recv() => match item {
                        Some(item) => item,
                        None => break,
                    },
                };

                let permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => break,
                    },
                };

                dispatched += 1;
                let work = map(item);
                let cancel = cancel.clone();
                let results_tx = results_tx.clone();
                let errors_tx = errors_tx.clone();
                let name = name.clone();

                tokio::spawn(async move {
                    let _permit = permit;
                    match work.await {
                        Ok(value) => {
                            metrics::STAGE_ITEMS.with_label_values(&[name.as_str(), "ok"]).inc();
                            emit(&cancel, &results_tx, value).await;
                        }
                        Err(err) => {
                            metrics::STAGE_ITEMS
                                .with_label_values(&[name.as_str(), "error"])
                                .inc();
                            emit(&cancel, &errors_tx, err).await;
                        }
                    }
                });
            }

            // All permits back means every worker has finished emitting.
            let _ = semaphore.acquire_many(limit).await;
            debug!(stage = %name, dispatched, cancelled = cancel.is_cancelled(), "Stage finished");
            // Dropping the last senders closes both outputs.
        });

        StageOutput { results, errors }
    }
}

async fn emit<T>(cancel: &CancellationToken, tx: &mpsc::Sender<T>, value: T) {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {}
        _ = tx.send(value) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::source_stream;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_zero_limit_becomes_one() {
        assert_eq!(WorkerStage::new("s", 0).limit(), 1);
        assert_eq!(WorkerStage::new("s", 7).limit(), 7);
    }

    #[tokio::test]
    async fn test_limit_is_respected() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let stage = WorkerStage::new("limited", 3);
        let output = {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            stage.spawn(
                CancellationToken::new(),
                source_stream((0..20).collect::<Vec<u32>>()),
                move |n| {
                    let in_flight = Arc::clone(&in_flight);
                    let peak = Arc::clone(&peak);
                    async move {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        Ok::<_, String>(n)
                    }
                },
            )
        };

        let StageOutput {
            mut results,
            mut errors,
        } = output;
        let mut count = 0;
        while results.recv().await.is_some() {
            count += 1;
        }
        assert!(errors.recv().await.is_none());
        assert_eq!(count, 20);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_cancel_before_start_closes_outputs() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let output = WorkerStage::new("cancelled", 2).spawn(
            cancel,
            source_stream(vec![1, 2, 3]),
            |n: i32| async move { Ok::<_, String>(n) },
        );

        let StageOutput {
            mut results,
            mut errors,
        } = output;
        assert!(results.recv().await.is_none());
        assert!(errors.recv().await.is_none());
    }
}
