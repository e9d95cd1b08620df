use tokio_util::sync::CancellationToken;

use super::StageOutput;

/// Everything a stage emitted, collected after both outputs closed.
#[derive(Debug)]
pub struct Drained<T, E> {
    pub items: Vec<T>,
    pub errors: Vec<E>,
}

impl<T, E> Drained<T, E> {
    pub fn first_error(&self) -> Option<&E> {
        self.errors.first()
    }
}

/// Drain both outputs of a stage concurrently until both are closed.
///
/// The first error cancels `cancel` so the stage stops dispatching, but
/// draining continues so in-flight workers can finish and the outputs close.
pub async fn drain<T, E>(cancel: &CancellationToken, output: StageOutput<T, E>) -> Drained<T, E> {
    let StageOutput {
        mut results,
        mut errors,
    } = output;
    let mut drained = Drained {
        items: Vec::new(),
        errors: Vec::new(),
    };
    let mut results_open = true;
    let mut errors_open = true;

    while results_open || errors_open {
        tokio::select! {
            item = results.recv(), if results_open => match item {
                Some(item) => drained.items.push(item),
                None => results_open = false,
            },
            err = errors.recv(), if errors_open => match err {
                Some(err) => {
                    if drained.errors.is_empty() {
                        cancel.cancel();
                    }
                    drained.errors.push(err);
                }
                None => errors_open = false,
            },
        }
    }

    drained
}

/// Drain both outputs without cancelling on errors.
///
/// Used where a failing item must not stop its siblings, such as the
/// per-tracker search stages.
pub async fn collect<T, E>(output: StageOutput<T, E>) -> Drained<T, E> {
    let StageOutput {
        mut results,
        mut errors,
    } = output;
    let mut drained = Drained {
        items: Vec::new(),
        errors: Vec::new(),
    };
    let mut results_open = true;
    let mut errors_open = true;

    while results_open || errors_open {
        tokio::select! {
            item = results.recv(), if results_open => match item {
                Some(item) => drained.items.push(item),
                None => results_open = false,
            },
            err = errors.recv(), if errors_open => match err {
                Some(err) => drained.errors.push(err),
                None => errors_open = false,
            },
        }
    }

    drained
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{source_stream, WorkerStage};

    #[tokio::test]
    async fn test_collect_keeps_all_errors() {
        let output = WorkerStage::new("collect", 2).spawn(
            CancellationToken::new(),
            source_stream((0..6).collect::<Vec<u32>>()),
            |n| async move {
                if n % 2 == 0 {
                    Ok(n)
                } else {
                    Err(format!("odd {}", n))
                }
            },
        );

        let drained = collect(output).await;
        assert_eq!(drained.items.len(), 3);
        assert_eq!(drained.errors.len(), 3);
    }

    #[tokio::test]
    async fn test_drain_cancels_on_first_error() {
        let cancel = CancellationToken::new();
        let output = WorkerStage::new("drain", 1).spawn(
            cancel.clone(),
            source_stream(vec![1u32]),
            |_| async move { Err::<u32, _>("boom".to_string()) },
        );

        let drained = drain(&cancel, output).await;
        assert!(cancel.is_cancelled());
        assert_eq!(drained.first_error().map(String::as_str), Some("boom"));
        assert!(drained.items.is_empty());
    }
}
