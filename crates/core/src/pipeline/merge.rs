use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Fan several streams of one type into a single stream.
///
/// Each input gets its own forwarding task, so elements arrive in no
/// particular order. The output closes after every input has closed, or
/// early once `cancel` fires.
pub fn merge<T, I>(cancel: CancellationToken, streams: I) -> mpsc::Receiver<T>
where
    T: Send + 'static,
    I: IntoIterator<Item = mpsc::Receiver<T>>,
{
    let streams: Vec<_> = streams.into_iter().collect();
    let (tx, rx) = mpsc::channel(streams.len().max(1));

    for mut stream in streams {
        let tx = tx.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                let item = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    item = stream.recv() => match item {
                        Some(item) => item,
                        None => break,
                    },
                };

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    sent = tx.send(item) => if sent.is_err() {
                        break;
                    },
                }
            }
        });
    }

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::source_stream;

    #[tokio::test]
    async fn test_merges_all_elements() {
        let cancel = CancellationToken::new();
        let mut merged = merge(
            cancel,
            vec![
                source_stream(vec![1, 2, 3]),
                source_stream(vec![]),
                source_stream(vec![4, 5]),
            ],
        );

        let mut seen = Vec::new();
        while let Some(n) = merged.recv().await {
            seen.push(n);
        }
        seen.sort();
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_no_inputs_is_closed() {
        let mut merged = merge(CancellationToken::new(), Vec::<mpsc::Receiver<u8>>::new());
        assert!(merged.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_cancel_closes_output_early() {
        let cancel = CancellationToken::new();
        // Input whose sender is kept alive so it never closes on its own
        let (_tx, open) = mpsc::channel::<u8>(1);
        let mut merged = merge(cancel.clone(), vec![open]);

        cancel.cancel();
        assert!(merged.recv().await.is_none());
    }
}
