use tokio::sync::mpsc;

/// Turn a list of inputs into a stream that yields them in order.
///
/// Items are fed from a spawned task, so the call returns immediately. The
/// channel holds a single item; production stops as soon as the receiver is
/// dropped. An empty list yields a stream that is already closed.
pub fn source_stream<T>(items: Vec<T>) -> mpsc::Receiver<T>
where
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel(1);
    if items.is_empty() {
        return rx;
    }

    tokio::spawn(async move {
        for item in items {
            if tx.send(item).await.is_err() {
                break;
            }
        }
    });

    rx
}
