//! Debounced search input.
//!
//! Keystrokes go in through [`SearchDebouncer::push`]; the latest query comes
//! out of the receiver once no new keystroke has arrived for the quiet
//! period. Only the timing changes: the last query emitted is always the
//! last query typed, so the filtered result matches eager evaluation.

use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct SearchDebouncer {
    sender: mpsc::UnboundedSender<String>,
}

impl SearchDebouncer {
    /// Spawn the debounce task on the current tokio runtime
    pub fn spawn(quiet_period: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
        let (output_tx, output_rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            while let Some(mut latest) = input_rx.recv().await {
                loop {
                    tokio::select! {
                        next = input_rx.recv() => match next {
                            Some(query) => latest = query,
                            None => {
                                let _ = output_tx.send(std::mem::take(&mut latest));
                                return;
                            }
                        },
                        _ = tokio::time::sleep(quiet_period) => {
                            debug!("Search settled on {:?}", latest);
                            if output_tx.send(std::mem::take(&mut latest)).is_err() {
                                return;
                            }
                            break;
                        }
                    }
                }
            }
        });

        (Self { sender: input_tx }, output_rx)
    }

    /// Record a keystroke. Returns `false` once the debounce task has stopped.
    pub fn push(&self, query: impl Into<String>) -> bool {
        self.sender.send(query.into()).is_ok()
    }
}
