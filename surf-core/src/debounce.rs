use std::time::Duration;

use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle, time::Instant};

/// Delivers a message once no newer message has been scheduled for `delay`.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    /// Send `message` on `tx` after the quiet period, replacing anything
    /// scheduled before.
    pub fn schedule<M>(&mut self, tx: &UnboundedSender<M>, message: M)
    where
        M: Send + 'static,
    {
        self.cancel();

        let tx = tx.clone();
        let deadline = Instant::now() + self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            // Receiver gone means the session is shutting down.
            let _ = tx.send(message);
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
