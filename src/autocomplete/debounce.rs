//! Single-shot debounce timer backed by a cancellation token.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Keystroke pause before a suggestion request is issued.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(160);

/// Restartable single-shot timer.
///
/// Each [`restart`](Debouncer::restart) cancels the run scheduled before it,
/// so only the last trigger of a burst fires.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<CancellationToken>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_DELAY)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancels the pending run and returns the token of the new one.
    pub fn restart(&mut self) -> CancellationToken {
        self.cancel();
        let token = CancellationToken::new();
        self.pending = Some(token.clone());
        token
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

/// Sleeps for `delay` unless `token` is cancelled first.
///
/// Returns `true` when the full delay elapsed.
pub async fn wait(delay: Duration, token: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_wait_elapses() {
        let token = CancellationToken::new();
        assert!(wait(DEBOUNCE_DELAY, &token).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_cancels_previous_run() {
        let mut debouncer = Debouncer::default();
        let first = debouncer.restart();
        let second = debouncer.restart();

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(!wait(debouncer.delay(), &first).await);
        assert!(wait(debouncer.delay(), &second).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_wait() {
        let token = CancellationToken::new();
        let waiter = tokio::spawn({
            let token = token.clone();
            async move { wait(Duration::from_millis(500), &token).await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
        assert!(!waiter.await.unwrap());
    }
}
