use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    cancelled: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl RequestContext {
    pub fn background() -> Self {
        Self {
            cancelled: None,
            deadline: None,
        }
    }

    pub fn with_cancel() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let ctx = Self {
            cancelled: Some(rx),
            deadline: None,
        };
        (ctx, CancelHandle { tx })
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current <= deadline => current,
            _ => deadline,
        });
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    pub fn err(&self) -> Option<ContextError> {
        if self.is_cancelled() {
            return Some(ContextError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    pub async fn done(&self) -> ContextError {
        let cancelled = async {
            match self.cancelled.clone() {
                Some(mut rx) => {
                    // A dropped handle can no longer cancel.
                    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => ContextError::Canceled,
            _ = expired => ContextError::DeadlineExceeded,
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}
