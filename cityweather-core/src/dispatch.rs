//! Background work with completions posted back to a single owner.
//!
//! A `Dispatcher` spawns each future on the tokio runtime and posts its output
//! into an unbounded channel. The matching `Mailbox` stays with the owning
//! context, which drains it and applies results itself. Spawned tasks never
//! touch owner state directly.
//!
//! A job that panics still settles its slot: the mailbox logs the failure and
//! stops waiting for it.

use std::future::Future;

use tokio::{sync::mpsc, task::JoinError};

type Outcome<M> = Result<M, JoinError>;

/// Create a connected dispatcher/mailbox pair.
pub fn channel<M>() -> (Dispatcher<M>, Mailbox<M>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Dispatcher { tx }, Mailbox { rx, pending: 0 })
}

#[derive(Debug)]
pub struct Dispatcher<M> {
    tx: mpsc::UnboundedSender<Outcome<M>>,
}

impl<M> Clone for Dispatcher<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<M: Send + 'static> Dispatcher<M> {
    /// Run `work` on the runtime and post its output to the mailbox.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(&self, work: F)
    where
        F: Future<Output = M> + Send + 'static,
    {
        let tx = self.tx.clone();
        let job = tokio::spawn(work);
        tokio::spawn(async move {
            if tx.send(job.await).is_err() {
                tracing::debug!("completion dropped: mailbox closed");
            }
        });
    }
}

#[derive(Debug)]
pub struct Mailbox<M> {
    rx: mpsc::UnboundedReceiver<Outcome<M>>,
    pending: usize,
}

impl<M> Mailbox<M> {
    /// Record that one more completion is expected.
    pub fn expect_one(&mut self) {
        self.pending += 1;
    }

    /// Number of dispatched jobs whose completion has not been received yet.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Wait for the next completion. Returns `None` when nothing is outstanding.
    pub async fn recv(&mut self) -> Option<M> {
        while self.pending > 0 {
            let outcome = self.rx.recv().await?;
            if let Some(message) = self.settle(outcome) {
                return Some(message);
            }
        }
        None
    }

    /// Take a completion that has already arrived, without waiting.
    pub fn try_recv(&mut self) -> Option<M> {
        while self.pending > 0 {
            let outcome = self.rx.try_recv().ok()?;
            if let Some(message) = self.settle(outcome) {
                return Some(message);
            }
        }
        None
    }

    fn settle(&mut self, outcome: Outcome<M>) -> Option<M> {
        self.pending -= 1;
        match outcome {
            Ok(message) => Some(message),
            Err(e) => {
                tracing::error!(error = %e, "background job did not complete");
                None
            }
        }
    }
}
