use super::*;
use futures::Stream;
use futures::StreamExt;
use futures::stream::BoxStream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::Context;
use std::task::Poll;

/// Lazy, single-pass stream of projected rows.
///
/// Nothing reaches the provider until the first poll. The stream ends after
/// the last row or after its first error; in both cases, and when the
/// stream is dropped early, the underlying cursor has been disposed exactly
/// once.
pub struct RowStream<T> {
    inner: BoxStream<'static, Result<T>>,
    cancel: Cancel,
}

impl<T> RowStream<T> {
    /// Handle that cancels this stream from elsewhere.
    pub fn canceller(&self) -> Cancel {
        self.cancel.clone()
    }
    /// Cancels the stream; the next poll yields [`Error::Cancelled`].
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl<T> Stream for RowStream<T> {
    type Item = Result<T>;
    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl<T> std::fmt::Debug for RowStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowStream")
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

/// Where a streamed query stands between pulls.
///
/// Terminal states are not represented: once a pull completes, fails or is
/// cancelled, the lease has been released and the state is dropped.
enum Phase {
    Pending {
        provider: Arc<dyn Provider>,
        command: Command,
    },
    Streaming(Lease),
}

struct Pull<F> {
    phase: Phase,
    project: F,
    cancel: Cancel,
}

/// Builds the stream that executes `command` on first poll and maps each
/// pulled row through `project`.
pub(crate) fn pull<T, F>(provider: Arc<dyn Provider>, command: Command, project: F) -> RowStream<T>
where
    T: Send + 'static,
    F: FnMut(Row) -> Result<T> + Send + 'static,
{
    let cancel = Cancel::new();
    let state = Pull {
        phase: Phase::Pending { provider, command },
        project,
        cancel: cancel.clone(),
    };
    RowStream {
        inner: futures::stream::try_unfold(state, step::<T, F>).boxed(),
        cancel,
    }
}

async fn step<T, F>(pull: Pull<F>) -> Result<Option<(T, Pull<F>)>>
where
    F: FnMut(Row) -> Result<T>,
{
    let Pull {
        phase,
        mut project,
        cancel,
    } = pull;
    let mut lease = match phase {
        Phase::Streaming(lease) => lease,
        Phase::Pending { provider, command } => match open(provider, command, &cancel).await? {
            Some(lease) => lease,
            None => return Ok(None),
        },
    };
    if cancel.is_cancelled() {
        lease.release();
        log::debug!("stream cancelled between pulls");
        return Err(Error::Cancelled);
    }
    let pulled = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        pulled = lease.next() => Some(pulled),
    };
    match pulled {
        None => {
            lease.release();
            log::debug!("stream cancelled while fetching");
            Err(Error::Cancelled)
        }
        Some(Err(e)) => {
            lease.release();
            log::debug!("stream failed: {}", e);
            Err(Error::Provider(e))
        }
        Some(Ok(None)) => {
            lease.release();
            log::debug!("stream completed");
            Ok(None)
        }
        Some(Ok(Some(row))) => match project(row) {
            Ok(item) => Ok(Some((
                item,
                Pull {
                    phase: Phase::Streaming(lease),
                    project,
                    cancel,
                },
            ))),
            Err(e) => {
                lease.release();
                log::debug!("projection failed: {}", e);
                Err(e)
            }
        },
    }
}

/// Runs the command and takes ownership of the resulting cursor.
///
/// `Ok(None)` means the provider answered with a row count instead of a
/// cursor, which streams as an empty result.
async fn open(provider: Arc<dyn Provider>, command: Command, cancel: &Cancel) -> Result<Option<Lease>> {
    log::debug!("executing {}", command);
    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        outcome = provider.execute(&command, Mode::Rows) => Some(outcome),
    };
    match outcome {
        None => {
            log::debug!("stream cancelled while executing");
            Err(Error::Cancelled)
        }
        Some(Err(e)) => Err(Error::Provider(e)),
        Some(Ok(Outcome::Affected(n))) => {
            log::debug!("command affected {} rows and returned no cursor", n);
            Ok(None)
        }
        Some(Ok(Outcome::Rows(cursor))) => {
            log::debug!("streaming {} columns", cursor.columns().len());
            Ok(Some(Lease::new(cursor)))
        }
    }
}
