use super::*;
use std::sync::Arc;

/// Result of handing a command to a [`Provider`].
pub enum Outcome {
    /// An open cursor; the receiver becomes responsible for disposing it.
    Rows(Box<dyn Cursor>),
    /// Rows affected by a non-row-returning command.
    Affected(u64),
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rows(cursor) => f.debug_tuple("Rows").field(&cursor.columns().len()).finish(),
            Self::Affected(n) => f.debug_tuple("Affected").field(n).finish(),
        }
    }
}

/// The tabular data source behind an [`Executor`].
///
/// Connection handling, transactions and parameter binding live on the
/// implementor's side. `execute` is awaited by the executor; a provider
/// backed by a blocking driver blocks inside that await rather than
/// offering true non-blocking execution.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    async fn execute(&self, command: &Command, mode: Mode) -> anyhow::Result<Outcome>;
}

#[async_trait::async_trait]
impl<P> Provider for Arc<P>
where
    P: Provider + ?Sized,
{
    async fn execute(&self, command: &Command, mode: Mode) -> anyhow::Result<Outcome> {
        self.as_ref().execute(command, mode).await
    }
}
