use super::*;
use std::sync::Arc;

/// Runs commands against a [`Provider`] and streams their results.
///
/// Every `stream_*` method validates its arguments up front and returns a
/// lazy [`RowStream`]; the provider sees the command on the stream's first
/// poll. Streams are single-pass: to read the rows again, issue the command
/// again.
#[derive(Clone)]
pub struct Executor {
    provider: Arc<dyn Provider>,
}

impl Executor {
    pub fn new<P>(provider: P) -> Self
    where
        P: Provider + 'static,
    {
        Self {
            provider: Arc::new(provider),
        }
    }
    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Executes `command` in `mode` and takes ownership of whatever the
    /// provider answers with.
    ///
    /// The raw stage under every other method. A cursor comes back leased,
    /// so dropping the result releases it.
    pub async fn execute(&self, command: impl Into<Command>, mode: Mode) -> Result<Executed> {
        let command = command.into();
        command.validate()?;
        log::debug!("executing {} ({:?})", command, mode);
        match self
            .provider
            .execute(&command, mode)
            .await
            .map_err(Error::Provider)?
        {
            Outcome::Rows(cursor) => Ok(Executed::Rows(Lease::new(cursor))),
            Outcome::Affected(n) => Ok(Executed::Affected(n)),
        }
    }

    /// Executes a row-returning command and hands back its leased cursor,
    /// for callers that want to drive the cursor themselves. A provider
    /// that answers with a row count is reported as a provider error.
    pub async fn open(&self, command: impl Into<Command>) -> Result<Lease> {
        match self.execute(command, Mode::Rows).await? {
            Executed::Rows(lease) => Ok(lease),
            Executed::Affected(n) => Err(Error::Provider(anyhow::anyhow!(
                "expected a cursor, provider reported {} affected rows",
                n
            ))),
        }
    }

    /// Streams raw rows in provider order.
    pub fn stream_rows(&self, command: impl Into<Command>) -> Result<RowStream<Row>> {
        let command = command.into();
        command.validate()?;
        Ok(stream::pull(self.provider.clone(), command, Ok))
    }

    /// Streams rows projected onto `T` by exact column/member name.
    ///
    /// Columns without a writable member are ignored; members without a
    /// column keep their `Default` value. The first conversion failure ends
    /// the stream with [`Error::Accessor`].
    pub fn stream_typed<T>(&self, command: impl Into<Command>) -> Result<RowStream<T>>
    where
        T: Mapped + Default,
    {
        let command = command.into().with_access(Access::Sequential);
        command.validate()?;
        let mut projection = Projection::<T>::new()?;
        Ok(stream::pull(self.provider.clone(), command, move |row| {
            projection.project(row)
        }))
    }

    /// Streams rows as name-indexed [`Record`] snapshots.
    pub fn stream_dynamic(&self, command: impl Into<Command>) -> Result<RowStream<Record>> {
        let command = command.into().with_access(Access::Sequential);
        command.validate()?;
        Ok(stream::pull(self.provider.clone(), command, |row| {
            Ok(Record::from(row))
        }))
    }

    /// Executes a non-row-returning command and returns the affected-row count.
    ///
    /// Dropping the returned future before it resolves abandons the call.
    pub async fn execute_count(&self, command: impl Into<Command>) -> Result<u64> {
        match self.execute(command, Mode::Count).await? {
            Executed::Affected(n) => Ok(n),
            Executed::Rows(mut lease) => {
                lease.release();
                Err(Error::Provider(anyhow::anyhow!(
                    "expected an affected-row count, provider returned a cursor"
                )))
            }
        }
    }
}

/// What [`Executor::execute`] got back from the provider.
#[derive(Debug)]
pub enum Executed {
    Rows(Lease),
    Affected(u64),
}

impl<P> From<Arc<P>> for Executor
where
    P: Provider + 'static,
{
    fn from(provider: Arc<P>) -> Self {
        Self { provider }
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor").finish_non_exhaustive()
    }
}
