//! In-memory [`Provider`] for tests and examples.
//!
//! A [`MemoryProvider`] replays a fixed result set for every command and
//! counts what happens to the cursors it hands out, so tests can assert on
//! disposal and leaks without a database.
use super::*;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// Lifecycle counters shared by a provider and all of its cursors.
#[derive(Debug, Default)]
pub struct Stats {
    executed: AtomicUsize,
    opened: AtomicUsize,
    advanced: AtomicUsize,
    disposed: AtomicUsize,
    leaked: AtomicUsize,
    commands: Mutex<Vec<(Command, Mode)>>,
}

impl Stats {
    /// Commands received, in either mode.
    pub fn executed(&self) -> usize {
        self.executed.load(Ordering::SeqCst)
    }
    /// Cursors handed out.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
    /// Successful `advance` calls across all cursors.
    pub fn advanced(&self) -> usize {
        self.advanced.load(Ordering::SeqCst)
    }
    /// `dispose` calls across all cursors, repeated calls included.
    pub fn disposed(&self) -> usize {
        self.disposed.load(Ordering::SeqCst)
    }
    /// Cursors dropped without ever being disposed.
    pub fn leaked(&self) -> usize {
        self.leaked.load(Ordering::SeqCst)
    }
    /// Every command received so far, with its mode.
    pub fn commands(&self) -> Vec<(Command, Mode)> {
        self.commands
            .lock()
            .map(|commands| commands.clone())
            .unwrap_or_default()
    }
}

#[derive(Clone, Default)]
struct Script {
    columns: Arc<Columns>,
    rows: Arc<Vec<Vec<Value>>>,
    affected: u64,
    reject: Option<String>,
    fail_at: Option<usize>,
    latency: Option<Duration>,
    opposite: bool,
}

/// Provider that replays a scripted result set.
///
/// Clones share their [`Stats`].
#[derive(Clone, Default)]
pub struct MemoryProvider {
    script: Script,
    stats: Arc<Stats>,
}

impl MemoryProvider {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Script {
                columns: Arc::new(Columns::new(columns)),
                ..Script::default()
            },
            stats: Arc::default(),
        }
    }
    /// Appends one row. Missing trailing values are `Null`, extra ones dropped.
    pub fn row<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let width = self.script.columns.len();
        let mut row = values.into_iter().map(Into::into).take(width).collect::<Vec<Value>>();
        row.resize(width, Value::Null);
        Arc::make_mut(&mut self.script.rows).push(row);
        self
    }
    pub fn rows<I, R, V>(self, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        rows.into_iter().fold(self, |provider, row| provider.row(row))
    }
    /// Count reported for [`Mode::Count`] commands.
    pub fn affected(mut self, n: u64) -> Self {
        self.script.affected = n;
        self
    }
    /// Fails every `execute` with `message`.
    pub fn reject(mut self, message: &str) -> Self {
        self.script.reject = Some(message.to_owned());
        self
    }
    /// Fails the `advance` that would move onto row `index` (0-based).
    pub fn fail_at(mut self, index: usize) -> Self {
        self.script.fail_at = Some(index);
        self
    }
    /// Sleeps before answering `execute` and each `advance`.
    pub fn latency(mut self, latency: Duration) -> Self {
        self.script.latency = Some(latency);
        self
    }
    /// Answers row commands with a count and count commands with a cursor.
    pub fn opposite(mut self) -> Self {
        self.script.opposite = true;
        self
    }
    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}

#[async_trait::async_trait]
impl Provider for MemoryProvider {
    async fn execute(&self, command: &Command, mode: Mode) -> anyhow::Result<Outcome> {
        self.stats.executed.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut commands) = self.stats.commands.lock() {
            commands.push((command.clone(), mode));
        }
        if let Some(latency) = self.script.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(ref message) = self.script.reject {
            anyhow::bail!("{}", message);
        }
        let answer = match (mode, self.script.opposite) {
            (mode, false) => mode,
            (Mode::Rows, true) => Mode::Count,
            (Mode::Count, true) => Mode::Rows,
        };
        match answer {
            Mode::Count => Ok(Outcome::Affected(self.script.affected)),
            Mode::Rows => {
                self.stats.opened.fetch_add(1, Ordering::SeqCst);
                Ok(Outcome::Rows(Box::new(MemoryCursor {
                    script: self.script.clone(),
                    stats: Arc::clone(&self.stats),
                    current: None,
                    next: 0,
                    closed: false,
                    disposed: false,
                })))
            }
        }
    }
}

/// Cursor over a [`MemoryProvider`]'s scripted rows.
pub struct MemoryCursor {
    script: Script,
    stats: Arc<Stats>,
    current: Option<usize>,
    next: usize,
    closed: bool,
    disposed: bool,
}

#[async_trait::async_trait]
impl Cursor for MemoryCursor {
    fn columns(&self) -> &Arc<Columns> {
        &self.script.columns
    }
    fn is_closed(&self) -> bool {
        self.closed
    }
    async fn advance(&mut self) -> anyhow::Result<bool> {
        if let Some(latency) = self.script.latency {
            tokio::time::sleep(latency).await;
        }
        if self.closed {
            return Ok(false);
        }
        if self.script.fail_at == Some(self.next) {
            self.closed = true;
            anyhow::bail!("connection lost before row {}", self.next);
        }
        if self.next >= self.script.rows.len() {
            self.closed = true;
            self.current = None;
            return Ok(false);
        }
        self.current = Some(self.next);
        self.next += 1;
        self.stats.advanced.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }
    fn value(&self, ordinal: usize) -> anyhow::Result<Value> {
        let row = self
            .current
            .and_then(|i| self.script.rows.get(i))
            .ok_or_else(|| anyhow::anyhow!("cursor is not on a row"))?;
        row.get(ordinal)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("ordinal {} out of range", ordinal))
    }
    fn dispose(&mut self) {
        self.stats.disposed.fetch_add(1, Ordering::SeqCst);
        self.disposed = true;
        self.closed = true;
        self.current = None;
    }
}

impl Drop for MemoryCursor {
    fn drop(&mut self) {
        if !self.disposed {
            self.stats.leaked.fetch_add(1, Ordering::SeqCst);
        }
    }
}
