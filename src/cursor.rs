use super::*;
use std::sync::Arc;

/// Forward-only, single-pass handle over a provider's result rows.
///
/// Implementations own whatever command/statement resources back the rows
/// and free them in [`dispose`](Cursor::dispose). `dispose` is synchronous
/// so that it can run from `Drop`, and must tolerate repeated calls.
#[async_trait::async_trait]
pub trait Cursor: Send {
    /// Column names of the result set, fixed for the cursor's lifetime.
    fn columns(&self) -> &Arc<Columns>;
    /// True once the cursor can yield no more rows.
    fn is_closed(&self) -> bool;
    /// Moves to the next row. Returns `false` at the end of the result set.
    async fn advance(&mut self) -> anyhow::Result<bool>;
    /// Value at `ordinal` on the current row.
    fn value(&self, ordinal: usize) -> anyhow::Result<Value>;
    /// Value of the column called `name` on the current row.
    fn value_named(&self, name: &str) -> anyhow::Result<Value> {
        let ordinal = self
            .columns()
            .ordinal(name)
            .ok_or_else(|| anyhow::anyhow!("no such column: {}", name))?;
        self.value(ordinal)
    }
    /// Copies the current row out of the cursor.
    fn snapshot(&self) -> anyhow::Result<Row> {
        let values = (0..self.columns().len())
            .map(|i| self.value(i))
            .collect::<anyhow::Result<Vec<Value>>>()?;
        Ok(Row::new(Arc::clone(self.columns()), values))
    }
    /// Releases the cursor and its command. Idempotent.
    fn dispose(&mut self);
}

/// Exclusive owner of one open cursor.
///
/// The cursor is disposed exactly once: by [`release`](Lease::release) on
/// a normal, failed or cancelled finish, or by `Drop` when the lease is
/// abandoned mid-stream.
pub struct Lease {
    cursor: Option<Box<dyn Cursor>>,
}

impl Lease {
    pub fn new(cursor: Box<dyn Cursor>) -> Self {
        Self {
            cursor: Some(cursor),
        }
    }
    /// Column names, or `None` once released.
    pub fn columns(&self) -> Option<&Arc<Columns>> {
        self.cursor.as_ref().map(|c| c.columns())
    }
    pub fn is_released(&self) -> bool {
        self.cursor.is_none()
    }
    /// Pulls the next row as an owned snapshot.
    ///
    /// Returns `Ok(None)` at the end of the result set or after release;
    /// it does not release the cursor by itself.
    pub async fn next(&mut self) -> anyhow::Result<Option<Row>> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(None);
        };
        if cursor.is_closed() || !cursor.advance().await? {
            return Ok(None);
        }
        cursor.snapshot().map(Some)
    }
    /// Disposes the cursor if it is still held.
    pub fn release(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            cursor.dispose();
            log::debug!("released cursor");
        }
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Lease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lease")
            .field("released", &self.is_released())
            .finish()
    }
}
