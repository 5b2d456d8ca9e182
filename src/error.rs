use super::*;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the executor and its streams.
///
/// Every variant except [`Error::InvalidArgument`] is delivered as the last
/// item of a stream; the cursor behind the stream has already been released
/// by the time the consumer sees it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rejected before any provider interaction.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Member read/write or value conversion failed.
    #[error(transparent)]
    Accessor(#[from] AccessorError),
    /// Lookup of a column name that the row does not carry.
    #[error("no such column: {0}")]
    NoSuchColumn(String),
    /// Failure raised by the provider or its cursor, passed through unchanged.
    #[error("provider error: {0}")]
    Provider(#[source] anyhow::Error),
    /// The consumer cancelled the stream.
    #[error("cancelled")]
    Cancelled,
}

impl Error {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Failures of a single compiled member accessor.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AccessorError {
    #[error("{ty}::{member} is not readable")]
    NotReadable {
        ty: &'static str,
        member: String,
    },
    #[error("{ty}::{member} is not writable")]
    NotWritable {
        ty: &'static str,
        member: String,
    },
    #[error("{ty}::{member}: {source}")]
    TypeMismatch {
        ty: &'static str,
        member: String,
        #[source]
        source: Mismatch,
    },
    #[error("{ty} has no member {member}")]
    UnknownMember { ty: &'static str, member: String },
}

/// A value that the conversion policy refuses to turn into the target type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot convert {found} into {expected}")]
pub struct Mismatch {
    pub expected: &'static str,
    pub found: String,
}

impl Mismatch {
    pub fn new(expected: &'static str, value: &Value) -> Self {
        Self {
            expected,
            found: format!("{} `{}`", value.kind(), value),
        }
    }
}
