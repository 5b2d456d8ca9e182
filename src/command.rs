use super::*;
use std::fmt::Display;
use std::fmt::Formatter;

/// How the provider should interpret the command text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandKind {
    /// Plain query text with named placeholders.
    #[default]
    Text,
    /// Name of a stored routine; parameters are passed in binding order.
    Procedure,
}

/// Row access hint forwarded to the provider.
///
/// Projections read every column exactly once, left to right, so they ask
/// for [`Access::Sequential`]; providers are free to ignore the hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    Default,
    Sequential,
}

/// What the caller expects back from an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// An open cursor over result rows.
    Rows,
    /// The number of rows affected.
    Count,
}

/// Named parameter values, in binding order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<(String, Value)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }
    /// Binds `name`, replacing any earlier value under the same name.
    pub fn bind<V>(mut self, name: &str, value: V) -> Self
    where
        V: Into<Value>,
    {
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name.to_owned(), value)),
        }
        self
    }
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V, const N: usize> From<[(&str, V); N]> for Params
where
    V: Into<Value>,
{
    fn from(pairs: [(&str, V); N]) -> Self {
        pairs
            .into_iter()
            .fold(Self::new(), |params, (name, value)| params.bind(name, value))
    }
}

/// A command ready to hand to a [`Provider`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Command {
    text: String,
    params: Params,
    kind: CommandKind,
    access: Access,
}

impl Command {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
    pub fn procedure(name: impl Into<String>) -> Self {
        Self::new(name).with_kind(CommandKind::Procedure)
    }
    pub fn bind<V>(mut self, name: &str, value: V) -> Self
    where
        V: Into<Value>,
    {
        self.params = self.params.bind(name, value);
        self
    }
    pub fn with_params(mut self, params: impl Into<Params>) -> Self {
        self.params = params.into();
        self
    }
    pub fn with_kind(mut self, kind: CommandKind) -> Self {
        self.kind = kind;
        self
    }
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }
    pub fn text(&self) -> &str {
        &self.text
    }
    pub fn params(&self) -> &Params {
        &self.params
    }
    pub fn kind(&self) -> CommandKind {
        self.kind
    }
    pub fn access(&self) -> Access {
        self.access
    }
    /// Rejects commands that cannot be sent to any provider.
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            Err(Error::InvalidArgument("command text is empty".to_owned()))
        } else {
            Ok(())
        }
    }
}

impl From<&str> for Command {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}
impl From<String> for Command {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        const PREVIEW: usize = 64;
        let text = self.text.trim();
        match text.char_indices().nth(PREVIEW) {
            Some((cut, _)) => write!(f, "{}…", &text[..cut])?,
            None => write!(f, "{}", text)?,
        }
        if !self.params.is_empty() {
            write!(f, " ({} params)", self.params.len())?;
        }
        Ok(())
    }
}
