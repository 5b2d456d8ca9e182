use super::*;
use std::collections::HashMap;
use std::sync::Arc;

/// Ordered column names of one result set.
///
/// Shared by every [`Row`] pulled from the same cursor. Name lookup is exact
/// and case-sensitive; when a result set repeats a name, the first ordinal
/// wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Columns {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().collect()
    }
    pub fn ordinal(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
    pub fn name(&self, ordinal: usize) -> Option<&str> {
        self.names.get(ordinal).map(String::as_str)
    }
    pub fn len(&self) -> usize {
        self.names.len()
    }
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S> FromIterator<S> for Columns
where
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let names = iter.into_iter().map(Into::into).collect::<Vec<String>>();
        let mut index = HashMap::with_capacity(names.len());
        for (ordinal, name) in names.iter().enumerate() {
            index.entry(name.clone()).or_insert(ordinal);
        }
        Self { names, index }
    }
}

/// Owned snapshot of one cursor row.
///
/// Values are copied out of the cursor when the row is pulled, so a `Row`
/// stays valid after the cursor has moved on or been released.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<Columns>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<Columns>, values: Vec<Value>) -> Self {
        debug_assert!(columns.len() == values.len(), "row arity");
        Self { columns, values }
    }
    pub fn columns(&self) -> &Arc<Columns> {
        &self.columns
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    /// Value at `ordinal`, if the row is that wide.
    pub fn get(&self, ordinal: usize) -> Option<&Value> {
        self.values.get(ordinal)
    }
    /// Value of the column called `name`.
    pub fn named(&self, name: &str) -> Result<&Value> {
        self.columns
            .ordinal(name)
            .and_then(|i| self.values.get(i))
            .ok_or_else(|| Error::NoSuchColumn(name.to_owned()))
    }
    /// Value of the column called `name`, converted through [`FromValue`].
    pub fn named_as<T>(&self, name: &str) -> Result<T>
    where
        T: FromValue,
    {
        let value = self.named(name)?.clone();
        T::from_value(value).map_err(|source| {
            Error::Accessor(AccessorError::TypeMismatch {
                ty: "Row",
                member: name.to_owned(),
                source,
            })
        })
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
    /// `(name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().zip(self.values.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        let columns = Arc::new(Columns::new(["Id", "Name", "Id"]));
        Row::new(
            columns,
            vec![Value::Int32(7), Value::from("Ann"), Value::Int32(8)],
        )
    }

    #[test]
    fn first_duplicate_wins() {
        assert_eq!(row().named("Id").unwrap(), &Value::Int32(7));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(matches!(row().named("name"), Err(Error::NoSuchColumn(c)) if c == "name"));
    }

    #[test]
    fn converts_by_name() {
        assert_eq!(row().named_as::<i64>("Id").unwrap(), 7);
        assert!(row().named_as::<i64>("Name").is_err());
    }
}
