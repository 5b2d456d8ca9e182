use super::*;
use serde::ser::SerializeMap;
use std::ops::Index;

/// A row exposed by column name, without a compiled target type.
///
/// Records are eager snapshots: they own their values and remain readable
/// after the stream that produced them has advanced, finished, or been
/// dropped. Lookups of a name the row does not carry fail with
/// [`Error::NoSuchColumn`]; there is no silent `Null` fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct Record(Row);

impl Record {
    /// Value of the column called `name`.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.0.named(name)
    }
    /// Value of the column called `name`, converted through [`FromValue`].
    pub fn get_as<T>(&self, name: &str) -> Result<T>
    where
        T: FromValue,
    {
        self.0.named_as(name)
    }
    pub fn contains(&self, name: &str) -> bool {
        self.0.columns().ordinal(name).is_some()
    }
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.columns().iter()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn into_row(self) -> Row {
        self.0
    }
}

impl From<Row> for Record {
    fn from(row: Row) -> Self {
        Self(row)
    }
}

/// # Panics
///
/// Panics with "no such column" when the record has no column called
/// `name`. Use [`Record::get`] to handle the absence instead.
impl Index<&str> for Record {
    type Output = Value;
    fn index(&self, name: &str) -> &Value {
        match self.get(name) {
            Ok(value) => value,
            Err(_) => panic!("no such column: {}", name),
        }
    }
}

/// Serializes as a map in column order.
impl serde::Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn ann() -> Record {
        let columns = Arc::new(Columns::new(["Id", "Name"]));
        Record::from(Row::new(columns, vec![Value::Int32(7), Value::from("Ann")]))
    }

    #[test]
    fn lookup_by_name() {
        let record = ann();
        assert_eq!(record["Id"], Value::Int32(7));
        assert_eq!(record["Name"], Value::from("Ann"));
        assert_eq!(record.get_as::<String>("Name").unwrap(), "Ann");
    }

    #[test]
    fn missing_column_is_an_error() {
        let err = ann().get("Missing").unwrap_err();
        assert!(matches!(err, Error::NoSuchColumn(ref c) if c == "Missing"));
        assert_eq!(err.to_string(), "no such column: Missing");
    }

    #[test]
    #[should_panic(expected = "no such column: Missing")]
    fn index_panics_on_missing_column() {
        let _ = &ann()["Missing"];
    }

    #[test]
    fn serializes_in_column_order() {
        let json = serde_json::to_string(&ann()).unwrap();
        assert_eq!(json, r#"{"Id":7,"Name":"Ann"}"#);
    }
}
