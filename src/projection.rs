use super::*;
use std::sync::Arc;

/// Row → `T` mapping for one stream.
///
/// The accessor table is resolved once when the stream is built. The
/// column → member pairing is worked out on the first row and reused for
/// every row sharing the same [`Columns`].
pub(crate) struct Projection<T> {
    accessors: Arc<Accessors<T>>,
    plan: Option<Plan>,
}

struct Plan {
    columns: Arc<Columns>,
    /// `(column ordinal, member ordinal)`, ascending by column.
    pairs: Vec<(usize, usize)>,
}

impl Plan {
    fn new<T>(accessors: &Accessors<T>, columns: &Arc<Columns>) -> Self
    where
        T: 'static,
    {
        let pairs = columns
            .iter()
            .enumerate()
            .filter(|&(c, name)| columns.ordinal(name) == Some(c))
            .filter_map(|(c, name)| accessors.ordinal(name).map(|m| (c, m)))
            .filter(|&(_, m)| accessors.at(m).is_writable())
            .collect::<Vec<_>>();
        log::debug!(
            "mapped {} of {} columns onto {}",
            pairs.len(),
            columns.len(),
            std::any::type_name::<T>()
        );
        Self {
            columns: Arc::clone(columns),
            pairs,
        }
    }
}

impl<T> Projection<T>
where
    T: Mapped + Default,
{
    /// Fails when `T` has nothing a row could be written into.
    pub(crate) fn new() -> Result<Self> {
        let accessors = Accessors::<T>::resolve();
        if accessors.writable().next().is_none() {
            return Err(Error::InvalidArgument(format!(
                "{} has no writable members",
                std::any::type_name::<T>()
            )));
        }
        Ok(Self {
            accessors,
            plan: None,
        })
    }

    pub(crate) fn project(&mut self, row: Row) -> Result<T> {
        let stale = self
            .plan
            .as_ref()
            .is_none_or(|plan| !Arc::ptr_eq(&plan.columns, row.columns()));
        if stale {
            self.plan = Some(Plan::new(&self.accessors, row.columns()));
        }
        let pairs = self.plan.as_ref().map_or(&[][..], |plan| &plan.pairs[..]);
        let mut values = row.into_values().into_iter().enumerate();
        let mut target = T::default();
        for &(column, member) in pairs {
            let value = values
                .find(|&(i, _)| i == column)
                .map(|(_, v)| v)
                .unwrap_or_default();
            self.accessors.at(member).set(&mut target, value)?;
        }
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Person {
        id: i32,
        name: String,
        email: Option<String>,
    }

    mapped!(Person {
        id as "Id",
        name as "Name",
        email as "Email",
    });

    #[derive(Debug, Default)]
    struct Frozen {
        id: i32,
    }

    mapped!(Frozen { readonly id });

    fn row(values: Vec<Value>) -> Row {
        Row::new(Arc::new(Columns::new(["Id", "Extra", "Name"])), values)
    }

    #[test]
    fn matches_by_exact_name() {
        let mut projection = Projection::<Person>::new().unwrap();
        let person = projection
            .project(row(vec![Value::Int32(7), Value::from("x"), Value::from("Ann")]))
            .unwrap();
        assert_eq!(
            person,
            Person {
                id: 7,
                name: "Ann".to_owned(),
                email: None,
            }
        );
    }

    #[test]
    fn plan_survives_across_rows() {
        let columns = Arc::new(Columns::new(["Name", "Id"]));
        let mut projection = Projection::<Person>::new().unwrap();
        for i in 0..3 {
            let person = projection
                .project(Row::new(
                    Arc::clone(&columns),
                    vec![Value::from("Bo"), Value::Int64(i)],
                ))
                .unwrap();
            assert_eq!(person.id, i as i32);
        }
    }

    #[test]
    fn conversion_failure_names_member() {
        let mut projection = Projection::<Person>::new().unwrap();
        let err = projection
            .project(row(vec![Value::from("seven"), Value::Null, Value::from("Ann")]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Accessor(AccessorError::TypeMismatch { ref member, .. }) if member == "Id"
        ));
    }

    #[test]
    fn first_duplicate_column_wins() {
        let columns = Arc::new(Columns::new(["Id", "Id"]));
        let mut projection = Projection::<Person>::new().unwrap();
        let person = projection
            .project(Row::new(columns, vec![Value::Int32(1), Value::from("two")]))
            .unwrap();
        assert_eq!(person.id, 1);
    }

    #[test]
    fn readonly_types_are_rejected() {
        assert!(matches!(
            Projection::<Frozen>::new(),
            Err(Error::InvalidArgument(_))
        ));
    }
}
