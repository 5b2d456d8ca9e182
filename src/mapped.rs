/// Implements [`Mapped`](crate::Mapped) for a struct by listing its members.
///
/// Each listed field becomes a readable and writable member named after the
/// field, or after the string given with `as`. Prefix a field with
/// `readonly` to generate only the getter. Field types need
/// `Clone + Into<Value>` for reads and [`FromValue`](crate::FromValue) for
/// writes.
///
/// ```
/// #[derive(Default)]
/// struct User {
///     id: i32,
///     name: String,
///     email: Option<String>,
///     created: i64,
/// }
///
/// rowmap::mapped!(User {
///     id as "Id",
///     name as "Name",
///     email as "Email",
///     readonly created,
/// });
///
/// let table = rowmap::Accessors::<User>::resolve();
/// assert!(table.member("Id").is_some_and(|m| m.is_writable()));
/// assert!(table.member("created").is_some_and(|m| !m.is_writable()));
/// ```
#[macro_export]
macro_rules! mapped {
    (@members $acc:ident;) => {};
    (@members $acc:ident; readonly $field:ident $(as $column:literal)? $(, $($rest:tt)*)?) => {
        $acc.push(
            $crate::Member::new($crate::mapped!(@name $field $($column)?))
                .getter(|x: &Self| $crate::Value::from(::std::clone::Clone::clone(&x.$field))),
        );
        $crate::mapped!(@members $acc; $($($rest)*)?);
    };
    (@members $acc:ident; $field:ident $(as $column:literal)? $(, $($rest:tt)*)?) => {
        $acc.push(
            $crate::Member::new($crate::mapped!(@name $field $($column)?))
                .getter(|x: &Self| $crate::Value::from(::std::clone::Clone::clone(&x.$field)))
                .setter(|x: &mut Self, v: $crate::Value| {
                    x.$field = $crate::FromValue::from_value(v)?;
                    ::std::result::Result::Ok(())
                }),
        );
        $crate::mapped!(@members $acc; $($($rest)*)?);
    };
    (@name $field:ident) => {
        ::std::stringify!($field)
    };
    (@name $field:ident $column:literal) => {
        $column
    };
    ($ty:ty { $($body:tt)* }) => {
        impl $crate::Mapped for $ty {
            fn members() -> ::std::vec::Vec<$crate::Member<Self>> {
                let mut members = ::std::vec::Vec::new();
                $crate::mapped!(@members members; $($body)*);
                members
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[derive(Debug, Default, PartialEq)]
    struct Order {
        id: i64,
        sku: String,
        qty: i16,
        note: Option<String>,
        total: f64,
    }

    mapped!(Order {
        id as "OrderId",
        sku,
        qty,
        note,
        readonly total
    });

    #[derive(Debug, Default)]
    struct Counter {
        hits: u64,
        shard: u8,
        slot: usize,
    }

    mapped!(Counter { hits, shard, slot });

    #[test]
    fn unsigned_fields_map() {
        let table = Accessors::<Counter>::resolve();
        let mut counter = Counter::default();
        table.set(&mut counter, "hits", Value::Int64(10)).unwrap();
        table.set(&mut counter, "shard", Value::Int32(3)).unwrap();
        table.set(&mut counter, "slot", Value::Int16(5)).unwrap();
        assert!(table.set(&mut counter, "shard", Value::Int32(300)).is_err());
        assert_eq!(counter.shard, 3);
        assert_eq!(table.get(&counter, "hits").unwrap(), Value::Int64(10));
        assert_eq!(counter.slot, 5);
    }

    #[test]
    fn renames_and_readonly() {
        let table = Accessors::<Order>::resolve();
        assert!(table.member("id").is_none());
        assert!(table.member("OrderId").unwrap().is_writable());
        assert!(table.member("total").unwrap().is_readable());
        assert!(!table.member("total").unwrap().is_writable());
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn generated_closures_convert() {
        let table = Accessors::<Order>::resolve();
        let mut order = Order::default();
        table.set(&mut order, "OrderId", Value::Int32(9)).unwrap();
        table.set(&mut order, "qty", Value::Int64(3)).unwrap();
        table.set(&mut order, "note", Value::from("gift")).unwrap();
        assert_eq!(order.id, 9);
        assert_eq!(order.qty, 3);
        assert_eq!(order.note.as_deref(), Some("gift"));
        assert_eq!(table.get(&order, "total").unwrap(), Value::Float64(0.0));
    }
}
