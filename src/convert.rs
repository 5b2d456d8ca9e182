//! Value → member type conversion policy.
//!
//! Accepted conversions, per target:
//!
//! | target            | accepts                                                  |
//! |-------------------|----------------------------------------------------------|
//! | `Value`           | anything                                                 |
//! | integers          | any integer variant in range (checked `TryFrom`), text   |
//! | `f32`             | `Float32`, `Int16`, text                                 |
//! | `f64`             | `Float64`, `Float32`, `Int16`, `Int32`, text             |
//! | `bool`            | `Bool`, text (`true` / `false`)                          |
//! | `String`          | `Text`                                                   |
//! | `Vec<u8>`         | `Bytes`                                                  |
//! | `Option<T>`       | `Null` as `None`, otherwise whatever `T` accepts         |
//!
//! Anything else, including `Null` into a non-optional target, is a
//! [`Mismatch`]. Lossy float narrowing and integer truncation are never
//! performed.
use super::*;
use std::str::FromStr;

/// Conversion from a provider [`Value`] into a member type.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> std::result::Result<Self, Mismatch>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> std::result::Result<Self, Mismatch> {
        Ok(value)
    }
}

impl<T> FromValue for Option<T>
where
    T: FromValue,
{
    fn from_value(value: Value) -> std::result::Result<Self, Mismatch> {
        match value {
            Value::Null => Ok(None),
            value => T::from_value(value).map(Some),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> std::result::Result<Self, Mismatch> {
        match value {
            Value::Bool(v) => Ok(v),
            Value::Text(ref s) => parse(s, "bool", &value),
            ref value => Err(Mismatch::new("bool", value)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> std::result::Result<Self, Mismatch> {
        match value {
            Value::Text(v) => Ok(v),
            ref value => Err(Mismatch::new("string", value)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> std::result::Result<Self, Mismatch> {
        match value {
            Value::Bytes(v) => Ok(v),
            ref value => Err(Mismatch::new("bytes", value)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> std::result::Result<Self, Mismatch> {
        match value {
            Value::Float32(v) => Ok(v),
            Value::Int16(v) => Ok(f32::from(v)),
            Value::Text(ref s) => parse(s, "f32", &value),
            ref value => Err(Mismatch::new("f32", value)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> std::result::Result<Self, Mismatch> {
        match value {
            Value::Float64(v) => Ok(v),
            Value::Float32(v) => Ok(f64::from(v)),
            Value::Int16(v) => Ok(f64::from(v)),
            Value::Int32(v) => Ok(f64::from(v)),
            Value::Text(ref s) => parse(s, "f64", &value),
            ref value => Err(Mismatch::new("f64", value)),
        }
    }
}

macro_rules! integral {
    ($($t:ty),*) => {$(
        impl FromValue for $t {
            fn from_value(value: Value) -> std::result::Result<Self, Mismatch> {
                integral(value, stringify!($t))
            }
        }
    )*};
}

integral!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

fn integral<T>(value: Value, expected: &'static str) -> std::result::Result<T, Mismatch>
where
    T: TryFrom<i16> + TryFrom<i32> + TryFrom<i64> + FromStr,
{
    let narrowed = match value {
        Value::Int16(v) => T::try_from(v).ok(),
        Value::Int32(v) => T::try_from(v).ok(),
        Value::Int64(v) => T::try_from(v).ok(),
        Value::Text(ref s) => s.trim().parse::<T>().ok(),
        _ => None,
    };
    narrowed.ok_or_else(|| Mismatch::new(expected, &value))
}

fn parse<T>(text: &str, expected: &'static str, value: &Value) -> std::result::Result<T, Mismatch>
where
    T: FromStr,
{
    text.trim()
        .parse::<T>()
        .map_err(|_| Mismatch::new(expected, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_widen() {
        assert_eq!(i64::from_value(Value::Int16(-3)), Ok(-3));
        assert_eq!(i32::from_value(Value::Int16(12)), Ok(12));
    }

    #[test]
    fn integers_narrow_only_in_range() {
        assert_eq!(i16::from_value(Value::Int64(300)), Ok(300));
        assert!(i16::from_value(Value::Int64(70_000)).is_err());
        assert!(u32::from_value(Value::Int32(-1)).is_err());
    }

    #[test]
    fn small_and_unsigned_integers() {
        assert_eq!(i8::from_value(Value::Int32(-128)), Ok(-128));
        assert!(i8::from_value(Value::Int16(128)).is_err());
        assert_eq!(u8::from_value(Value::Int64(255)), Ok(255));
        assert!(u8::from_value(Value::Int16(-1)).is_err());
        assert_eq!(u16::from_value(Value::from("65535")), Ok(65535));
        assert_eq!(usize::from_value(Value::Int64(42)), Ok(42));
        assert!(u64::from_value(Value::Int64(-1)).is_err());
        assert_eq!(u64::from_value(Value::from(u64::MAX)), Ok(u64::MAX));
    }

    #[test]
    fn floats_never_narrow() {
        assert_eq!(f64::from_value(Value::Float32(0.5)), Ok(0.5));
        assert!(f32::from_value(Value::Float64(0.5)).is_err());
        assert!(f64::from_value(Value::Int64(1)).is_err());
    }

    #[test]
    fn text_parses() {
        assert_eq!(i32::from_value(Value::from(" 42 ")), Ok(42));
        assert_eq!(bool::from_value(Value::from("true")), Ok(true));
        assert!(i32::from_value(Value::from("forty-two")).is_err());
    }

    #[test]
    fn null_requires_option() {
        assert_eq!(Option::<String>::from_value(Value::Null), Ok(None));
        assert_eq!(
            Option::<i64>::from_value(Value::Int32(5)),
            Ok(Some(5))
        );
        let err = String::from_value(Value::Null).unwrap_err();
        assert_eq!(err.expected, "string");
    }
}
