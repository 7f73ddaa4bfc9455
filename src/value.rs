use chrono::{DateTime, Utc};
use derive_more::Display;

/// Domain value held by a field.
#[derive(Clone, Debug, PartialEq, Display)]
pub enum Value {
    #[display("{_0}")]
    Bool(bool),
    #[display("{_0}")]
    Int(i64),
    #[display("{_0}")]
    Uint(u64),
    #[display("{_0}")]
    Decimal(f64),
    #[display("{_0}")]
    Text(String),
    #[display("{_0}")]
    DateTime(DateTime<Utc>),
}

macro_rules! impl_from {
    ($variant:ident, $target:ty, $($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::$variant(<$target>::from(v))
                }
            }
        )+
    };
}

impl_from!(Bool, bool, bool);
impl_from!(Int, i64, i8, i16, i32, i64);
impl_from!(Uint, u64, u8, u16, u32, u64);
impl_from!(Decimal, f64, f32, f64);
impl_from!(Text, String, String, &str);
impl_from!(DateTime, DateTime<Utc>, DateTime<Utc>);

impl Value {
    /// Zero, empty text and `false` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(v) => *v,
            Self::Int(v) => *v != 0,
            Self::Uint(v) => *v != 0,
            Self::Decimal(v) => *v != 0.0,
            Self::Text(v) => !v.is_empty(),
            Self::DateTime(_) => true,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer view of the value, accepting unsigned values that fit `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Uint(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint(v) => Some(*v),
            Self::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Decimal view of the value, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Decimal(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::Uint(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(v) => Some(*v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(Value::from(-3_i32), Value::Int(-3));
        assert_eq!(Value::from(7_u8), Value::Uint(7));
        assert_eq!(Value::from(1.5_f64), Value::Decimal(1.5));
        assert_eq!(Value::from("abc"), Value::Text("abc".into()));
        assert_eq!(Value::from(true), Value::Bool(true));

        assert_eq!(Value::Uint(5).as_i64(), Some(5));
        assert_eq!(Value::Uint(u64::MAX).as_i64(), None);
        assert_eq!(Value::Int(-1).as_u64(), None);
        assert_eq!(Value::Int(2).as_f64(), Some(2.0));
        assert_eq!(Value::Text("x".into()).as_f64(), None);
    }

    #[test]
    fn truthiness() {
        for v in [Value::from(true), Value::from(1_i64), Value::from(56_u8), Value::from("true")] {
            assert!(v.is_truthy(), "{v}");
        }
        for v in [Value::from(false), Value::from(0_i64), Value::from(""), Value::from(0.0)] {
            assert!(!v.is_truthy(), "{v}");
        }
    }

    #[test]
    fn display() {
        assert_eq!(Value::Decimal(-1.3).to_string(), "-1.3");
        assert_eq!(Value::Int(-12).to_string(), "-12");
        assert_eq!(Value::Text("ab".into()).to_string(), "ab");
    }
}
