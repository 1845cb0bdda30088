//! Scalar field values.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single scalar value stored in a record field.
///
/// Values are opaque to the stage; transforms decide how to read them.
/// `Null` entries are allowed inside a field's value sequence and are
/// skipped by the derivations that concatenate text.
///
/// Floats compare and hash by bit pattern, so `Eq` holds.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FieldValue {
    /// Null value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer.
    Integer(i64),
    /// Unsigned integer above `i64::MAX`.
    Unsigned(u64),
    /// Floating point number.
    Float(f64),
    /// Text string.
    Text(String),
}

impl FieldValue {
    /// Creates a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns true if this is `Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text if this is a `Text` value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value rendered as text, or `None` for `Null`.
    #[must_use]
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(Cow::Owned(b.to_string())),
            Self::Integer(i) => Some(Cow::Owned(i.to_string())),
            Self::Unsigned(u) => Some(Cow::Owned(u.to_string())),
            Self::Float(x) => Some(Cow::Owned(x.to_string())),
            Self::Text(s) => Some(Cow::Borrowed(s)),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Unsigned(u) => write!(f, "{u}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Unsigned(a), Self::Unsigned(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FieldValue {}

impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Bool(b) => b.hash(state),
            Self::Integer(i) => i.hash(state),
            Self::Unsigned(u) => u.hash(state),
            Self::Float(x) => x.to_bits().hash(state),
            Self::Text(s) => s.hash(state),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(Self::Unsigned(value), Self::Integer)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_has_no_text() {
        assert!(FieldValue::Null.is_null());
        assert_eq!(FieldValue::Null.to_text(), None);
        assert_eq!(FieldValue::Null.to_string(), "");
    }

    #[test]
    fn scalars_render_as_text() {
        assert_eq!(FieldValue::from(42i64).to_text().as_deref(), Some("42"));
        assert_eq!(FieldValue::from(true).to_text().as_deref(), Some("true"));
        assert_eq!(FieldValue::from("abc").as_text(), Some("abc"));
        assert_eq!(FieldValue::from(7i64).as_text(), None);
    }

    #[test]
    fn numbers_render_as_text() {
        assert_eq!(FieldValue::from(9.99).to_text().as_deref(), Some("9.99"));
        assert_eq!(FieldValue::from(u64::MAX).to_string(), "18446744073709551615");
        assert_eq!(FieldValue::from(5u64), FieldValue::Integer(5));
    }

    #[test]
    fn floats_compare_by_bits() {
        assert_eq!(FieldValue::Float(f64::NAN), FieldValue::Float(f64::NAN));
        assert_ne!(FieldValue::Float(0.0), FieldValue::Float(-0.0));
        assert_ne!(FieldValue::Float(1.0), FieldValue::Integer(1));
    }

    #[test]
    fn option_conversion() {
        assert_eq!(FieldValue::from(None::<&str>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some("x")), FieldValue::text("x"));
    }
}
