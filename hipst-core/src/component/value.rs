//! Store values and value-producers.
//!
//! A store entry is a [`Slot`]: either a static [`Value`] or a producer, a
//! function of the rendering [`Context`] that computes the value on demand.
//! Consumers resolve slots without caring which kind they hold.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::Context;

/// A resolved value.
///
/// Serializes untagged, so a JSON object of scalars maps directly onto a
/// state bag.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent or reset. Renders as nothing.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Truthiness: `Null`, `false`, zero and the empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::Str(s) => !s.is_empty(),
        }
    }

    /// The boolean, if this is a [`Value::Bool`]. No coercion; see
    /// [`Value::is_truthy`] for that.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer, if this is a [`Value::Int`]. Floats are not truncated.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value of an `Int` or `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Borrowed string of a [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) if x.is_infinite() => {
                f.write_str(if *x > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

macro_rules! value_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        i64::try_from(v).map_or(Value::Float(v as f64), Value::Int)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or(Value::Float(v as f64), Value::Int)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Str(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

/// A function of the rendering context that computes a value.
pub type Producer = Rc<dyn Fn(&Context) -> Value>;

/// A store entry: a constant or a live formula.
#[derive(Clone)]
pub enum Slot {
    Value(Value),
    Producer(Producer),
}

impl Slot {
    /// Wrap a closure as a producer slot.
    pub fn producer<F, V>(f: F) -> Self
    where
        F: Fn(&Context) -> V + 'static,
        V: Into<Value>,
    {
        Slot::Producer(Rc::new(move |ctx: &Context| f(ctx).into()))
    }

    /// Resolve against `ctx`: constants are returned as-is, producers are
    /// invoked.
    pub fn resolve(&self, ctx: &Context) -> Value {
        match self {
            Slot::Value(value) => value.clone(),
            Slot::Producer(producer) => producer(ctx),
        }
    }

    /// Whether the slot is resolved on every read.
    pub fn is_producer(&self) -> bool {
        matches!(self, Slot::Producer(_))
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Slot::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

/// Shorthand for [`Slot::producer`].
///
/// ```rust,ignore
/// Component::new("div").style("display", dynamic(|ctx| {
///     if ctx.state().get("open").is_truthy() { "block" } else { "none" }
/// }));
/// ```
pub fn dynamic<F, V>(f: F) -> Slot
where
    F: Fn(&Context) -> V + 'static,
    V: Into<Value>,
{
    Slot::producer(f)
}

macro_rules! slot_from_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Slot {
                fn from(v: $ty) -> Self {
                    Slot::Value(Value::from(v))
                }
            }
        )*
    };
}

slot_from_value!(i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64, bool, &str, String, &String);

impl From<Value> for Slot {
    fn from(v: Value) -> Self {
        Slot::Value(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Slot {
    fn from(v: Option<T>) -> Self {
        Slot::Value(Value::from(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_text_rendering() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::from(2.0).to_string(), "2");
        assert_eq!(Value::from(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(Value::from("hi").to_string(), "hi");
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from(false).is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(Value::from(-1).is_truthy());
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::from("a"));
    }

    #[test]
    fn deserializes_scalars_untagged() {
        let values: Vec<Value> = serde_json::from_str(r#"[null, true, 3, 2.5, "s"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Int(3),
                Value::Float(2.5),
                Value::from("s"),
            ]
        );
    }
}
