//! Read-only inspection of component state.
//!
//! The CPU state, the VIAs and the memory map answer path queries so the
//! front end and tests can look inside without reaching into fields.

use std::fmt;

/// A dynamically-typed value for state queries.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// 8-bit unsigned integer.
    U8(u8),
    /// 16-bit unsigned integer.
    U16(u16),
    /// 64-bit unsigned integer.
    U64(u64),
    /// String value.
    String(String),
    /// Array of values.
    Array(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v:#04X}"),
            Value::U16(v) => write!(f, "{v:#06X}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
            Value::Array(arr) => {
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// A component whose state can be inspected between steps.
///
/// Queries take `&self`, so reading a VIA register through `query` never
/// clears an interrupt flag the way a bus read would.
pub trait Observable {
    /// Value at a dotted path such as `pc`, `flags.z` or `t1.counter`.
    ///
    /// Returns `None` if the path is not recognised.
    fn query(&self, path: &str) -> Option<Value>;

    /// Every path `query` answers.
    fn query_paths(&self) -> &'static [&'static str];

    /// `path = value` lines for every known path, in `query_paths` order.
    fn describe(&self) -> Vec<String> {
        self.query_paths()
            .iter()
            .filter_map(|path| self.query(path).map(|value| format!("{path} = {value}")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair {
        left: u8,
        right: bool,
    }

    impl Observable for Pair {
        fn query(&self, path: &str) -> Option<Value> {
            match path {
                "left" => Some(self.left.into()),
                "right" => Some(self.right.into()),
                _ => None,
            }
        }

        fn query_paths(&self) -> &'static [&'static str] {
            &["left", "right"]
        }
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::U8(0x0A).to_string(), "0x0A");
        assert_eq!(Value::U16(0xD9CD).to_string(), "0xD9CD");
        assert_eq!(Value::U64(42).to_string(), "42");
        assert_eq!(Value::Array(vec![true.into(), 1u8.into()]).to_string(), "[true, 0x01]");
    }

    #[test]
    fn test_describe_lists_known_paths() {
        let pair = Pair {
            left: 0xFF,
            right: false,
        };
        assert_eq!(pair.describe(), vec!["left = 0xFF", "right = false"]);
        assert_eq!(pair.query("missing"), None);
    }
}
