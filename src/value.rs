// ABOUTME: Runtime values and the type tags used for payload resolution and `type`

use std::fmt;

/// Tag for a resolved runtime value or a statement payload's stored buffer.
/// One flat tag enum doubling as both "kind of AST payload" and "kind of
/// runtime value".
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Numeric = 0,
    Str = 1,
    Identifier = 2,
    ExprTree = 3,
    FRetVal = 4,
    Indx = 5,
    GList = 6,
    GStack = 7,
    None = 8,
}

/// A fully resolved runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Str(String),
    GList,
    GStack,
    None,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Numeric,
            Value::Str(_) => ValueKind::Str,
            Value::GList => ValueKind::GList,
            Value::GStack => ValueKind::GStack,
            Value::None => ValueKind::None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "numeric",
            Value::Str(_) => "string",
            Value::GList => "glist",
            Value::GStack => "gstack",
            Value::None => "none",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Formatting used by `print`: strings quoted, numbers shortest round-trip.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_numeric(*n)),
            Value::Str(s) => write!(f, "'{}'", s),
            Value::GList => write!(f, "glist"),
            Value::GStack => write!(f, "gstack"),
            Value::None => write!(f, "none"),
        }
    }
}

/// `%g`-style numeric formatting: integral values print without a decimal
/// point, everything else prints its shortest round-trip representation.
pub fn format_numeric(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Formatting used by `put`: strings unquoted.
pub fn format_put(value: &Value) -> String {
    match value {
        Value::Str(s) => s.clone(),
        other => other.to_string(),
    }
}
