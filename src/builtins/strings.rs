// ABOUTME: String built-ins: cmp, len, idx, rev

use crate::error::EvalError;
use crate::value::Value;

fn expect_str<'a>(name: &str, v: &'a Value) -> Result<&'a str, EvalError> {
    v.as_str().ok_or_else(|| EvalError::TypeMismatch {
        context: format!("{name}: expected a string argument"),
    })
}

/// `strcmp`-style comparison: negative/zero/positive by first differing byte.
pub fn cmp(a: &Value, b: &Value) -> Result<Value, EvalError> {
    let a = expect_str("cmp", a)?;
    let b = expect_str("cmp", b)?;

    let mut result = 0i32;
    for (x, y) in a.bytes().zip(b.bytes()) {
        if x != y {
            result = x as i32 - y as i32;
            break;
        }
    }
    if result == 0 {
        result = a.len() as i32 - b.len() as i32;
    }
    Ok(Value::Number(result as f64))
}

pub fn len(a: &Value) -> Result<Value, EvalError> {
    let a = expect_str("len", a)?;
    Ok(Value::Number(a.len() as f64))
}

/// Byte offset of `needle` within `haystack`, or -1 if absent.
pub fn idx(haystack: &Value, needle: &Value) -> Result<Value, EvalError> {
    let haystack = expect_str("idx", haystack)?;
    let needle = expect_str("idx", needle)?;
    let offset = haystack.find(needle).map(|i| i as f64).unwrap_or(-1.0);
    Ok(Value::Number(offset))
}

pub fn rev(a: &Value) -> Result<Value, EvalError> {
    let a = expect_str("rev", a)?;
    Ok(Value::Str(a.chars().rev().collect()))
}
