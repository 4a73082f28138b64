// ABOUTME: System built-ins: exit, type (gc is handled in eval.rs, which owns the allocator)

use crate::error::{CherryError, EvalError};
use crate::value::Value;

pub fn type_of(v: &Value) -> Value {
    Value::Number(v.kind() as i32 as f64)
}

/// Terminates the process with the caller-supplied exit code once the
/// evaluator has drained open defers and run cleanup.
pub fn exit(v: &Value) -> Result<Value, CherryError> {
    let code = v.as_number().ok_or_else(|| EvalError::TypeMismatch {
        context: "exit: expected a numeric exit code".into(),
    })?;
    Err(CherryError::Exit(code as i32))
}
