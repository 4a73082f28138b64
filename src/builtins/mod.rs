// ABOUTME: Built-in function registry, arity/type checking and dispatch by name
//!
//! Cherry ships eight built-ins, grouped by what they touch: string
//! inspection ([`strings`]), output ([`io`]), and process/type queries
//! ([`system`]). `gc` is the one exception dispatched directly by the
//! evaluator, since it needs access to the symbol table's storage rather
//! than a plain resolved value.

pub mod io;
pub mod strings;
pub mod system;

use crate::error::{CherryError, EvalError};
use crate::value::Value;

pub const NAMES: &[&str] = &["cmp", "len", "idx", "put", "rev", "exit", "gc", "type"];

pub fn is_builtin(name: &str) -> bool {
    NAMES.contains(&name)
}

fn arity_error(name: &str, expected: &str, actual: usize) -> EvalError {
    EvalError::ArityMismatch {
        name: name.to_string(),
        expected: expected.to_string(),
        actual,
    }
}

/// Dispatches every built-in except `gc`, which the evaluator calls directly.
pub fn call(name: &str, args: &[Value]) -> Result<Value, CherryError> {
    match name {
        "cmp" => {
            let [a, b] = two(name, args)?;
            Ok(strings::cmp(a, b)?)
        }
        "len" => {
            let [a] = one(name, args)?;
            Ok(strings::len(a)?)
        }
        "idx" => {
            let [a, b] = two(name, args)?;
            Ok(strings::idx(a, b)?)
        }
        "put" => Ok(io::put(args)),
        "rev" => {
            let [a] = one(name, args)?;
            Ok(strings::rev(a)?)
        }
        "exit" => {
            let [a] = one(name, args)?;
            system::exit(a)
        }
        "type" => {
            let [a] = one(name, args)?;
            Ok(system::type_of(a))
        }
        "gc" => unreachable!("gc is dispatched by the evaluator directly"),
        other => Err(EvalError::UndefinedFunction(other.to_string()).into()),
    }
}

fn one<'a>(name: &str, args: &'a [Value]) -> Result<[&'a Value; 1], EvalError> {
    match args {
        [a] => Ok([a]),
        _ => Err(arity_error(name, "1", args.len())),
    }
}

fn two<'a>(name: &str, args: &'a [Value]) -> Result<[&'a Value; 2], EvalError> {
    match args {
        [a, b] => Ok([a, b]),
        _ => Err(arity_error(name, "2", args.len())),
    }
}
