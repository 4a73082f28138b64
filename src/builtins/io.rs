// ABOUTME: The `put` built-in, variadic, space-separated, unquoted strings

use crate::value::{format_put, Value};

pub fn put(args: &[Value]) -> Value {
    let rendered: Vec<String> = args.iter().map(format_put).collect();
    println!("{}", rendered.join(" "));
    Value::None
}
