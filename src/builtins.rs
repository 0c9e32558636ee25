// File: src/builtins.rs
//
// Built-in functions for the minipy language.
// Besides print (handled by the interpreter, which owns the output sink),
// the builtins are the four type constructors. Called with no argument
// they produce the type's zero value; with an argument they delegate to
// the corresponding coercion on Value.

use crate::bigint::BigInt;
use crate::interpreter::Value;

/// True for the builtin type constructors, which are resolved before the
/// user function table.
pub fn is_coercion(name: &str) -> bool {
    matches!(name, "int" | "float" | "str" | "bool")
}

/// Applies a type constructor to an optional already-evaluated argument.
pub fn coerce(name: &str, arg: Option<Value>) -> Value {
    match (name, arg) {
        ("int", None) => Value::Int(BigInt::zero()),
        ("int", Some(v)) => v.to_int(),
        ("float", None) => Value::Float(0.0),
        ("float", Some(v)) => Value::Float(v.as_f64()),
        ("str", None) => Value::Str(String::new()),
        ("str", Some(v)) => v.to_str(),
        ("bool", None) => Value::Bool(false),
        ("bool", Some(v)) => Value::Bool(v.truthy()),
        _ => Value::None,
    }
}
