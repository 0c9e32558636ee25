// File: src/interpreter/value.rs
//
// Runtime value types for the minipy interpreter.
// A value is exactly one of: None, a boolean, an arbitrary-precision
// integer, a 64-bit float, or an immutable string. Values are passed and
// assigned by copy.
//
// The operator methods mirror the host language's coercion rules: `+`
// concatenates display forms when either operand is a string, `*` repeats
// a string by an integer count, `/` is always true (float) division, and
// `//`/`%` on two integers go through the BigInt kernel.

use crate::ast::{BinOp, CmpOp};
use crate::bigint::BigInt;
use crate::errors::InterpError;
use std::fmt;

/// Runtime values in the minipy interpreter
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(BigInt),
    Float(f64),
    Str(String),
}

impl Value {
    /// Truthiness: None and the type zero values are false.
    pub fn truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => i.to_bool(),
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
        }
    }

    /// Integer coercion. Floats truncate toward zero; strings are trimmed
    /// and parsed (through a float when they contain a '.'); anything that
    /// fails to parse coerces to zero.
    pub fn to_int(&self) -> Value {
        match self {
            Value::Bool(b) => Value::Int(BigInt::from(i64::from(*b))),
            Value::Int(_) => self.clone(),
            Value::Float(f) => Value::Int(BigInt::from(f.trunc() as i64)),
            Value::Str(s) => {
                let s = s.trim();
                if s.contains('.') {
                    let f = s.parse::<f64>().unwrap_or(0.0);
                    Value::Int(BigInt::from(f.trunc() as i64))
                } else if is_integer_literal(s) {
                    Value::Int(BigInt::parse(s))
                } else {
                    Value::Int(BigInt::zero())
                }
            }
            Value::None => Value::Int(BigInt::zero()),
        }
    }

    /// Float view of the value; unparsable strings and None read as 0.0.
    pub fn as_f64(&self) -> f64 {
        match self {
            Value::None => 0.0,
            Value::Bool(b) => f64::from(i32::from(*b)),
            Value::Int(i) => i.to_f64(),
            Value::Float(f) => *f,
            Value::Str(s) => s.trim().parse().unwrap_or(0.0),
        }
    }

    /// String coercion: strings pass through, everything else takes its
    /// display form.
    pub fn to_str(&self) -> Value {
        match self {
            Value::Str(_) => self.clone(),
            other => Value::Str(other.to_string()),
        }
    }

    /// Applies a binary arithmetic operator. Only integer floor division
    /// and modulo by zero can fail.
    pub fn binary(&self, op: BinOp, other: &Value) -> Result<Value, Box<InterpError>> {
        match op {
            BinOp::Add => Ok(self.add_value(other)),
            BinOp::Sub => Ok(self.sub_value(other)),
            BinOp::Mul => Ok(self.mul_value(other)),
            BinOp::Div => Ok(Value::Float(self.as_f64() / other.as_f64())),
            BinOp::FloorDiv => self.floordiv_value(other),
            BinOp::Mod => self.mod_value(other),
        }
    }

    fn add_value(&self, other: &Value) -> Value {
        if matches!(self, Value::Str(_)) || matches!(other, Value::Str(_)) {
            return Value::Str(format!("{}{}", self, other));
        }
        if matches!(self, Value::Float(_)) || matches!(other, Value::Float(_)) {
            return Value::Float(self.as_f64() + other.as_f64());
        }
        if let (Value::Int(a), Value::Int(b)) = (self, other) {
            return Value::Int(a + b);
        }
        Value::None
    }

    fn sub_value(&self, other: &Value) -> Value {
        if matches!(self, Value::Float(_)) || matches!(other, Value::Float(_)) {
            return Value::Float(self.as_f64() - other.as_f64());
        }
        if let (Value::Int(a), Value::Int(b)) = (self, other) {
            return Value::Int(a - b);
        }
        Value::None
    }

    fn mul_value(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
                Value::Str(repeat_str(s, n))
            }
            _ => {
                if matches!(self, Value::Float(_)) || matches!(other, Value::Float(_)) {
                    return Value::Float(self.as_f64() * other.as_f64());
                }
                if let (Value::Int(a), Value::Int(b)) = (self, other) {
                    return Value::Int(a * b);
                }
                Value::None
            }
        }
    }

    fn floordiv_value(&self, other: &Value) -> Result<Value, Box<InterpError>> {
        if let (Value::Int(a), Value::Int(b)) = (self, other) {
            let q = a.floordiv(b).ok_or_else(InterpError::division_by_zero)?;
            return Ok(Value::Int(q));
        }
        Ok(Value::Float((self.as_f64() / other.as_f64()).floor()))
    }

    fn mod_value(&self, other: &Value) -> Result<Value, Box<InterpError>> {
        if let (Value::Int(a), Value::Int(b)) = (self, other) {
            let r = a.modulo(b).ok_or_else(InterpError::division_by_zero)?;
            return Ok(Value::Int(r));
        }
        Ok(Value::None)
    }

    /// Unary minus. Non-numeric operands yield None.
    pub fn neg(&self) -> Value {
        match self {
            Value::Int(i) => Value::Int(-i.clone()),
            Value::Float(f) => Value::Float(-f),
            _ => Value::None,
        }
    }

    /// Applies a comparison operator; the result is always a plain bool.
    pub fn compare(&self, op: CmpOp, other: &Value) -> bool {
        match op {
            CmpOp::Lt => self.lt_value(other),
            CmpOp::Gt => other.lt_value(self),
            CmpOp::Le => !other.lt_value(self),
            CmpOp::Ge => !self.lt_value(other),
            CmpOp::Eq => self.eq_value(other),
            CmpOp::Ne => !self.eq_value(other),
        }
    }

    fn lt_value(&self, other: &Value) -> bool {
        if matches!(self, Value::Float(_)) || matches!(other, Value::Float(_)) {
            return self.as_f64() < other.as_f64();
        }
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a < b,
            (Value::Str(a), Value::Str(b)) => a < b,
            _ => false,
        }
    }

    fn eq_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(_), Value::Float(_))
            | (Value::Int(_), Value::Float(_))
            | (Value::Float(_), Value::Int(_)) => self.as_f64() == other.as_f64(),
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => false,
        }
    }
}

/// Repeats a string `n` times; a non-positive count yields the empty string.
fn repeat_str(s: &str, n: &BigInt) -> String {
    let count = n.to_f64() as i64;
    if count > 0 {
        s.repeat(count as usize)
    } else {
        String::new()
    }
}

/// An integer literal: optional '-' then one or more ASCII digits.
fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for Value {
    /// The canonical display form: `None`, `True`/`False`, decimal integers,
    /// floats in fixed six-digit form, strings verbatim.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:.6}", x),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Value {
        Value::Int(BigInt::from(n))
    }

    fn s(text: &str) -> Value {
        Value::Str(text.to_string())
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(Value::None.to_string(), "None");
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(int(-42).to_string(), "-42");
        assert_eq!(Value::Float(3.14).to_string(), "3.140000");
        assert_eq!(s("hi").to_string(), "hi");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::None.truthy());
        assert!(!int(0).truthy());
        assert!(int(-1).truthy());
        assert!(!Value::Float(0.0).truthy());
        assert!(!s("").truthy());
        assert!(s("0").truthy());
    }

    #[test]
    fn test_to_int_string_coercion() {
        assert_eq!(s("  42  ").to_int(), int(42));
        assert_eq!(s("3.9").to_int(), int(3));
        assert_eq!(s("-3.9").to_int(), int(-3));
        assert_eq!(s("junk").to_int(), int(0));
        assert_eq!(Value::Bool(true).to_int(), int(1));
        assert_eq!(Value::Float(-2.7).to_int(), int(-2));
    }

    #[test]
    fn test_add_prefers_string_concatenation() {
        assert_eq!(int(1).binary(BinOp::Add, &int(2)).unwrap(), int(3));
        assert_eq!(s("a").binary(BinOp::Add, &s("b")).unwrap(), s("ab"));
        assert_eq!(s("n=").binary(BinOp::Add, &int(5)).unwrap(), s("n=5"));
        assert_eq!(
            int(1).binary(BinOp::Add, &Value::Float(0.5)).unwrap(),
            Value::Float(1.5)
        );
        assert_eq!(Value::None.binary(BinOp::Sub, &s("x")).unwrap(), Value::None);
    }

    #[test]
    fn test_mul_repeats_strings() {
        assert_eq!(s("ab").binary(BinOp::Mul, &int(3)).unwrap(), s("ababab"));
        assert_eq!(int(3).binary(BinOp::Mul, &s("ab")).unwrap(), s("ababab"));
        assert_eq!(s("ab").binary(BinOp::Mul, &int(0)).unwrap(), s(""));
        assert_eq!(s("ab").binary(BinOp::Mul, &int(-2)).unwrap(), s(""));
    }

    #[test]
    fn test_true_division_is_always_float() {
        assert_eq!(int(7).binary(BinOp::Div, &int(2)).unwrap(), Value::Float(3.5));
        let inf = int(1).binary(BinOp::Div, &Value::Float(0.0)).unwrap();
        assert_eq!(inf, Value::Float(f64::INFINITY));
    }

    #[test]
    fn test_integer_division_by_zero_is_an_error() {
        assert!(int(1).binary(BinOp::FloorDiv, &int(0)).is_err());
        assert!(int(1).binary(BinOp::Mod, &int(0)).is_err());
    }

    #[test]
    fn test_float_floordiv_floors() {
        assert_eq!(
            Value::Float(7.0).binary(BinOp::FloorDiv, &int(2)).unwrap(),
            Value::Float(3.0)
        );
        assert_eq!(
            Value::Float(-7.0).binary(BinOp::FloorDiv, &int(2)).unwrap(),
            Value::Float(-4.0)
        );
    }

    #[test]
    fn test_float_modulo_is_none() {
        assert_eq!(
            Value::Float(7.0).binary(BinOp::Mod, &int(2)).unwrap(),
            Value::None
        );
    }

    #[test]
    fn test_comparisons() {
        assert!(int(1).compare(CmpOp::Lt, &int(2)));
        assert!(s("abc").compare(CmpOp::Lt, &s("abd")));
        assert!(int(2).compare(CmpOp::Eq, &Value::Float(2.0)));
        assert!(int(2).compare(CmpOp::Le, &Value::Float(2.0)));
        // Mismatched non-numeric types are never ordered or equal.
        assert!(!s("1").compare(CmpOp::Eq, &int(1)));
        assert!(!Value::None.compare(CmpOp::Lt, &s("x")));
        assert!(Value::None.compare(CmpOp::Eq, &Value::None));
    }

    #[test]
    fn test_negation() {
        assert_eq!(int(5).neg(), int(-5));
        assert_eq!(Value::Float(2.5).neg(), Value::Float(-2.5));
        assert_eq!(s("x").neg(), Value::None);
    }
}
