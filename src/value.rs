use std::cmp::Ordering;
use std::fmt;

use rust_decimal::Decimal;

/// A scalar produced while evaluating a rule.
///
/// Groups evaluate to booleans, while the function service may hand back any
/// of the three kinds.
///
/// # Examples
///
/// ```
/// use trap_rules::Value;
/// use rust_decimal::Decimal;
///
/// let matched = Value::Boolean(true);
/// let uptime = Value::Number(Decimal::new(4200, 2));
/// let name = Value::String("eth0".to_string());
///
/// assert!(matched.as_bool());
/// assert_eq!(uptime.as_string(), "42.00");
/// assert_eq!(name.type_name(), "string");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Result of a comparison or boolean operator
    Boolean(bool),

    /// Decimal number (kept exact, `0.1 + 0.2` stays `0.3`)
    Number(Decimal),

    /// UTF-8 string
    String(String),
}

impl Value {
    /// Check if the value is truthy (for conditions)
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Number(n) => !n.is_zero(),
            Value::String(s) => !s.is_empty(),
        }
    }

    /// Convert to boolean for conditions
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            _ => self.is_truthy(),
        }
    }


    /// Get as string (used by the `~` operator)
    pub fn as_string(&self) -> String {
        match self {
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
        }
    }

    /// Orders two values of the same kind. Mixed kinds are unordered.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Number(a), Value::Number(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Decimal> for Value {
    fn from(n: Decimal) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}
