//! Function calls inside rules.
//!
//! The evaluator never interprets `name(args)` itself: it hands the whole call
//! text to a [`FunctionService`]. [`FunctionRegistry`] is the stock service,
//! mapping names to native closures and parsing literal arguments.

use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::lexer::Lexer;
use crate::value::Value;

/// Evaluates one complete `name(arguments)` call expression.
pub trait FunctionService {
    fn evaluate(&self, call: &str) -> Result<Value, FunctionError>;
}

#[derive(Debug, Error)]
pub enum FunctionError {
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("malformed function call: {0}")]
    Malformed(String),

    #[error("{name}() expects {expected} argument(s), got {actual}")]
    Arity {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("{name}(): {message}")]
    Argument { name: String, message: String },

    #[error("{0}")]
    Failed(String),
}

type NativeFunction = Box<dyn Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync>;

/// Name-indexed set of native functions.
#[derive(Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, NativeFunction>,
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("FunctionRegistry").field("functions", &names).finish()
    }
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the string and network helpers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("_contains", |args| {
            let [s, sub] = strings::<2>("_contains", args)?;
            Ok(Value::Boolean(s.contains(sub.as_str())))
        });
        registry.register("_startswith", |args| {
            let [s, prefix] = strings::<2>("_startswith", args)?;
            Ok(Value::Boolean(s.starts_with(prefix.as_str())))
        });
        registry.register("_endswith", |args| {
            let [s, suffix] = strings::<2>("_endswith", args)?;
            Ok(Value::Boolean(s.ends_with(suffix.as_str())))
        });
        registry.register("_upper", |args| {
            let [s] = strings::<1>("_upper", args)?;
            Ok(Value::String(s.to_uppercase()))
        });
        registry.register("_lower", |args| {
            let [s] = strings::<1>("_lower", args)?;
            Ok(Value::String(s.to_lowercase()))
        });
        registry.register("_length", |args| {
            let [s] = strings::<1>("_length", args)?;
            Ok(Value::Number(Decimal::from(s.chars().count() as u64)))
        });
        registry.register("_innetwork", in_network);
        registry
    }

    pub fn register<F>(&mut self, name: &str, function: F)
    where
        F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        self.functions.insert(name.to_string(), Box::new(function));
    }
}

impl FunctionService for FunctionRegistry {
    fn evaluate(&self, call: &str) -> Result<Value, FunctionError> {
        let (name, args) = parse_call(call)?;
        let function = self
            .functions
            .get(&name)
            .ok_or_else(|| FunctionError::UnknownFunction(name.clone()))?;
        function(&args)
    }
}

/// Splits `name(a, "b", 3)` into its name and literal arguments.
pub fn parse_call(call: &str) -> Result<(String, Vec<Value>), FunctionError> {
    let open = call
        .find('(')
        .ok_or_else(|| FunctionError::Malformed(call.to_string()))?;
    let name = call[..open].trim();
    if name.is_empty() {
        return Err(FunctionError::Malformed(call.to_string()));
    }

    let mut lexer = Lexer::at(call, call[..open].chars().count());
    let inner = lexer
        .read_group()
        .map_err(|e| FunctionError::Malformed(e.to_string()))?;
    lexer.skip_spaces();
    if !lexer.is_eof() {
        return Err(FunctionError::Malformed(call.to_string()));
    }

    let args = split_arguments(&inner)
        .into_iter()
        .map(|arg| parse_argument(&arg))
        .collect();
    Ok((name.to_string(), args))
}

/// Splits on commas that are neither quoted nor nested in parentheses.
fn split_arguments(inner: &str) -> Vec<String> {
    if inner.trim().is_empty() {
        return vec![];
    }

    let mut args = vec![];
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quoted = false;

    for ch in inner.chars() {
        match ch {
            '"' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth = depth.saturating_sub(1),
            ',' if !quoted && depth == 0 => {
                args.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    args.push(current.trim().to_string());
    args
}

fn parse_argument(arg: &str) -> Value {
    if arg.len() >= 2 && arg.starts_with('"') && arg.ends_with('"') {
        return Value::String(arg[1..arg.len() - 1].to_string());
    }
    match arg {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        _ => match Decimal::from_str(arg) {
            Ok(n) => Value::Number(n),
            Err(_) => Value::String(arg.to_string()),
        },
    }
}

fn strings<const N: usize>(name: &str, args: &[Value]) -> Result<[String; N], FunctionError> {
    if args.len() != N {
        return Err(FunctionError::Arity {
            name: name.to_string(),
            expected: N,
            actual: args.len(),
        });
    }
    Ok(std::array::from_fn(|i| args[i].as_string()))
}

/// `_innetwork(ip, network, prefix_len)`
fn in_network(args: &[Value]) -> Result<Value, FunctionError> {
    const NAME: &str = "_innetwork";
    let [ip, network, prefix] = strings::<3>(NAME, args)?;

    let parse_addr = |text: &str| {
        Ipv4Addr::from_str(text).map_err(|_| FunctionError::Argument {
            name: NAME.to_string(),
            message: format!("invalid IPv4 address '{}'", text),
        })
    };
    let ip = u32::from(parse_addr(&ip)?);
    let network = u32::from(parse_addr(&network)?);

    let prefix: u32 = match prefix.parse() {
        Ok(p) if p <= 32 => p,
        _ => {
            return Err(FunctionError::Argument {
                name: NAME.to_string(),
                message: format!("invalid prefix length '{}'", prefix),
            });
        }
    };
    let mask = u32::MAX.checked_shl(32 - prefix).unwrap_or(0);

    Ok(Value::Boolean(ip & mask == network & mask))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_call_arguments() {
        let (name, args) = parse_call(r#"_contains("a,b", 12, true, (x,y))"#).unwrap();
        assert_eq!(name, "_contains");
        assert_eq!(
            args,
            vec![
                Value::String("a,b".to_string()),
                Value::Number(Decimal::from(12)),
                Value::Boolean(true),
                Value::String("(x,y)".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_call_without_arguments() {
        let (name, args) = parse_call("_now()").unwrap();
        assert_eq!(name, "_now");
        assert!(args.is_empty());
    }

    #[test]
    fn test_parse_call_rejects_trailing_text() {
        assert!(matches!(
            parse_call("_f(1) x"),
            Err(FunctionError::Malformed(_))
        ));
        assert!(matches!(parse_call("_f"), Err(FunctionError::Malformed(_))));
    }

    #[test]
    fn test_builtins() {
        let registry = FunctionRegistry::with_builtins();
        assert_eq!(
            registry.evaluate(r#"_contains("link down", "down")"#).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            registry.evaluate(r#"_upper("eth0")"#).unwrap(),
            Value::String("ETH0".to_string())
        );
        assert_eq!(
            registry.evaluate(r#"_length("abc")"#).unwrap(),
            Value::Number(Decimal::from(3))
        );
    }

    #[test]
    fn test_in_network() {
        let registry = FunctionRegistry::with_builtins();
        assert_eq!(
            registry
                .evaluate(r#"_innetwork("192.168.1.20", "192.168.1.0", 24)"#)
                .unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            registry
                .evaluate(r#"_innetwork("10.0.0.1", "192.168.1.0", 24)"#)
                .unwrap(),
            Value::Boolean(false)
        );
        assert_eq!(
            registry
                .evaluate(r#"_innetwork("10.0.0.1", "0.0.0.0", 0)"#)
                .unwrap(),
            Value::Boolean(true)
        );
        assert!(matches!(
            registry.evaluate(r#"_innetwork("10.0.0", "0.0.0.0", 0)"#),
            Err(FunctionError::Argument { .. })
        ));
    }

    #[test]
    fn test_unknown_and_arity() {
        let registry = FunctionRegistry::with_builtins();
        assert!(matches!(
            registry.evaluate("_nope(1)"),
            Err(FunctionError::UnknownFunction(name)) if name == "_nope"
        ));
        assert!(matches!(
            registry.evaluate(r#"_upper("a", "b")"#),
            Err(FunctionError::Arity { expected: 1, actual: 2, .. })
        ));
    }
}
