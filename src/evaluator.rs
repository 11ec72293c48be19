use std::cmp::Ordering;
use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;

use crate::{
    ast::{Operator, Token, TokenKind},
    error::{Result, RuleError},
    functions::FunctionService,
    lexer::Lexer,
    logging::{LogSink, Severity},
    value::Value,
};

/// Reads the group at the current `(` and evaluates its content as a rule of
/// its own, starting at offset 0 of the extracted text.
///
/// `evaluate` receives the content and a start offset and returns the result
/// with the offset where it stopped.
pub fn eval_group<F>(lexer: &mut Lexer, evaluate: F) -> Result<Token>
where
    F: FnOnce(&str, usize) -> Result<(Value, usize)>,
{
    let content = lexer.read_group()?;
    let (value, _) = evaluate(&content, 0)?;
    Ok(Token::Evaluated(value))
}

/// Reads `name(args)` from the current position and hands the whole span to
/// the function service.
///
/// The call is logged at debug level before the service runs, so a failing
/// call can always be traced.
pub fn eval_function(
    lexer: &mut Lexer,
    functions: &dyn FunctionService,
    sink: &dyn LogSink,
) -> Result<Token> {
    let offset = lexer.position();
    let call = lexer.read_function_span()?;

    sink.log(&format!("got function {}", call), Severity::Debug);

    functions
        .evaluate(&call)
        .map(Token::Evaluated)
        .map_err(|source| RuleError::FunctionService {
            call,
            rule: lexer.rule(),
            offset,
            source,
        })
}

/// Rule evaluator.
///
/// Reads a rule left to right without building a tree. Every evaluation gets
/// its own [`Lexer`], so one evaluator can be shared by independent callers.
pub struct Evaluator<'a> {
    functions: &'a dyn FunctionService,
    sink: &'a dyn LogSink,
}

impl<'a> Evaluator<'a> {
    pub fn new(functions: &'a dyn FunctionService, sink: &'a dyn LogSink) -> Self {
        Evaluator { functions, sink }
    }

    /// Evaluates a whole rule.
    ///
    /// # Examples
    ///
    /// ```
    /// use trap_rules::{Evaluator, FunctionRegistry, TracingSink, Value};
    ///
    /// let functions = FunctionRegistry::with_builtins();
    /// let evaluator = Evaluator::new(&functions, &TracingSink);
    ///
    /// let result = evaluator.evaluate(r#"(2 > 1) & _contains("link down", "down")"#).unwrap();
    /// assert_eq!(result, Value::Boolean(true));
    /// ```
    pub fn evaluate(&self, rule: &str) -> Result<Value> {
        self.evaluation(rule, 0).map(|(value, _)| value)
    }

    /// Evaluates `rule` from offset `start`, returning the result and the
    /// offset where evaluation stopped.
    pub fn evaluation(&self, rule: &str, start: usize) -> Result<(Value, usize)> {
        let mut lexer = Lexer::at(rule, start);
        let value = self.eval_rule_at(&mut lexer)?;
        Ok((value, lexer.position()))
    }

    fn eval_rule_at(&self, lexer: &mut Lexer) -> Result<Value> {
        lexer.skip_spaces();
        let negate = lexer.current_char() == Some('!');
        if negate {
            lexer.advance();
        }

        let left = self.read_element(lexer)?;
        lexer.skip_spaces();

        // A lone element must already be a boolean-like result
        if lexer.is_eof() {
            return match left {
                Token::Evaluated(value) if negate => Ok(Value::Boolean(!value.as_bool())),
                Token::Evaluated(value) => Ok(value),
                _ => Err(RuleError::NotBoolean { rule: lexer.rule() }),
            };
        }

        let op = read_operator(lexer)?;
        lexer.skip_spaces();

        let right = if lexer.current_char() == Some('!') {
            if !op.is_logical() {
                return Err(RuleError::MixedBoolean {
                    rule: lexer.rule(),
                    offset: lexer.position(),
                });
            }
            lexer.advance();
            let rest = self.eval_rule_at(lexer)?;
            Token::Evaluated(Value::Boolean(!rest.as_bool()))
        } else {
            self.read_element(lexer)?
        };

        if left.kind() != right.kind() {
            return Err(RuleError::TypeMismatch {
                rule: lexer.rule(),
                offset: lexer.position(),
            });
        }
        if op.is_logical() && left.kind() != TokenKind::Evaluated {
            return Err(RuleError::BooleanOperands {
                rule: lexer.rule(),
                offset: lexer.position(),
            });
        }

        let mut result = self.compare(lexer, op, left, right)?;
        if negate {
            result = !result;
        }

        lexer.skip_spaces();
        match lexer.current_char() {
            None => Ok(Value::Boolean(result)),
            Some('|') => {
                lexer.advance();
                if result {
                    lexer.skip_to_end();
                    return Ok(Value::Boolean(true));
                }
                Ok(Value::Boolean(self.eval_rule_at(lexer)?.as_bool()))
            }
            Some('&') => {
                lexer.advance();
                if !result {
                    lexer.skip_to_end();
                    return Ok(Value::Boolean(false));
                }
                Ok(Value::Boolean(self.eval_rule_at(lexer)?.as_bool()))
            }
            Some(found) => Err(RuleError::TrailingInput {
                found,
                rule: lexer.rule(),
                offset: lexer.position(),
            }),
        }
    }

    /// Reads one number, string, group or function call.
    fn read_element(&self, lexer: &mut Lexer) -> Result<Token> {
        lexer.skip_spaces();

        match lexer.current_char() {
            None => Err(RuleError::UnexpectedEnd {
                rule: lexer.rule(),
                offset: lexer.position(),
            }),
            Some(ch) if ch.is_ascii_digit() || ch == '-' || ch == '.' => Ok(lexer.read_number()),
            Some('"') => lexer.read_string(),
            Some('(') => eval_group(lexer, |content, start| self.evaluation(content, start)),
            Some('_') => eval_function(lexer, self.functions, self.sink),
            Some(found) => Err(RuleError::UnexpectedCharacter {
                found,
                rule: lexer.rule(),
                offset: lexer.position(),
            }),
        }
    }

    fn compare(&self, lexer: &Lexer, op: Operator, left: Token, right: Token) -> Result<bool> {
        let left = token_value(lexer, left)?;
        let right = token_value(lexer, right)?;

        let ordering = |lexer: &Lexer| -> Result<Ordering> {
            left.compare(&right).ok_or_else(|| RuleError::TypeMismatch {
                rule: lexer.rule(),
                offset: lexer.position(),
            })
        };

        Ok(match op {
            Operator::Equal => left == right,
            Operator::NotEqual => left != right,
            Operator::LessThan => ordering(lexer)? == Ordering::Less,
            Operator::GreaterThan => ordering(lexer)? == Ordering::Greater,
            Operator::LessEqual => ordering(lexer)? != Ordering::Greater,
            Operator::GreaterEqual => ordering(lexer)? != Ordering::Less,
            Operator::Matches => {
                let pattern = right.as_string();
                let re = Regex::new(&pattern)
                    .map_err(|source| RuleError::InvalidPattern { pattern, source })?;
                re.is_match(&left.as_string())
            }
            Operator::And => left.as_bool() && right.as_bool(),
            Operator::Or => left.as_bool() || right.as_bool(),
        })
    }
}

/// Numbers are validated only here, when they are about to be compared.
fn token_value(lexer: &Lexer, token: Token) -> Result<Value> {
    match token {
        Token::Number(text) => match Decimal::from_str(&text) {
            Ok(n) => Ok(Value::Number(n)),
            Err(_) => Err(RuleError::InvalidNumber {
                text,
                rule: lexer.rule(),
            }),
        },
        Token::String(s) => Ok(Value::String(s)),
        Token::Evaluated(value) => Ok(value),
    }
}

fn read_operator(lexer: &mut Lexer) -> Result<Operator> {
    lexer.skip_spaces();

    let followed_by_eq = lexer.peek_char(1) == Some('=');
    let (op, width) = match lexer.current_char() {
        None => {
            return Err(RuleError::UnexpectedEnd {
                rule: lexer.rule(),
                offset: lexer.position(),
            });
        }
        Some('<') if followed_by_eq => (Operator::LessEqual, 2),
        Some('<') => (Operator::LessThan, 1),
        Some('>') if followed_by_eq => (Operator::GreaterEqual, 2),
        Some('>') => (Operator::GreaterThan, 1),
        Some('=') if followed_by_eq => (Operator::Equal, 2),
        Some('=') => (Operator::Equal, 1),
        Some('!') if followed_by_eq => (Operator::NotEqual, 2),
        Some('~') => (Operator::Matches, 1),
        Some('|') => (Operator::Or, 1),
        Some('&') => (Operator::And, 1),
        Some(found) => {
            return Err(RuleError::UnknownOperator {
                found,
                rule: lexer.rule(),
                offset: lexer.position(),
            });
        }
    };

    for _ in 0..width {
        lexer.advance();
    }
    Ok(op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::FunctionError;
    use std::cell::RefCell;

    struct Echo;

    impl FunctionService for Echo {
        fn evaluate(&self, call: &str) -> std::result::Result<Value, FunctionError> {
            Ok(Value::String(call.to_string()))
        }
    }

    #[derive(Default)]
    struct Collect(RefCell<Vec<String>>);

    impl LogSink for Collect {
        fn log(&self, message: &str, _severity: Severity) {
            self.0.borrow_mut().push(message.to_string());
        }
    }

    #[test]
    fn test_group_uses_fresh_offsets() {
        let mut lexer = Lexer::at("1=1&(2=2)", 4);
        let token = eval_group(&mut lexer, |content, start| {
            assert_eq!(content, "2=2");
            assert_eq!(start, 0);
            Ok((Value::Boolean(true), content.chars().count()))
        })
        .unwrap();
        assert_eq!(token, Token::Evaluated(Value::Boolean(true)));
        assert!(lexer.is_eof());
    }

    #[test]
    fn test_function_span_forwarded() {
        let sink = Collect::default();
        let mut lexer = Lexer::new("_f(1,(2))=3");
        let token = eval_function(&mut lexer, &Echo, &sink).unwrap();
        assert_eq!(token, Token::Evaluated(Value::String("_f(1,(2))".to_string())));
        assert_eq!(lexer.current_char(), Some('='));
        assert_eq!(*sink.0.borrow(), vec!["got function _f(1,(2))".to_string()]);
    }

    #[test]
    fn test_operators() {
        let cases = vec![
            ("<", Operator::LessThan),
            ("<=", Operator::LessEqual),
            (">", Operator::GreaterThan),
            (">=", Operator::GreaterEqual),
            ("=", Operator::Equal),
            ("==", Operator::Equal),
            ("!=", Operator::NotEqual),
            ("~", Operator::Matches),
            ("&", Operator::And),
            ("|", Operator::Or),
        ];
        for (input, expected) in cases {
            let mut lexer = Lexer::new(input);
            assert_eq!(read_operator(&mut lexer).unwrap(), expected, "{}", input);
            assert!(lexer.is_eof());
        }
    }

    #[test]
    fn test_bang_alone_is_not_an_operator() {
        let mut lexer = Lexer::new("!1");
        assert!(matches!(
            read_operator(&mut lexer),
            Err(RuleError::UnknownOperator { found: '!', offset: 0, .. })
        ));
    }
}
