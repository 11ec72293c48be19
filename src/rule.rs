//! Rule entry point: binds trap varbinds into a rule and evaluates it.
//!
//! `_OID(<oid>)` references are replaced by the value of the matching varbind
//! before anything else runs. In the OID, `*` stands for one numeric arc and
//! `**` for any run of text.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, RuleError},
    evaluator::Evaluator,
    functions::FunctionService,
    logging::{LogSink, Severity},
};

static OID_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_OID\(([0-9.*]+)\)").expect("valid OID reference pattern"));

static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]*\.?[0-9]+$").expect("valid numeric pattern"));

/// One varbind of a received trap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidValue {
    pub oid: String,
    pub value: String,
}

impl OidValue {
    pub fn new(oid: impl Into<String>, value: impl Into<String>) -> Self {
        OidValue {
            oid: oid.into(),
            value: value.into(),
        }
    }
}

/// Evaluates stored rules against trap varbinds.
pub struct RuleEngine<'a> {
    evaluator: Evaluator<'a>,
    sink: &'a dyn LogSink,
}

impl<'a> RuleEngine<'a> {
    pub fn new(functions: &'a dyn FunctionService, sink: &'a dyn LogSink) -> Self {
        RuleEngine {
            evaluator: Evaluator::new(functions, sink),
            sink,
        }
    }

    /// Returns whether the trap described by `oids` matches `rule`.
    ///
    /// An empty rule always matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use trap_rules::{FunctionRegistry, OidValue, RuleEngine, TracingSink};
    ///
    /// let functions = FunctionRegistry::with_builtins();
    /// let engine = RuleEngine::new(&functions, &TracingSink);
    /// let oids = vec![OidValue::new(".1.3.6.1.2.1.2.2.1.8.3", "2")];
    ///
    /// assert!(engine.eval_rule("_OID(.1.3.6.1.2.1.2.2.1.8.*) = 2", &oids).unwrap());
    /// ```
    pub fn eval_rule(&self, rule: &str, oids: &[OidValue]) -> Result<bool> {
        let rule = self.prepare(rule, oids)?;
        self.eval_prepared(&rule)
    }

    /// Binds `oids` into `rule` and strips spaces, logging the result.
    ///
    /// An empty rule stays empty.
    pub fn prepare(&self, rule: &str, oids: &[OidValue]) -> Result<String> {
        if rule.trim().is_empty() {
            return Ok(String::new());
        }

        let rule = self.substitute_oids(rule, oids)?;
        let rule = cleanup(&rule)?;
        self.sink
            .log(&format!("Rule after cleanup: {}", rule), Severity::Info);
        Ok(rule)
    }

    /// Evaluates a rule returned by [`RuleEngine::prepare`].
    pub fn eval_prepared(&self, rule: &str) -> Result<bool> {
        if rule.is_empty() {
            return Ok(true);
        }
        Ok(self.evaluator.evaluate(rule)?.as_bool())
    }

    /// Replaces every `_OID(...)` reference with the value of the first
    /// matching varbind. Non-numeric values become quoted strings.
    pub fn substitute_oids(&self, rule: &str, oids: &[OidValue]) -> Result<String> {
        let mut values: HashMap<String, String> = HashMap::new();

        for caps in OID_REF.captures_iter(rule) {
            let oid = &caps[1];
            if values.contains_key(oid) {
                continue;
            }

            let pattern = oid_pattern(oid)?;
            self.sink.log(
                &format!("OID in rule : {} / {}", oid, pattern.as_str()),
                Severity::Debug,
            );

            let found = oids
                .iter()
                .find(|v| pattern.is_match(&v.oid))
                .ok_or_else(|| RuleError::OidNotFound {
                    oid: oid.to_string(),
                })?;
            values.insert(oid.to_string(), quote_value(&found.value));
        }

        Ok(OID_REF
            .replace_all(rule, |caps: &Captures| values[&caps[1]].clone())
            .into_owned())
    }
}

/// Anchored regex for an OID that may contain `*` and `**` wildcards.
fn oid_pattern(oid: &str) -> Result<Regex> {
    let mut pattern = String::from("^");
    let mut rest = oid;

    while let Some(star) = rest.find('*') {
        pattern.push_str(&regex::escape(&rest[..star]));
        if rest[star..].starts_with("**") {
            pattern.push_str(".*");
            rest = &rest[star + 2..];
        } else {
            pattern.push_str("[0-9]+");
            rest = &rest[star + 1..];
        }
    }
    pattern.push_str(&regex::escape(rest));
    pattern.push('$');

    Regex::new(&pattern).map_err(|source| RuleError::InvalidPattern { pattern, source })
}

fn quote_value(value: &str) -> String {
    if NUMERIC.is_match(value) {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('"', "'"))
    }
}

/// Removes every space that is not inside a quoted string.
pub fn cleanup(rule: &str) -> Result<String> {
    let mut result = String::with_capacity(rule.len());
    let mut chars = rule.chars();

    while let Some(ch) = chars.next() {
        match ch {
            ' ' => {}
            '"' => {
                result.push(ch);
                loop {
                    match chars.next() {
                        Some('"') => {
                            result.push('"');
                            break;
                        }
                        Some(c) => result.push(c),
                        None => {
                            return Err(RuleError::UnterminatedString {
                                rule: rule.to_string(),
                                offset: rule.chars().count(),
                            });
                        }
                    }
                }
            }
            _ => result.push(ch),
        }
    }

    Ok(result)
}
