//! Evaluate a rule against trap varbinds

use serde::Serialize;

use crate::{FunctionRegistry, RuleEngine, TracingSink};

use super::{parse_oids, CliError};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The rule to evaluate
    pub rule: String,
    /// JSON varbind list
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
}

/// Result of a check operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Rule after OID substitution and whitespace cleanup
    pub rule: String,
    pub matched: bool,
}

/// Execute a check operation with the built-in functions
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let oids = match &options.input {
        Some(json) if !json.trim().is_empty() => parse_oids(json)?,
        _ => vec![],
    };

    let functions = FunctionRegistry::with_builtins();
    let engine = RuleEngine::new(&functions, &TracingSink);

    let rule = engine.prepare(&options.rule, &oids)?;
    let matched = engine.eval_prepared(&rule)?;

    Ok(CheckResult { rule, matched })
}
