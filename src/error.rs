//! Errors raised while reading or evaluating a rule.
//!
//! Every variant aborts the whole evaluation. Structural failures carry the
//! rule being read and the character offset where reading stopped.

use thiserror::Error;

use crate::functions::FunctionError;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("closing '\"' not found in {rule} at {offset}")]
    UnterminatedString { rule: String, offset: usize },

    #[error("no closing () in {rule} at {offset}")]
    UnterminatedGroup { rule: String, offset: usize },

    #[error("no opening () for function in {rule} at {offset}")]
    MalformedFunctionCall { rule: String, offset: usize },

    #[error("function {call} failed in {rule} at {offset}: {source}")]
    FunctionService {
        call: String,
        rule: String,
        offset: usize,
        source: FunctionError,
    },

    #[error("unexpected end of {rule} at {offset}")]
    UnexpectedEnd { rule: String, offset: usize },

    #[error("number/string not found in {rule} at {offset} : {found}")]
    UnexpectedCharacter {
        found: char,
        rule: String,
        offset: usize,
    },

    #[error("operator not found in {rule} at {offset} : {found}")]
    UnknownOperator {
        found: char,
        rule: String,
        offset: usize,
    },

    #[error("cannot use num/string as boolean : {rule}")]
    NotBoolean { rule: String },

    #[error("cannot compare string & number : {rule} at {offset}")]
    TypeMismatch { rule: String, offset: usize },

    #[error("mixing boolean and comparison : {rule} at {offset}")]
    MixedBoolean { rule: String, offset: usize },

    #[error("cannot use boolean operators with string & number : {rule} at {offset}")]
    BooleanOperands { rule: String, offset: usize },

    #[error("garbage at end of expression {rule} at {offset} : {found}")]
    TrailingInput {
        found: char,
        rule: String,
        offset: usize,
    },

    #[error("invalid number '{text}' in {rule}")]
    InvalidNumber { text: String, rule: String },

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("OID {oid} not found in trap")]
    OidNotFound { oid: String },
}

impl RuleError {
    /// Offset where reading stopped, when the failure is positional.
    pub fn offset(&self) -> Option<usize> {
        match self {
            RuleError::UnterminatedString { offset, .. }
            | RuleError::UnterminatedGroup { offset, .. }
            | RuleError::MalformedFunctionCall { offset, .. }
            | RuleError::FunctionService { offset, .. }
            | RuleError::UnexpectedEnd { offset, .. }
            | RuleError::UnexpectedCharacter { offset, .. }
            | RuleError::UnknownOperator { offset, .. }
            | RuleError::TypeMismatch { offset, .. }
            | RuleError::MixedBoolean { offset, .. }
            | RuleError::BooleanOperands { offset, .. }
            | RuleError::TrailingInput { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;
