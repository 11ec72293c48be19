pub mod ast;
pub mod cli;
pub mod database;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod logging;
pub mod rule;
pub mod value;

pub use ast::{Operator, Token, TokenKind};
pub use database::{Connection, Connector, Database, DbError, DbParams};
pub use error::RuleError;
pub use evaluator::{Evaluator, eval_function, eval_group};
pub use functions::{FunctionError, FunctionRegistry, FunctionService};
pub use lexer::Lexer;
pub use logging::{LogConfig, LogSink, Severity, TracingSink};
pub use rule::{OidValue, RuleEngine, cleanup};
pub use value::Value;
