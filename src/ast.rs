//! # Trap rule language - tokens and operators
//!
//! Rules decide whether an incoming SNMP trap matches a handler. They are flat
//! strings evaluated left to right, without a separate parse tree:
//!
//! ```text
//! _OID(.1.3.6.1.6.3.1.1.4.1.0) = ".1.3.6.1.4.1.8072.2.3.0.1" & (_OID(.1.3.6.1.2.1.2.2.1.8.*) != 1)
//! ```
//!
//! - **[tokens]** - the three element kinds (number, string, evaluated result)
//! - **[operators]** - comparison and boolean operators
//!
//! ## Elements
//!
//! - Numbers start with a digit, `-` or `.` and run over `[-0-9.]`
//! - Strings are enclosed in double quotes and have no escapes
//! - Groups `( ... )` are evaluated as a nested rule
//! - Function calls `_name(args)` are handed to the function service
//!
//! ## Chaining
//!
//! The first operator always binds the two elements around it. Once that
//! comparison is complete, a following `&` or `|` takes the whole rest of the
//! rule as its right side. So `1=2 & 1=1 | 1=1` reads as
//! `(1=2) & (1=1 | 1=1)`, while `(1=2) & (1=1) | (1=1)` reads as
//! `((1=2) & (1=1)) | (1=1)`. Use groups to force another order.
pub mod operators;
pub mod tokens;

pub use operators::Operator;
pub use tokens::{Token, TokenKind};
