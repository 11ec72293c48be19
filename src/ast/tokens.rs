use crate::value::Value;

/// Token read from a rule string by one of the element primitives.
///
/// The three kinds are never mixed by the comparison operators: a number is
/// only compared with a number, a quoted string with a quoted string and an
/// evaluated result with another evaluated result.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal, kept as raw text
    ///
    /// The scanner does not validate the text, `1.2.3` and `--5` are both
    /// accepted here and only rejected once they are compared.
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -3.5
    /// .1.3.6
    /// ```
    Number(String),

    /// String literal enclosed in double quotes (quotes stripped)
    ///
    /// # Examples
    /// ```text
    /// "link down"
    /// "a)b"
    /// ```
    String(String),

    /// Result of a parenthesized group or of a function call
    ///
    /// # Examples
    /// ```text
    /// (1 = 1)
    /// _contains("eth0 down", "down")
    /// ```
    Evaluated(Value),
}

/// Kind tag of a [`Token`], numbered like the rule storage format does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Number = 0,
    String = 1,
    Evaluated = 2,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Number(_) => TokenKind::Number,
            Token::String(_) => TokenKind::String,
            Token::Evaluated(_) => TokenKind::Evaluated,
        }
    }
}
