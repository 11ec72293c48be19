use std::fmt;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    // Comparison
    /// Equal (`=` or `==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Regular expression match (`~`)
    Matches,

    // Logical
    /// Logical AND (`&`)
    And,
    /// Logical OR (`|`)
    Or,
}

impl Operator {
    /// `&` and `|` only accept evaluated operands.
    pub fn is_logical(self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::GreaterThan => ">",
            Operator::LessEqual => "<=",
            Operator::GreaterEqual => ">=",
            Operator::Matches => "~",
            Operator::And => "&",
            Operator::Or => "|",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
