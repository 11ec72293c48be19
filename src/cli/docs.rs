//! Documentation content for the traprule CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    Functions,
    Oids,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" => Some(Self::Syntax),
            "operators" | "ops" => Some(Self::Operators),
            "functions" | "function" | "fn" => Some(Self::Functions),
            "oids" | "oid" | "varbinds" => Some(Self::Oids),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"TRAPRULE DOCUMENTATION

Trap rules are small boolean expressions evaluated against the varbinds of a
received SNMP trap. A rule compares numbers, quoted strings, parenthesized
sub-rules and function results, and combines comparisons with & and |.

DOCUMENTATION CATEGORIES

  syntax            Elements, grouping, negation and whitespace handling
  operators         Comparison, regex and logical operators
  functions         Built-in functions and how calls are parsed
  oids              Referencing trap varbinds with _OID(...)

QUICK REFERENCE

  42  -3.5          Numbers
  "text"            Quoted string
  ( ... )           Sub-rule
  !( ... )          Negated sub-rule
  _name(args)       Function call
  _OID(1.3.6.*)     Varbind value
  = != < <= > >=    Comparison
  ~                 Regex match
  & |               And, or

Run 'traprule doc <category>' for details.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_str(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Functions) => Ok(FUNCTIONS_DOC),
        Some(DocCategory::Oids) => Ok(OIDS_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX - Rule Elements

ELEMENTS
  A rule is built from elements joined by operators:

  42, -1, .5        Number: a digit, '-' or '.' followed by digits, '-' and '.'
  "some text"       String: double-quoted, no escape sequences
  (1 = 1)           Group: evaluated as its own rule
  _fn(a, b)         Function call, evaluated by the function service

NEGATION
  A leading '!' negates the first element. On the right side of an operator,
  '!' is only accepted after & or |.

  !(1 = 2)                        true
  1 = 1 & !(2 = 3)                true

WHITESPACE
  Spaces outside of quoted strings are removed before evaluation, so
  "1 = 1" and "1=1" are the same rule. Spaces inside quotes are kept.

EMPTY RULES
  An empty rule always matches.

RESULT
  A rule must produce a boolean. A lone number or string is an error.
"#;

const OPERATORS_DOC: &str = r#"OPERATORS - Comparison and Logic

COMPARISON
  Both sides must be of the same kind (number, string or boolean result).

  =  ==             Equal
  !=                Not equal
  <  <=  >  >=      Ordering (numbers compare numerically,
                    strings lexicographically)

  3 > 2                           true
  "abc" = "abc"                   true
  "abc" < 3                       error: type mismatch

REGEX
  ~                 Left side matches the regex on the right

  "link down" ~ "^link"           true

LOGICAL
  &                 And
  |                 Or

  Both sides must be boolean results. The first operator binds the two
  elements around it. After a complete comparison, a following & or |
  takes the whole rest of the rule as its right side:

  1=2 & 1=1 | 1=1                 false, read as (1=2) & (1=1 | 1=1)
  (1=2) & (1=1) | (1=1)           true, read as ((1=2) & (1=1)) | (1=1)

  Use parentheses to group explicitly. Evaluation stops as soon as the
  left side decides the result.

  1 = 1 | (1 = 2)                 true
"#;

const FUNCTIONS_DOC: &str = r#"FUNCTIONS - Built-in Calls

A function call is a name followed by a parenthesized argument list. The full
text of the call is handed to the function service.

ARGUMENTS
  Arguments are split on commas outside quotes and parentheses.
  Quoted text is a string, true/false are booleans, numbers are numbers and
  anything else is taken as a bare string.

BUILT-INS
  _contains(s, sub)          s contains sub
  _startswith(s, prefix)     s starts with prefix
  _endswith(s, suffix)       s ends with suffix
  _upper(s)                  s in upper case
  _lower(s)                  s in lower case
  _length(s)                 number of characters in s
  _innetwork(ip, net, bits)  ip is inside net/bits (IPv4)

  1 = 1 & _contains("link down", "down")    true
  _upper("a") = _lower("A")                 false
  _length("abc") = 3                        error: type mismatch

  A function result only compares with another function result or group.

ERRORS
  A call without an argument list is malformed. Failures inside the function
  service are reported with the call text and its position in the rule.
"#;

const OIDS_DOC: &str = r#"OIDS - Referencing Varbinds

_OID(oid) is replaced by the value of the matching varbind before the rule
is evaluated.

PATTERNS
  _OID(1.3.6.1.2.1.1.3.0)    Exact OID
  _OID(1.3.6.1.*.3.0)        '*' matches one numeric arc
  _OID(1.3.6.1.**)           '**' matches any remaining text

VALUES
  Numeric values are inserted as-is. Anything else is wrapped in double
  quotes, with embedded double quotes turned into single quotes.

  varbind 1.3.6.1.4.1.8072.2.3.2.1 = 5
  _OID(1.3.6.1.4.1.8072.2.3.2.1) > 3        true

ERRORS
  A reference with no matching varbind is an error.
"#;
