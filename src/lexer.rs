use crate::ast::Token;
use crate::error::{Result, RuleError};

/// Read position over one rule string.
///
/// The input never changes while a rule is read; only `position` moves, and
/// only forward. Nested groups are read by a fresh `Lexer` over the extracted
/// text, so offsets always refer to the string the lexer was built from.
#[derive(Debug, Clone)]
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Starts reading `input` at `position` (clamped to the end of input).
    pub fn at(input: &str, position: usize) -> Self {
        let mut lexer = Lexer::new(input);
        lexer.position = position.min(lexer.input.len());
        lexer
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    pub fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    pub fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    pub fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    pub fn advance(&mut self) {
        if self.position < self.input.len() {
            self.position += 1;
        }
    }

    pub fn skip_to_end(&mut self) {
        self.position = self.input.len();
    }

    pub fn skip_spaces(&mut self) {
        while self.current_char() == Some(' ') {
            self.advance();
        }
    }

    /// The whole rule, for error reports.
    pub fn rule(&self) -> String {
        self.input.iter().collect()
    }

    pub fn slice(&self, start: usize, end: usize) -> String {
        self.input[start..end].iter().collect()
    }

    /// Moves one past the next `delimiter`, starting at the current character.
    ///
    /// Returns `false` and leaves the lexer at the end of input when there is
    /// no such delimiter.
    pub fn skip_past(&mut self, delimiter: char) -> bool {
        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == delimiter {
                return true;
            }
        }
        false
    }

    /// Reads a numeric literal. The current character was already checked by
    /// the caller; the run continues over `[-0-9.]` without validation.
    pub fn read_number(&mut self) -> Token {
        let start = self.position;
        self.advance();

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() || ch == '-' || ch == '.' {
                self.advance();
            } else {
                break;
            }
        }

        Token::Number(self.slice(start, self.position))
    }

    /// Reads a string literal starting at its opening quote.
    pub fn read_string(&mut self) -> Result<Token> {
        self.advance(); // Consume opening quote
        let start = self.position;

        if !self.skip_past('"') {
            return Err(self.unterminated_string());
        }

        Ok(Token::String(self.slice(start, self.position - 1)))
    }

    /// Returns everything between the `(` at the current position and its
    /// matching `)`, and moves past that `)`.
    ///
    /// Quoted segments are skipped whole, so `( "test" != ")test" & (1=2) )`
    /// yields ` "test" != ")test" & (1=2) `.
    pub fn read_group(&mut self) -> Result<String> {
        self.advance(); // Consume '('
        let start = self.position;
        let mut depth = 0usize;

        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    self.advance();
                    if !self.skip_past('"') {
                        return Err(self.unterminated_string());
                    }
                }
                '(' => {
                    depth += 1;
                    self.advance();
                }
                ')' if depth == 0 => break,
                ')' => {
                    depth -= 1;
                    self.advance();
                }
                _ => self.advance(),
            }
        }

        if self.is_eof() {
            return Err(RuleError::UnterminatedGroup {
                rule: self.rule(),
                offset: self.position,
            });
        }

        let content = self.slice(start, self.position);
        self.advance(); // Consume ')'
        Ok(content)
    }

    /// Returns the whole `name(args)` span starting at the current position
    /// and moves past its closing `)`.
    pub fn read_function_span(&mut self) -> Result<String> {
        let start = self.position;

        while let Some(ch) = self.current_char() {
            if ch == '(' {
                break;
            }
            self.advance();
        }

        if self.is_eof() {
            return Err(RuleError::MalformedFunctionCall {
                rule: self.rule(),
                offset: self.position,
            });
        }

        self.read_group()?;
        Ok(self.slice(start, self.position))
    }

    fn unterminated_string(&self) -> RuleError {
        RuleError::UnterminatedString {
            rule: self.rule(),
            offset: self.position,
        }
    }
}

#[test]
fn test_skip_past() {
    let mut lexer = Lexer::new("ab\"cd");
    assert!(lexer.skip_past('"'));
    assert_eq!(lexer.position(), 3);
    assert!(!lexer.skip_past('"'));
    assert_eq!(lexer.position(), 5);
}

#[test]
fn test_number_stops_at_operator() {
    let mut lexer = Lexer::new("12.5<3");
    assert_eq!(lexer.read_number(), Token::Number("12.5".to_string()));
    assert_eq!(lexer.current_char(), Some('<'));
}

#[test]
fn test_group_inside_rule() {
    let mut lexer = Lexer::at("1=1&(2=2)|3", 4);
    assert_eq!(lexer.read_group().unwrap(), "2=2");
    assert_eq!(lexer.current_char(), Some('|'));
}
