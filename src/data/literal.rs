use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Literal – the list-literal subset used by the "Cuisine Style" / "Reviews"
// columns
// ---------------------------------------------------------------------------

/// A parsed list literal. Only strings and (nested) lists are accepted;
/// numbers, `None`, tuples, dicts and anything else are syntax errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Str(String),
    List(Vec<Literal>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("{message} at offset {position}")]
    Syntax { position: usize, message: String },
    #[error("expected {expected}")]
    Shape { expected: &'static str },
}

/// Nesting deeper than this is rejected instead of recursing further.
const MAX_DEPTH: usize = 16;

const STRING_LIST: &str = "a list of strings";
const LIST_PAIR: &str = "a list of two lists of strings";

/// Parse a complete literal. Leading and trailing whitespace is allowed,
/// anything else after the value is an error.
pub fn parse(input: &str) -> Result<Literal, LiteralError> {
    let mut parser = Parser { input, pos: 0 };
    let value = parser.value(0)?;
    parser.skip_ws();
    if parser.pos != input.len() {
        return Err(parser.error("unexpected trailing characters"));
    }
    Ok(value)
}

/// Parse `['a', 'b']` into its strings.
pub fn parse_string_list(input: &str) -> Result<Vec<String>, LiteralError> {
    parse(input)?.into_string_list()
}

/// Parse `[['a', 'b'], ['c', 'd']]` into its two string lists.
pub fn parse_list_pair(input: &str) -> Result<(Vec<String>, Vec<String>), LiteralError> {
    parse(input)?.into_list_pair()
}

impl Literal {
    pub fn string_list<S: AsRef<str>>(items: &[S]) -> Self {
        Literal::List(
            items
                .iter()
                .map(|s| Literal::Str(s.as_ref().to_string()))
                .collect(),
        )
    }

    pub fn list_pair<S: AsRef<str>>(first: &[S], second: &[S]) -> Self {
        Literal::List(vec![Literal::string_list(first), Literal::string_list(second)])
    }

    pub fn into_string_list(self) -> Result<Vec<String>, LiteralError> {
        match self {
            Literal::List(items) => items
                .into_iter()
                .map(|item| match item {
                    Literal::Str(s) => Ok(s),
                    Literal::List(_) => Err(LiteralError::Shape {
                        expected: STRING_LIST,
                    }),
                })
                .collect(),
            Literal::Str(_) => Err(LiteralError::Shape {
                expected: STRING_LIST,
            }),
        }
    }

    pub fn into_list_pair(self) -> Result<(Vec<String>, Vec<String>), LiteralError> {
        let shape = LiteralError::Shape {
            expected: LIST_PAIR,
        };
        let Literal::List(items) = self else {
            return Err(shape);
        };
        let [first, second]: [Literal; 2] = items.try_into().map_err(|_| shape.clone())?;
        let first = first.into_string_list().map_err(|_| shape.clone())?;
        let second = second.into_string_list().map_err(|_| shape)?;
        Ok((first, second))
    }
}

// -- Display writes the canonical repr form, e.g. ['Italian', "Joe's"] --

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) => write_quoted(f, s),
            Literal::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Single quotes unless the text contains a single quote and no double quote.
fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    write!(f, "{quote}")?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c == quote => write!(f, "\\{c}")?,
            c if (c as u32) < 0x20 || c as u32 == 0x7f => write!(f, "\\x{:02x}", c as u32)?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "{quote}")
}

// ---------------------------------------------------------------------------
// Recursive-descent parser
// ---------------------------------------------------------------------------

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError::Syntax {
            position: self.pos,
            message: message.into(),
        }
    }

    fn value(&mut self, depth: usize) -> Result<Literal, LiteralError> {
        self.skip_ws();
        match self.peek() {
            Some('[') => self.list(depth),
            Some(quote @ ('\'' | '"')) => self.string(quote).map(Literal::Str),
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn list(&mut self, depth: usize) -> Result<Literal, LiteralError> {
        if depth >= MAX_DEPTH {
            return Err(self.error("list nesting too deep"));
        }
        self.bump(); // '['
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(']') {
                self.bump();
                return Ok(Literal::List(items));
            }
            items.push(self.value(depth + 1)?);
            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') => {
                    self.bump();
                    return Ok(Literal::List(items));
                }
                Some(c) => return Err(self.error(format!("expected ',' or ']', found '{c}'"))),
                None => return Err(self.error("unterminated list")),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<String, LiteralError> {
        self.bump(); // opening quote
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some('\n') => return Err(self.error("newline in string")),
                Some(c) if c == quote => {
                    self.bump();
                    return Ok(out);
                }
                Some('\\') => {
                    self.bump();
                    self.escape(&mut out)?;
                }
                Some(c) => {
                    self.bump();
                    out.push(c);
                }
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
        let Some(c) = self.bump() else {
            return Err(self.error("unterminated string"));
        };
        match c {
            '\\' | '\'' | '"' => out.push(c),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'v' => out.push('\x0b'),
            'x' => out.push(self.hex_escape(2)?),
            'u' => out.push(self.hex_escape(4)?),
            'U' => out.push(self.hex_escape(8)?),
            '0'..='7' => out.push(self.octal_escape(c)?),
            // line continuation
            '\n' => {}
            // unknown escapes keep the backslash
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn hex_escape(&mut self, digits: usize) -> Result<char, LiteralError> {
        let mut code = 0u32;
        for _ in 0..digits {
            let digit = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("truncated hex escape"))?;
            self.bump();
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| self.error(format!("invalid code point {code:#x}")))
    }

    fn octal_escape(&mut self, first: char) -> Result<char, LiteralError> {
        let mut code = first.to_digit(8).unwrap_or(0);
        for _ in 0..2 {
            match self.peek().and_then(|c| c.to_digit(8)) {
                Some(d) => {
                    self.bump();
                    code = code * 8 + d;
                }
                None => break,
            }
        }
        char::from_u32(code).ok_or_else(|| self.error(format!("invalid code point {code:#o}")))
    }
}
