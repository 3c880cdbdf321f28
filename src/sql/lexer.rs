//! SQL lexer for tokenizing CREATE TABLE statements.

use std::iter::Peekable;
use std::str::Chars;

/// SQL token types.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Create,
    Table,
    If,
    Not,
    Exists,
    Primary,
    Key,
    Foreign,
    References,
    Null,
    Unique,
    Default,
    Constraint,
    Index,
    Check,
    On,
    AutoIncrement, // AUTO_INCREMENT, AUTOINCREMENT

    // Identifiers and literals
    Ident(String),
    /// Contents of a single-quoted literal, with `''` collapsed.
    Str(String),
    /// Typed literal such as `b'1'`, `X'FF'` or `N'abc'`: prefix and contents.
    Prefixed(String, String),
    Num(String),

    // Symbols
    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,

    Eof,
}

/// SQL lexer.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    current_char: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut chars = input.chars().peekable();
        let current_char = chars.next();
        Self { chars, current_char }
    }

    fn advance(&mut self) {
        self.current_char = self.chars.next();
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.current_char {
            self.advance();
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        self.advance(); // skip *
        while let Some(c) = self.current_char {
            self.advance();
            if c == '*' && self.current_char == Some('/') {
                self.advance();
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.current_char {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }
        ident
    }

    fn read_delimited(&mut self, close: char) -> String {
        self.advance(); // skip opening delimiter
        let mut text = String::new();
        while let Some(c) = self.current_char {
            if c == close {
                // A doubled delimiter is an escaped one
                if self.peek() == Some(&close) {
                    text.push(c);
                    self.advance();
                    self.advance();
                } else {
                    self.advance();
                    break;
                }
            } else {
                text.push(c);
                self.advance();
            }
        }
        text
    }

    fn read_string(&mut self) -> String {
        self.advance(); // skip opening quote
        let mut s = String::new();
        while let Some(c) = self.current_char {
            if c == '\'' {
                if self.peek() == Some(&'\'') {
                    s.push(c);
                    self.advance();
                    self.advance();
                } else {
                    self.advance();
                    break;
                }
            } else if c == '\\' {
                // Backslash escapes are kept as written
                s.push(c);
                self.advance();
                if let Some(escaped) = self.current_char {
                    s.push(escaped);
                    self.advance();
                }
            } else {
                s.push(c);
                self.advance();
            }
        }
        s
    }

    fn read_number(&mut self) -> String {
        let mut num = String::new();
        let mut has_dot = false;

        if let Some(sign @ ('-' | '+')) = self.current_char {
            num.push(sign);
            self.advance();
        }

        while let Some(c) = self.current_char {
            if c.is_ascii_digit() {
                num.push(c);
                self.advance();
            } else if c == '.' && !has_dot {
                has_dot = true;
                num.push(c);
                self.advance();
            } else {
                break;
            }
        }
        num
    }

    fn keyword_or_ident(&self, s: String) -> Token {
        match s.to_uppercase().as_str() {
            "CREATE" => Token::Create,
            "TABLE" => Token::Table,
            "IF" => Token::If,
            "NOT" => Token::Not,
            "EXISTS" => Token::Exists,
            "PRIMARY" => Token::Primary,
            "KEY" => Token::Key,
            "FOREIGN" => Token::Foreign,
            "REFERENCES" => Token::References,
            "NULL" => Token::Null,
            "UNIQUE" => Token::Unique,
            "DEFAULT" => Token::Default,
            "CONSTRAINT" => Token::Constraint,
            "INDEX" => Token::Index,
            "CHECK" => Token::Check,
            "ON" => Token::On,
            "AUTO_INCREMENT" | "AUTOINCREMENT" => Token::AutoIncrement,
            _ => Token::Ident(s),
        }
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();

            match self.current_char {
                None => return Token::Eof,

                Some('-') => {
                    if self.peek() == Some(&'-') {
                        self.skip_line_comment();
                        continue;
                    } else if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        return Token::Num(self.read_number());
                    } else {
                        self.advance();
                        continue; // Skip standalone dash
                    }
                }

                Some('+') => {
                    if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        return Token::Num(self.read_number());
                    }
                    self.advance();
                    continue;
                }

                Some('/') => {
                    self.advance();
                    if self.current_char == Some('*') {
                        self.skip_block_comment();
                    }
                    continue;
                }

                Some('#') => {
                    self.skip_line_comment();
                    continue;
                }

                Some('(') => {
                    self.advance();
                    return Token::LParen;
                }
                Some(')') => {
                    self.advance();
                    return Token::RParen;
                }
                Some(',') => {
                    self.advance();
                    return Token::Comma;
                }
                Some(';') => {
                    self.advance();
                    return Token::Semicolon;
                }
                Some('.') => {
                    self.advance();
                    return Token::Dot;
                }

                // Quoted identifiers are never keywords
                Some('"') => return Token::Ident(self.read_delimited('"')),
                Some('`') => return Token::Ident(self.read_delimited('`')),
                Some('[') => return Token::Ident(self.read_delimited(']')),

                Some('\'') => return Token::Str(self.read_string()),

                Some(c) if c.is_ascii_digit() => {
                    return Token::Num(self.read_number());
                }

                Some(c) if c.is_alphabetic() || c == '_' => {
                    let ident = self.read_identifier();
                    return match self.keyword_or_ident(ident) {
                        // A quote right after the word makes it a literal prefix
                        Token::Ident(prefix) if self.current_char == Some('\'') => {
                            Token::Prefixed(prefix, self.read_string())
                        }
                        token => token,
                    };
                }

                Some(_) => {
                    // Skip unknown characters
                    self.advance();
                    continue;
                }
            }
        }
    }

    /// Collect all tokens, ending with `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_create_table() {
        let sql = "CREATE TABLE users (id INT);";
        let tokens = Lexer::new(sql).tokenize();

        assert_eq!(
            tokens,
            vec![
                Token::Create,
                Token::Table,
                Token::Ident("users".to_string()),
                Token::LParen,
                Token::Ident("id".to_string()),
                Token::Ident("INT".to_string()),
                Token::RParen,
                Token::Semicolon,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_quoted_identifiers() {
        let sql = r#"CREATE TABLE "User Table" (`column name` INT, [key] INT);"#;
        let tokens = Lexer::new(sql).tokenize();

        assert_eq!(tokens[2], Token::Ident("User Table".to_string()));
        assert_eq!(tokens[4], Token::Ident("column name".to_string()));
        assert_eq!(tokens[7], Token::Ident("key".to_string()));
    }

    #[test]
    fn test_comments() {
        let sql = "-- comment\nCREATE /* block */ TABLE t (id INT); # trailing";
        let tokens = Lexer::new(sql).tokenize();

        assert_eq!(tokens[0], Token::Create);
        assert_eq!(tokens[1], Token::Table);
        assert_eq!(tokens.last(), Some(&Token::Eof));
        assert_eq!(tokens.len(), 9);
    }

    #[test]
    fn test_strings_and_numbers() {
        let tokens = Lexer::new("DEFAULT 'it''s' DEFAULT -1 DEFAULT 0.50").tokenize();
        assert_eq!(tokens[1], Token::Str("it's".to_string()));
        assert_eq!(tokens[3], Token::Num("-1".to_string()));
        assert_eq!(tokens[5], Token::Num("0.50".to_string()));
    }

    #[test]
    fn test_prefixed_literals() {
        let sql = "DEFAULT b'1' DEFAULT N'it''s' DEFAULT x 'FF' DEFAULT +5";
        let tokens = Lexer::new(sql).tokenize();
        assert_eq!(tokens[1], Token::Prefixed("b".to_string(), "1".to_string()));
        assert_eq!(tokens[3], Token::Prefixed("N".to_string(), "it's".to_string()));
        assert_eq!(tokens[5], Token::Ident("x".to_string()));
        assert_eq!(tokens[6], Token::Str("FF".to_string()));
        assert_eq!(tokens[8], Token::Num("+5".to_string()));
    }

    #[test]
    fn test_auto_increment_spellings() {
        let tokens = Lexer::new("AUTO_INCREMENT autoincrement").tokenize();
        assert_eq!(tokens[0], Token::AutoIncrement);
        assert_eq!(tokens[1], Token::AutoIncrement);
    }
}
