//! XPath Lexer
//!
//! Tokenizes path expressions. Whitespace is skipped between tokens.

use crate::error::XPathError;

/// XPath token types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Slash,        // /
    At,           // @
    Eq,           // =
    LeftBracket,  // [
    RightBracket, // ]

    /// Quoted literal, quotes stripped
    String(String),
    /// Run of alphanumerics, `_` and `-`
    Name(String),

    Eof,
}

/// A token and the byte offset where it starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub position: usize,
}

/// XPath lexer
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer
    pub fn new(input: &'a str) -> Self {
        Lexer { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.advance(c.len_utf8());
        }
    }

    /// Get the next token; `Eof` repeats once the input is exhausted
    pub fn next_token(&mut self) -> Result<Spanned, XPathError> {
        self.skip_whitespace();
        let position = self.pos;

        let Some(c) = self.peek() else {
            return Ok(Spanned {
                token: Token::Eof,
                position,
            });
        };

        let token = match c {
            '/' => {
                self.advance(1);
                Token::Slash
            }
            '@' => {
                self.advance(1);
                Token::At
            }
            '=' => {
                self.advance(1);
                Token::Eq
            }
            '[' => {
                self.advance(1);
                Token::LeftBracket
            }
            ']' => {
                self.advance(1);
                Token::RightBracket
            }
            '"' | '\'' => self.read_string(c)?,
            _ if is_name_char(c) => self.read_name(),
            _ => return Err(XPathError::InvalidCharacter { ch: c, position }),
        };

        Ok(Spanned { token, position })
    }

    /// Read a quoted literal; the opening quote is at the current position
    fn read_string(&mut self, quote: char) -> Result<Token, XPathError> {
        let open = self.pos;
        self.advance(1);
        let start = self.pos;

        match self.remaining().find(quote) {
            Some(len) => {
                let value = self.input[start..start + len].to_string();
                self.advance(len + 1);
                Ok(Token::String(value))
            }
            None => Err(XPathError::UnterminatedString { position: open }),
        }
    }

    fn read_name(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !is_name_char(c) {
                break;
            }
            self.advance(c.len_utf8());
        }
        Token::Name(self.input[start..self.pos].to_string())
    }

    /// Tokenize entire input, `Eof` excluded
    pub fn tokenize(&mut self) -> Result<Vec<Spanned>, XPathError> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_token()?;
            if spanned.token == Token::Eof {
                break;
            }
            tokens.push(spanned);
        }
        Ok(tokens)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_simple_path() {
        let mut lexer = Lexer::new("/root/child");
        assert_eq!(lexer.next_token().unwrap().token, Token::Slash);
        assert_eq!(lexer.next_token().unwrap().token, Token::Name("root".to_string()));
        assert_eq!(lexer.next_token().unwrap().token, Token::Slash);
        assert_eq!(lexer.next_token().unwrap().token, Token::Name("child".to_string()));
        assert_eq!(lexer.next_token().unwrap().token, Token::Eof);
        assert_eq!(lexer.next_token().unwrap().token, Token::Eof);
    }

    #[test]
    fn test_predicate() {
        assert_eq!(
            tokens("item[@id='test']"),
            vec![
                Token::Name("item".to_string()),
                Token::LeftBracket,
                Token::At,
                Token::Name("id".to_string()),
                Token::Eq,
                Token::String("test".to_string()),
                Token::RightBracket,
            ]
        );
    }

    #[test]
    fn test_whitespace_and_positions() {
        let spanned = Lexer::new(" / a [ @b = \"c d\" ]").tokenize().unwrap();
        let positions: Vec<usize> = spanned.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![1, 3, 5, 7, 8, 10, 12, 18]);
        assert_eq!(spanned[6].token, Token::String("c d".to_string()));
    }

    #[test]
    fn test_name_characters() {
        assert_eq!(
            tokens("/my-item_2/élan"),
            vec![
                Token::Slash,
                Token::Name("my-item_2".to_string()),
                Token::Slash,
                Token::Name("élan".to_string()),
            ]
        );
    }

    #[test]
    fn test_quotes_do_not_mix() {
        assert_eq!(tokens("'say \"hi\"'"), vec![Token::String("say \"hi\"".to_string())]);
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("/a[@b='c]").tokenize().unwrap_err();
        assert_eq!(err, XPathError::UnterminatedString { position: 6 });
    }

    #[test]
    fn test_invalid_character() {
        let err = Lexer::new("/root/*").tokenize().unwrap_err();
        assert_eq!(err, XPathError::InvalidCharacter { ch: '*', position: 6 });
    }
}
