//! XPath Parser
//!
//! Recursive descent over the path subset:
//!
//! ```text
//! Path      := '/' Step ('/' Step)*
//! Step      := Name Predicate?
//! Predicate := '[' '@' Name '=' Literal ']'
//! ```
//!
//! One token of lookahead. Each step carries at most one predicate; errors
//! name the token that was expected.

use std::fmt;
use std::mem;
use std::slice;

use super::lexer::{Lexer, Spanned, Token};
use crate::error::XPathError;

/// A parsed path expression; never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    /// Steps from the outermost inward
    pub fn steps(&self) -> slice::Iter<'_, Step> {
        self.steps.iter()
    }

    /// Number of steps
    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    /// The step whose matches are results
    pub fn leaf(&self) -> Option<&Step> {
        self.steps.last()
    }
}

/// One `/name[@attr='value']` segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub name: String,
    pub predicate: Option<Predicate>,
}

/// `[@attribute='value']`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub attribute: String,
    pub value: String,
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in self.steps() {
            write!(f, "/{}", step.name)?;
            if let Some(pred) = &step.predicate {
                let quote = if pred.value.contains('"') { '\'' } else { '"' };
                write!(f, "[@{}={quote}{}{quote}]", pred.attribute, pred.value)?;
            }
        }
        Ok(())
    }
}

/// XPath parser
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Spanned,
}

impl<'a> Parser<'a> {
    /// Create a parser positioned on the first token
    pub fn new(input: &'a str) -> Result<Self, XPathError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Parser { lexer, current })
    }

    /// Consume the current token, returning it
    fn advance(&mut self) -> Result<Spanned, XPathError> {
        let next = self.lexer.next_token()?;
        Ok(mem::replace(&mut self.current, next))
    }

    #[inline]
    fn position(&self) -> usize {
        self.current.position
    }

    /// Parse a complete path; anything after the last step is an error
    pub fn parse(mut self) -> Result<Path, XPathError> {
        let mut steps = Vec::new();
        loop {
            if self.current.token != Token::Slash {
                return Err(XPathError::ExpectedSlash {
                    position: self.position(),
                });
            }
            self.advance()?;
            steps.push(self.parse_step()?);

            match self.current.token {
                Token::Slash => continue,
                Token::Eof => break,
                _ => {
                    return Err(XPathError::TrailingInput {
                        position: self.position(),
                    })
                }
            }
        }

        Ok(Path { steps })
    }

    fn parse_step(&mut self) -> Result<Step, XPathError> {
        let name = self.expect_name()?;
        let predicate = if self.current.token == Token::LeftBracket {
            self.advance()?;
            Some(self.parse_predicate()?)
        } else {
            None
        };
        Ok(Step { name, predicate })
    }

    /// After '[': `@name = 'literal' ]`
    fn parse_predicate(&mut self) -> Result<Predicate, XPathError> {
        if self.current.token != Token::At {
            return Err(XPathError::ExpectedAt {
                position: self.position(),
            });
        }
        self.advance()?;

        let attribute = self.expect_name()?;

        if self.current.token != Token::Eq {
            return Err(XPathError::ExpectedEquals {
                position: self.position(),
            });
        }
        self.advance()?;

        let value = match &mut self.current.token {
            Token::String(s) => mem::take(s),
            _ => {
                return Err(XPathError::ExpectedStringLiteral {
                    position: self.position(),
                })
            }
        };
        self.advance()?;

        if self.current.token != Token::RightBracket {
            return Err(XPathError::ExpectedCloseBracket {
                position: self.position(),
            });
        }
        self.advance()?;

        Ok(Predicate { attribute, value })
    }

    fn expect_name(&mut self) -> Result<String, XPathError> {
        let name = match &mut self.current.token {
            Token::Name(name) => mem::take(name),
            _ => {
                return Err(XPathError::ExpectedIdentifier {
                    position: self.position(),
                })
            }
        };
        self.advance()?;
        Ok(name)
    }
}

/// Parse an XPath expression
pub fn parse(input: &str) -> Result<Path, XPathError> {
    Parser::new(input)?.parse()
}
