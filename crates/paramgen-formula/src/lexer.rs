//! Tokenizer for guard expressions.

use crate::FormulaError;
use std::iter::Peekable;
use std::str::CharIndices;

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    /// `$NAME` or `${NAME}`; holds the bare name.
    Var(String),
    True,
    False,
    None,
    And,
    Or,
    Not,
    In,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
}

/// Token plus its byte offset in the source expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub offset: usize,
}

/// Split an expression into tokens.
pub(crate) fn tokenize(expr: &str) -> Result<Vec<Spanned>, FormulaError> {
    let mut lexer = Lexer {
        expr,
        chars: expr.char_indices().peekable(),
    };
    let mut tokens = Vec::new();
    while let Some(spanned) = lexer.next_token()? {
        tokens.push(spanned);
    }
    Ok(tokens)
}

struct Lexer<'a> {
    expr: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn next_token(&mut self) -> Result<Option<Spanned>, FormulaError> {
        while self.chars.next_if(|(_, ch)| ch.is_whitespace()).is_some() {}

        let Some((offset, ch)) = self.chars.next() else {
            return Ok(None);
        };

        let token = match ch {
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ',' => Token::Comma,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '=' => {
                self.expect('=', offset)?;
                Token::Eq
            }
            '!' => {
                if self.eat('=') {
                    Token::Ne
                } else {
                    Token::Not
                }
            }
            '<' => {
                if self.eat('=') {
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            '>' => {
                if self.eat('=') {
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            '&' => {
                self.expect('&', offset)?;
                Token::And
            }
            '|' => {
                self.expect('|', offset)?;
                Token::Or
            }
            '"' | '\'' => Token::Str(self.string(ch, offset)?),
            '$' => Token::Var(self.placeholder(offset)?),
            ch if ch.is_ascii_digit() => self.number(offset)?,
            ch if ch.is_alphabetic() || ch == '_' => {
                let word = self.word(offset);
                keyword(word).unwrap_or_else(|| Token::Ident(word.to_string()))
            }
            other => {
                return Err(FormulaError::syntax(
                    self.expr,
                    offset,
                    format!("unexpected character `{other}`"),
                ));
            }
        };
        Ok(Some(Spanned { token, offset }))
    }

    fn eat(&mut self, expected: char) -> bool {
        self.chars.next_if(|(_, ch)| *ch == expected).is_some()
    }

    fn expect(&mut self, expected: char, offset: usize) -> Result<(), FormulaError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(FormulaError::syntax(
                self.expr,
                offset,
                format!("expected `{expected}`"),
            ))
        }
    }

    /// Consume identifier characters and return the full word starting at `start`.
    fn word(&mut self, start: usize) -> &'a str {
        let mut end = self.expr.len();
        while let Some(&(idx, ch)) = self.chars.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                self.chars.next();
            } else {
                end = idx;
                break;
            }
        }
        &self.expr[start..end]
    }

    fn placeholder(&mut self, offset: usize) -> Result<String, FormulaError> {
        let braced = self.eat('{');
        let name_start = match self.chars.peek() {
            Some(&(idx, ch)) if ch.is_alphanumeric() || ch == '_' => idx,
            _ => {
                return Err(FormulaError::syntax(
                    self.expr,
                    offset,
                    "expected variable name after `$`",
                ));
            }
        };
        let name = self.word(name_start).to_string();
        if braced {
            self.expect('}', offset)?;
        }
        Ok(name)
    }

    fn string(&mut self, quote: char, offset: usize) -> Result<String, FormulaError> {
        let mut out = String::new();
        while let Some((_, ch)) = self.chars.next() {
            match ch {
                '\\' => match self.chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, escaped)) => out.push(escaped),
                    None => break,
                },
                ch if ch == quote => return Ok(out),
                ch => out.push(ch),
            }
        }
        Err(FormulaError::syntax(
            self.expr,
            offset,
            "unterminated string literal",
        ))
    }

    fn number(&mut self, start: usize) -> Result<Token, FormulaError> {
        let mut end = self.expr.len();
        let mut is_float = false;
        let mut prev = '0';
        while let Some(&(idx, ch)) = self.chars.peek() {
            let accept = ch.is_ascii_digit()
                || (ch == '.' && !is_float)
                || matches!(ch, 'e' | 'E')
                || (matches!(ch, '+' | '-') && matches!(prev, 'e' | 'E'));
            if !accept {
                end = idx;
                break;
            }
            if matches!(ch, '.' | 'e' | 'E') {
                is_float = true;
            }
            prev = ch;
            self.chars.next();
        }

        let text = &self.expr[start..end];
        let invalid = || FormulaError::syntax(self.expr, start, format!("invalid number `{text}`"));
        if is_float {
            text.parse::<f64>().map(Token::Float).map_err(|_| invalid())
        } else {
            text.parse::<i64>().map(Token::Int).map_err(|_| invalid())
        }
    }
}

fn keyword(word: &str) -> Option<Token> {
    let token = match word {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "in" => Token::In,
        "True" | "true" => Token::True,
        "False" | "false" => Token::False,
        "None" => Token::None,
        _ => return None,
    };
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(expr: &str) -> Vec<Token> {
        tokenize(expr)
            .expect("tokenize")
            .into_iter()
            .map(|spanned| spanned.token)
            .collect()
    }

    #[test]
    fn splits_comparison_with_placeholder() {
        assert_eq!(
            tokens("$COMP>=1"),
            vec![Token::Var("COMP".to_string()), Token::Ge, Token::Int(1)]
        );
        assert_eq!(
            tokens("${OCN_GRID} == 'gx1v7'"),
            vec![
                Token::Var("OCN_GRID".to_string()),
                Token::Eq,
                Token::Str("gx1v7".to_string()),
            ]
        );
    }

    #[test]
    fn reads_numbers_and_keywords() {
        assert_eq!(
            tokens("not 1.5e3 and True || x"),
            vec![
                Token::Not,
                Token::Float(1500.0),
                Token::And,
                Token::True,
                Token::Or,
                Token::Ident("x".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_single_equals() {
        let err = tokenize("a = 1").unwrap_err();
        assert!(matches!(err, FormulaError::Syntax { position: 2, .. }));
    }

    #[test]
    fn rejects_unterminated_string() {
        assert!(tokenize("'abc").is_err());
    }
}
