//! Recursive-descent parser producing a guard expression tree.
//!
//! Precedence from loosest to tightest: `or`, `and`, `not`, comparisons
//! (including `in` / `not in`, chained like `a < b < c`), `+ -`, `* / %`,
//! unary minus, primaries.

use crate::FormulaError;
use crate::eval::Value;
use crate::lexer::{Spanned, Token, tokenize};

/// Deepest expression tree accepted. Parsing, evaluation and drop all recurse
/// over the tree, so the bound keeps hostile keys from exhausting the stack.
pub(crate) const MAX_DEPTH: usize = 128;

/// Comparison operators usable in a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

/// Parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Literal(Value),
    /// Bare word; evaluates to its own spelling.
    Ident(String),
    /// Unexpanded placeholder.
    Var(String),
    List(Vec<Expr>),
    Not(Box<Expr>),
    Neg(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare {
        first: Box<Expr>,
        rest: Vec<(CmpOp, Expr)>,
    },
    Arith {
        op: ArithOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Whether the root node is a boolean-producing construct.
    pub(crate) fn is_logical(&self) -> bool {
        matches!(
            self,
            Expr::Compare { .. }
                | Expr::And(..)
                | Expr::Or(..)
                | Expr::Not(_)
                | Expr::Literal(Value::Bool(_))
        )
    }
}

/// Parse a complete expression; trailing tokens are an error.
pub(crate) fn parse(expr: &str) -> Result<Expr, FormulaError> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser {
        expr,
        tokens,
        pos: 0,
        depth: 0,
    };
    let tree = parser.or_expr()?;
    if let Some(spanned) = parser.tokens.get(parser.pos) {
        return Err(FormulaError::syntax(
            expr,
            spanned.offset,
            format!("unexpected trailing token {:?}", spanned.token),
        ));
    }
    Ok(tree)
}

struct Parser<'a> {
    expr: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|spanned| &spanned.token)
    }

    fn peek_at(&self, ahead: usize) -> Option<&Token> {
        self.tokens
            .get(self.pos + ahead)
            .map(|spanned| &spanned.token)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|spanned| spanned.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> FormulaError {
        let offset = self
            .tokens
            .get(self.pos)
            .map(|spanned| spanned.offset)
            .unwrap_or(self.expr.len());
        FormulaError::syntax(self.expr, offset, message)
    }

    /// Account for one more level of tree depth.
    fn enter(&mut self) -> Result<(), FormulaError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error("expression nested too deeply"));
        }
        Ok(())
    }

    fn leave(&mut self, levels: usize) {
        self.depth -= levels;
    }

    // Left-associative chains grow the tree by one level per operator, so
    // every link counts against the depth limit.
    fn or_expr(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.and_expr()?;
        let mut links = 0;
        while self.eat(&Token::Or) {
            self.enter()?;
            links += 1;
            let rhs = self.and_expr()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        self.leave(links);
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.not_expr()?;
        let mut links = 0;
        while self.eat(&Token::And) {
            self.enter()?;
            links += 1;
            let rhs = self.not_expr()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        self.leave(links);
        Ok(lhs)
    }

    fn not_expr(&mut self) -> Result<Expr, FormulaError> {
        if self.eat(&Token::Not) {
            self.enter()?;
            let inner = self.not_expr()?;
            self.leave(1);
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, FormulaError> {
        let first = self.additive()?;
        let mut rest = Vec::new();
        while let Some(op) = self.comparison_op() {
            rest.push((op, self.additive()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare {
                first: Box::new(first),
                rest,
            })
        }
    }

    fn comparison_op(&mut self) -> Option<CmpOp> {
        let (op, width) = match (self.peek()?, self.peek_at(1)) {
            (Token::Eq, _) => (CmpOp::Eq, 1),
            (Token::Ne, _) => (CmpOp::Ne, 1),
            (Token::Lt, _) => (CmpOp::Lt, 1),
            (Token::Le, _) => (CmpOp::Le, 1),
            (Token::Gt, _) => (CmpOp::Gt, 1),
            (Token::Ge, _) => (CmpOp::Ge, 1),
            (Token::In, _) => (CmpOp::In, 1),
            (Token::Not, Some(Token::In)) => (CmpOp::NotIn, 2),
            _ => return None,
        };
        self.pos += width;
        Some(op)
    }

    fn additive(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.term()?;
        let mut links = 0;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => ArithOp::Add,
                Some(Token::Minus) => ArithOp::Sub,
                _ => {
                    self.leave(links);
                    return Ok(lhs);
                }
            };
            self.pos += 1;
            self.enter()?;
            links += 1;
            let rhs = self.term()?;
            lhs = Expr::Arith {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn term(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.unary()?;
        let mut links = 0;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => ArithOp::Mul,
                Some(Token::Slash) => ArithOp::Div,
                Some(Token::Percent) => ArithOp::Rem,
                _ => {
                    self.leave(links);
                    return Ok(lhs);
                }
            };
            self.pos += 1;
            self.enter()?;
            links += 1;
            let rhs = self.unary()?;
            lhs = Expr::Arith {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        if self.eat(&Token::Minus) {
            self.enter()?;
            let inner = self.unary()?;
            self.leave(1);
            return Ok(Expr::Neg(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, FormulaError> {
        let Some(token) = self.advance() else {
            return Err(self.error("unexpected end of expression"));
        };
        let expr = match token {
            Token::Int(value) => Expr::Literal(Value::Int(value)),
            Token::Float(value) => Expr::Literal(Value::Float(value)),
            Token::Str(value) => Expr::Literal(Value::Str(value)),
            Token::True => Expr::Literal(Value::Bool(true)),
            Token::False => Expr::Literal(Value::Bool(false)),
            Token::None => Expr::Literal(Value::None),
            Token::Ident(name) => Expr::Ident(name),
            Token::Var(name) => Expr::Var(name),
            Token::LParen => {
                self.enter()?;
                let inner = self.or_expr()?;
                if !self.eat(&Token::RParen) {
                    return Err(self.error("expected `)`"));
                }
                self.leave(1);
                inner
            }
            Token::LBracket => {
                self.enter()?;
                let items = self.list_items()?;
                self.leave(1);
                Expr::List(items)
            }
            other => {
                self.pos -= 1;
                return Err(self.error(format!("unexpected token {other:?}")));
            }
        };
        Ok(expr)
    }

    fn list_items(&mut self) -> Result<Vec<Expr>, FormulaError> {
        let mut items = Vec::new();
        loop {
            if self.eat(&Token::RBracket) {
                return Ok(items);
            }
            items.push(self.or_expr()?);
            if self.eat(&Token::RBracket) {
                return Ok(items);
            }
            if !self.eat(&Token::Comma) {
                return Err(self.error("expected `,` or `]`"));
            }
        }
    }
}
