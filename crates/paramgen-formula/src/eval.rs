//! Evaluation of parsed guard expressions.

use crate::FormulaError;
use crate::parser::{ArithOp, CmpOp, Expr};
use std::cmp::Ordering;
use std::fmt;

/// Result of evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    /// Python-style truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(value) => *value,
            Value::Int(value) => *value != 0,
            Value::Float(value) => *value != 0.0,
            Value::Str(value) => !value.is_empty(),
            Value::List(items) => !items.is_empty(),
        }
    }

    /// Strict boolean view; `None` for every non-boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value:?}"),
            Value::Str(value) => write!(f, "'{value}'"),
            Value::List(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Evaluates an expression tree; `source` is only used in error messages.
pub(crate) struct Evaluator<'a> {
    source: &'a str,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self { source }
    }

    pub(crate) fn eval(&self, expr: &Expr) -> Result<Value, FormulaError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Ident(name) => Ok(Value::Str(name.clone())),
            Expr::Var(name) => Err(FormulaError::UnresolvedVariable {
                expr: self.source.to_string(),
                name: name.clone(),
            }),
            Expr::List(items) => items
                .iter()
                .map(|item| self.eval(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Expr::Not(inner) => Ok(Value::Bool(!self.eval(inner)?.is_truthy())),
            Expr::Neg(inner) => match self.eval(inner)? {
                Value::Int(value) => value
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| self.type_error("integer overflow")),
                Value::Float(value) => Ok(Value::Float(-value)),
                other => Err(self.type_error(format!("cannot negate {}", other.type_name()))),
            },
            // `and`/`or` short-circuit and yield an operand, not a coerced bool.
            Expr::And(lhs, rhs) => {
                let lhs = self.eval(lhs)?;
                if lhs.is_truthy() {
                    self.eval(rhs)
                } else {
                    Ok(lhs)
                }
            }
            Expr::Or(lhs, rhs) => {
                let lhs = self.eval(lhs)?;
                if lhs.is_truthy() {
                    Ok(lhs)
                } else {
                    self.eval(rhs)
                }
            }
            Expr::Compare { first, rest } => {
                let mut lhs = self.eval(first)?;
                for (op, rhs) in rest {
                    let rhs = self.eval(rhs)?;
                    if !self.compare(*op, &lhs, &rhs)? {
                        return Ok(Value::Bool(false));
                    }
                    lhs = rhs;
                }
                Ok(Value::Bool(true))
            }
            Expr::Arith { op, lhs, rhs } => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                self.arith(*op, lhs, rhs)
            }
        }
    }

    fn compare(&self, op: CmpOp, lhs: &Value, rhs: &Value) -> Result<bool, FormulaError> {
        match op {
            CmpOp::Eq => Ok(values_equal(lhs, rhs)),
            CmpOp::Ne => Ok(!values_equal(lhs, rhs)),
            CmpOp::In => self.contains(rhs, lhs),
            CmpOp::NotIn => self.contains(rhs, lhs).map(|found| !found),
            CmpOp::Lt | CmpOp::Le | CmpOp::Gt | CmpOp::Ge => {
                let ordering = self.order(lhs, rhs)?;
                Ok(match op {
                    CmpOp::Lt => ordering == Ordering::Less,
                    CmpOp::Le => ordering != Ordering::Greater,
                    CmpOp::Gt => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                })
            }
        }
    }

    fn order(&self, lhs: &Value, rhs: &Value) -> Result<Ordering, FormulaError> {
        match (lhs, rhs) {
            (Value::Str(lhs), Value::Str(rhs)) => Ok(lhs.cmp(rhs)),
            (Value::Bool(lhs), Value::Bool(rhs)) => Ok(lhs.cmp(rhs)),
            _ => match (lhs.as_f64(), rhs.as_f64()) {
                (Some(lhs), Some(rhs)) => lhs
                    .partial_cmp(&rhs)
                    .ok_or_else(|| self.type_error("cannot order NaN")),
                _ => Err(self.type_error(format!(
                    "cannot order {} and {}",
                    lhs.type_name(),
                    rhs.type_name()
                ))),
            },
        }
    }

    fn contains(&self, container: &Value, item: &Value) -> Result<bool, FormulaError> {
        match (container, item) {
            (Value::List(items), item) => Ok(items.iter().any(|entry| values_equal(entry, item))),
            (Value::Str(haystack), Value::Str(needle)) => Ok(haystack.contains(needle.as_str())),
            _ => Err(self.type_error(format!(
                "cannot test membership of {} in {}",
                item.type_name(),
                container.type_name()
            ))),
        }
    }

    fn arith(&self, op: ArithOp, lhs: Value, rhs: Value) -> Result<Value, FormulaError> {
        match (op, lhs, rhs) {
            (ArithOp::Add, Value::Str(lhs), Value::Str(rhs)) => Ok(Value::Str(lhs + &rhs)),
            (ArithOp::Div, lhs, rhs) => {
                let (lhs, rhs) = self.numeric_pair(op, &lhs, &rhs)?;
                if rhs == 0.0 {
                    return Err(self.division_by_zero());
                }
                Ok(Value::Float(lhs / rhs))
            }
            (op, Value::Int(lhs), Value::Int(rhs)) => {
                let result = match op {
                    ArithOp::Add => lhs.checked_add(rhs),
                    ArithOp::Sub => lhs.checked_sub(rhs),
                    ArithOp::Mul => lhs.checked_mul(rhs),
                    ArithOp::Rem if rhs == 0 => return Err(self.division_by_zero()),
                    // Sign follows the divisor.
                    ArithOp::Rem => lhs.checked_rem(rhs).map(|rem| {
                        if rem != 0 && (rem < 0) != (rhs < 0) {
                            rem + rhs
                        } else {
                            rem
                        }
                    }),
                    ArithOp::Div => unreachable!("division handled above"),
                };
                result
                    .map(Value::Int)
                    .ok_or_else(|| self.type_error("integer overflow"))
            }
            (op, lhs, rhs) => {
                let (lhs, rhs) = self.numeric_pair(op, &lhs, &rhs)?;
                let result = match op {
                    ArithOp::Add => lhs + rhs,
                    ArithOp::Sub => lhs - rhs,
                    ArithOp::Mul => lhs * rhs,
                    ArithOp::Rem if rhs == 0.0 => return Err(self.division_by_zero()),
                    ArithOp::Rem => lhs - rhs * (lhs / rhs).floor(),
                    ArithOp::Div => lhs / rhs,
                };
                Ok(Value::Float(result))
            }
        }
    }

    fn numeric_pair(
        &self,
        op: ArithOp,
        lhs: &Value,
        rhs: &Value,
    ) -> Result<(f64, f64), FormulaError> {
        match (lhs.as_f64(), rhs.as_f64()) {
            (Some(lhs), Some(rhs)) => Ok((lhs, rhs)),
            _ => Err(self.type_error(format!(
                "unsupported operands for {op:?}: {} and {}",
                lhs.type_name(),
                rhs.type_name()
            ))),
        }
    }

    fn type_error(&self, message: impl Into<String>) -> FormulaError {
        FormulaError::type_error(self.source, message)
    }

    fn division_by_zero(&self) -> FormulaError {
        FormulaError::DivisionByZero {
            expr: self.source.to_string(),
        }
    }
}

/// Equality with numeric coercion between ints and floats.
fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::List(lhs), Value::List(rhs)) => {
            lhs.len() == rhs.len() && lhs.iter().zip(rhs).all(|(a, b)| values_equal(a, b))
        }
        (Value::Int(lhs), Value::Int(rhs)) => lhs == rhs,
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            lhs.as_f64() == rhs.as_f64()
        }
        _ => lhs == rhs,
    }
}
