//! Row predicates for batched updates and deletes.
//!
//! A predicate is written as a typed [`Expr`] tree and compiled once against
//! the view's fields into a reusable closure:
//!
//! ```
//! use horizon_grid::model::{DataType, Field};
//! use horizon_grid::predicate::{Expr, Predicate};
//!
//! let fields = vec![
//!     Field::new(0, "State"),
//!     Field::new(1, "Qty").with_data_type(DataType::Int),
//! ];
//! let expr = Expr::column(0).eq(Expr::text("CA")).and(Expr::column(1).gt(Expr::int(10)));
//! let predicate = Predicate::compile(&expr, &fields);
//! assert!(predicate.is_valid());
//! ```
//!
//! Compilation fails closed: an expression that references a missing column
//! or uses an operator on operands it cannot apply to compiles to a predicate
//! that matches no row. The failure is logged at error level and reported by
//! [`Predicate::is_valid`] and [`Predicate::error`].

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::ops::Not;

use horizon_grid_core::logging::targets;

use crate::model::{CompareValue, DataType, Field, Row, RowId};

/// A literal operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Text converted through the data type of the column it is compared with.
    Coerce(String),
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical negation of a boolean operand.
    Not,
    /// `true` for empty text and absent dates or times.
    IsEmpty,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Substring test on text.
    Contains,
    /// Prefix test on text.
    StartsWith,
    And,
    Or,
}

impl BinaryOp {
    fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    fn is_ordering(self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge)
    }

    fn is_textual(self) -> bool {
        matches!(self, BinaryOp::Contains | BinaryOp::StartsWith)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Contains => "contains",
            BinaryOp::StartsWith => "starts-with",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        };
        f.write_str(symbol)
    }
}

/// A predicate expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    /// The compare value of a column (display text for text operators).
    Column(usize),
    /// The row's id, as an integer.
    RowId,
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

// Builder methods named after the operators they build.
#[allow(clippy::should_implement_trait)]
impl Expr {
    pub fn column(index: usize) -> Self {
        Expr::Column(index)
    }

    pub fn row_id() -> Self {
        Expr::RowId
    }

    pub fn text(value: impl Into<String>) -> Self {
        Expr::Literal(Literal::Text(value.into()))
    }

    pub fn int(value: i64) -> Self {
        Expr::Literal(Literal::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Expr::Literal(Literal::Float(value))
    }

    pub fn bool(value: bool) -> Self {
        Expr::Literal(Literal::Bool(value))
    }

    /// Text converted through the data type of the column it meets.
    pub fn coerce(value: impl Into<String>) -> Self {
        Expr::Literal(Literal::Coerce(value.into()))
    }

    fn binary(self, op: BinaryOp, rhs: Expr) -> Self {
        Expr::Binary(op, Box::new(self), Box::new(rhs))
    }

    pub fn eq(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Eq, rhs)
    }

    pub fn ne(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Ne, rhs)
    }

    pub fn lt(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Lt, rhs)
    }

    pub fn le(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Le, rhs)
    }

    pub fn gt(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Gt, rhs)
    }

    pub fn ge(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Ge, rhs)
    }

    pub fn contains(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Contains, rhs)
    }

    pub fn starts_with(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::StartsWith, rhs)
    }

    pub fn and(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::And, rhs)
    }

    pub fn or(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Or, rhs)
    }

    pub fn is_empty(self) -> Self {
        Expr::Unary(UnaryOp::IsEmpty, Box::new(self))
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Unary(UnaryOp::Not, Box::new(self))
    }
}

/// Why an expression failed to compile.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredicateError {
    #[error("column {column} does not exist ({field_count} fields)")]
    UnknownColumn { column: usize, field_count: usize },

    #[error("operator '{op}' needs {expected} operands")]
    OperandType { op: String, expected: &'static str },

    #[error("cannot order {left} values against {right} values")]
    Incomparable {
        left: &'static str,
        right: &'static str,
    },
}

type BoolFn = Box<dyn Fn(&Row) -> bool + Send + Sync>;
type ValueFn = Box<dyn for<'r> Fn(&'r Row) -> Cow<'r, CompareValue> + Send + Sync>;
type TextFn = Box<dyn for<'r> Fn(&'r Row) -> Cow<'r, str> + Send + Sync>;

fn bool_fn<F>(f: F) -> BoolFn
where
    F: Fn(&Row) -> bool + Send + Sync + 'static,
{
    Box::new(f)
}

fn value_fn<F>(f: F) -> ValueFn
where
    F: for<'r> Fn(&'r Row) -> Cow<'r, CompareValue> + Send + Sync + 'static,
{
    Box::new(f)
}

fn text_fn<F>(f: F) -> TextFn
where
    F: for<'r> Fn(&'r Row) -> Cow<'r, str> + Send + Sync + 'static,
{
    Box::new(f)
}

enum Matcher {
    All,
    Ids(HashSet<RowId>),
    Compiled(BoolFn),
    Never,
}

/// A compiled row predicate.
pub struct Predicate {
    matcher: Matcher,
    error: Option<PredicateError>,
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.matcher {
            Matcher::All => "all",
            Matcher::Ids(_) => "ids",
            Matcher::Compiled(_) => "compiled",
            Matcher::Never => "never",
        };
        f.debug_struct("Predicate")
            .field("kind", &kind)
            .field("error", &self.error)
            .finish()
    }
}

impl Predicate {
    /// Matches every row.
    pub fn all() -> Self {
        Self {
            matcher: Matcher::All,
            error: None,
        }
    }

    /// Matches the rows with the given ids.
    pub fn row_ids(ids: impl IntoIterator<Item = RowId>) -> Self {
        Self {
            matcher: Matcher::Ids(ids.into_iter().collect()),
            error: None,
        }
    }

    /// Compiles an expression against a field list.
    ///
    /// The root must be boolean. Compilation never fails outright; an
    /// invalid expression yields a predicate that matches nothing.
    pub fn compile(expr: &Expr, fields: &[Field]) -> Self {
        let compiler = Compiler { fields };
        match compiler.boolean(expr) {
            Ok(matcher) => Self {
                matcher: Matcher::Compiled(matcher),
                error: None,
            },
            Err(err) => {
                tracing::error!(
                    target: targets::PREDICATE,
                    %err,
                    ?expr,
                    "predicate failed to compile; it matches no rows"
                );
                Self {
                    matcher: Matcher::Never,
                    error: Some(err),
                }
            }
        }
    }

    /// `false` if the expression failed to compile.
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&PredicateError> {
        self.error.as_ref()
    }

    pub fn matches(&self, row: &Row) -> bool {
        match &self.matcher {
            Matcher::All => true,
            Matcher::Ids(ids) => ids.contains(&row.id()),
            Matcher::Compiled(matcher) => matcher(row),
            Matcher::Never => false,
        }
    }
}

/// Static operand kinds, used to reject orderings that can never hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Text,
    Number,
    Date,
    Time,
    Timestamp,
    Bool,
    /// Coerced literal: takes the kind of the other operand.
    Any,
}

impl Kind {
    fn of_data_type(data_type: Option<DataType>) -> Self {
        match data_type {
            None | Some(DataType::String) | Some(DataType::InsensitiveString) => Kind::Text,
            Some(DataType::Int) | Some(DataType::Float) => Kind::Number,
            Some(DataType::Date) => Kind::Date,
            Some(DataType::Time) => Kind::Time,
            Some(DataType::Timestamp) => Kind::Timestamp,
            Some(DataType::Boolean) | Some(DataType::BooleanTf) => Kind::Bool,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Kind::Text => "text",
            Kind::Number => "numeric",
            Kind::Date => "date",
            Kind::Time => "time",
            Kind::Timestamp => "timestamp",
            Kind::Bool => "boolean",
            Kind::Any => "coerced",
        }
    }

    fn orders_with(self, other: Kind) -> bool {
        self == Kind::Any || other == Kind::Any || self == other
    }
}

struct Compiler<'f> {
    fields: &'f [Field],
}

impl Compiler<'_> {
    fn field(&self, column: usize) -> Result<&Field, PredicateError> {
        self.fields.get(column).ok_or(PredicateError::UnknownColumn {
            column,
            field_count: self.fields.len(),
        })
    }

    fn boolean(&self, expr: &Expr) -> Result<BoolFn, PredicateError> {
        match expr {
            Expr::Literal(Literal::Bool(b)) => {
                let b = *b;
                Ok(bool_fn(move |_| b))
            }
            Expr::Column(column) => {
                let field = self.field(*column)?;
                if Kind::of_data_type(field.data_type()) != Kind::Bool {
                    return Err(PredicateError::OperandType {
                        op: format!("column {column} as condition"),
                        expected: "boolean",
                    });
                }
                let column = *column;
                Ok(bool_fn(move |row| {
                    row.value(column).and_then(CompareValue::as_bool).unwrap_or(false)
                }))
            }
            Expr::Unary(UnaryOp::Not, inner) => {
                let inner = self.boolean(inner)?;
                Ok(bool_fn(move |row| !inner(row)))
            }
            Expr::Unary(UnaryOp::IsEmpty, inner) => {
                let (value, _) = self.value(inner, None)?;
                Ok(bool_fn(move |row| value(row).is_empty()))
            }
            Expr::Binary(op, lhs, rhs) if op.is_logical() => {
                let lhs = self.boolean(lhs)?;
                let rhs = self.boolean(rhs)?;
                Ok(match op {
                    BinaryOp::And => bool_fn(move |row| lhs(row) && rhs(row)),
                    _ => bool_fn(move |row| lhs(row) || rhs(row)),
                })
            }
            Expr::Binary(op, lhs_expr, rhs_expr) if op.is_textual() => {
                let lhs = self.text(lhs_expr, rhs_expr)?;
                let rhs = self.text(rhs_expr, lhs_expr)?;
                Ok(match op {
                    BinaryOp::Contains => bool_fn(move |row| lhs(row).contains(rhs(row).as_ref())),
                    _ => bool_fn(move |row| lhs(row).starts_with(rhs(row).as_ref())),
                })
            }
            Expr::Binary(op, lhs, rhs) => self.comparison(*op, lhs, rhs),
            Expr::Literal(_) | Expr::RowId => Err(PredicateError::OperandType {
                op: "condition".to_string(),
                expected: "boolean",
            }),
        }
    }

    fn comparison(&self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<BoolFn, PredicateError> {
        let (left, left_kind) = self.value(lhs, self.context(rhs)?)?;
        let (right, right_kind) = self.value(rhs, self.context(lhs)?)?;
        if op.is_ordering() && !left_kind.orders_with(right_kind) {
            return Err(PredicateError::Incomparable {
                left: left_kind.name(),
                right: right_kind.name(),
            });
        }
        let test: fn(Ordering) -> bool = match op {
            BinaryOp::Eq => Ordering::is_eq,
            BinaryOp::Ne => Ordering::is_ne,
            BinaryOp::Lt => Ordering::is_lt,
            BinaryOp::Le => Ordering::is_le,
            BinaryOp::Gt => Ordering::is_gt,
            _ => Ordering::is_ge,
        };
        Ok(bool_fn(move |row| test(left(row).compare(&right(row)))))
    }

    /// The field a coerced literal on the other side converts through.
    fn context(&self, other: &Expr) -> Result<Option<&Field>, PredicateError> {
        match other {
            Expr::Column(column) => self.field(*column).map(Some),
            _ => Ok(None),
        }
    }

    fn value(&self, expr: &Expr, context: Option<&Field>) -> Result<(ValueFn, Kind), PredicateError> {
        match expr {
            Expr::Column(column) => {
                let field = self.field(*column)?;
                let column = *column;
                let f = value_fn(move |row| match row.value(column) {
                    Some(value) => Cow::Borrowed(value),
                    None => Cow::Owned(CompareValue::default()),
                });
                Ok((f, Kind::of_data_type(field.data_type())))
            }
            Expr::RowId => {
                let f = value_fn(|row| {
                    let id = i64::try_from(row.id().get()).unwrap_or(i64::MAX);
                    Cow::Owned(CompareValue::Int(id))
                });
                Ok((f, Kind::Number))
            }
            Expr::Literal(literal) => {
                let (value, kind) = match literal {
                    Literal::Text(s) => (CompareValue::Text(s.clone()), Kind::Text),
                    Literal::Int(n) => (CompareValue::Int(*n), Kind::Number),
                    Literal::Float(n) => (CompareValue::from(*n), Kind::Number),
                    Literal::Bool(b) => (CompareValue::Bool(*b), Kind::Bool),
                    Literal::Coerce(s) => match context {
                        Some(field) => (field.convert(s).value, Kind::Any),
                        None => (CompareValue::Text(s.clone()), Kind::Any),
                    },
                };
                let f = value_fn(move |_| Cow::Owned(value.clone()));
                Ok((f, kind))
            }
            Expr::Unary(..) | Expr::Binary(..) => Err(PredicateError::OperandType {
                op: "comparison".to_string(),
                expected: "value",
            }),
        }
    }

    fn text(&self, expr: &Expr, other: &Expr) -> Result<TextFn, PredicateError> {
        match expr {
            Expr::Column(column) => {
                self.field(*column)?;
                let column = *column;
                Ok(text_fn(move |row| Cow::Borrowed(row.display(column).unwrap_or_default())))
            }
            Expr::RowId => Ok(text_fn(|row| Cow::Owned(row.id().to_string()))),
            Expr::Literal(literal) => {
                let text = match literal {
                    Literal::Text(s) => s.clone(),
                    Literal::Int(n) => n.to_string(),
                    Literal::Float(n) => n.to_string(),
                    Literal::Bool(b) => b.to_string(),
                    Literal::Coerce(s) => match self.context(other)? {
                        Some(field) => field.convert(s).display,
                        None => s.clone(),
                    },
                };
                Ok(text_fn(move |_| Cow::Owned(text.clone())))
            }
            Expr::Unary(..) | Expr::Binary(..) => Err(PredicateError::OperandType {
                op: "text test".to_string(),
                expected: "value",
            }),
        }
    }
}
