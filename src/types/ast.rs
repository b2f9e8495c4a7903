use std::fmt;
use std::ops::Not;

/// Comparison operators available in template argument constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "="),
            CompareOp::Ne => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Ge => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Le => write!(f, "<="),
        }
    }
}

/// Kind of a GraphQL operation. Subscriptions parse but are rejected at
/// compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    /// Root path segment for hashing; keeps query and mutation trees apart.
    pub(crate) fn root_segment(self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        }
    }
}

/// A named allow-list template: one operation a client is permitted to send.
///
/// Templates are produced by [`parse()`](crate::parse()) or constructed
/// directly. Their position in the slice passed to
/// [`compile()`](crate::compile()) becomes their bit index in match results.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub name: String,
    pub kind: OperationKind,
    pub selections: Vec<Selection>,
}

/// One entry in a selection set.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Field(FieldNode),
    /// Inline fragment: `... on Type { ... }`. The type condition becomes a
    /// path discriminator so same-named fields under different conditions
    /// occupy distinct buckets.
    Fragment {
        type_name: String,
        selections: Vec<Selection>,
    },
    /// Bounded repetition: `max N { ... }`. The wrapped selections are
    /// optional, but at most `limit` of their occurrences may appear in one
    /// query.
    Repeat {
        limit: u32,
        selections: Vec<Selection>,
    },
}

/// A field with its argument constraints and sub-selections.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldNode {
    pub name: String,
    pub args: Vec<(String, ConstraintExpr)>,
    pub selections: Vec<Selection>,
}

impl FieldNode {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            args: Vec::new(),
            selections: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, name: &str, constraint: ConstraintExpr) -> Self {
        self.args.push((name.to_owned(), constraint));
        self
    }

    #[must_use]
    pub fn select(mut self, child: FieldNode) -> Self {
        self.selections.push(Selection::Field(child));
        self
    }
}

/// Argument constraint expression as written in a template.
///
/// This is the closed grammar accepted by the compiler; anything else is an
/// upstream parser bug and compilation fails fast.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintExpr {
    /// `*`: accept any value.
    Any,
    /// `$name`: the argument is fed from a declared variable; accepts any
    /// resolved value (typing is the schema layer's concern).
    Variable(String),
    Not(Box<ConstraintExpr>),
    And(Box<ConstraintExpr>, Box<ConstraintExpr>),
    Or(Box<ConstraintExpr>, Box<ConstraintExpr>),
    /// `val <op> <operand>`.
    Compare { op: CompareOp, operand: OperandExpr },
    /// `len <op> <n>`: byte length of strings, element count of lists.
    Length { op: CompareOp, operand: u64 },
}

/// Right-hand side of a `val` comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum OperandExpr {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    /// `[c1, c2, ...]`: positional, order-sensitive element constraints.
    List(Vec<ConstraintExpr>),
    /// `[... c]`: broadcast one constraint over every element.
    Each(Box<ConstraintExpr>),
    /// `{k: c, ...}`: exact-cardinality object constraint.
    Object(Vec<(String, ConstraintExpr)>),
}

impl ConstraintExpr {
    #[must_use]
    pub fn and(self, other: ConstraintExpr) -> ConstraintExpr {
        ConstraintExpr::And(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn or(self, other: ConstraintExpr) -> ConstraintExpr {
        ConstraintExpr::Or(Box::new(self), Box::new(other))
    }
}

impl Not for ConstraintExpr {
    type Output = ConstraintExpr;

    fn not(self) -> ConstraintExpr {
        ConstraintExpr::Not(Box::new(self))
    }
}

/// Shorthand for `val <op> <operand>` used by the builder-style API.
#[must_use]
pub fn val(op: CompareOp, operand: OperandExpr) -> ConstraintExpr {
    ConstraintExpr::Compare { op, operand }
}
