use std::cmp::Ordering;

use super::ast::CompareOp;
use super::value::QueryValue;

/// One compiled constraint with its negation flag.
///
/// Negation is applied once, at the outermost comparison: a negated
/// constraint over a compound (array/object) value flips the final result,
/// it does not distribute element-wise into nested substructure.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Elem {
    pub(crate) negated: bool,
    pub(crate) constraint: Constraint,
}

impl Elem {
    pub(crate) fn new(constraint: Constraint) -> Self {
        Self {
            negated: false,
            constraint,
        }
    }

    /// Evaluate this constraint against a decomposed value. `None` is the
    /// plain structural leaf: only the wildcard accepts it.
    pub(crate) fn matches(&self, value: Option<&QueryValue>) -> bool {
        self.constraint.matches(value) ^ self.negated
    }
}

/// Closed set of compiled constraint shapes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Constraint {
    /// Wildcard: accepts anything, including plain structural parts.
    Any,
    And(Vec<Elem>),
    Or(Vec<Elem>),
    /// Broadcast one element constraint over every element of an array
    /// value. An empty array trivially satisfies.
    Map(Box<Elem>),
    Cmp(CompareOp, Operand),
    /// Byte length of strings, element count of arrays.
    Len(CompareOp, u64),
}

/// Typed payload of a comparison constraint.
///
/// String scalars are normalized to raw bytes at compile time so matching
/// compares byte-wise without re-encoding.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand {
    Int(i64),
    Float(f64),
    Bool(bool),
    Bytes(Vec<u8>),
    Array(Vec<Elem>),
    Object(Vec<(String, Elem)>),
}

impl Constraint {
    fn matches(&self, value: Option<&QueryValue>) -> bool {
        match self {
            Constraint::Any => true,
            Constraint::And(elems) => elems.iter().all(|e| e.matches(value)),
            Constraint::Or(elems) => elems.iter().any(|e| e.matches(value)),
            Constraint::Map(inner) => match value {
                Some(QueryValue::List(items)) => {
                    items.iter().all(|item| inner.matches(Some(item)))
                }
                _ => false,
            },
            Constraint::Cmp(op, operand) => compare(*op, operand, value),
            Constraint::Len(op, expected) => match value {
                Some(QueryValue::Str(s)) => length_ok(*op, s.len() as u64, *expected),
                Some(QueryValue::List(items)) => length_ok(*op, items.len() as u64, *expected),
                _ => false,
            },
        }
    }
}

fn compare(op: CompareOp, operand: &Operand, value: Option<&QueryValue>) -> bool {
    // Compound payloads support only (in)equality; the negation of Ne is
    // applied once here, at the outermost comparison.
    match (operand, value) {
        (Operand::Array(elems), Some(QueryValue::List(items))) => {
            let neg = op == CompareOp::Ne;
            if op != CompareOp::Eq && op != CompareOp::Ne {
                return false;
            }
            let equal = elems.len() == items.len()
                && elems
                    .iter()
                    .zip(items)
                    .all(|(e, item)| e.matches(Some(item)));
            equal ^ neg
        }
        (Operand::Object(fields), Some(QueryValue::Object(entries))) => {
            let neg = op == CompareOp::Ne;
            if op != CompareOp::Eq && op != CompareOp::Ne {
                return false;
            }
            let equal = fields.len() == entries.len()
                && fields.iter().all(|(name, elem)| {
                    entries
                        .iter()
                        .find(|(k, _)| k == name)
                        .is_some_and(|(_, v)| elem.matches(Some(v)))
                });
            equal ^ neg
        }
        (Operand::Int(a), Some(QueryValue::Int(b))) => ordering_ok(op, b.cmp(a)),
        (Operand::Float(a), Some(QueryValue::Float(b))) => match b.partial_cmp(a) {
            Some(ord) => ordering_ok(op, ord),
            // NaN on either side: only "not equal" holds.
            None => op == CompareOp::Ne,
        },
        (Operand::Bool(a), Some(QueryValue::Bool(b))) => match op {
            CompareOp::Eq => a == b,
            CompareOp::Ne => a != b,
            _ => false,
        },
        (Operand::Bytes(a), Some(QueryValue::Str(b))) => match op {
            CompareOp::Eq => b.as_bytes() == a.as_slice(),
            CompareOp::Ne => b.as_bytes() != a.as_slice(),
            _ => false,
        },
        // Mismatched shapes and mismatched numeric kinds compare false; no
        // coercion between integers and floats.
        _ => false,
    }
}

fn ordering_ok(op: CompareOp, ord: Ordering) -> bool {
    match op {
        CompareOp::Eq => ord == Ordering::Equal,
        CompareOp::Ne => ord != Ordering::Equal,
        CompareOp::Gt => ord == Ordering::Greater,
        CompareOp::Ge => ord != Ordering::Less,
        CompareOp::Lt => ord == Ordering::Less,
        CompareOp::Le => ord != Ordering::Greater,
    }
}

fn length_ok(op: CompareOp, actual: u64, expected: u64) -> bool {
    ordering_ok(op, actual.cmp(&expected))
}
