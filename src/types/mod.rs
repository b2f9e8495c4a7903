mod ast;
mod bitset;
pub(crate) mod constraint;
mod error;
mod query;
pub(crate) mod table;
pub(crate) mod tally;
mod value;

pub use ast::{val, CompareOp, ConstraintExpr, FieldNode, OperandExpr, OperationKind, Selection, Template};
pub use bitset::BitSet;
pub use error::{CompileError, CompileIssue};
pub use query::{QueryDoc, QueryField, QuerySelection};
pub use table::{MatchSession, RuleTable};
pub use value::{QueryPart, QueryValue};
