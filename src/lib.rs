//! GraphQL allow-list matching: compile operation templates into a
//! hash-indexed rule table, then stream decomposed queries through it to
//! decide which templates, if any, admit each query.
//!
//! The two-phase split keeps the hot path allocation-light: [`compile()`]
//! runs once per configuration change and produces an immutable
//! [`RuleTable`]; per-query scratch lives in a reusable [`MatchSession`].
//!
//! ```
//! use gqlgate::{parse, QueryDoc, QueryField};
//!
//! let templates = parse(
//!     "template find_user:\n  query { user(id: $id) { name } }",
//! )?;
//! let table = gqlgate::compile(&templates.templates)?;
//!
//! let doc = QueryDoc::query().field(
//!     QueryField::new("user").arg("id", 7_i64).select(QueryField::new("name")),
//! );
//! let mut session = table.session();
//! assert_eq!(table.match_first(&doc, &mut session), Some("find_user"));
//! # Ok::<(), gqlgate::GqlgateError>(())
//! ```

mod compile;
mod decompose;
mod error;
mod hash;
mod matching;
pub mod parse;
mod types;

pub use compile::CompileOptions;
pub use error::GqlgateError;
pub use parse::{parse, parse_operation};
pub use types::{
    val, BitSet, CompareOp, CompileError, CompileIssue, ConstraintExpr, FieldNode, MatchSession,
    OperandExpr, OperationKind, QueryDoc, QueryField, QueryPart, QuerySelection, QueryValue,
    RuleTable, Selection, Template,
};

/// Compile templates into an immutable [`RuleTable`] with default options.
///
/// Template order is significant: each template's position becomes its bit
/// index in match results, and [`RuleTable::match_first`] prefers the lowest
/// index on ties.
///
/// # Errors
///
/// Returns [`CompileError`] on duplicate template names, unsupported
/// constructs, or if no seed yields a collision-free table.
pub fn compile(templates: &[Template]) -> Result<RuleTable, CompileError> {
    compile::compile(templates, CompileOptions::default())
}

/// [`compile()`] with explicit [`CompileOptions`].
pub fn compile_with(
    templates: &[Template],
    options: CompileOptions,
) -> Result<RuleTable, CompileError> {
    compile::compile(templates, options)
}
