use thiserror::Error;

use crate::parse::ParseError;
use crate::CompileError;

/// Unified error type covering parsing and compilation.
///
/// Returned by convenience paths that go from DSL text straight to a
/// [`RuleTable`](crate::RuleTable), where either stage may fail.
#[derive(Debug, Error)]
pub enum GqlgateError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}
