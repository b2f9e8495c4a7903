use std::fmt;

/// A decomposed argument value from an incoming query, with variables
/// already resolved by the caller.
///
/// Shapes mirror the compiled constraint payloads so the evaluator recurses
/// identically on both sides.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    List(Vec<QueryValue>),
    /// Ordered string-keyed map.
    Object(Vec<(String, QueryValue)>),
}

impl From<i64> for QueryValue {
    fn from(v: i64) -> Self {
        QueryValue::Int(v)
    }
}

impl From<f64> for QueryValue {
    fn from(v: f64) -> Self {
        QueryValue::Float(v)
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        QueryValue::Bool(v)
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::Str(v.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::Str(v)
    }
}

impl<T: Into<QueryValue>> From<Vec<T>> for QueryValue {
    fn from(v: Vec<T>) -> Self {
        QueryValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Null => write!(f, "null"),
            QueryValue::Int(v) => write!(f, "{v}"),
            QueryValue::Float(v) => write!(f, "{v}"),
            QueryValue::Bool(v) => write!(f, "{v}"),
            QueryValue::Str(v) => write!(f, "\"{v}\""),
            QueryValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            QueryValue::Object(fields) => {
                write!(f, "{{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// One streamed unit of a decomposed query: a path hash, the argument
/// ordinal within the owning field (0 = the field itself), and the value
/// carried at that path (`None` for plain structural parts).
#[derive(Debug, Clone, Copy)]
pub struct QueryPart<'a> {
    pub hash: u64,
    pub arg_ordinal: u32,
    pub value: Option<&'a QueryValue>,
}

impl QueryPart<'_> {
    /// Whether this part continues the preceding field part with an
    /// argument leaf. Combinator accounting skips continuations so a field
    /// with several arguments counts as one occurrence.
    #[must_use]
    pub fn is_arg_continuation(&self) -> bool {
        self.arg_ordinal > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_impls() {
        assert_eq!(QueryValue::from(42_i64), QueryValue::Int(42));
        assert_eq!(QueryValue::from(2.5_f64), QueryValue::Float(2.5));
        assert_eq!(QueryValue::from(true), QueryValue::Bool(true));
        assert_eq!(QueryValue::from("hi"), QueryValue::Str("hi".to_owned()));
        assert_eq!(
            QueryValue::from(vec![1_i64, 2]),
            QueryValue::List(vec![QueryValue::Int(1), QueryValue::Int(2)])
        );
    }

    #[test]
    fn display() {
        let v = QueryValue::Object(vec![
            ("a".to_owned(), QueryValue::from(vec!["x", "y"])),
            ("b".to_owned(), QueryValue::Null),
        ]);
        assert_eq!(v.to_string(), "{a: [\"x\", \"y\"], b: null}");
    }

    #[test]
    fn arg_continuation() {
        let v = QueryValue::Int(1);
        let field = QueryPart {
            hash: 1,
            arg_ordinal: 0,
            value: None,
        };
        let arg = QueryPart {
            hash: 2,
            arg_ordinal: 1,
            value: Some(&v),
        };
        assert!(!field.is_arg_continuation());
        assert!(arg.is_arg_continuation());
    }
}
