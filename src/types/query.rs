use super::ast::OperationKind;
use super::value::QueryValue;

/// An incoming GraphQL operation prepared for matching: parsed selections
/// with argument values, variables already substituted by the caller.
///
/// # Example
///
/// ```
/// use gqlgate::{QueryDoc, QueryField};
///
/// let doc = QueryDoc::query()
///     .field(QueryField::new("user").arg("id", 7_i64).select(QueryField::new("name")));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDoc {
    pub kind: OperationKind,
    pub selections: Vec<QuerySelection>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuerySelection {
    Field(QueryField),
    Fragment {
        type_name: String,
        selections: Vec<QuerySelection>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryField {
    pub name: String,
    pub args: Vec<(String, QueryValue)>,
    pub selections: Vec<QuerySelection>,
}

impl QueryDoc {
    #[must_use]
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            selections: Vec::new(),
        }
    }

    #[must_use]
    pub fn query() -> Self {
        Self::new(OperationKind::Query)
    }

    #[must_use]
    pub fn mutation() -> Self {
        Self::new(OperationKind::Mutation)
    }

    #[must_use]
    pub fn field(mut self, field: QueryField) -> Self {
        self.selections.push(QuerySelection::Field(field));
        self
    }

    #[must_use]
    pub fn fragment(mut self, type_name: &str, selections: Vec<QuerySelection>) -> Self {
        self.selections.push(QuerySelection::Fragment {
            type_name: type_name.to_owned(),
            selections,
        });
        self
    }
}

impl QueryField {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            args: Vec::new(),
            selections: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, name: &str, value: impl Into<QueryValue>) -> Self {
        self.args.push((name.to_owned(), value.into()));
        self
    }

    #[must_use]
    pub fn select(mut self, child: QueryField) -> Self {
        self.selections.push(QuerySelection::Field(child));
        self
    }

    #[must_use]
    pub fn fragment(mut self, type_name: &str, selections: Vec<QuerySelection>) -> Self {
        self.selections.push(QuerySelection::Fragment {
            type_name: type_name.to_owned(),
            selections,
        });
        self
    }
}

impl From<QueryField> for QuerySelection {
    fn from(field: QueryField) -> Self {
        QuerySelection::Field(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QueryValue;

    #[test]
    fn builder_shapes() {
        let doc = QueryDoc::query().field(
            QueryField::new("user")
                .arg("id", 7_i64)
                .select(QueryField::new("name")),
        );
        assert_eq!(doc.kind, OperationKind::Query);
        assert_eq!(doc.selections.len(), 1);
        let QuerySelection::Field(user) = &doc.selections[0] else {
            panic!("expected field");
        };
        assert_eq!(user.args, vec![("id".to_owned(), QueryValue::Int(7))]);
        assert_eq!(user.selections.len(), 1);
    }

    #[test]
    fn fragment_selection() {
        let doc = QueryDoc::query().fragment(
            "Admin",
            vec![QueryField::new("permissions").into()],
        );
        assert!(matches!(
            &doc.selections[0],
            QuerySelection::Fragment { type_name, .. } if type_name == "Admin"
        ));
    }
}
