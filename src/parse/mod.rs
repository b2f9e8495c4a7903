mod error;
mod grammar;
mod parser;

pub use error::ParseError;
pub use parser::ParsedTemplates;

/// Parse a DSL document of named templates into a [`ParsedTemplates`].
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not valid DSL syntax.
pub fn parse(input: &str) -> Result<ParsedTemplates, ParseError> {
    use winnow::Parser;
    grammar::parse_templates
        .parse(input)
        .map_err(|e| ParseError::new(e.to_string()))
}

/// Parse a single bare operation (`query { ... }`) as a template named
/// `name`. Convenient when templates are assembled programmatically rather
/// than loaded from a document.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a single valid operation.
pub fn parse_operation(name: &str, input: &str) -> Result<crate::Template, ParseError> {
    use winnow::Parser;
    let (kind, selections) = grammar::single_operation
        .parse(input)
        .map_err(|e| ParseError::new(e.to_string()))?;
    Ok(crate::Template {
        name: name.to_owned(),
        kind,
        selections,
    })
}
