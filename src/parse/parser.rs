use crate::Template;

/// The result of parsing a template DSL document.
#[derive(Debug)]
pub struct ParsedTemplates {
    pub templates: Vec<Template>,
}
