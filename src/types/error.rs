use thiserror::Error;

/// A single unsupported-construct finding, reported with every other
/// finding so a bad configuration is rejected with a complete picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileIssue {
    /// Name of the offending template.
    pub template: String,
    /// What the compiler could not accept.
    pub detail: String,
}

impl std::fmt::Display for CompileIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "template '{}': {}", self.template, self.detail)
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("duplicate template name '{name}'")]
    DuplicateTemplate { name: String },

    /// The configuration was rejected wholesale; every finding is listed.
    #[error("configuration rejected: {}", issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Rejected { issues: Vec<CompileIssue> },

    /// Path-hash collisions persisted across every reseed attempt.
    #[error("path hash collision not resolved after {attempts} seed attempts (last colliding path '{path}')")]
    SeedsExhausted { attempts: u32, path: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_template_message() {
        let err = CompileError::DuplicateTemplate {
            name: "find_user".into(),
        };
        assert_eq!(err.to_string(), "duplicate template name 'find_user'");
    }

    #[test]
    fn rejected_lists_every_issue() {
        let err = CompileError::Rejected {
            issues: vec![
                CompileIssue {
                    template: "a".into(),
                    detail: "subscription operations are not supported".into(),
                },
                CompileIssue {
                    template: "b".into(),
                    detail: "ordering comparison over a list operand".into(),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("template 'a': subscription operations are not supported"));
        assert!(msg.contains("template 'b': ordering comparison over a list operand"));
    }

    #[test]
    fn seeds_exhausted_message() {
        let err = CompileError::SeedsExhausted {
            attempts: 32,
            path: "query.user:id".into(),
        };
        assert_eq!(
            err.to_string(),
            "path hash collision not resolved after 32 seed attempts (last colliding path 'query.user:id')"
        );
    }
}
