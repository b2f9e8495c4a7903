use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::hash::{fragment_segment, next_seed, PathHasher};
use crate::types::constraint::{Constraint, Elem, Operand};
use crate::types::table::{Combination, RuleTable, Variant};
use crate::{
    CompareOp, CompileError, CompileIssue, ConstraintExpr, FieldNode, OperandExpr, OperationKind,
    Selection, Template,
};

/// Knobs for the compile loop, injectable for deterministic testing.
#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    /// Seed for the first build attempt; subsequent attempts derive new
    /// seeds deterministically.
    pub seed: u64,
    /// Bound on rebuild-from-scratch attempts after path-hash collisions.
    pub max_attempts: u32,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            seed: 0x6761_7465_5f76_3031,
            max_attempts: 32,
        }
    }
}

pub(crate) fn compile(
    templates: &[Template],
    options: CompileOptions,
) -> Result<RuleTable, CompileError> {
    check_duplicates(templates)?;

    let mut seed = options.seed;
    let mut last_collision = String::new();
    let attempts = options.max_attempts.max(1);

    for attempt in 0..attempts {
        debug!(attempt, seed, "building rule table");
        match Builder::new(seed).build(templates) {
            Ok(table) => return Ok(table),
            Err(BuildFailure::Rejected { issues }) => {
                return Err(CompileError::Rejected { issues });
            }
            Err(BuildFailure::Collision { path }) => {
                warn!(attempt, seed, %path, "path hash collision, reseeding");
                last_collision = path;
                seed = next_seed(seed);
            }
        }
    }

    Err(CompileError::SeedsExhausted {
        attempts,
        path: last_collision,
    })
}

fn check_duplicates(templates: &[Template]) -> Result<(), CompileError> {
    let mut seen = HashSet::new();
    for template in templates {
        if !seen.insert(template.name.as_str()) {
            return Err(CompileError::DuplicateTemplate {
                name: template.name.clone(),
            });
        }
    }
    Ok(())
}

enum BuildFailure {
    /// Two textually different paths hashed identically under this seed.
    Collision { path: String },
    /// Unsupported constructs; every finding across every template.
    Rejected { issues: Vec<CompileIssue> },
}

struct Builder {
    seed: u64,
    hasher: PathHasher,
    /// Canonical path strings mirroring the hasher stack.
    canon: Vec<String>,
    buckets: HashMap<u64, Vec<Variant>>,
    paths: HashMap<u64, String>,
    limits: Vec<u32>,
    required: Vec<u32>,
    issues: Vec<CompileIssue>,
    /// Slots of the enclosing `max` blocks, outermost first.
    repeat_stack: Vec<usize>,
    template: usize,
    template_name: String,
}

impl Builder {
    fn new(seed: u64) -> Self {
        Self {
            seed,
            hasher: PathHasher::new(seed),
            canon: Vec::new(),
            buckets: HashMap::new(),
            paths: HashMap::new(),
            limits: Vec::new(),
            required: Vec::new(),
            issues: Vec::new(),
            repeat_stack: Vec::new(),
            template: 0,
            template_name: String::new(),
        }
    }

    fn build(mut self, templates: &[Template]) -> Result<RuleTable, BuildFailure> {
        let mut template_ids = Vec::with_capacity(templates.len());

        for (index, template) in templates.iter().enumerate() {
            template_ids.push(template.name.clone());
            self.required.push(0);
            self.template = index;
            self.template_name.clone_from(&template.name);

            if template.kind == OperationKind::Subscription {
                self.issue("subscription operations are not supported");
                continue;
            }

            self.hasher = PathHasher::new(self.seed);
            self.hasher.push_field(template.kind.root_segment());
            self.canon.clear();
            self.canon.push(template.kind.root_segment().to_owned());
            self.repeat_stack.clear();

            self.selections(&template.selections)?;
        }

        if !self.issues.is_empty() {
            return Err(BuildFailure::Rejected {
                issues: self.issues,
            });
        }

        Ok(RuleTable {
            seed: self.seed,
            buckets: self.buckets,
            paths: self.paths,
            template_ids,
            limits: self.limits,
            required: self.required,
        })
    }

    fn issue(&mut self, detail: &str) {
        self.issues.push(CompileIssue {
            template: self.template_name.clone(),
            detail: detail.to_owned(),
        });
    }

    fn selections(&mut self, selections: &[Selection]) -> Result<(), BuildFailure> {
        for selection in selections {
            match selection {
                Selection::Field(field) => self.field(field)?,
                Selection::Fragment {
                    type_name,
                    selections,
                } => {
                    self.descend_field(&fragment_segment(type_name));
                    self.selections(selections)?;
                    self.ascend();
                }
                Selection::Repeat { limit, selections } => {
                    let slot = self.limits.len();
                    self.limits.push(*limit);
                    self.repeat_stack.push(slot);
                    self.selections(selections)?;
                    self.repeat_stack.pop();
                }
            }
        }
        Ok(())
    }

    fn field(&mut self, field: &FieldNode) -> Result<(), BuildFailure> {
        self.descend_field(&field.name);
        self.register(Elem::new(Constraint::Any))?;
        for (name, expr) in &field.args {
            self.descend_arg(name);
            let elem = self.lower(expr);
            self.register(elem)?;
            self.ascend();
        }
        self.selections(&field.selections)?;
        self.ascend();
        Ok(())
    }

    fn descend_field(&mut self, name: &str) {
        self.hasher.push_field(name);
        let parent = self.canon.last().map(String::as_str).unwrap_or_default();
        self.canon.push(format!("{parent}.{name}"));
    }

    fn descend_arg(&mut self, name: &str) {
        self.hasher.push_arg(name);
        let parent = self.canon.last().map(String::as_str).unwrap_or_default();
        self.canon.push(format!("{parent}:{name}"));
    }

    fn ascend(&mut self) {
        self.hasher.pop();
        self.canon.pop();
    }

    /// Register one part of the current template at the current path.
    ///
    /// Identical alternatives merge in place: the template's bit joins the
    /// existing Variant's mask and its repeat-block entries are appended.
    /// Re-registering the same path inside the same block is a no-op for
    /// the accounting entries, so `max 2 { a a }` still charges each query
    /// occurrence of `a` once.
    fn register(&mut self, elem: Elem) -> Result<(), BuildFailure> {
        let hash = self.hasher.current();
        let path = self.canon.last().cloned().unwrap_or_default();

        match self.paths.get(&hash) {
            Some(first) if *first != path => {
                return Err(BuildFailure::Collision { path });
            }
            Some(_) => {}
            None => {
                self.paths.insert(hash, path);
            }
        }

        if self.repeat_stack.is_empty() {
            self.required[self.template] += 1;
        }
        let combinations: Vec<Combination> = self
            .repeat_stack
            .iter()
            .enumerate()
            .map(|(depth, &slot)| Combination {
                slot,
                depth,
                owner: self.template,
            })
            .collect();

        let bucket = self.buckets.entry(hash).or_default();
        if let Some(existing) = bucket.iter_mut().find(|v| v.elem == elem) {
            existing.mask.insert(self.template);
            if self.repeat_stack.is_empty() {
                existing.mandatory.insert(self.template);
            }
            for combo in combinations {
                if !existing.combinations.contains(&combo) {
                    existing.combinations.push(combo);
                }
            }
        } else {
            let mandatory = if self.repeat_stack.is_empty() {
                crate::BitSet::of(self.template)
            } else {
                crate::BitSet::new()
            };
            bucket.push(Variant {
                elem,
                mask: crate::BitSet::of(self.template),
                mandatory,
                combinations,
            });
        }
        Ok(())
    }

    /// Lower a template constraint expression into the closed compiled set.
    /// Unsupported constructs become issues; the placeholder result never
    /// ships because a non-empty issue list rejects the whole build.
    fn lower(&mut self, expr: &ConstraintExpr) -> Elem {
        match expr {
            // A variable-fed argument admits any resolved value; typing it
            // is the schema layer's concern.
            ConstraintExpr::Any | ConstraintExpr::Variable(_) => Elem::new(Constraint::Any),
            ConstraintExpr::Not(inner) => {
                let mut elem = self.lower(inner);
                elem.negated = !elem.negated;
                elem
            }
            ConstraintExpr::And(a, b) => {
                Elem::new(Constraint::And(vec![self.lower(a), self.lower(b)]))
            }
            ConstraintExpr::Or(a, b) => {
                Elem::new(Constraint::Or(vec![self.lower(a), self.lower(b)]))
            }
            ConstraintExpr::Length { op, operand } => Elem::new(Constraint::Len(*op, *operand)),
            ConstraintExpr::Compare { op, operand } => self.lower_compare(*op, operand),
        }
    }

    fn lower_compare(&mut self, op: CompareOp, operand: &OperandExpr) -> Elem {
        let constraint = match operand {
            OperandExpr::Int(v) => Constraint::Cmp(op, Operand::Int(*v)),
            OperandExpr::Float(v) => Constraint::Cmp(op, Operand::Float(*v)),
            OperandExpr::Bool(v) => Constraint::Cmp(op, Operand::Bool(*v)),
            OperandExpr::Str(v) => Constraint::Cmp(op, Operand::Bytes(v.as_bytes().to_vec())),
            OperandExpr::List(items) => {
                if op != CompareOp::Eq && op != CompareOp::Ne {
                    self.issue("ordering comparison over a list operand");
                }
                let elems = items.iter().map(|item| self.lower(item)).collect();
                Constraint::Cmp(op, Operand::Array(elems))
            }
            OperandExpr::Each(inner) => {
                if op != CompareOp::Eq {
                    self.issue("map broadcast requires '='");
                }
                Constraint::Map(Box::new(self.lower(inner)))
            }
            OperandExpr::Object(fields) => {
                if op != CompareOp::Eq && op != CompareOp::Ne {
                    self.issue("ordering comparison over an object operand");
                }
                let fields = fields
                    .iter()
                    .map(|(name, expr)| (name.clone(), self.lower(expr)))
                    .collect();
                Constraint::Cmp(op, Operand::Object(fields))
            }
        };
        Elem::new(constraint)
    }
}
