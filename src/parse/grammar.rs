use winnow::ascii::{dec_int, dec_uint, till_line_ending};
use winnow::combinator::{alt, cut_err, delimited, opt, preceded, repeat, separated};
use winnow::error::{ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, take_while};

use crate::{
    CompareOp, ConstraintExpr, FieldNode, OperandExpr, OperationKind, Selection, Template,
};

use super::parser::ParsedTemplates;

// -- Whitespace & comments --------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_ascii_whitespace()).void(),
            ('#', till_line_ending).void(),
        )),
    )
    .parse_next(input)?;
    Ok(())
}

fn ws1(input: &mut &str) -> ModalResult<()> {
    take_while(1.., |c: char| c.is_ascii_whitespace()).void().parse_next(input)?;
    ws(input)
}

// -- Identifiers ------------------------------------------------------------

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

// -- Literals ---------------------------------------------------------------

fn string_literal(input: &mut &str) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = any.parse_next(input)?;
        match ch {
            '"' => return Ok(s),
            '\\' => {
                let esc = any.parse_next(input)?;
                match esc {
                    '"' => s.push('"'),
                    '\\' => s.push('\\'),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

fn negative_number(input: &mut &str) -> ModalResult<OperandExpr> {
    let neg_str = (
        '-',
        take_while(1.., |c: char| c.is_ascii_digit() || c == '.'),
    )
        .take()
        .parse_next(input)?;
    if neg_str.contains('.') {
        let f: f64 = neg_str
            .parse()
            .map_err(|_| ErrMode::from_input(input).cut())?;
        Ok(OperandExpr::Float(f))
    } else {
        let i: i64 = neg_str
            .parse()
            .map_err(|_| ErrMode::from_input(input).cut())?;
        Ok(OperandExpr::Int(i))
    }
}

fn float_literal(input: &mut &str) -> ModalResult<f64> {
    // Only match floats that contain a decimal point
    (
        take_while(1.., |c: char| c.is_ascii_digit()),
        '.',
        take_while(1.., |c: char| c.is_ascii_digit()),
    )
        .take()
        .try_map(|s: &str| s.parse::<f64>())
        .parse_next(input)
}

// -- Comparison operators ---------------------------------------------------

fn compare_op(input: &mut &str) -> ModalResult<CompareOp> {
    ws.parse_next(input)?;
    alt((
        ">=".value(CompareOp::Ge),
        ">".value(CompareOp::Gt),
        "<=".value(CompareOp::Le),
        "<".value(CompareOp::Lt),
        "!=".value(CompareOp::Ne),
        "=".value(CompareOp::Eq),
    ))
    .parse_next(input)
}

// -- Operands ---------------------------------------------------------------

fn list_operand(input: &mut &str) -> ModalResult<OperandExpr> {
    '['.parse_next(input)?;
    ws.parse_next(input)?;
    if opt("...").parse_next(input)?.is_some() {
        let inner = cut_err(constraint).parse_next(input)?;
        ws.parse_next(input)?;
        cut_err(']').parse_next(input)?;
        Ok(OperandExpr::Each(Box::new(inner)))
    } else {
        let items: Vec<ConstraintExpr> =
            separated(0.., constraint, (ws, ',')).parse_next(input)?;
        ws.parse_next(input)?;
        cut_err(']').parse_next(input)?;
        Ok(OperandExpr::List(items))
    }
}

fn object_field(input: &mut &str) -> ModalResult<(String, ConstraintExpr)> {
    ws.parse_next(input)?;
    let name = ident.parse_next(input)?;
    ws.parse_next(input)?;
    ':'.parse_next(input)?;
    let c = cut_err(constraint).parse_next(input)?;
    Ok((name.to_owned(), c))
}

fn object_operand(input: &mut &str) -> ModalResult<OperandExpr> {
    '{'.parse_next(input)?;
    let fields: Vec<(String, ConstraintExpr)> =
        separated(0.., object_field, (ws, ',')).parse_next(input)?;
    ws.parse_next(input)?;
    cut_err('}').parse_next(input)?;
    Ok(OperandExpr::Object(fields))
}

fn operand(input: &mut &str) -> ModalResult<OperandExpr> {
    ws.parse_next(input)?;
    alt((
        string_literal.map(OperandExpr::Str),
        "true".value(OperandExpr::Bool(true)),
        "false".value(OperandExpr::Bool(false)),
        list_operand,
        object_operand,
        negative_number,
        float_literal.map(OperandExpr::Float),
        dec_int::<_, i64, _>.map(OperandExpr::Int),
    ))
    .context(StrContext::Expected(StrContextValue::Description("operand")))
    .parse_next(input)
}

// -- Constraints (precedence: || < && < ! < primary) ------------------------

fn val_compare(input: &mut &str) -> ModalResult<ConstraintExpr> {
    "val".parse_next(input)?;
    let op = compare_op.parse_next(input)?;
    let operand = cut_err(operand).parse_next(input)?;
    Ok(ConstraintExpr::Compare { op, operand })
}

fn len_compare(input: &mut &str) -> ModalResult<ConstraintExpr> {
    "len".parse_next(input)?;
    let op = compare_op.parse_next(input)?;
    let n: u64 = preceded(ws, cut_err(dec_uint)).parse_next(input)?;
    Ok(ConstraintExpr::Length { op, operand: n })
}

fn primary(input: &mut &str) -> ModalResult<ConstraintExpr> {
    ws.parse_next(input)?;
    alt((
        delimited('(', constraint, (ws, ')')),
        '*'.value(ConstraintExpr::Any),
        preceded('$', cut_err(ident)).map(|name| ConstraintExpr::Variable(name.to_owned())),
        len_compare,
        val_compare,
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "constraint",
    )))
    .parse_next(input)
}

fn unary(input: &mut &str) -> ModalResult<ConstraintExpr> {
    ws.parse_next(input)?;
    if opt('!').parse_next(input)?.is_some() {
        let inner = cut_err(unary).parse_next(input)?;
        Ok(ConstraintExpr::Not(Box::new(inner)))
    } else {
        primary(input)
    }
}

fn and_expr(input: &mut &str) -> ModalResult<ConstraintExpr> {
    let first = unary(input)?;
    let rest: Vec<ConstraintExpr> =
        repeat(0.., preceded((ws, "&&"), cut_err(unary))).parse_next(input)?;
    Ok(rest.into_iter().fold(first, ConstraintExpr::and))
}

fn or_expr(input: &mut &str) -> ModalResult<ConstraintExpr> {
    let first = and_expr(input)?;
    let rest: Vec<ConstraintExpr> =
        repeat(0.., preceded((ws, "||"), cut_err(and_expr))).parse_next(input)?;
    Ok(rest.into_iter().fold(first, ConstraintExpr::or))
}

fn constraint(input: &mut &str) -> ModalResult<ConstraintExpr> {
    ws.parse_next(input)?;
    or_expr(input)
}

// -- Selections -------------------------------------------------------------

fn argument(input: &mut &str) -> ModalResult<(String, ConstraintExpr)> {
    ws.parse_next(input)?;
    let name = ident.parse_next(input)?;
    ws.parse_next(input)?;
    ':'.parse_next(input)?;
    let c = cut_err(constraint).parse_next(input)?;
    Ok((name.to_owned(), c))
}

fn arguments(input: &mut &str) -> ModalResult<Vec<(String, ConstraintExpr)>> {
    '('.parse_next(input)?;
    let args: Vec<(String, ConstraintExpr)> =
        separated(1.., argument, (ws, ',')).parse_next(input)?;
    ws.parse_next(input)?;
    cut_err(')').parse_next(input)?;
    Ok(args)
}

fn field(input: &mut &str) -> ModalResult<Selection> {
    let name = ident.parse_next(input)?;
    let args = opt(preceded(ws, arguments)).parse_next(input)?;
    let selections = opt(selection_set).parse_next(input)?;
    Ok(Selection::Field(FieldNode {
        name: name.to_owned(),
        args: args.unwrap_or_default(),
        selections: selections.unwrap_or_default(),
    }))
}

fn fragment(input: &mut &str) -> ModalResult<Selection> {
    "...".parse_next(input)?;
    ws.parse_next(input)?;
    "on".parse_next(input)?;
    ws1.parse_next(input)?;
    let type_name = cut_err(ident)
        .context(StrContext::Expected(StrContextValue::Description(
            "type condition",
        )))
        .parse_next(input)?;
    let selections = cut_err(selection_set).parse_next(input)?;
    Ok(Selection::Fragment {
        type_name: type_name.to_owned(),
        selections,
    })
}

fn repeat_block(input: &mut &str) -> ModalResult<Selection> {
    "max".parse_next(input)?;
    ws1.parse_next(input)?;
    let limit: u32 = dec_uint.parse_next(input)?;
    let selections = cut_err(selection_set).parse_next(input)?;
    Ok(Selection::Repeat { limit, selections })
}

fn selection(input: &mut &str) -> ModalResult<Selection> {
    ws.parse_next(input)?;
    alt((fragment, repeat_block, field)).parse_next(input)
}

fn selection_set(input: &mut &str) -> ModalResult<Vec<Selection>> {
    ws.parse_next(input)?;
    '{'.parse_next(input)?;
    let selections: Vec<Selection> = repeat(0.., selection).parse_next(input)?;
    ws.parse_next(input)?;
    cut_err('}').parse_next(input)?;
    Ok(selections)
}

// -- Operations & templates -------------------------------------------------

fn operation_kind(input: &mut &str) -> ModalResult<OperationKind> {
    ws.parse_next(input)?;
    alt((
        "query".value(OperationKind::Query),
        "mutation".value(OperationKind::Mutation),
        "subscription".value(OperationKind::Subscription),
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "operation kind",
    )))
    .parse_next(input)
}

fn operation(input: &mut &str) -> ModalResult<(OperationKind, Vec<Selection>)> {
    let kind = operation_kind.parse_next(input)?;
    let selections = cut_err(selection_set).parse_next(input)?;
    Ok((kind, selections))
}

pub(super) fn single_operation(input: &mut &str) -> ModalResult<(OperationKind, Vec<Selection>)> {
    let op = operation.parse_next(input)?;
    ws.parse_next(input)?;
    Ok(op)
}

fn template_def(input: &mut &str) -> ModalResult<Template> {
    ws.parse_next(input)?;
    "template".parse_next(input)?;
    ws1.parse_next(input)?;
    let name = cut_err(ident)
        .context(StrContext::Expected(StrContextValue::Description(
            "template name",
        )))
        .parse_next(input)?;
    ws.parse_next(input)?;
    cut_err(':').parse_next(input)?;
    let (kind, selections) = cut_err(operation).parse_next(input)?;
    Ok(Template {
        name: name.to_owned(),
        kind,
        selections,
    })
}

pub(super) fn parse_templates(input: &mut &str) -> ModalResult<ParsedTemplates> {
    let templates: Vec<Template> = repeat(0.., template_def).parse_next(input)?;
    ws.parse_next(input)?;
    Ok(ParsedTemplates { templates })
}
