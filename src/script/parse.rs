//! Parse pest pairs into script statements

use miette::{NamedSource, SourceSpan};
use pest::Parser;
use pest::error::InputLocation;
use pest::iterators::{Pair, Pairs};
use pest_derive::Parser;

use super::ast::*;
use crate::capture::CaptureState;
use crate::errors::ScriptError;
use crate::types::{Point, Size};

#[derive(Parser)]
#[grammar = "script/script.pest"]
pub struct ScriptParser;

/// Source being parsed, for error reporting
struct Cx<'a> {
    name: &'a str,
    source: &'a str,
}

impl Cx<'_> {
    fn error(&self, span: pest::Span<'_>, message: impl Into<String>) -> ScriptError {
        ScriptError::Syntax {
            message: message.into(),
            src: NamedSource::new(self.name, self.source.to_string()),
            span: to_source_span(span),
        }
    }

    fn next<'i>(&self, pairs: &mut Pairs<'i, Rule>, parent: pest::Span<'_>, what: &str) -> Result<Pair<'i, Rule>, ScriptError> {
        pairs.next().ok_or_else(|| self.error(parent, format!("missing {what}")))
    }
}

fn to_source_span(span: pest::Span<'_>) -> SourceSpan {
    (span.start(), span.end() - span.start()).into()
}

/// Parse gesture script source. `name` labels diagnostics.
pub fn parse(name: &str, source: &str) -> Result<Script, ScriptError> {
    let cx = Cx { name, source };
    let mut pairs = ScriptParser::parse(Rule::script, source).map_err(|e| {
        let (start, end) = match e.location {
            InputLocation::Pos(pos) => (pos, pos),
            InputLocation::Span(span) => span,
        };
        ScriptError::Syntax {
            message: e.variant.message().into_owned(),
            src: NamedSource::new(name, source.to_string()),
            span: (start, end - start).into(),
        }
    })?;

    let mut statements = Vec::new();
    let Some(script) = pairs.next() else {
        return Ok(Script::default());
    };
    for pair in script.into_inner() {
        if pair.as_rule() == Rule::statement {
            statements.push(parse_statement(&cx, pair)?);
        }
    }
    Ok(Script { statements })
}

fn parse_statement<'i>(cx: &Cx<'_>, pair: Pair<'i, Rule>) -> Result<Statement, ScriptError> {
    let span = pair.as_span();
    let inner = cx.next(&mut pair.into_inner(), span, "statement")?;
    let rule = inner.as_rule();

    // Pull the trailing `=> outcome` off so each arm only sees its operands.
    let mut expect = None;
    let mut operands = Vec::new();
    for part in inner.into_inner() {
        if part.as_rule() == Rule::expect {
            expect = Some(parse_expect(cx, part)?);
        } else {
            operands.push(part);
        }
    }
    let mut ops = operands.into_iter();
    let need = |pair: Option<Pair<'i, Rule>>, what: &str| pair.ok_or_else(|| cx.error(span, format!("missing {what}")));

    let kind = match rule {
        Rule::document_stmt => {
            let id = parse_string(cx, need(ops.next(), "document id")?)?;
            let size = parse_size(cx, need(ops.next(), "document size")?)?;
            let image = ops.next().map(|p| parse_string(cx, p)).transpose()?;
            StatementKind::Document { id, size, image }
        }
        Rule::select_stmt => StatementKind::Select(parse_string(cx, need(ops.next(), "document id")?)?),
        Rule::place_stmt => {
            let at = parse_point(cx, need(ops.next(), "point")?)?;
            let label = parse_string(cx, need(ops.next(), "owner label")?)?;
            StatementKind::Place { at, label }
        }
        Rule::down_stmt => {
            let at = parse_point(cx, need(ops.next(), "point")?)?;
            let label = ops.next().map(|p| parse_string(cx, p)).transpose()?;
            StatementKind::Down { at, label }
        }
        Rule::move_stmt => StatementKind::Move(parse_point(cx, need(ops.next(), "point")?)?),
        Rule::up_stmt => StatementKind::Up,
        Rule::cancel_stmt => StatementKind::Cancel,
        Rule::stroke_stmt => StatementKind::Stroke(ops.map(|p| parse_point(cx, p)).collect::<Result<_, _>>()?),
        Rule::clear_stmt => StatementKind::Clear,
        Rule::save_stmt => StatementKind::Save,
        Rule::sign_stmt => {
            let target = need(ops.next(), "field")?;
            match target.as_rule() {
                Rule::all => StatementKind::Sign(SignTarget::All),
                _ => StatementKind::Sign(SignTarget::Field(parse_integer(cx, target)?)),
            }
        }
        Rule::delete_stmt => StatementKind::Delete(parse_integer(cx, need(ops.next(), "field")?)?),
        Rule::advance_stmt => StatementKind::Advance,
        Rule::assert_stmt => StatementKind::Assert(parse_assertion(cx, need(ops.next(), "assertion")?)?),
        other => return Err(cx.error(span, format!("unexpected rule in statement: {other:?}"))),
    };

    Ok(Statement { kind, expect, span: to_source_span(span) })
}

fn parse_assertion(cx: &Cx<'_>, pair: Pair<'_, Rule>) -> Result<Assertion, ScriptError> {
    let span = pair.as_span();
    let rule = pair.as_rule();
    let mut inner = pair.into_inner();
    match rule {
        Rule::assert_field => {
            let id = parse_integer(cx, cx.next(&mut inner, span, "field")?)?;
            let at = parse_point(cx, cx.next(&mut inner, span, "point")?)?;
            let size = inner.next().map(|p| parse_size(cx, p)).transpose()?;
            Ok(Assertion::Field { id, at, size })
        }
        Rule::assert_count => {
            let n = parse_integer(cx, cx.next(&mut inner, span, "count")?)?;
            let n = usize::try_from(n).map_err(|_| cx.error(span, "field count out of range"))?;
            Ok(Assertion::FieldCount(n))
        }
        Rule::assert_signed => {
            let value = cx.next(&mut inner, span, "true or false")?;
            Ok(Assertion::FullySigned(value.as_str() == "true"))
        }
        Rule::assert_capture => {
            let state = cx.next(&mut inner, span, "capture state")?;
            let state = match state.as_str() {
                "empty" => CaptureState::Empty,
                "dirty" => CaptureState::Dirty,
                "saved" => CaptureState::Saved,
                other => return Err(cx.error(state.as_span(), format!("unknown capture state `{other}`"))),
            };
            Ok(Assertion::Capture(state))
        }
        Rule::assert_current => Ok(Assertion::Current(parse_string(cx, cx.next(&mut inner, span, "document id")?)?)),
        other => Err(cx.error(span, format!("unexpected assertion: {other:?}"))),
    }
}

fn parse_expect(cx: &Cx<'_>, pair: Pair<'_, Rule>) -> Result<Outcome, ScriptError> {
    let span = pair.as_span();
    let word = cx.next(&mut pair.into_inner(), span, "outcome")?;
    Outcome::from_keyword(word.as_str())
        .ok_or_else(|| cx.error(word.as_span(), format!("unknown outcome `{}`", word.as_str())))
}

fn parse_point(cx: &Cx<'_>, pair: Pair<'_, Rule>) -> Result<Point, ScriptError> {
    let span = pair.as_span();
    let mut inner = pair.into_inner();
    let x = parse_number(cx, cx.next(&mut inner, span, "x")?)?;
    let y = parse_number(cx, cx.next(&mut inner, span, "y")?)?;
    Ok(Point::new(x, y))
}

fn parse_size(cx: &Cx<'_>, pair: Pair<'_, Rule>) -> Result<Size, ScriptError> {
    let span = pair.as_span();
    let mut inner = pair.into_inner();
    let w = parse_number(cx, cx.next(&mut inner, span, "width")?)?;
    let h = parse_number(cx, cx.next(&mut inner, span, "height")?)?;
    Size::try_new(w, h).map_err(|e| cx.error(span, format!("invalid size: {e}")))
}

fn parse_number(cx: &Cx<'_>, pair: Pair<'_, Rule>) -> Result<f64, ScriptError> {
    pair.as_str()
        .parse()
        .map_err(|_| cx.error(pair.as_span(), format!("invalid number `{}`", pair.as_str())))
}

fn parse_integer(cx: &Cx<'_>, pair: Pair<'_, Rule>) -> Result<u64, ScriptError> {
    pair.as_str()
        .parse()
        .map_err(|_| cx.error(pair.as_span(), format!("invalid integer `{}`", pair.as_str())))
}

fn parse_string(cx: &Cx<'_>, pair: Pair<'_, Rule>) -> Result<String, ScriptError> {
    let span = pair.as_span();
    let text = cx.next(&mut pair.into_inner(), span, "string contents")?;
    Ok(text.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statements(source: &str) -> Vec<StatementKind> {
        parse("test.gesture", source)
            .unwrap_or_else(|e| panic!("parse failed: {e:?}"))
            .statements
            .into_iter()
            .map(|s| s.kind)
            .collect()
    }

    #[test]
    fn parses_document_and_placement() {
        let kinds = statements(
            r#"
            # a lease with one field
            document "lease" 400x400 image "lease.png"
            place 70,70 as "Ada Lovelace"
            "#,
        );
        assert_eq!(
            kinds,
            vec![
                StatementKind::Document {
                    id: "lease".into(),
                    size: Size::new(400.0, 400.0),
                    image: Some("lease.png".into()),
                },
                StatementKind::Place { at: Point::new(70.0, 70.0), label: "Ada Lovelace".into() },
            ]
        );
    }

    #[test]
    fn parses_expectations() {
        let script = parse("t", "place 80, 80 as \"A\" => overlap\nsave => empty").unwrap();
        assert_eq!(script.statements[0].expect, Some(Outcome::Overlap));
        assert_eq!(script.statements[1].expect, Some(Outcome::Empty));
    }

    #[test]
    fn parses_strokes_and_negative_numbers() {
        let kinds = statements("stroke 10,10 -> 20.5,-4 -> 30,30\n");
        assert_eq!(
            kinds,
            vec![StatementKind::Stroke(vec![
                Point::new(10.0, 10.0),
                Point::new(20.5, -4.0),
                Point::new(30.0, 30.0),
            ])]
        );
    }

    #[test]
    fn parses_assertions() {
        let kinds = statements(
            "assert field 1 at 220,340 size 180x60\nassert fields 2\nassert fully_signed false\nassert capture saved\nassert current \"b\"",
        );
        assert_eq!(
            kinds,
            vec![
                StatementKind::Assert(Assertion::Field {
                    id: 1,
                    at: Point::new(220.0, 340.0),
                    size: Some(Size::new(180.0, 60.0)),
                }),
                StatementKind::Assert(Assertion::FieldCount(2)),
                StatementKind::Assert(Assertion::FullySigned(false)),
                StatementKind::Assert(Assertion::Capture(CaptureState::Saved)),
                StatementKind::Assert(Assertion::Current("b".into())),
            ]
        );
    }

    #[test]
    fn sign_all_and_field() {
        let kinds = statements("sign all\nsign 3 => unknown\n");
        assert_eq!(
            kinds,
            vec![StatementKind::Sign(SignTarget::All), StatementKind::Sign(SignTarget::Field(3))]
        );
    }

    #[test]
    fn unknown_outcome_is_a_syntax_error() {
        let err = parse("t", "save => exploded").unwrap_err();
        assert!(matches!(err, ScriptError::Syntax { .. }));
    }

    #[test]
    fn garbage_reports_position() {
        let err = parse("t", "document \"a\" 10x10\nwiggle 3,3\n").unwrap_err();
        let ScriptError::Syntax { span, .. } = err else {
            panic!("expected syntax error");
        };
        assert_eq!(span.offset(), 19);
    }

    #[test]
    fn zero_sized_document_is_rejected() {
        assert!(parse("t", "document \"a\" 0x10").is_err());
    }
}
