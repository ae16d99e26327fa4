//! Replay a parsed script against a fresh signing session

use std::sync::Arc;

use miette::NamedSource;

use super::ast::*;
use super::parse::parse;
use crate::config::EngineConfig;
use crate::encoder::SignatureImage;
use crate::errors::{CaptureError, PlacementError, ScriptError, SessionError};
use crate::field::{Document, DocumentId, FieldId};
use crate::gesture::Interaction;
use crate::log::debug;
use crate::persistence::SubmissionBundle;
use crate::session::SigningSession;
use crate::types::{Point, Size};

/// Owner label for `down` presses that do not name one
const DEFAULT_OWNER: &str = "Signer";

const EPSILON: f64 = 1e-9;

/// State left behind by a script that ran to completion
#[derive(Debug)]
pub struct ScriptReport {
    pub session: SigningSession,
    pub statements: usize,
}

impl ScriptReport {
    pub fn saved_signature(&self) -> Option<&Arc<SignatureImage>> {
        self.session.saved_signature()
    }

    pub fn bundles(&self) -> Vec<SubmissionBundle> {
        self.session.bundles()
    }
}

/// Parse and replay `source`. Every statement must produce its expected
/// outcome and every assertion must hold.
pub fn run(name: &str, source: &str, config: &EngineConfig) -> Result<ScriptReport, miette::Report> {
    let script = parse(name, source)?;
    let mut runner = Runner { session: SigningSession::new(config.clone())?, name, source };
    for statement in &script.statements {
        runner.exec(statement)?;
    }
    debug!(script = name, statements = script.statements.len(), "script finished");
    Ok(ScriptReport { session: runner.session, statements: script.statements.len() })
}

struct Runner<'a> {
    session: SigningSession,
    name: &'a str,
    source: &'a str,
}

impl Runner<'_> {
    fn exec(&mut self, statement: &Statement) -> Result<(), ScriptError> {
        let actual = match &statement.kind {
            StatementKind::Document { id, size, image } => {
                let document = Document::new(id.as_str(), image.clone().unwrap_or_default(), *size);
                settled(self.session.add_document(document))
            }
            StatementKind::Select(id) => settled(self.session.select(&DocumentId::from(id.as_str()))),
            StatementKind::Place { at, label } => {
                let outcome = interaction(self.session.pointer_down(*at, label));
                self.session.pointer_up();
                outcome
            }
            StatementKind::Down { at, label } => {
                interaction(self.session.pointer_down(*at, label.as_deref().unwrap_or(DEFAULT_OWNER)))
            }
            StatementKind::Move(at) => interaction(self.session.pointer_move(*at)),
            StatementKind::Up => interaction(Ok(self.session.pointer_up())),
            StatementKind::Cancel => interaction(Ok(self.session.pointer_cancel())),
            StatementKind::Stroke(points) => {
                if let Some((first, rest)) = points.split_first() {
                    self.session.begin_stroke(*first);
                    for point in rest {
                        self.session.extend_stroke(*point);
                    }
                    self.session.end_stroke();
                }
                Outcome::Ok
            }
            StatementKind::Clear => {
                self.session.clear_signature();
                Outcome::Ok
            }
            StatementKind::Save => settled(self.session.save_signature()),
            StatementKind::Sign(SignTarget::Field(id)) => settled(self.session.sign_field(FieldId(*id))),
            StatementKind::Sign(SignTarget::All) => settled(self.session.sign_current_document()),
            StatementKind::Delete(id) => settled(self.session.delete_field(FieldId(*id))),
            StatementKind::Advance => settled(self.session.advance()),
            StatementKind::Assert(assertion) => {
                self.check(assertion, statement)?;
                Outcome::Ok
            }
        };

        let expected = statement.expect.or_else(|| default_outcome(&statement.kind));
        match expected {
            Some(expected) if expected != actual => Err(ScriptError::UnexpectedOutcome {
                expected: expected.to_string(),
                actual: actual.to_string(),
                src: self.named_source(),
                span: statement.span,
            }),
            _ => Ok(()),
        }
    }

    fn check(&self, assertion: &Assertion, statement: &Statement) -> Result<(), ScriptError> {
        let failure = match assertion {
            Assertion::Field { id, at, size } => match self.session.current().and_then(|s| s.field(FieldId(*id))) {
                None => Some(format!("field {id} does not exist")),
                Some(field) => {
                    let rect = field.rect();
                    let at_ok = near_point(rect.top_left(), *at);
                    let size_ok = size.is_none_or(|s| near_size(rect.size(), s));
                    (!at_ok || !size_ok).then(|| format!("field {id} is {rect}"))
                }
            },
            Assertion::FieldCount(n) => {
                let count = self.session.current().map_or(0, |s| s.len());
                (count != *n).then(|| format!("document has {count} field(s)"))
            }
            Assertion::FullySigned(expected) => {
                let signed = self.session.current().is_some_and(|s| s.is_fully_signed());
                (signed != *expected).then(|| format!("fully signed is {signed}"))
            }
            Assertion::Capture(expected) => {
                let state = self.session.surface().state();
                (state != *expected).then(|| format!("capture state is {state:?}"))
            }
            Assertion::Current(expected) => {
                let current = self.session.documents().current_id().map(DocumentId::as_str);
                (current != Some(expected.as_str())).then(|| format!("current document is {current:?}"))
            }
        };
        match failure {
            Some(details) => Err(ScriptError::AssertionFailed {
                src: self.named_source(),
                span: statement.span,
                details: Some(details),
            }),
            None => Ok(()),
        }
    }

    fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.name, self.source.to_string())
    }
}

/// Outcome assumed when a statement has no `=>`; `None` accepts anything
fn default_outcome(kind: &StatementKind) -> Option<Outcome> {
    match kind {
        StatementKind::Place { .. } => Some(Outcome::Placed),
        StatementKind::Down { .. } | StatementKind::Move(_) | StatementKind::Up | StatementKind::Cancel => None,
        StatementKind::Assert(_) => None,
        _ => Some(Outcome::Ok),
    }
}

fn interaction(result: Result<Interaction, SessionError>) -> Outcome {
    match result {
        Ok(Interaction::Placed(_)) => Outcome::Placed,
        Ok(Interaction::PlacementRejected(PlacementError::Overlap { .. })) => Outcome::Overlap,
        Ok(Interaction::PlacementRejected(PlacementError::OutsideDocument { .. })) => Outcome::Outside,
        Ok(Interaction::DragStarted(_)) => Outcome::Drag,
        Ok(Interaction::ResizeStarted(_)) => Outcome::Resize,
        Ok(Interaction::FieldMoved(..)) => Outcome::Moved,
        Ok(Interaction::FieldResized(..)) => Outcome::Resized,
        Ok(Interaction::FieldClicked(_)) => Outcome::Click,
        Ok(Interaction::GestureEnded(_)) => Outcome::Ended,
        Ok(Interaction::Ignored) => Outcome::Ignored,
        Err(err) => failure(&err),
    }
}

fn settled<T>(result: Result<T, SessionError>) -> Outcome {
    match result {
        Ok(_) => Outcome::Ok,
        Err(err) => failure(&err),
    }
}

fn failure(err: &SessionError) -> Outcome {
    match err {
        SessionError::Capture(CaptureError::EmptyCapture) => Outcome::Empty,
        SessionError::Capture(CaptureError::OversizedImage { .. }) => Outcome::Oversized,
        SessionError::Placement(PlacementError::Overlap { .. }) => Outcome::Overlap,
        SessionError::Placement(PlacementError::OutsideDocument { .. }) => Outcome::Outside,
        SessionError::NoSavedSignature => Outcome::Unsaved,
        SessionError::UnknownField(_) | SessionError::UnknownDocument(_) => Outcome::Unknown,
        SessionError::DocumentIncomplete { .. } => Outcome::Incomplete,
        SessionError::LastDocument => Outcome::Last,
        SessionError::DuplicateDocument(_) => Outcome::Duplicate,
        SessionError::NoDocument => Outcome::NoDocument,
        SessionError::Capture(_) => Outcome::Failed,
    }
}

fn near_point(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
}

fn near_size(a: Size, b: Size) -> bool {
    (a.w - b.w).abs() < EPSILON && (a.h - b.h).abs() < EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureState;

    fn replay(source: &str) -> Result<ScriptReport, miette::Report> {
        run("test.gesture", source, &EngineConfig::default())
    }

    #[test]
    fn placement_and_drag_script() {
        let report = replay(
            r#"
            document "lease" 400x400
            place 70,70 as "Ada"
            place 80,80 as "Ada" => overlap
            down 70,70 => drag
            move 570,570 => moved
            up => ended
            assert field 1 at 220,340 size 180x60
            assert fields 1
            "#,
        )
        .unwrap();
        assert_eq!(report.statements, 8);
        assert_eq!(report.session.current().unwrap().len(), 1);
    }

    #[test]
    fn wrong_outcome_fails_at_statement() {
        let err = replay("document \"a\" 400x400\nsave => ok\n").unwrap_err();
        let err = err.downcast::<ScriptError>().unwrap();
        let ScriptError::UnexpectedOutcome { expected, actual, span, .. } = err else {
            panic!("expected outcome mismatch");
        };
        assert_eq!((expected.as_str(), actual.as_str()), ("ok", "empty"));
        assert_eq!(span.offset(), 21);
    }

    #[test]
    fn failing_assertion_explains_itself() {
        let err = replay("document \"a\" 400x400\nplace 0,0 as \"A\"\nassert fields 2").unwrap_err();
        let err = err.downcast::<ScriptError>().unwrap();
        let ScriptError::AssertionFailed { details, .. } = err else {
            panic!("expected assertion failure");
        };
        assert_eq!(details.as_deref(), Some("document has 1 field(s)"));
    }

    #[test]
    fn signing_flow_script() {
        let report = replay(
            r#"
            document "one" 400x400
            document "two" 400x400
            place 10,10 as "Ada"
            sign 1 => unsaved
            stroke 20,100 -> 200,80 -> 300,120
            assert capture dirty
            save
            assert capture saved
            advance => incomplete
            sign all
            assert fully_signed true
            advance
            assert current "two"
            advance => last
            "#,
        )
        .unwrap();
        assert!(report.saved_signature().is_some());
        assert_eq!(report.session.surface().state(), CaptureState::Saved);
        let bundles = report.bundles();
        assert_eq!(bundles.len(), 2);
        assert!(bundles[0].signature_image.is_some());
    }
}
