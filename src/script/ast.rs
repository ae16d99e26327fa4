//! Syntax tree for gesture scripts

use std::fmt;

use miette::SourceSpan;

use crate::capture::CaptureState;
use crate::types::{Point, Size};

#[derive(Debug, Clone, Default)]
pub struct Script {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    /// `=> outcome` written after the statement
    pub expect: Option<Outcome>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// document "id" WxH [image "ref"]
    Document { id: String, size: Size, image: Option<String> },
    Select(String),
    /// Press and release on the document
    Place { at: Point, label: String },
    Down { at: Point, label: Option<String> },
    Move(Point),
    Up,
    Cancel,
    /// One pen stroke through every point
    Stroke(Vec<Point>),
    Clear,
    Save,
    Sign(SignTarget),
    Delete(u64),
    Advance,
    Assert(Assertion),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignTarget {
    Field(u64),
    /// Every unsigned field of the displayed document
    All,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Assertion {
    Field { id: u64, at: Point, size: Option<Size> },
    FieldCount(usize),
    FullySigned(bool),
    Capture(CaptureState),
    Current(String),
}

/// Result of a statement as scripts spell it after `=>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Placed,
    Overlap,
    Outside,
    Drag,
    Resize,
    Moved,
    Resized,
    Click,
    Ended,
    Ignored,
    Empty,
    Oversized,
    Unsaved,
    Unknown,
    Incomplete,
    Last,
    Duplicate,
    NoDocument,
    Failed,
}

impl Outcome {
    const ALL: [Outcome; 20] = [
        Outcome::Ok,
        Outcome::Placed,
        Outcome::Overlap,
        Outcome::Outside,
        Outcome::Drag,
        Outcome::Resize,
        Outcome::Moved,
        Outcome::Resized,
        Outcome::Click,
        Outcome::Ended,
        Outcome::Ignored,
        Outcome::Empty,
        Outcome::Oversized,
        Outcome::Unsaved,
        Outcome::Unknown,
        Outcome::Incomplete,
        Outcome::Last,
        Outcome::Duplicate,
        Outcome::NoDocument,
        Outcome::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Placed => "placed",
            Outcome::Overlap => "overlap",
            Outcome::Outside => "outside",
            Outcome::Drag => "drag",
            Outcome::Resize => "resize",
            Outcome::Moved => "moved",
            Outcome::Resized => "resized",
            Outcome::Click => "click",
            Outcome::Ended => "ended",
            Outcome::Ignored => "ignored",
            Outcome::Empty => "empty",
            Outcome::Oversized => "oversized",
            Outcome::Unsaved => "unsaved",
            Outcome::Unknown => "unknown",
            Outcome::Incomplete => "incomplete",
            Outcome::Last => "last",
            Outcome::Duplicate => "duplicate",
            Outcome::NoDocument => "no_document",
            Outcome::Failed => "failed",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.as_str() == word)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
