//! Gesture scripts
//!
//! A small line-oriented language for replaying pointer and pen input
//! against a [`SigningSession`](crate::session::SigningSession):
//!
//! ```text
//! document "lease" 400x400
//! place 70,70 as "Ada"
//! down 70,70 => drag
//! move 570,570
//! up
//! assert field 1 at 220,340
//! ```
//!
//! A statement may end in `=> outcome` to state what it must produce.

mod ast;
mod parse;
mod run;

pub use ast::{Assertion, Outcome, Script, SignTarget, Statement, StatementKind};
pub use parse::parse;
pub use run::{ScriptReport, run};
