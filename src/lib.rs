//! A declarative BDD-style assertion engine, layered over a host test
//! reporter.
//!
//! Behavior is described in nested scopes, and each assertion is written
//! as a sentence: a subject, the `Should` connective, an optional `Not`,
//! a matcher, and (for binary matchers) one argument. The engine parses
//! the sentence, resolves lazy subjects, invokes the matcher behind a
//! panic guard, and aggregates results per scope, forwarding a one-line
//! summary to the host [`Report`] when the scope closes.
//!
//! ```
//! use minispec::*;
//!
//! let mut rep = RecordingReport::new();
//! let mut s = SpecTest::new(&mut rep);
//!
//! s.describe("a stack", |s| {
//!     let stack: Vec<i32> = vec![1, 2, 3];
//!
//!     s.it("knows its length", |s| {
//!         spec!(s, call(move || stack.len()), Should, equal(), 3_usize);
//!     });
//! });
//!
//! assert!(!rep.failed());
//! ```
//!
//! Lifecycle hooks attach to the innermost open scope with
//! [`SpecTest::before`] and [`SpecTest::after`], quantified by
//! [`Quantifier`]. A selection pattern (see [`SpecConfig`] and
//! [`PATTERN_ENV`]) restricts which scopes evaluate their assertions.

pub mod config;
pub mod errors;
pub mod formatter;
pub mod matcher;
pub mod parser;
pub mod report;
pub mod runner;
pub mod term;
pub mod value;

pub use config::{SpecConfig, PATTERN_ENV};
pub use errors::{SpecError, SpecResult};
pub use matcher::{
    builtins, equal, have_error, panics, satisfy, FnMatcher, MatchError, Matcher, MatcherRef,
    Registry, Subject,
};
pub use parser::GrammarError;
pub use report::{ConsoleReport, LogReport, RecordingReport, Report};
pub use runner::{HookPos, Quantifier, ScopeOutcome, SpecTest};
pub use runner::Quantifier::{All, First, Last};
pub use term::Sugar::{Not, Should};
pub use term::{call, call_with_error, pred, try_call, val, Sugar, Term};
pub use value::{ErrorReturn, FnCall, Predicate, SpecValue};

#[cfg(test)]
mod tests;
