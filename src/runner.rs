//! The spec engine: nested scopes, lifecycle hooks, and the assertion
//! pipeline.
//!
//! A [`SpecTest`] borrows a host [`Report`] for its lifetime. Scope
//! bodies run synchronously; entering a scope pushes a frame and leaving
//! it tears the frame down on every exit path, including a panic raised
//! inside the body (teardown runs, then the panic resumes). Each frame
//! owns its hook lists and its own outcome accumulator, so nested scopes
//! report independently.

use crate::config::SpecConfig;
use crate::errors::{SpecError, SpecResult};
use crate::formatter;
use crate::matcher;
use crate::parser;
use crate::report::Report;
use crate::Term;
use regex::Regex;
use std::fmt;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};

/// How many times, and when, a hook fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// Around every assertion evaluated inside the scope.
    All,
    /// Once, for the next assertion evaluated inside the scope.
    First,
    /// Once, at scope teardown. After-hooks only.
    Last,
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantifier::All => f.write_str("All"),
            Quantifier::First => f.write_str("First"),
            Quantifier::Last => f.write_str("Last"),
        }
    }
}

/// Which side of an assertion a hook runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPos {
    Before,
    After,
}

impl fmt::Display for HookPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPos::Before => f.write_str("Before"),
            HookPos::After => f.write_str("After"),
        }
    }
}

/// A registered lifecycle hook, owned by exactly one scope's list.
struct Trigger {
    quantifier: Quantifier,
    callback: Box<dyn FnMut()>,
}

/// Aggregated assertion results for one scope.
#[derive(Debug, Default)]
pub struct ScopeOutcome {
    /// Assertions evaluated directly in this scope.
    pub ran: usize,
    /// Assertions that evaluated to false.
    pub failed: usize,
    /// First error text, if any assertion errored.
    pub error: Option<String>,
    /// Rendered form of the first non-passing sequence.
    pub failing_seq: Option<String>,
}

impl ScopeOutcome {
    pub fn passed(&self) -> bool {
        self.failed == 0 && self.error.is_none()
    }
}

/// One open description scope.
struct Frame {
    label: String,
    /// Selection gate: false skips assertions declared directly here.
    gate: bool,
    before: Vec<Trigger>,
    after: Vec<Trigger>,
    outcome: ScopeOutcome,
}

impl Frame {
    fn new(label: &str) -> Self {
        Frame {
            label: label.to_string(),
            gate: true,
            before: Vec::new(),
            after: Vec::new(),
            outcome: ScopeOutcome::default(),
        }
    }
}

/// The primary object of the crate. Describe behavior with [`describe`],
/// [`it`], and [`they`]; register hooks with [`before`] and [`after`];
/// write individual assertions with [`spec`] or the [`spec!`] macro.
///
/// ```
/// # use minispec::*;
/// # let mut rep = RecordingReport::new();
/// let mut s = SpecTest::new(&mut rep);
/// s.describe("my counter", |s| {
///     s.it("starts at zero", |s| {
///         spec!(s, 0, Should, equal(), 0);
///     });
/// });
/// ```
///
/// [`describe`]: SpecTest::describe
/// [`it`]: SpecTest::it
/// [`they`]: SpecTest::they
/// [`before`]: SpecTest::before
/// [`after`]: SpecTest::after
/// [`spec`]: SpecTest::spec
pub struct SpecTest<'r> {
    reporter: &'r mut dyn Report,
    pattern: Option<Regex>,
    debug: bool,
    frames: Vec<Frame>,
}

impl<'r> SpecTest<'r> {
    /// Create an engine configured from the environment
    /// (`MINISPEC_PATTERN`).
    pub fn new(reporter: &'r mut dyn Report) -> Self {
        Self::with_config(reporter, SpecConfig::from_env())
    }

    /// Create an engine with an explicit configuration. An invalid
    /// selection pattern is an unrecoverable setup fault, reported
    /// through [`Report::fatal`].
    pub fn with_config(reporter: &'r mut dyn Report, config: SpecConfig) -> Self {
        let pattern = match config.compile() {
            Ok(pattern) => pattern,
            Err(e) => reporter.fatalf(format_args!("{}", e)),
        };
        SpecTest {
            reporter,
            pattern,
            debug: config.debug,
            frames: Vec::new(),
        }
    }

    /// The space-joined labels of the currently open scopes.
    pub fn path(&self) -> String {
        self.frames
            .iter()
            .map(|f| f.label.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether the host reporter has recorded a failure.
    pub fn failed(&self) -> bool {
        self.reporter.failed()
    }

    /// Open a named scope around `body`. The scope's frame is torn down
    /// on every exit path: remaining `Last` after-hooks run in
    /// registration order, the scope's outcome (if any assertion ran in
    /// it) is forwarded to the reporter, and the frame is popped.
    pub fn describe<F>(&mut self, label: &str, body: F)
    where
        F: FnOnce(&mut Self),
    {
        self.enter(label);
        let result = {
            let this = &mut *self;
            catch_unwind(AssertUnwindSafe(move || body(this)))
        };
        self.teardown();
        if let Err(payload) = result {
            resume_unwind(payload);
        }
    }

    /// A synonym of [`describe`](SpecTest::describe), for scopes that
    /// read as `it does ...`.
    pub fn it<F>(&mut self, specification: &str, check: F)
    where
        F: FnOnce(&mut Self),
    {
        self.describe(specification, check)
    }

    /// A synonym of [`describe`](SpecTest::describe), for scopes that
    /// read as `they do ...`.
    pub fn they<F>(&mut self, specification: &str, check: F)
    where
        F: FnOnce(&mut Self),
    {
        self.describe(specification, check)
    }

    fn enter(&mut self, label: &str) {
        self.frames.push(Frame::new(label));
        // The gate is re-evaluated against the full path at every
        // nesting level.
        let gate = match &self.pattern {
            None => true,
            Some(pattern) => pattern.is_match(&self.path()),
        };
        self.frames.last_mut().expect("frame just pushed").gate = gate;
    }

    fn teardown(&mut self) {
        let mut frame = self.frames.pop().expect("teardown of an open scope");

        // Remaining Last after-hooks run before the frame is released,
        // in registration order, gated by nothing.
        for trigger in frame.after.iter_mut() {
            if trigger.quantifier == Quantifier::Last {
                self.trace(format_args!("firing After Last in {:?}", frame.label));
                (trigger.callback)();
            }
        }

        if frame.outcome.ran > 0 {
            let path = if self.frames.is_empty() {
                frame.label.clone()
            } else {
                format!("{} {}", self.path(), frame.label)
            };
            let msg = formatter::format_outcome(&path, &frame.outcome);
            if frame.outcome.passed() {
                self.reporter.log(&msg);
            } else {
                self.reporter.error(&msg);
            }
        }
    }

    /// Register a hook on the innermost open scope.
    ///
    /// `Before` + `Last` is structurally meaningless and is rejected, as
    /// is registration outside any scope. Both are returned errors, not
    /// panics.
    pub fn register_hook<F>(
        &mut self,
        position: HookPos,
        quantifier: Quantifier,
        callback: F,
    ) -> SpecResult<()>
    where
        F: FnMut() + 'static,
    {
        if position == HookPos::Before && quantifier == Quantifier::Last {
            return Err(SpecError::Trigger {
                position,
                quantifier,
            });
        }
        let frame = self.frames.last_mut().ok_or(SpecError::NoScope)?;
        let list = match position {
            HookPos::Before => &mut frame.before,
            HookPos::After => &mut frame.after,
        };
        list.push(Trigger {
            quantifier,
            callback: Box::new(callback),
        });
        Ok(())
    }

    /// Register a hook firing before assertions in the current scope.
    pub fn before<F>(&mut self, quantifier: Quantifier, callback: F) -> SpecResult<()>
    where
        F: FnMut() + 'static,
    {
        self.register_hook(HookPos::Before, quantifier, callback)
    }

    /// Register a hook firing after assertions in the current scope, or
    /// at scope teardown for [`Quantifier::Last`].
    pub fn after<F>(&mut self, quantifier: Quantifier, callback: F) -> SpecResult<()>
    where
        F: FnMut() + 'static,
    {
        self.register_hook(HookPos::After, quantifier, callback)
    }

    /// Evaluate one assertion sequence.
    ///
    /// Skipped entirely (hooks included) when the current scope's
    /// selection gate is closed. Otherwise before-hooks fire, the
    /// sequence runs through the tokenizer, parser, nilary resolver, and
    /// matcher invoker, after-hooks fire on every exit path of that
    /// pipeline, and the outcome lands in the current frame.
    pub fn spec(&mut self, terms: Vec<Term>) {
        let gate = match self.frames.last() {
            Some(frame) => frame.gate,
            None => {
                self.reporter.error("Spec error: no open describe scope");
                return;
            }
        };
        if !gate {
            return;
        }

        self.fire_hooks(HookPos::Before);

        let rendered = formatter::render_sequence(&terms);
        let result = self.evaluate(terms);

        self.fire_hooks(HookPos::After);
        self.record(rendered, result);
    }

    /// Tokenize, parse, resolve, and invoke. Negation flips exactly the
    /// boolean outcome, never the error.
    fn evaluate(&mut self, terms: Vec<Term>) -> SpecResult<bool> {
        let parsed = parser::parse(terms)?;
        let mut args = vec![parsed.subject];
        if let Some(argument) = parsed.argument {
            args.push(argument);
        }
        let passed = matcher::invoke(&parsed.matcher, &args)?;
        Ok(if parsed.negated { !passed } else { passed })
    }

    /// Fire applicable hooks, walking scopes from outermost to
    /// innermost in registration order. `First` triggers are removed
    /// after their single firing; `Last` after-hooks wait for teardown.
    fn fire_hooks(&mut self, position: HookPos) {
        for i in 0..self.frames.len() {
            let mut list = match position {
                HookPos::Before => std::mem::take(&mut self.frames[i].before),
                HookPos::After => std::mem::take(&mut self.frames[i].after),
            };

            let mut j = 0;
            while j < list.len() {
                if position == HookPos::After && list[j].quantifier == Quantifier::Last {
                    j += 1;
                    continue;
                }
                self.trace(format_args!(
                    "firing {} {} at depth {}",
                    position, list[j].quantifier, i
                ));
                if list[j].quantifier == Quantifier::First {
                    let mut trigger = list.remove(j);
                    (trigger.callback)();
                } else {
                    (list[j].callback)();
                    j += 1;
                }
            }

            match position {
                HookPos::Before => self.frames[i].before = list,
                HookPos::After => self.frames[i].after = list,
            }
        }
    }

    fn record(&mut self, rendered: String, result: SpecResult<bool>) {
        let outcome = &mut self
            .frames
            .last_mut()
            .expect("recording requires an open scope")
            .outcome;
        outcome.ran += 1;
        match result {
            Ok(true) => {}
            Ok(false) => {
                outcome.failed += 1;
                if outcome.failing_seq.is_none() {
                    outcome.failing_seq = Some(rendered);
                }
            }
            Err(e) => {
                if outcome.error.is_none() {
                    outcome.error = Some(e.to_string());
                    if outcome.failing_seq.is_none() {
                        outcome.failing_seq = Some(rendered);
                    }
                }
            }
        }
    }

    fn trace(&mut self, args: fmt::Arguments<'_>) {
        if self.debug {
            self.reporter.logf(args);
        }
    }
}
