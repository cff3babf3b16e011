//! Matcher trait, registry, built-ins, and the guarded invoker.
//!
//! A matcher is any named, arity-declared boolean predicate over resolved
//! subjects. Built-ins and user matchers satisfy the same [`Matcher`]
//! trait; nothing in the engine special-cases the built-in set. Arity is
//! validated once at construction, so per-call failures are purely
//! argument mismatches.

use crate::errors::{SpecError, SpecResult};
use crate::value::{panic_message, FnCall, Predicate, SpecValue};
use crate::Term;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;

/// A resolved assertion operand: either a plain value or a realized
/// function call.
#[derive(Debug)]
pub enum Subject {
    Plain(Box<dyn SpecValue>),
    Call(FnCall),
}

impl Subject {
    /// Unwrap to the effective comparison value: a plain value itself, or
    /// a function call's first return value.
    pub fn effective(&self) -> Result<&dyn SpecValue, MatchError> {
        match self {
            Subject::Plain(v) => Ok(&**v),
            Subject::Call(call) => call.first().ok_or(MatchError::EmptyCall),
        }
    }

    /// The realized function call, if this subject is one.
    pub fn as_call(&self) -> Option<&FnCall> {
        match self {
            Subject::Call(call) => Some(call),
            Subject::Plain(_) => None,
        }
    }
}

/// Errors raised while invoking a matcher. Per-assertion, never fatal.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("wrong number of arguments: {matcher} takes {expected}, got {got}")]
    ArgCount {
        matcher: String,
        expected: usize,
        got: usize,
    },

    #[error("{matcher} argument type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        matcher: String,
        expected: String,
        actual: String,
    },

    #[error("{matcher} needs a predicate argument (fn(&T) -> bool)")]
    NotPredicate { matcher: String },

    #[error("{matcher} needs a function call subject")]
    NeedsFnCall { matcher: String },

    #[error("function call's last return value must be error-capable")]
    NoErrorReturn,

    #[error("function call produced no value")]
    EmptyCall,

    #[error("runtime panic: {0}")]
    Panicked(String),
}

/// A named, arity-declared boolean predicate over subjects.
///
/// `num_args` counts the subject itself, so `Equal` declares 2 and
/// `HaveError` declares 1. Implementations report pass/fail through the
/// `Ok` value and argument problems through `Err`; panics are caught at
/// the invocation boundary by [`invoke`].
pub trait Matcher: Send + Sync {
    fn name(&self) -> &str;

    /// Number of arguments, subject included. Must be at least 1.
    fn num_args(&self) -> usize;

    fn matches(&self, args: &[Subject]) -> Result<bool, MatchError>;
}

/// Shared handle to a matcher, as carried in term sequences.
pub type MatcherRef = Arc<dyn Matcher>;

/// Invoke a matcher with an arity check and a panic guard.
///
/// A panic raised inside the matcher itself becomes a
/// [`MatchError::Panicked`] rather than escaping to the host.
pub fn invoke(matcher: &MatcherRef, args: &[Subject]) -> Result<bool, MatchError> {
    if args.len() != matcher.num_args() {
        return Err(MatchError::ArgCount {
            matcher: matcher.name().to_string(),
            expected: matcher.num_args(),
            got: args.len(),
        });
    }
    match catch_unwind(AssertUnwindSafe(|| matcher.matches(args))) {
        Ok(result) => result,
        Err(payload) => Err(MatchError::Panicked(panic_message(&*payload))),
    }
}

/// Adapt a plain closure into a [`Matcher`].
///
/// Construction validates the declared arity once; a nilary matcher is a
/// registration error, not a runtime condition.
pub struct FnMatcher {
    name: String,
    num_args: usize,
    f: Box<dyn Fn(&[Subject]) -> Result<bool, MatchError> + Send + Sync>,
}

impl FnMatcher {
    pub fn new<F>(name: impl Into<String>, num_args: usize, f: F) -> SpecResult<Self>
    where
        F: Fn(&[Subject]) -> Result<bool, MatchError> + Send + Sync + 'static,
    {
        let name = name.into();
        if num_args == 0 {
            return Err(SpecError::Registration(format!(
                "matcher {:?} declares no arguments",
                name
            )));
        }
        Ok(FnMatcher {
            name,
            num_args,
            f: Box::new(f),
        })
    }
}

impl Matcher for FnMatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_args(&self) -> usize {
        self.num_args
    }

    fn matches(&self, args: &[Subject]) -> Result<bool, MatchError> {
        (self.f)(args)
    }
}

/// Deep structural equality between the two effective values.
struct EqualMatcher;

impl Matcher for EqualMatcher {
    fn name(&self) -> &str {
        "Equal"
    }

    fn num_args(&self) -> usize {
        2
    }

    fn matches(&self, args: &[Subject]) -> Result<bool, MatchError> {
        let a = args[0].effective()?;
        let b = args[1].effective()?;
        Ok(a.dyn_eq(b))
    }
}

/// Apply a runtime type-checked predicate to the effective subject.
struct SatisfyMatcher;

impl Matcher for SatisfyMatcher {
    fn name(&self) -> &str {
        "Satisfy"
    }

    fn num_args(&self) -> usize {
        2
    }

    fn matches(&self, args: &[Subject]) -> Result<bool, MatchError> {
        let x = args[0].effective()?;
        let predicate = args[1]
            .effective()?
            .as_any()
            .downcast_ref::<Predicate>()
            .ok_or_else(|| MatchError::NotPredicate {
                matcher: self.name().to_string(),
            })?;
        predicate
            .apply(x)
            .ok_or_else(|| MatchError::TypeMismatch {
                matcher: self.name().to_string(),
                expected: predicate.expects().to_string(),
                actual: x.type_label().to_string(),
            })
    }
}

/// Pass iff a function-call subject's declared error slot is non-nil.
struct HaveErrorMatcher;

impl Matcher for HaveErrorMatcher {
    fn name(&self) -> &str {
        "HaveError"
    }

    fn num_args(&self) -> usize {
        1
    }

    fn matches(&self, args: &[Subject]) -> Result<bool, MatchError> {
        let call = args[0].as_call().ok_or(MatchError::NeedsFnCall {
            matcher: self.name().to_string(),
        })?;
        if !call.err.is_declared() {
            return Err(MatchError::NoErrorReturn);
        }
        Ok(matches!(call.err, crate::value::ErrorReturn::Err(_)))
    }
}

/// Pass iff invoking the function-call subject raised a captured fault.
struct PanicMatcher;

impl Matcher for PanicMatcher {
    fn name(&self) -> &str {
        "Panic"
    }

    fn num_args(&self) -> usize {
        1
    }

    fn matches(&self, args: &[Subject]) -> Result<bool, MatchError> {
        let call = args[0].as_call().ok_or(MatchError::NeedsFnCall {
            matcher: self.name().to_string(),
        })?;
        Ok(call.fault.is_some())
    }
}

/// A named set of matchers, read-only after initialization.
pub struct Registry {
    matchers: BTreeMap<String, MatcherRef>,
}

impl Registry {
    /// An empty registry.
    pub fn empty() -> Self {
        Registry {
            matchers: BTreeMap::new(),
        }
    }

    /// A registry pre-populated with the built-in matchers.
    pub fn with_builtins() -> Self {
        let mut registry = Registry::empty();
        for matcher in [
            Arc::new(EqualMatcher) as MatcherRef,
            Arc::new(SatisfyMatcher) as MatcherRef,
            Arc::new(HaveErrorMatcher) as MatcherRef,
            Arc::new(PanicMatcher) as MatcherRef,
        ]
        .iter()
        .cloned()
        {
            registry
                .register(matcher)
                .expect("built-in matchers are valid");
        }
        registry
    }

    /// Register a matcher. Fails on a duplicate name or zero arity.
    pub fn register(&mut self, matcher: MatcherRef) -> SpecResult<()> {
        if matcher.num_args() == 0 {
            return Err(SpecError::Registration(format!(
                "matcher {:?} declares no arguments",
                matcher.name()
            )));
        }
        let name = matcher.name().to_string();
        if self.matchers.contains_key(&name) {
            return Err(SpecError::Registration(format!(
                "matcher {:?} already registered",
                name
            )));
        }
        self.matchers.insert(name, matcher);
        Ok(())
    }

    /// Look up a matcher by name.
    pub fn get(&self, name: &str) -> Option<MatcherRef> {
        self.matchers.get(name).cloned()
    }

    /// Look up a matcher and wrap it as a sequence term.
    pub fn term(&self, name: &str) -> SpecResult<Term> {
        self.get(name)
            .map(Term::Matcher)
            .ok_or_else(|| SpecError::Registration(format!("no matcher named {:?}", name)))
    }

    /// Registered matcher names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.matchers.keys().map(|k| k.as_str()).collect()
    }
}

static BUILTINS: Lazy<Registry> = Lazy::new(Registry::with_builtins);

/// The built-in registry shared by the keyword helpers.
pub fn builtins() -> &'static Registry {
    &BUILTINS
}

fn builtin_term(name: &str) -> Term {
    Term::Matcher(BUILTINS.get(name).expect("built-in matcher registered"))
}

/// The `Equal` matcher keyword.
pub fn equal() -> Term {
    builtin_term("Equal")
}

/// The `Satisfy` matcher keyword.
pub fn satisfy() -> Term {
    builtin_term("Satisfy")
}

/// The `HaveError` matcher keyword.
pub fn have_error() -> Term {
    builtin_term("HaveError")
}

/// The `Panic` matcher keyword.
pub fn panics() -> Term {
    builtin_term("Panic")
}
