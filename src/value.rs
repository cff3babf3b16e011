//! Dynamic spec values and nilary function-call subjects.
//!
//! Assertion subjects and matcher arguments are an open set of runtime
//! types. [`SpecValue`] gives the engine the two capabilities it needs
//! over that set: downcasting (via [`Any`]) and deep structural equality
//! across type-erased values. A blanket impl covers every `'static` type
//! that is `Debug + PartialEq`, so plain literals, structs, and enums all
//! participate without per-type glue.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// A type-erased assertion value.
///
/// Equality is structural: `dyn_eq` succeeds only when the other value has
/// the same concrete type and compares equal by `PartialEq`.
pub trait SpecValue: Any + fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    /// Deep structural equality against another erased value.
    fn dyn_eq(&self, other: &dyn SpecValue) -> bool;

    /// Concrete type name, for type-mismatch diagnostics.
    fn type_label(&self) -> &'static str;
}

impl<T: Any + fmt::Debug + PartialEq> SpecValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn SpecValue) -> bool {
        match other.as_any().downcast_ref::<T>() {
            Some(other) => self == other,
            None => false,
        }
    }

    fn type_label(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Owned, type-erased value.
pub type BoxValue = Box<dyn SpecValue>;

/// The declared error slot of a nilary callable's return list.
///
/// Mirrors the three observable states of a fallible call: the callable
/// never declared an error-capable return, it declared one and returned
/// nil, or it returned an actual error.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorReturn {
    Undeclared,
    Nil,
    Err(String),
}

impl ErrorReturn {
    /// True when the callable declares an error-capable final return.
    pub fn is_declared(&self) -> bool {
        !matches!(self, ErrorReturn::Undeclared)
    }
}

/// The realized result of invoking a zero-argument callable subject.
///
/// Holds the ordered returned values, the declared error slot, and any
/// runtime fault (panic) captured during the call. Created fresh per
/// assertion and discarded with it.
#[derive(Debug)]
pub struct FnCall {
    /// Returned values, in declaration order. Empty when the call
    /// panicked or returned `Err`.
    pub out: Vec<BoxValue>,
    /// The declared error slot, held apart from the value outputs.
    pub err: ErrorReturn,
    /// Panic payload captured during invocation, if any.
    pub fault: Option<String>,
}

impl FnCall {
    /// The first returned value, used as the effective comparison value
    /// when no index was supplied.
    pub fn first(&self) -> Option<&dyn SpecValue> {
        self.out.first().map(|v| &**v)
    }
}

/// Raw outputs produced by a nilary callable, before fault capture.
pub(crate) struct Outputs {
    pub(crate) out: Vec<BoxValue>,
    pub(crate) err: ErrorReturn,
}

/// An un-invoked zero-argument callable usable as an assertion subject.
///
/// Built through [`crate::call`], [`crate::try_call`], or
/// [`crate::call_with_error`]; the parser invokes it exactly once while
/// resolving the subject, capturing any panic as a fault.
pub struct Nilary {
    f: Box<dyn FnOnce() -> Outputs>,
}

impl Nilary {
    pub(crate) fn new(f: Box<dyn FnOnce() -> Outputs>) -> Self {
        Nilary { f }
    }

    /// Invoke the callable, capturing a panic rather than propagating it.
    pub(crate) fn invoke(self) -> FnCall {
        match catch_unwind(AssertUnwindSafe(self.f)) {
            Ok(Outputs { out, err }) => FnCall {
                out,
                err,
                fault: None,
            },
            Err(payload) => FnCall {
                out: Vec::new(),
                err: ErrorReturn::Undeclared,
                fault: Some(panic_message(&*payload)),
            },
        }
    }
}

impl fmt::Debug for Nilary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<fn>")
    }
}

/// Extract a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// A runtime type-checked boolean predicate for the `Satisfy` matcher.
///
/// Wraps a single-argument closure together with the name of the type it
/// expects, so an incompatible subject becomes a type-mismatch error
/// instead of a crash. Built through [`crate::pred`].
pub struct Predicate {
    expects: &'static str,
    check: Box<dyn Fn(&dyn Any) -> Option<bool>>,
}

impl Predicate {
    pub fn new<T, F>(f: F) -> Self
    where
        T: Any,
        F: Fn(&T) -> bool + 'static,
    {
        Predicate {
            expects: std::any::type_name::<T>(),
            check: Box::new(move |any| any.downcast_ref::<T>().map(|t| f(t))),
        }
    }

    /// The type name this predicate accepts.
    pub fn expects(&self) -> &'static str {
        self.expects
    }

    /// Apply to an erased value. `None` means the value's runtime type
    /// does not admit the predicate's parameter type.
    pub fn apply(&self, value: &dyn SpecValue) -> Option<bool> {
        (self.check)(value.as_any())
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate(fn(&{}) -> bool)", self.expects)
    }
}

// Predicates compare by identity; two separately built predicates are
// never structurally equal.
impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}
