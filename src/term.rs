//! Assertion sequence pieces.
//!
//! A spec is written as a flat, ordered list of [`Term`]s that reads as a
//! sentence: `1, Should, Not, equal(), 2`. Connectives and matcher
//! references are distinguished from plain values purely by which variant
//! carries them; the tokenizer classifies by that identity alone.

use crate::matcher::MatcherRef;
use crate::value::{BoxValue, ErrorReturn, Nilary, Outputs, Predicate, SpecValue};
use std::fmt;

/// The two connective markers of the spec grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sugar {
    Should,
    Not,
}

impl fmt::Display for Sugar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sugar::Should => f.write_str("Should"),
            Sugar::Not => f.write_str("Not"),
        }
    }
}

/// One raw piece of an assertion sequence.
pub enum Term {
    /// A connective marker (`Should` / `Not`).
    Sugar(Sugar),
    /// A reference to a registered matcher.
    Matcher(MatcherRef),
    /// A zero-argument callable, resolved lazily as a subject.
    Callable(Nilary),
    /// Everything else: literals, structs, predicates, indexes.
    Value(BoxValue),
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Sugar(s) => write!(f, "Sugar({})", s),
            Term::Matcher(m) => write!(f, "Matcher({})", m.name()),
            Term::Callable(_) => f.write_str("Callable(<fn>)"),
            Term::Value(v) => write!(f, "Value({:?})", v),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Sugar(s) => write!(f, "{}", s),
            Term::Matcher(m) => f.write_str(m.name()),
            Term::Callable(_) => f.write_str("<fn>"),
            Term::Value(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<Sugar> for Term {
    fn from(s: Sugar) -> Term {
        Term::Sugar(s)
    }
}

impl From<MatcherRef> for Term {
    fn from(m: MatcherRef) -> Term {
        Term::Matcher(m)
    }
}

impl From<Nilary> for Term {
    fn from(n: Nilary) -> Term {
        Term::Callable(n)
    }
}

macro_rules! term_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Term {
                fn from(v: $ty) -> Term {
                    Term::Value(Box::new(v))
                }
            }
        )*
    };
}

term_from_value!(i32, i64, u32, u64, usize, bool, char, f64, String);

// &str cannot be erased as-is (it is not `'static` in general); capture
// it as an owned String so Equal compares String to String.
impl From<&str> for Term {
    fn from(v: &str) -> Term {
        Term::Value(Box::new(v.to_string()))
    }
}

/// Wrap an arbitrary value as a plain sequence piece.
pub fn val(v: impl SpecValue) -> Term {
    Term::Value(Box::new(v))
}

/// A zero-argument callable returning a single value.
///
/// ```
/// # use minispec::*;
/// # let mut rep = RecordingReport::new();
/// # let mut s = SpecTest::new(&mut rep);
/// # s.describe("three", |s| {
/// s.spec(vec![call(|| 3), Should.into(), equal(), 3.into()]);
/// # });
/// ```
pub fn call<F, T>(f: F) -> Term
where
    F: FnOnce() -> T + 'static,
    T: SpecValue,
{
    Term::Callable(Nilary::new(Box::new(move || Outputs {
        out: vec![Box::new(f()) as BoxValue],
        err: ErrorReturn::Undeclared,
    })))
}

/// A zero-argument fallible callable. `Ok(v)` yields one value and a nil
/// error slot; `Err(e)` yields no values and a set error slot.
pub fn try_call<F, T, E>(f: F) -> Term
where
    F: FnOnce() -> Result<T, E> + 'static,
    T: SpecValue,
    E: fmt::Display,
{
    Term::Callable(Nilary::new(Box::new(move || match f() {
        Ok(v) => Outputs {
            out: vec![Box::new(v) as BoxValue],
            err: ErrorReturn::Nil,
        },
        Err(e) => Outputs {
            out: Vec::new(),
            err: ErrorReturn::Err(e.to_string()),
        },
    })))
}

/// A zero-argument callable returning a value together with an optional
/// error, the shape `HaveError` inspects: the value output is always
/// present and the error slot is nil or set.
pub fn call_with_error<F, T, E>(f: F) -> Term
where
    F: FnOnce() -> (T, Option<E>) + 'static,
    T: SpecValue,
    E: fmt::Display,
{
    Term::Callable(Nilary::new(Box::new(move || {
        let (v, e) = f();
        Outputs {
            out: vec![Box::new(v) as BoxValue],
            err: match e {
                Some(e) => ErrorReturn::Err(e.to_string()),
                None => ErrorReturn::Nil,
            },
        }
    })))
}

/// A runtime type-checked predicate argument for `Satisfy`.
pub fn pred<T, F>(f: F) -> Term
where
    T: std::any::Any,
    F: Fn(&T) -> bool + 'static,
{
    Term::Value(Box::new(Predicate::new(f)))
}

/// Build a term sequence and evaluate it as a spec:
///
/// ```
/// # use minispec::*;
/// # let mut rep = RecordingReport::new();
/// # let mut s = SpecTest::new(&mut rep);
/// # s.describe("one", |s| {
/// spec!(s, 1, Should, Not, equal(), 2);
/// # });
/// ```
#[macro_export]
macro_rules! spec {
    ($runner:expr, $($piece:expr),+ $(,)?) => {
        $runner.spec(vec![$($crate::Term::from($piece)),+])
    };
}
