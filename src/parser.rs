//! Tokenizer and grammar parser for assertion sequences.
//!
//! The grammar has two shapes:
//!
//! ```text
//! assertion    := subject-spec Should [Not] matcher [argument]
//! subject-spec := value [ integer-index ]
//! ```
//!
//! Tokens are classified purely by term identity; parsing consumes them
//! left to right and resolves nilary callables as it goes. Every failure
//! is a returned [`GrammarError`] scoped to the single assertion — the
//! parser never panics and never unwinds past it.

use crate::matcher::{MatcherRef, Subject};
use crate::term::{Sugar, Term};
use std::fmt;
use thiserror::Error;

/// Classification of one raw sequence piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `Should` or `Not`.
    Sugar,
    /// A registered matcher reference.
    Matcher,
    /// Everything else, callables included.
    Value,
}

impl TokenKind {
    fn of(term: &Term) -> TokenKind {
        match term {
            Term::Sugar(_) => TokenKind::Sugar,
            Term::Matcher(_) => TokenKind::Matcher,
            Term::Callable(_) | Term::Value(_) => TokenKind::Value,
        }
    }
}

/// Classify every piece of a sequence.
pub fn tokenize(terms: &[Term]) -> Vec<TokenKind> {
    terms.iter().map(TokenKind::of).collect()
}

/// Grammar errors for a single assertion sequence.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("missing subject value")]
    MissingValue,

    #[error("missing Should connective")]
    MissingShould,

    #[error("misplaced connective")]
    BadConnective,

    #[error("unexpected value in place of a connective")]
    UnexpectedValue,

    #[error("missing matcher")]
    MissingMatcher,

    #[error("too many value pieces")]
    TooManyValuePieces,

    #[error("subject index must be an integer")]
    NonIntegerIndex,

    #[error("cannot index a plain value")]
    CannotIndex,

    #[error("index {index} out of range for {len} returned values")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("matcher needs too many arguments")]
    NeedsTooManyArguments,

    #[error("missing matcher argument")]
    MissingArgument,

    #[error("excess specification pieces")]
    ExcessPieces,
}

/// A fully parsed assertion, ready for matcher invocation.
pub struct ParsedSpec {
    pub subject: Subject,
    pub negated: bool,
    pub matcher: MatcherRef,
    pub argument: Option<Subject>,
}

// Matcher handles render by name.
impl fmt::Debug for ParsedSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedSpec")
            .field("subject", &self.subject)
            .field("negated", &self.negated)
            .field("matcher", &self.matcher.name())
            .field("argument", &self.argument)
            .finish()
    }
}

/// Parse a full assertion sequence.
pub fn parse(terms: Vec<Term>) -> Result<ParsedSpec, GrammarError> {
    if terms.is_empty() {
        return Err(GrammarError::MissingValue);
    }

    let mut terms = terms.into_iter().peekable();

    let subject = parse_value(&mut terms, true)?;

    // `Should` separates subject from matcher.
    match terms.next() {
        Some(Term::Sugar(Sugar::Should)) => {}
        Some(Term::Sugar(Sugar::Not)) => return Err(GrammarError::BadConnective),
        Some(Term::Matcher(_)) => return Err(GrammarError::MissingShould),
        Some(_) => return Err(GrammarError::UnexpectedValue),
        None => return Err(GrammarError::MissingShould),
    }

    // Optional `Not` sets the negation flag.
    let negated = match terms.peek() {
        Some(Term::Sugar(Sugar::Not)) => {
            terms.next();
            true
        }
        _ => false,
    };

    let matcher = match terms.next() {
        Some(Term::Matcher(m)) => m,
        _ => return Err(GrammarError::MissingMatcher),
    };

    let argument = match matcher.num_args() {
        0 | 1 => None,
        2 => {
            if terms.peek().is_none() {
                return Err(GrammarError::MissingArgument);
            }
            Some(parse_value(&mut terms, false)?)
        }
        _ => return Err(GrammarError::NeedsTooManyArguments),
    };

    if terms.next().is_some() {
        return Err(GrammarError::ExcessPieces);
    }

    Ok(ParsedSpec {
        subject,
        negated,
        matcher,
        argument,
    })
}

/// Parse one value spec: gobble plain pieces up to the next connective,
/// resolve a nilary callable, and apply an optional positional index.
///
/// `leading` marks the subject position, where an immediate connective
/// means the subject is missing rather than merely misplaced.
fn parse_value<I>(
    terms: &mut std::iter::Peekable<I>,
    leading: bool,
) -> Result<Subject, GrammarError>
where
    I: Iterator<Item = Term>,
{
    let mut pieces: Vec<Term> = Vec::new();
    loop {
        match terms.peek() {
            Some(Term::Sugar(Sugar::Should)) => {
                if pieces.is_empty() {
                    return Err(if leading {
                        GrammarError::MissingValue
                    } else {
                        GrammarError::MissingArgument
                    });
                }
                break;
            }
            Some(Term::Sugar(Sugar::Not)) => return Err(GrammarError::BadConnective),
            Some(Term::Matcher(_)) => {
                if leading {
                    return Err(GrammarError::MissingShould);
                }
                break;
            }
            Some(_) => {
                if pieces.len() == 2 {
                    return Err(GrammarError::TooManyValuePieces);
                }
                pieces.push(terms.next().expect("peeked"));
            }
            None => break,
        }
    }

    if pieces.is_empty() {
        return Err(if leading {
            GrammarError::MissingValue
        } else {
            GrammarError::MissingArgument
        });
    }

    let mut pieces = pieces.into_iter();

    // Resolve a nilary callable immediately, capturing any fault.
    let mut subject = match pieces.next().expect("at least one piece") {
        Term::Callable(nilary) => Subject::Call(nilary.invoke()),
        Term::Value(v) => Subject::Plain(v),
        _ => unreachable!("connectives and matchers never reach the piece list"),
    };

    // Apply a positional index into a multi-value return list.
    if let Some(index_piece) = pieces.next() {
        let index = integer_index(&index_piece).ok_or(GrammarError::NonIntegerIndex)?;
        subject = match subject {
            Subject::Call(call) => {
                let len = call.out.len();
                if index >= len {
                    return Err(GrammarError::IndexOutOfRange { index, len });
                }
                let value = call
                    .out
                    .into_iter()
                    .nth(index)
                    .expect("index checked against len");
                Subject::Plain(value)
            }
            Subject::Plain(_) => return Err(GrammarError::CannotIndex),
        };
    }

    Ok(subject)
}

/// Downcast an index piece to a non-negative integer.
fn integer_index(term: &Term) -> Option<usize> {
    let value = match term {
        Term::Value(v) => v.as_any(),
        _ => return None,
    };
    if let Some(&i) = value.downcast_ref::<usize>() {
        Some(i)
    } else if let Some(&i) = value.downcast_ref::<i32>() {
        if i >= 0 {
            Some(i as usize)
        } else {
            None
        }
    } else if let Some(&i) = value.downcast_ref::<i64>() {
        if i >= 0 {
            Some(i as usize)
        } else {
            None
        }
    } else {
        None
    }
}
