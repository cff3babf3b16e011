//! End-to-end scenarios exercising the whole pipeline through the
//! public API.

use crate::*;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

#[derive(Debug, PartialEq, Clone)]
struct Point {
    x: i32,
    y: i32,
}

#[test]
fn test_value_equality() {
    let mut rep = RecordingReport::new();
    {
        let mut s = SpecTest::new(&mut rep);
        s.describe("equality", |s| {
            spec!(s, 3, Should, equal(), 3);
            spec!(s, "abc", Should, equal(), "abc");
            spec!(s, 2.5_f64, Should, Not, equal(), 2.6_f64);
            spec!(s, val(Point { x: 1, y: 2 }), Should, equal(), val(Point { x: 1, y: 2 }));
            spec!(s, val(Point { x: 1, y: 2 }), Should, Not, equal(), val(Point { x: 0, y: 2 }));
        });
    }
    assert!(!rep.failed(), "errors: {:?}", rep.errors);
    assert_eq!(rep.logs, vec!["equality: PASS"]);
}

#[test]
fn test_cross_type_equality_fails_without_error() {
    let mut rep = RecordingReport::new();
    {
        let mut s = SpecTest::new(&mut rep);
        s.describe("cross type", |s| {
            // Different concrete types are simply unequal.
            spec!(s, 1_i32, Should, Not, equal(), 1_i64);
        });
    }
    assert!(!rep.failed(), "errors: {:?}", rep.errors);
}

#[test]
fn test_lazy_subject_resolution() {
    let mut rep = RecordingReport::new();
    {
        let mut s = SpecTest::new(&mut rep);
        s.describe("lazy subjects", |s| {
            spec!(s, call(|| 2 + 2), Should, equal(), 4);
            // Index 0 selects a call's first return value explicitly.
            spec!(s, call(|| "hi".to_string()), 0, Should, equal(), "hi");
            // The argument side resolves lazily too.
            spec!(s, 4, Should, equal(), call(|| 2 + 2));
        });
    }
    assert!(!rep.failed(), "errors: {:?}", rep.errors);
}

#[test]
fn test_satisfy_predicate() {
    let mut rep = RecordingReport::new();
    {
        let mut s = SpecTest::new(&mut rep);
        s.describe("satisfy", |s| {
            spec!(s, 7, Should, satisfy(), pred(|x: &i32| *x > 0));
            spec!(s, -7, Should, Not, satisfy(), pred(|x: &i32| *x > 0));
            spec!(
                s,
                "word",
                Should,
                satisfy(),
                pred(|s: &String| s.chars().all(char::is_alphabetic))
            );
        });
    }
    assert!(!rep.failed(), "errors: {:?}", rep.errors);
}

#[test]
fn test_satisfy_wrong_subject_type_is_an_error() {
    let mut rep = RecordingReport::new();
    {
        let mut s = SpecTest::new(&mut rep);
        s.describe("satisfy type check", |s| {
            spec!(s, "nope", Should, satisfy(), pred(|x: &i32| *x > 0));
        });
    }
    assert_eq!(rep.error_count(), 1);
    assert!(rep.errors[0].contains("ERROR"));
    assert!(rep.errors[0].contains("type mismatch"));
}

#[test]
fn test_have_error_on_fallible_calls() {
    let mut rep = RecordingReport::new();
    {
        let mut s = SpecTest::new(&mut rep);
        s.describe("fallible calls", |s| {
            spec!(
                s,
                try_call(|| "7".parse::<i32>()),
                Should,
                Not,
                have_error()
            );
            spec!(
                s,
                try_call(|| "seven".parse::<i32>()),
                Should,
                have_error()
            );
            spec!(
                s,
                call_with_error(|| (3, None::<String>)),
                Should,
                Not,
                have_error()
            );
            spec!(
                s,
                call_with_error(|| (0, Some("overflow"))),
                Should,
                have_error()
            );
        });
    }
    assert!(!rep.failed(), "errors: {:?}", rep.errors);
}

#[test]
fn test_have_error_rejects_error_incapable_subjects() {
    let mut rep = RecordingReport::new();
    {
        let mut s = SpecTest::new(&mut rep);
        s.describe("have error misuse", |s| {
            // A bare call declares no error slot.
            spec!(s, call(|| 3), Should, have_error());
        });
    }
    assert_eq!(rep.error_count(), 1);
    assert!(rep.errors[0].contains("error-capable"));
}

#[test]
fn test_panicking_subject_is_contained() {
    let mut rep = RecordingReport::new();
    {
        let mut s = SpecTest::new(&mut rep);
        s.describe("contained panics", |s| {
            spec!(s, call(|| -> i32 { panic!("kaboom") }), Should, panics());
            spec!(s, call(|| 3), Should, Not, panics());
            // The run continues past the captured fault.
            spec!(s, 1, Should, equal(), 1);
        });
    }
    assert!(!rep.failed(), "errors: {:?}", rep.errors);
}

#[test]
fn test_custom_matcher_end_to_end() {
    let mut rep = RecordingReport::new();
    {
        let mut s = SpecTest::new(&mut rep);

        let be_empty: MatcherRef = Arc::new(
            FnMatcher::new("BeEmpty", 1, |args| {
                let v = args[0].effective()?;
                let s = v
                    .as_any()
                    .downcast_ref::<String>()
                    .ok_or_else(|| MatchError::TypeMismatch {
                        matcher: "BeEmpty".to_string(),
                        expected: "String".to_string(),
                        actual: v.type_label().to_string(),
                    })?;
                Ok(s.is_empty())
            })
            .unwrap(),
        );

        let mut registry = Registry::with_builtins();
        registry.register(be_empty).unwrap();

        s.describe("custom matchers", |s| {
            s.spec(vec![
                Term::from(""),
                Should.into(),
                registry.term("BeEmpty").unwrap(),
            ]);
            s.spec(vec![
                Term::from("x"),
                Should.into(),
                Not.into(),
                registry.term("BeEmpty").unwrap(),
            ]);
        });
    }
    assert!(!rep.failed(), "errors: {:?}", rep.errors);
}

// Port of the counter walkthrough: a shared counter mutated by hooks at
// two nesting levels, observed lazily by each assertion.
#[test]
fn test_counter_walkthrough() {
    let mut rep = RecordingReport::new();
    let x = Rc::new(Cell::new(0));
    let getx = {
        let x = Rc::clone(&x);
        move || {
            let x = Rc::clone(&x);
            call(move || x.get())
        }
    };

    {
        let mut s = SpecTest::new(&mut rep);
        s.describe("Triggers", |s| {
            {
                let x = Rc::clone(&x);
                s.before(All, move || x.set(x.get() + 1)).unwrap();
            }
            {
                let x = Rc::clone(&x);
                s.after(All, move || x.set(x.get() - 1)).unwrap();
            }

            s.it("sees the outer increment", |s| {
                spec!(s, getx(), Should, equal(), 1);
            });

            s.describe("nested", |s| {
                {
                    let x = Rc::clone(&x);
                    s.before(All, move || x.set(x.get() + 1)).unwrap();
                }
                {
                    let x = Rc::clone(&x);
                    s.after(All, move || x.set(x.get() - 1)).unwrap();
                }

                s.it("sees both increments", |s| {
                    spec!(s, getx(), Should, equal(), 2);
                    spec!(s, getx(), Should, equal(), 2);
                });
            });

            s.it("is back to the outer level", |s| {
                spec!(s, getx(), Should, equal(), 1);
            });
        });
    }

    assert!(!rep.failed(), "errors: {:?}", rep.errors);
    assert_eq!(x.get(), 0);
}

#[test]
fn test_first_quantifier_walkthrough() {
    let mut rep = RecordingReport::new();
    let x = Rc::new(Cell::new(0));
    let getx = {
        let x = Rc::clone(&x);
        move || {
            let x = Rc::clone(&x);
            call(move || x.get())
        }
    };

    {
        let mut s = SpecTest::new(&mut rep);
        s.describe("one-shot setup", |s| {
            {
                let x = Rc::clone(&x);
                s.before(First, move || x.set(10)).unwrap();
            }
            s.it("applies to the first assertion", |s| {
                spec!(s, getx(), Should, equal(), 10);
            });
            {
                let x = Rc::clone(&x);
                s.after(First, move || x.set(0)).unwrap();
            }
            s.it("and the paired teardown to the next", |s| {
                spec!(s, getx(), Should, equal(), 10);
            });
            s.it("after which neither fires again", |s| {
                spec!(s, getx(), Should, equal(), 0);
            });
        });
    }

    assert!(!rep.failed(), "errors: {:?}", rep.errors);
}

#[test]
fn test_scope_aggregation_takes_every_assertion_into_account() {
    let mut rep = RecordingReport::new();
    {
        let mut s = SpecTest::new(&mut rep);
        s.describe("aggregation", |s| {
            spec!(s, 1, Should, equal(), 2); // fails
            spec!(s, 1, Should, equal(), 1); // passes, scope still fails
        });
    }
    assert_eq!(rep.errors, vec!["aggregation: FAIL\n\t1 Should Equal 2"]);
    assert!(rep.logs.is_empty());
}

#[test]
fn test_grammar_errors_surface_per_scope() {
    let mut rep = RecordingReport::new();
    {
        let mut s = SpecTest::new(&mut rep);
        s.describe("grammar", |s| {
            s.describe("missing matcher", |s| {
                s.spec(vec![Term::from(1), Should.into()]);
            });
            s.describe("dangling index", |s| {
                spec!(s, call(|| 5), 3, Should, equal(), 5);
            });
            s.describe("index on a plain value", |s| {
                spec!(s, 5, 0, Should, equal(), 5);
            });
        });
    }
    assert_eq!(rep.error_count(), 3);
    assert!(rep.errors[0].contains("missing matcher"));
    assert!(rep.errors[1].contains("out of range"));
    assert!(rep.errors[2].contains("cannot index a plain value"));
}

#[test]
fn test_selection_pattern_from_config() {
    let mut rep = RecordingReport::new();
    let evaluated = Rc::new(Cell::new(0));
    {
        let mut s = SpecTest::with_config(&mut rep, SpecConfig::with_pattern("math"));
        let evaluated = Rc::clone(&evaluated);
        s.describe("math facts", |s| {
            let n = Rc::clone(&evaluated);
            spec!(s, call(move || { n.set(n.get() + 1); 2 + 2 }), Should, equal(), 4);
        });
        s.describe("string facts", |s| {
            let n = Rc::clone(&evaluated);
            spec!(s, call(move || { n.set(n.get() + 1); 0 }), Should, equal(), 999);
        });
    }
    // Only the matching scope evaluated its assertion.
    assert_eq!(evaluated.get(), 1);
    assert_eq!(rep.logs, vec!["math facts: PASS"]);
    assert!(rep.errors.is_empty());
}

#[test]
fn test_they_reads_as_plural() {
    let mut rep = RecordingReport::new();
    {
        let mut s = SpecTest::new(&mut rep);
        s.describe("primes", |s| {
            s.they("are all odd except two", |s| {
                for p in [3, 5, 7, 11] {
                    spec!(s, p % 2, Should, equal(), 1);
                }
            });
        });
    }
    assert_eq!(rep.logs, vec!["primes are all odd except two: PASS"]);
}
