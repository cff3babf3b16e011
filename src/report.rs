//! The host reporter capability and concrete reporters.
//!
//! The engine never talks to a test framework directly; it forwards
//! per-scope outcomes through [`Report`]. Successful scopes go through
//! `log`, failing or erroring scopes through `error`, and only an
//! unrecoverable setup fault (an invalid selection pattern) reaches
//! `fatal`.

use std::fmt;

/// An abstraction of a host test reporter.
///
/// `fatal` and `fail_now` abort the surrounding test and therefore never
/// return; in this crate's reporters they panic, which the host harness
/// treats as a test failure.
pub trait Report {
    fn log(&mut self, msg: &str);

    fn logf(&mut self, args: fmt::Arguments<'_>) {
        self.log(&args.to_string());
    }

    fn error(&mut self, msg: &str);

    fn errorf(&mut self, args: fmt::Arguments<'_>) {
        self.error(&args.to_string());
    }

    fn fatal(&mut self, msg: &str) -> !;

    fn fatalf(&mut self, args: fmt::Arguments<'_>) -> ! {
        self.fatal(&args.to_string())
    }

    /// Mark the run failed without stopping it.
    fn fail(&mut self);

    /// Mark the run failed and abort it.
    fn fail_now(&mut self) -> !;

    fn failed(&self) -> bool;
}

/// A reporter writing to stderr, for standalone use.
#[derive(Debug, Default)]
pub struct ConsoleReport {
    failed: bool,
}

impl ConsoleReport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Report for ConsoleReport {
    fn log(&mut self, msg: &str) {
        eprintln!("{}", msg);
    }

    fn error(&mut self, msg: &str) {
        self.failed = true;
        eprintln!("{}", msg);
    }

    fn fatal(&mut self, msg: &str) -> ! {
        self.failed = true;
        eprintln!("{}", msg);
        panic!("fatal: {}", msg);
    }

    fn fail(&mut self) {
        self.failed = true;
    }

    fn fail_now(&mut self) -> ! {
        self.failed = true;
        panic!("fail_now");
    }

    fn failed(&self) -> bool {
        self.failed
    }
}

/// A reporter forwarding to the `log` crate facade.
#[derive(Debug, Default)]
pub struct LogReport {
    failed: bool,
}

impl LogReport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Report for LogReport {
    fn log(&mut self, msg: &str) {
        log::info!("{}", msg);
    }

    fn error(&mut self, msg: &str) {
        self.failed = true;
        log::error!("{}", msg);
    }

    fn fatal(&mut self, msg: &str) -> ! {
        self.failed = true;
        log::error!("{}", msg);
        panic!("fatal: {}", msg);
    }

    fn fail(&mut self) {
        self.failed = true;
    }

    fn fail_now(&mut self) -> ! {
        self.failed = true;
        panic!("fail_now");
    }

    fn failed(&self) -> bool {
        self.failed
    }
}

/// A reporter capturing all traffic, for asserting on engine output.
#[derive(Debug, Default)]
pub struct RecordingReport {
    pub logs: Vec<String>,
    pub errors: Vec<String>,
    failed: bool,
}

impl RecordingReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

impl Report for RecordingReport {
    fn log(&mut self, msg: &str) {
        self.logs.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.failed = true;
        self.errors.push(msg.to_string());
    }

    fn fatal(&mut self, msg: &str) -> ! {
        self.failed = true;
        self.errors.push(msg.to_string());
        panic!("fatal: {}", msg);
    }

    fn fail(&mut self) {
        self.failed = true;
    }

    fn fail_now(&mut self) -> ! {
        self.failed = true;
        panic!("fail_now");
    }

    fn failed(&self) -> bool {
        self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn test_recording_report_captures_traffic() {
        let mut rep = RecordingReport::new();
        rep.log("all good");
        assert!(!rep.failed());

        rep.error("broke");
        assert!(rep.failed());
        assert_eq!(rep.logs, vec!["all good"]);
        assert_eq!(rep.errors, vec!["broke"]);
    }

    #[test]
    fn test_logf_formats() {
        let mut rep = RecordingReport::new();
        rep.logf(format_args!("{} + {}", 1, 2));
        assert_eq!(rep.logs, vec!["1 + 2"]);
    }

    #[test]
    fn test_fatal_records_then_aborts() {
        let mut rep = RecordingReport::new();
        let result = catch_unwind(AssertUnwindSafe(|| rep.fatal("bad pattern")));
        assert!(result.is_err());
        assert!(rep.failed());
        assert_eq!(rep.errors, vec!["bad pattern"]);
    }
}
