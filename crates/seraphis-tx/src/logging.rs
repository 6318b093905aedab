//! Logger handles.
//!
//! A `Logger` names the `log` target its messages are emitted under. The
//! library never installs a backend or keeps global logging state; the host
//! application (or a test, via `env_logger`) decides where records go.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Logger {
    target: &'static str,
}

impl Logger {
    pub const fn new(target: &'static str) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        log::debug!(target: self.target, "{args}");
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        log::info!(target: self.target, "{args}");
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        log::warn!(target: self.target, "{args}");
    }

    /// Log a failed step at debug level and hand the error back.
    pub fn fail<E: fmt::Display>(&self, step: &str, err: E) -> E {
        log::debug!(target: self.target, "{step} failed: {err}");
        err
    }
}

/// Proposal, partial-input, and assembly code.
pub const BUILDER: Logger = Logger::new("seraphis::builder");

/// The staged transaction validator.
pub const VALIDATION: Logger = Logger::new("seraphis::validation");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_targets() {
        let _ = env_logger::builder().is_test(true).try_init();
        assert_eq!(BUILDER.target(), "seraphis::builder");
        assert_eq!(VALIDATION.target(), "seraphis::validation");

        let custom = Logger::new("app::wallet");
        custom.debug(format_args!("building {} outputs", 3));
        let err = custom.fail("balance check", "amounts differ");
        assert_eq!(err, "amounts differ");
    }
}
