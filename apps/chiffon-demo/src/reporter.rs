//! User-facing message reporting.
//!
//! The original demo reports through modal dialogs. The flow only needs
//! two message kinds, so the seam is a small trait: the binary uses the
//! console implementation, tests record messages instead.

/// Destination for the demo's user-facing messages.
pub trait Reporter {
    /// Report a warning (the "couldn't register" case).
    fn warning(&mut self, message: &str);

    /// Report an informational message (the greeting).
    fn info(&mut self, message: &str);
}

/// Reporter that writes to the terminal.
///
/// Warnings go to stderr, informational messages to stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn warning(&mut self, message: &str) {
        eprintln!("warning: {message}");
    }

    fn info(&mut self, message: &str) {
        println!("{message}");
    }
}

// =============================================================================
// TESTS
// =============================================================================

/// Reporter that records messages for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub warnings: Vec<String>,
    pub infos: Vec<String>,
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn info(&mut self, message: &str) {
        self.infos.push(message.to_string());
    }
}
