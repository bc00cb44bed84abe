//! The demo flow.
//!
//! The observable sequence of the original demo program: construct the
//! updater tool, initialize it, resolve the running binary's own path,
//! register it, and report the outcome with two user-facing messages (a
//! warning when registration was skipped, then an unconditional greeting
//! with the demo version).
//!
//! The original collapses every failure into one silent generic warning.
//! Here the flow still shows the single warning, but returns a distinct
//! [`SkipReason`] and logs each failure cause separately, so init
//! failures and self-path failures are no longer indistinguishable.

use crate::reporter::Reporter;
use crate::tool::{ToolError, UpdaterTool};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Demo version string, shown in the greeting.
pub const DEMO_VERSION: &str = "1.0";

/// Warning shown when the demo could not register itself.
pub const WARNING_MESSAGE: &str = "Couldn't register myself.";

/// Why self-registration was skipped.
#[derive(Debug)]
pub enum SkipReason {
    /// The updater tool reported initialization failure.
    InitFailed,
    /// The running binary's own path could not be resolved.
    SelfPathFailed(std::io::Error),
    /// The updater tool rejected the registration.
    RegisterFailed(ToolError),
}

/// Run the demo flow against the real self path.
///
/// Returns the skip reason when registration did not happen, `None` when
/// it did. The greeting is reported in every case.
pub fn run_demo(tool: &mut UpdaterTool, reporter: &mut dyn Reporter) -> Option<SkipReason> {
    run_with_self_path(tool, reporter, std::env::current_exe())
}

/// Demo flow with an injectable self-path result.
fn run_with_self_path(
    tool: &mut UpdaterTool,
    reporter: &mut dyn Reporter,
    self_path: std::io::Result<PathBuf>,
) -> Option<SkipReason> {
    let skip = register_self(tool, self_path);

    if let Some(reason) = &skip {
        match reason {
            SkipReason::InitFailed => {
                warn!("registration skipped: updater tool failed to initialize");
            }
            SkipReason::SelfPathFailed(err) => {
                warn!(error = %err, "registration skipped: could not resolve own binary path");
            }
            SkipReason::RegisterFailed(err) => {
                warn!(error = %err, "registration skipped: updater tool rejected the registration");
            }
        }
        reporter.warning(WARNING_MESSAGE);
    }

    reporter.info(&format!("Hello! This is Demo version {DEMO_VERSION}"));

    skip
}

/// Initialize the tool and register the running binary.
fn register_self(
    tool: &mut UpdaterTool,
    self_path: std::io::Result<PathBuf>,
) -> Option<SkipReason> {
    if !tool.initialize() {
        return Some(SkipReason::InitFailed);
    }

    match self_path {
        Ok(path) => match tool.register_program(&path) {
            Ok(sequence) => {
                debug!(sequence = sequence.value(), path = %path.display(), "registered myself");
                None
            }
            Err(err) => Some(SkipReason::RegisterFailed(err)),
        },
        Err(err) => Some(SkipReason::SelfPathFailed(err)),
    }
}

// =============================================================================
// TESTS
// =============================================================================
