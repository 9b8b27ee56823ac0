/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::error::Error;
use std::fmt;

use crate::stream::CameraStream;

mod logger;
pub use logger::LogReporter;

mod progress;
pub use progress::ProgressReporter;

mod summary;
pub use summary::format_summary;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    Scan,
    AttackRoutes,
    DetectAuth,
    AttackCredentials,
    ValidateStreams,
    Summary,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Scan => "scan",
            Step::AttackRoutes => "attack-routes",
            Step::DetectAuth => "detect-auth",
            Step::AttackCredentials => "attack-credentials",
            Step::ValidateStreams => "validate-streams",
            Step::Summary => "summary",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sink of the attack events.
///
/// All methods are fire-and-forget, and they may be called from many
/// worker tasks at the same time.
pub trait Reporter: Send + Sync {
    fn start(&self, step: Step, message: &str);
    fn done(&self, step: Step, message: &str);
    fn progress(&self, step: Step, message: &str);
    fn debug(&self, step: Step, message: &str);
    fn error(&self, step: Step, error: &dyn Error);

    /// Set the number of ticks expected for the step.
    fn set_total(&self, _step: Step, _total: usize) {}
    fn tick(&self, _step: Step) {}
    fn update_summary(&self, _streams: &[CameraStream]) {}
}

/// A reporter that drops all events.
pub struct NopReporter;

impl Reporter for NopReporter {
    fn start(&self, _step: Step, _message: &str) {}
    fn done(&self, _step: Step, _message: &str) {}
    fn progress(&self, _step: Step, _message: &str) {}
    fn debug(&self, _step: Step, _message: &str) {}
    fn error(&self, _step: Step, _error: &dyn Error) {}
}
