/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::error::Error;

use slog::{Logger, slog_debug, slog_error, slog_info};

use super::{Reporter, Step};
use crate::stream::CameraStream;

pub struct LogReporter {
    logger: Logger,
    debug: bool,
}

impl LogReporter {
    pub fn new(logger: Logger, debug: bool) -> Self {
        LogReporter { logger, debug }
    }
}

impl Reporter for LogReporter {
    fn start(&self, step: Step, message: &str) {
        slog_info!(self.logger, "{}", message; "step" => step.as_str(), "event" => "start");
    }

    fn done(&self, step: Step, message: &str) {
        slog_info!(self.logger, "{}", message; "step" => step.as_str(), "event" => "done");
    }

    fn progress(&self, step: Step, message: &str) {
        slog_info!(self.logger, "{}", message; "step" => step.as_str());
    }

    fn debug(&self, step: Step, message: &str) {
        if self.debug {
            slog_debug!(self.logger, "{}", message; "step" => step.as_str());
        }
    }

    fn error(&self, step: Step, error: &dyn Error) {
        slog_error!(self.logger, "{}", error; "step" => step.as_str());
    }

    fn update_summary(&self, streams: &[CameraStream]) {
        let accessible = streams.iter().filter(|s| s.available).count();
        slog_info!(self.logger, "summary updated";
            "step" => Step::Summary.as_str(),
            "streams" => streams.len(),
            "accessible" => accessible
        );
    }
}
