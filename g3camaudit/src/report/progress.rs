/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::error::Error;

use anstyle::{AnsiColor, Color, Style};
use indicatif::{ProgressBar, ProgressStyle};

use super::{Reporter, Step};

const COLOR_RED: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));
const COLOR_GREEN: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
const COLOR_CYAN: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan)));
const STYLE_DIMMED: Style = Style::new().dimmed();

/// Show one progress bar for the running step, and print the messages
/// above it.
pub struct ProgressReporter {
    bar: ProgressBar,
    debug: bool,
}

impl ProgressReporter {
    pub fn new(debug: bool) -> Self {
        let style = ProgressStyle::with_template(
            "{spinner:.green} {prefix:>18} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
        let bar = ProgressBar::new(0);
        bar.set_style(style);
        ProgressReporter { bar, debug }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    fn print(&self, style: Style, step: Step, message: &str) {
        self.bar.println(format!(
            "{}[{step}]{} {message}",
            style.render(),
            style.render_reset()
        ));
    }
}

impl Reporter for ProgressReporter {
    fn start(&self, step: Step, message: &str) {
        self.bar.reset();
        self.bar.set_length(0);
        self.bar.set_prefix(step.as_str());
        self.print(COLOR_CYAN, step, message);
    }

    fn done(&self, step: Step, message: &str) {
        self.print(COLOR_GREEN, step, message);
    }

    fn progress(&self, step: Step, message: &str) {
        self.print(Style::new(), step, message);
    }

    fn debug(&self, step: Step, message: &str) {
        if self.debug {
            self.print(STYLE_DIMMED, step, message);
        }
    }

    fn error(&self, step: Step, error: &dyn Error) {
        self.print(COLOR_RED, step, &error.to_string());
    }

    fn set_total(&self, _step: Step, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn tick(&self, _step: Step) {
        self.bar.inc(1);
    }
}
