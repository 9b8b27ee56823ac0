/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt::{self, Write as _};
use std::io::{self, IsTerminal, Write};

use anstyle::{AnsiColor, Color, Style};
use chrono::Local;
use slog::{Drain, KV, Level, OwnedKVList, Record, slog_o};
use slog_scope::GlobalLoggerGuard;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub fn setup(verbose_level: u8) -> Result<GlobalLoggerGuard, log::SetLoggerError> {
    let drain = StderrDrain::new();
    let logger = slog::Logger::root(drain.fuse(), slog_o!());

    let scope_guard = slog_scope::set_global_logger(logger);

    let log_level = match verbose_level {
        0 => log::Level::Warn,
        1 => log::Level::Info,
        2 => log::Level::Debug,
        _ => log::Level::Trace,
    };

    slog_stdlog::init_with_level(log_level)?;
    Ok(scope_guard)
}

struct StderrDrain {
    console: bool,
}

impl StderrDrain {
    fn new() -> Self {
        StderrDrain {
            console: io::stderr().is_terminal(),
        }
    }

    fn write_plain<IO: Write>(&self, io: &mut IO, v: &LogValue) -> io::Result<()> {
        write!(io, "{} {}", v.time, v.level)?;
        for (k, v) in &v.kv_pairs {
            write!(io, " {k}: {v},")?;
        }
        writeln!(io, " {}", v.message)
    }

    fn write_console<IO: Write>(&self, io: &mut IO, v: &LogValue) -> io::Result<()> {
        const COLOR_MAGENTA: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Magenta)));
        const COLOR_RED: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));
        const COLOR_YELLOW: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));
        const COLOR_GREEN: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
        const COLOR_CYAN: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan)));
        const COLOR_BLUE: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue)));
        const STYLE_BOLD: Style = Style::new().bold();

        let bold_s = STYLE_BOLD.render();
        let bold_e = STYLE_BOLD.render_reset();

        let level_color = match v.level {
            Level::Critical => COLOR_MAGENTA,
            Level::Error => COLOR_RED,
            Level::Warning => COLOR_YELLOW,
            Level::Info => COLOR_GREEN,
            Level::Debug => COLOR_CYAN,
            Level::Trace => COLOR_BLUE,
        };
        write!(
            io,
            "{} {}{}{}",
            v.time,
            level_color.render(),
            v.level,
            level_color.render_reset(),
        )?;
        for (k, v) in &v.kv_pairs {
            write!(io, " {bold_s}{k}{bold_e}={v},")?;
        }
        writeln!(io, " {bold_s}{}{bold_e}", v.message)
    }
}

impl Drain for StderrDrain {
    type Ok = ();
    type Err = io::Error;

    fn log(&self, record: &Record, values: &OwnedKVList) -> Result<Self::Ok, Self::Err> {
        let v = LogValue::new(record, values);

        let mut buf: Vec<u8> = Vec::with_capacity(256);
        if self.console {
            self.write_console(&mut buf, &v)?;
        } else {
            self.write_plain(&mut buf, &v)?;
        }

        let mut io = io::stderr().lock();
        io.write_all(&buf)?;
        io.flush()
    }
}

struct LogValue {
    time: String,
    level: Level,
    message: String,
    kv_pairs: Vec<(String, String)>,
}

impl LogValue {
    fn new(record: &Record, values: &OwnedKVList) -> Self {
        let mut message = String::new();
        let _ = write!(message, "{}", record.msg());
        if message.is_empty() {
            message.push_str("()");
        }

        let mut collector = KvCollector::default();
        let _ = record.kv().serialize(record, &mut collector);
        let _ = values.serialize(record, &mut collector);

        LogValue {
            time: Local::now().format(TIME_FORMAT).to_string(),
            level: record.level(),
            message,
            kv_pairs: collector.kv_pairs,
        }
    }
}

#[derive(Default)]
struct KvCollector {
    kv_pairs: Vec<(String, String)>,
}

impl slog::Serializer for KvCollector {
    fn emit_arguments(&mut self, key: slog::Key, val: &fmt::Arguments) -> slog::Result {
        self.kv_pairs.push((key.to_string(), val.to_string()));
        Ok(())
    }
}
