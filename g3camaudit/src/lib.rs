/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use slog::{slog_error, slog_info, slog_warn};
use tokio_util::sync::CancellationToken;

pub mod attack;
pub mod build;
pub mod dict;
pub mod output;
pub mod report;
pub mod scan;
pub mod stream;
pub mod target;

mod opts;
pub use opts::{
    ProcArgs, add_global_args, get_completion_shell, parse_global_args, version_requested,
};

pub mod logger;

use attack::Attacker;
use dict::{Dictionary, WordDictionary};
use report::{LogReporter, ProgressReporter, Reporter, Step};
use scan::Scanner;

pub async fn run(proc_args: &ProcArgs) -> anyhow::Result<ExitCode> {
    let logger = slog_scope::logger();

    let addrs = target::expand_targets(&proc_args.targets).await?;
    let ports = target::parse_ports(&proc_args.ports)?;
    let dictionary = WordDictionary::load(
        proc_args.custom_credentials.as_deref(),
        proc_args.custom_routes.as_deref(),
    )
    .context("failed to load dictionaries")?;
    let dictionary: Arc<dyn Dictionary> = Arc::new(dictionary);

    let progress = if proc_args.no_progress_bar {
        None
    } else {
        Some(Arc::new(ProgressReporter::new(proc_args.debug)))
    };
    let reporter: Arc<dyn Reporter> = match &progress {
        Some(p) => p.clone(),
        None => Arc::new(LogReporter::new(logger.clone(), proc_args.debug)),
    };

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });

    let candidates = target::build_streams(&addrs, &ports);
    let streams = if proc_args.skip_scan {
        candidates
    } else {
        Scanner::new(proc_args.timeout, proc_args.scan_concurrency)
            .scan(candidates, reporter.as_ref(), &shutdown)
            .await
    };

    let attacker = Attacker::new(dictionary, reporter.clone(), proc_args.attack_config());
    let (streams, failure) = match attacker.attack(streams, &shutdown).await {
        Ok(streams) => (streams, None),
        Err(f) => (f.streams, Some(f.error)),
    };

    if let Some(p) = &progress {
        p.finish();
    }

    reporter.update_summary(&streams);
    println!("{}", report::format_summary(&streams));

    if let Some(path) = &proc_args.output {
        output::write_m3u(path, &streams)
            .await
            .context(format!("failed to write playlist to {}", path.display()))?;
        slog_info!(logger, "playlist written"; "step" => Step::Summary.as_str(), "path" => %path.display());
    }

    match failure {
        Some(e) => {
            slog_error!(logger, "attack failed: {e}"; "step" => Step::Summary.as_str());
            if progress.is_some() {
                eprintln!("attack failed: {e}");
            }
            Ok(ExitCode::FAILURE)
        }
        None => {
            if shutdown.is_cancelled() {
                slog_warn!(logger, "attack interrupted");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
