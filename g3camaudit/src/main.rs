/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Command;
use clap_complete::Shell;

fn build_cli_args() -> Command {
    g3camaudit::add_global_args(Command::new(g3camaudit::build::PKG_NAME))
        .about("Discover and audit the access control of RTSP cameras")
        .disable_version_flag(true)
}

fn main() -> anyhow::Result<ExitCode> {
    let args = build_cli_args().get_matches();

    if let Some(shell) = g3camaudit::get_completion_shell(&args) {
        generate_completion(shell);
        return Ok(ExitCode::SUCCESS);
    }
    if g3camaudit::version_requested(&args) {
        g3camaudit::build::print_version();
        return Ok(ExitCode::SUCCESS);
    }

    let proc_args = g3camaudit::parse_global_args(&args)?;

    let _log_guard = g3camaudit::logger::setup(proc_args.verbose_level)
        .context("failed to setup logger")?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start main runtime")?;
    rt.block_on(g3camaudit::run(&proc_args))
}

fn generate_completion(shell: Shell) {
    let mut app = build_cli_args();
    let bin_name = app.get_name().to_string();
    clap_complete::generate(shell, &mut app, bin_name, &mut io::stdout());
}
