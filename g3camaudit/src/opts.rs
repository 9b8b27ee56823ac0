/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io::{IsTerminal, stderr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint, value_parser};
use clap_complete::Shell;

use crate::attack::AttackConfig;
use crate::target::DEFAULT_PORTS;

const GLOBAL_ARG_COMPLETION: &str = "completion";
const GLOBAL_ARG_VERSION: &str = "version";
const GLOBAL_ARG_TARGETS: &str = "targets";
const GLOBAL_ARG_PORTS: &str = "ports";
const GLOBAL_ARG_CUSTOM_ROUTES: &str = "custom-routes";
const GLOBAL_ARG_CUSTOM_CREDENTIALS: &str = "custom-credentials";
const GLOBAL_ARG_ATTACK_INTERVAL: &str = "attack-interval";
const GLOBAL_ARG_TIMEOUT: &str = "timeout";
const GLOBAL_ARG_SCAN_CONCURRENCY: &str = "scan-concurrency";
const GLOBAL_ARG_SKIP_SCAN: &str = "skip-scan";
const GLOBAL_ARG_OUTPUT: &str = "output";
const GLOBAL_ARG_DEBUG: &str = "debug";
const GLOBAL_ARG_VERBOSE: &str = "verbose";
const GLOBAL_ARG_NO_PROGRESS_BAR: &str = "no-progress-bar";

const DEFAULT_ATTACK_INTERVAL: &str = "0s";
const DEFAULT_TIMEOUT: &str = "2s";
const DEFAULT_SCAN_CONCURRENCY: usize = 256;

pub struct ProcArgs {
    pub targets: Vec<String>,
    pub ports: Vec<String>,
    pub custom_routes: Option<PathBuf>,
    pub custom_credentials: Option<PathBuf>,
    pub attack_interval: Duration,
    pub timeout: Duration,
    pub scan_concurrency: usize,
    pub skip_scan: bool,
    pub output: Option<PathBuf>,
    pub debug: bool,
    pub verbose_level: u8,
    pub no_progress_bar: bool,
}

impl Default for ProcArgs {
    fn default() -> Self {
        ProcArgs {
            targets: Vec::new(),
            ports: vec![DEFAULT_PORTS.to_string()],
            custom_routes: None,
            custom_credentials: None,
            attack_interval: Duration::ZERO,
            timeout: Duration::from_secs(2),
            scan_concurrency: DEFAULT_SCAN_CONCURRENCY,
            skip_scan: false,
            output: None,
            debug: false,
            verbose_level: 0,
            no_progress_bar: false,
        }
    }
}

impl ProcArgs {
    pub fn attack_config(&self) -> AttackConfig {
        AttackConfig {
            attack_interval: self.attack_interval,
            timeout: self.timeout,
        }
    }
}

pub fn add_global_args(app: Command) -> Command {
    app.arg(
        Arg::new(GLOBAL_ARG_VERSION)
            .help("Show version")
            .action(ArgAction::SetTrue)
            .short('V')
            .long(GLOBAL_ARG_VERSION)
            .exclusive(true),
    )
    .arg(
        Arg::new(GLOBAL_ARG_COMPLETION)
            .help("Generate shell completion script")
            .num_args(1)
            .value_name("SHELL")
            .long(GLOBAL_ARG_COMPLETION)
            .value_parser(value_parser!(Shell))
            .exclusive(true),
    )
    .arg(
        Arg::new(GLOBAL_ARG_TARGETS)
            .help("Targets to attack, as ip address, network, address range or host name")
            .value_name("TARGET")
            .short('t')
            .long(GLOBAL_ARG_TARGETS)
            .action(ArgAction::Append)
            .value_delimiter(',')
            .required_unless_present_any([GLOBAL_ARG_COMPLETION, GLOBAL_ARG_VERSION]),
    )
    .arg(
        Arg::new(GLOBAL_ARG_PORTS)
            .help("Ports to attack, as comma separated list or range")
            .value_name("PORTS")
            .short('p')
            .long(GLOBAL_ARG_PORTS)
            .action(ArgAction::Append)
            .default_value(DEFAULT_PORTS),
    )
    .arg(
        Arg::new(GLOBAL_ARG_CUSTOM_ROUTES)
            .help("Routes dictionary file, one route per line")
            .value_name("FILE")
            .short('r')
            .long(GLOBAL_ARG_CUSTOM_ROUTES)
            .num_args(1)
            .value_hint(ValueHint::FilePath)
            .value_parser(value_parser!(PathBuf)),
    )
    .arg(
        Arg::new(GLOBAL_ARG_CUSTOM_CREDENTIALS)
            .help("Credentials dictionary file in json format")
            .value_name("FILE")
            .short('c')
            .long(GLOBAL_ARG_CUSTOM_CREDENTIALS)
            .num_args(1)
            .value_hint(ValueHint::FilePath)
            .value_parser(value_parser!(PathBuf)),
    )
    .arg(
        Arg::new(GLOBAL_ARG_ATTACK_INTERVAL)
            .help("Interval between two attempts on the same stream")
            .value_name("DURATION")
            .short('I')
            .long(GLOBAL_ARG_ATTACK_INTERVAL)
            .num_args(1)
            .default_value(DEFAULT_ATTACK_INTERVAL),
    )
    .arg(
        Arg::new(GLOBAL_ARG_TIMEOUT)
            .help("Timeout for each request")
            .value_name("DURATION")
            .short('T')
            .long(GLOBAL_ARG_TIMEOUT)
            .num_args(1)
            .default_value(DEFAULT_TIMEOUT),
    )
    .arg(
        Arg::new(GLOBAL_ARG_SCAN_CONCURRENCY)
            .help("Number of endpoints to scan at a time")
            .value_name("COUNT")
            .long(GLOBAL_ARG_SCAN_CONCURRENCY)
            .num_args(1)
            .value_parser(value_parser!(usize)),
    )
    .arg(
        Arg::new(GLOBAL_ARG_SKIP_SCAN)
            .help("Attack all targets and ports without scanning them first")
            .action(ArgAction::SetTrue)
            .long(GLOBAL_ARG_SKIP_SCAN),
    )
    .arg(
        Arg::new(GLOBAL_ARG_OUTPUT)
            .help("Write the streams to a M3U playlist")
            .value_name("FILE")
            .short('o')
            .long(GLOBAL_ARG_OUTPUT)
            .num_args(1)
            .value_hint(ValueHint::FilePath)
            .value_parser(value_parser!(PathBuf)),
    )
    .arg(
        Arg::new(GLOBAL_ARG_DEBUG)
            .help("Show debug events of the attack")
            .action(ArgAction::SetTrue)
            .short('d')
            .long(GLOBAL_ARG_DEBUG),
    )
    .arg(
        Arg::new(GLOBAL_ARG_VERBOSE)
            .help("Show verbose logs")
            .action(ArgAction::Count)
            .short('v')
            .long(GLOBAL_ARG_VERBOSE),
    )
    .arg(
        Arg::new(GLOBAL_ARG_NO_PROGRESS_BAR)
            .help("Disable progress bar")
            .action(ArgAction::SetTrue)
            .long(GLOBAL_ARG_NO_PROGRESS_BAR),
    )
}

pub fn parse_global_args(args: &ArgMatches) -> anyhow::Result<ProcArgs> {
    let mut proc_args = ProcArgs::default();

    if let Some(values) = args.get_many::<String>(GLOBAL_ARG_TARGETS) {
        proc_args.targets = values
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if proc_args.targets.is_empty() {
        return Err(anyhow!("no target provided"));
    }
    if let Some(values) = args.get_many::<String>(GLOBAL_ARG_PORTS) {
        proc_args.ports = values.cloned().collect();
    }

    if let Some(path) = args.get_one::<PathBuf>(GLOBAL_ARG_CUSTOM_ROUTES) {
        proc_args.custom_routes = Some(path.clone());
    }
    if let Some(path) = args.get_one::<PathBuf>(GLOBAL_ARG_CUSTOM_CREDENTIALS) {
        proc_args.custom_credentials = Some(path.clone());
    }

    if let Some(v) = get_duration(args, GLOBAL_ARG_ATTACK_INTERVAL)? {
        proc_args.attack_interval = v;
    }
    if let Some(v) = get_duration(args, GLOBAL_ARG_TIMEOUT)? {
        if v.is_zero() {
            return Err(anyhow!("timeout should not be zero"));
        }
        proc_args.timeout = v;
    }
    if let Some(n) = args.get_one::<usize>(GLOBAL_ARG_SCAN_CONCURRENCY) {
        proc_args.scan_concurrency = (*n).max(1);
    }

    proc_args.skip_scan = args.get_flag(GLOBAL_ARG_SKIP_SCAN);
    if let Some(path) = args.get_one::<PathBuf>(GLOBAL_ARG_OUTPUT) {
        proc_args.output = Some(path.clone());
    }
    proc_args.debug = args.get_flag(GLOBAL_ARG_DEBUG);
    proc_args.verbose_level = args.get_count(GLOBAL_ARG_VERBOSE);

    if args.get_flag(GLOBAL_ARG_NO_PROGRESS_BAR) || !stderr().is_terminal() {
        proc_args.no_progress_bar = true;
    }

    Ok(proc_args)
}

pub fn get_completion_shell(args: &ArgMatches) -> Option<Shell> {
    args.get_one::<Shell>(GLOBAL_ARG_COMPLETION).copied()
}

pub fn version_requested(args: &ArgMatches) -> bool {
    args.get_flag(GLOBAL_ARG_VERSION)
}

fn get_duration(args: &ArgMatches, id: &str) -> anyhow::Result<Option<Duration>> {
    let Some(v) = args.get_one::<String>(id) else {
        return Ok(None);
    };
    let v = v.trim();
    if let Ok(millis) = v.parse::<u64>() {
        return Ok(Some(Duration::from_millis(millis)));
    }
    humanize_rs::duration::parse(v)
        .map(Some)
        .map_err(|e| anyhow!("{e:?}"))
        .context(format!("invalid duration value {v} for arg {id}"))
}
