/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

const DEFAULT_USER_AGENT: &str = concat!("g3-rtsp-client/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct RtspClientConfig {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub max_header_size: usize,
    pub max_body_size: usize,
    pub user_agent: String,
}

impl Default for RtspClientConfig {
    fn default() -> Self {
        RtspClientConfig {
            connect_timeout: Duration::from_secs(2),
            read_timeout: Duration::from_secs(2),
            write_timeout: Duration::from_secs(2),
            max_header_size: 8192,
            max_body_size: 65536,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl RtspClientConfig {
    /// Use the same value for connect, read and write timeouts.
    pub fn with_timeout(timeout: Duration) -> Self {
        RtspClientConfig {
            connect_timeout: timeout,
            read_timeout: timeout,
            write_timeout: timeout,
            ..Default::default()
        }
    }
}
