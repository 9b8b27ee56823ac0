/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use thiserror::Error;

use g3_rtsp_client::{RtspClientError, RtspMethod, RtspUrlError};

use crate::stream::CameraStream;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] RtspUrlError),
    #[error("{method} {url} failed: {source}")]
    Request {
        method: RtspMethod,
        url: String,
        #[source]
        source: RtspClientError,
    },
    #[error("unexpected {method} status code {code} for {url}")]
    UnexpectedStatus {
        method: RtspMethod,
        url: String,
        code: u16,
    },
    #[error("no media found in the description of {0}")]
    NoMedia(String),
    #[error("cancelled")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum AttackError {
    #[error("no stream found")]
    EmptyInput,
    #[error("attacking routes: {0}")]
    AttackRoutes(#[source] ProbeError),
    #[error("detecting authentication methods: {0}")]
    DetectAuth(#[source] ProbeError),
    #[error("attacking credentials: {0}")]
    AttackCredentials(#[source] ProbeError),
    #[error("validating streams: {0}")]
    ValidateStreams(#[source] ProbeError),
}

/// The attack failed, but the streams are still usable.
#[derive(Debug)]
pub struct AttackFailure {
    pub streams: Vec<CameraStream>,
    pub error: AttackError,
}

impl fmt::Display for AttackFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl std::error::Error for AttackFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
