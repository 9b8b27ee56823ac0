/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use crate::{RtspLineParseError, RtspMethod};

#[derive(Debug, Error)]
pub enum RtspResponseParseError {
    #[error("remote closed")]
    RemoteClosed,
    #[error("too large header, should be less than {0}")]
    TooLargeHeader(usize),
    #[error("too large body, should be less than {0}")]
    TooLargeBody(usize),
    #[error("invalid status line: {0}")]
    InvalidStatusLine(RtspLineParseError),
    #[error("invalid header line: {0}")]
    InvalidHeaderLine(RtspLineParseError),
    #[error("invalid content length")]
    InvalidContentLength,
    #[error("read failed: {0:?}")]
    IoFailed(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum RtspUrlError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unsupported scheme {0}")]
    UnsupportedScheme(String),
    #[error("no host found")]
    NoHost,
}

#[derive(Debug, Error)]
pub enum RtspClientError {
    #[error("connect failed: {0:?}")]
    ConnectFailed(io::Error),
    #[error("connect timed out")]
    ConnectTimedOut,
    #[error("unable to send {0} request: {1:?}")]
    SendFailed(RtspMethod, io::Error),
    #[error("timed out to send {0} request")]
    SendTimedOut(RtspMethod),
    #[error("unable to recv {0} response: {1}")]
    RecvFailed(RtspMethod, RtspResponseParseError),
    #[error("timed out to recv {0} response")]
    RecvTimedOut(RtspMethod),
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] RtspUrlError),
}
