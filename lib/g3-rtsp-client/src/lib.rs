/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod config;
pub use config::RtspClientConfig;

mod error;
pub use error::{RtspClientError, RtspResponseParseError, RtspUrlError};

mod parse;
pub use parse::{RtspHeaderLine, RtspLineParseError, RtspStatusLine};

mod method;
pub use method::RtspMethod;

mod response;
pub use response::RtspResponse;

mod uri;
pub use uri::RtspUrl;

mod auth;
pub use auth::{RtspAuthChallenge, RtspAuthScheme};

mod sdp;
pub use sdp::{MediaDescription, SessionDescription};

mod client;
pub use client::RtspClient;
