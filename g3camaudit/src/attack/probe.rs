/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::future::Future;
use std::net::SocketAddr;

use log::debug;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use g3_rtsp_client::{
    RtspClient, RtspClientConfig, RtspClientError, RtspMethod, RtspResponse, RtspUrl,
    SessionDescription,
};

use super::ProbeError;
use super::auth::classify_auth;
use crate::stream::{AuthType, CameraStream};

/// A route is plausible if the server knows it, even if it asks for auth.
pub(crate) fn route_accepted(code: u16) -> bool {
    matches!(code, 200 | 401 | 403)
}

pub(crate) fn route_accepted_with_credentials(code: u16) -> bool {
    code == 200
}

/// A not found reply still means the credentials passed the auth check.
pub(crate) fn credentials_accepted(code: u16) -> bool {
    matches!(code, 200 | 404)
}

pub(crate) struct ProbeResult {
    pub(crate) url: RtspUrl,
    pub(crate) code: u16,
    pub(crate) accepted: bool,
}

pub(crate) enum StreamStatus {
    Available,
    Unavailable { method: RtspMethod, code: u16 },
}

/// Single target probes, each one uses a new rtsp session.
#[derive(Clone)]
pub(crate) struct Prober {
    config: RtspClientConfig,
}

impl Prober {
    pub(crate) fn new(config: RtspClientConfig) -> Self {
        Prober { config }
    }

    pub(crate) async fn route(
        &self,
        cancel: &CancellationToken,
        target: &CameraStream,
        route: &str,
    ) -> Result<ProbeResult, ProbeError> {
        let url = RtspUrl::build(target.socket_addr(), route)?
            .with_credentials(&target.username, &target.password);
        let code = self.describe_status(cancel, target.socket_addr(), &url).await?;
        Ok(ProbeResult {
            url,
            code,
            accepted: route_accepted(code),
        })
    }

    pub(crate) async fn route_with_credentials(
        &self,
        cancel: &CancellationToken,
        target: &CameraStream,
        route: &str,
    ) -> Result<ProbeResult, ProbeError> {
        let url = RtspUrl::build(target.socket_addr(), route)?
            .with_credentials(&target.username, &target.password);
        let code = self.describe_status(cancel, target.socket_addr(), &url).await?;
        Ok(ProbeResult {
            url,
            code,
            accepted: route_accepted_with_credentials(code),
        })
    }

    pub(crate) async fn credentials(
        &self,
        cancel: &CancellationToken,
        target: &CameraStream,
        username: &str,
        password: &str,
    ) -> Result<ProbeResult, ProbeError> {
        let url = RtspUrl::build(target.socket_addr(), target.route())?
            .with_credentials(username, password);
        let code = self.describe_status(cancel, target.socket_addr(), &url).await?;
        Ok(ProbeResult {
            url,
            code,
            accepted: credentials_accepted(code),
        })
    }

    /// Describe the active route without credentials.
    pub(crate) async fn auth_type(
        &self,
        cancel: &CancellationToken,
        target: &CameraStream,
    ) -> Result<(u16, AuthType), ProbeError> {
        let url = RtspUrl::build(target.socket_addr(), target.route())?;
        let rsp = self.describe(cancel, target.socket_addr(), &url).await?;
        let auth_type = match rsp.code {
            200..=299 => AuthType::None,
            401 => classify_auth(rsp.header_values("WWW-Authenticate")),
            _ => AuthType::Unknown,
        };
        Ok((rsp.code, auth_type))
    }

    /// Describe and then set up the first media of the active route.
    pub(crate) async fn stream_status(
        &self,
        cancel: &CancellationToken,
        target: &CameraStream,
    ) -> Result<StreamStatus, ProbeError> {
        let addr = target.socket_addr();
        let url = RtspUrl::build(addr, target.route())?
            .with_credentials(&target.username, &target.password);

        cancellable(cancel, async {
            let mut client = self.connect(addr, RtspMethod::DESCRIBE, &url).await?;
            let rsp = client
                .describe(&url)
                .await
                .map_err(|e| request_error(RtspMethod::DESCRIBE, &url, e))?;
            match rsp.code {
                200..=299 => {}
                503 => {
                    return Ok(StreamStatus::Unavailable {
                        method: RtspMethod::DESCRIBE,
                        code: rsp.code,
                    });
                }
                code => {
                    return Err(ProbeError::UnexpectedStatus {
                        method: RtspMethod::DESCRIBE,
                        url: url.to_string(),
                        code,
                    });
                }
            }

            let sd = SessionDescription::parse(rsp.body());
            let Some(media) = sd.medias().first() else {
                return Err(ProbeError::NoMedia(url.to_string()));
            };
            let base = content_base(&rsp, &url);
            let setup_url = base.join(media.control().unwrap_or_default())?;

            let rsp = client
                .setup(&setup_url)
                .await
                .map_err(|e| request_error(RtspMethod::SETUP, &setup_url, e))?;
            if rsp.code != 200 {
                return Ok(StreamStatus::Unavailable {
                    method: RtspMethod::SETUP,
                    code: rsp.code,
                });
            }

            if let Err(e) = client.teardown(&base).await {
                debug!("teardown {base} failed: {e}");
            }
            Ok(StreamStatus::Available)
        })
        .await
    }

    async fn describe_status(
        &self,
        cancel: &CancellationToken,
        addr: SocketAddr,
        url: &RtspUrl,
    ) -> Result<u16, ProbeError> {
        self.describe(cancel, addr, url).await.map(|rsp| rsp.code)
    }

    async fn describe(
        &self,
        cancel: &CancellationToken,
        addr: SocketAddr,
        url: &RtspUrl,
    ) -> Result<RtspResponse, ProbeError> {
        cancellable(cancel, async {
            let mut client = self.connect(addr, RtspMethod::DESCRIBE, url).await?;
            client
                .describe(url)
                .await
                .map_err(|e| request_error(RtspMethod::DESCRIBE, url, e))
        })
        .await
    }

    async fn connect(
        &self,
        addr: SocketAddr,
        method: RtspMethod,
        url: &RtspUrl,
    ) -> Result<RtspClient<TcpStream>, ProbeError> {
        RtspClient::connect(addr, &self.config)
            .await
            .map_err(|e| request_error(method, url, e))
    }
}

fn content_base(rsp: &RtspResponse, url: &RtspUrl) -> RtspUrl {
    rsp.header("Content-Base")
        .or_else(|| rsp.header("Content-Location"))
        .and_then(|v| RtspUrl::parse(v).ok())
        .map(|base| base.with_credentials(url.username(), url.password()))
        .unwrap_or_else(|| url.clone())
}

fn request_error(method: RtspMethod, url: &RtspUrl, source: RtspClientError) -> ProbeError {
    ProbeError::Request {
        method,
        url: url.to_string(),
        source,
    }
}

async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, ProbeError>
where
    F: Future<Output = Result<T, ProbeError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ProbeError::Cancelled),
        r = fut => r,
    }
}
