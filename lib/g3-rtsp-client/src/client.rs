/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::SocketAddr;

use log::trace;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;

use crate::{
    RtspAuthChallenge, RtspClientConfig, RtspClientError, RtspMethod, RtspResponse, RtspUrl,
};

const SETUP_TRANSPORT: &str = "RTP/AVP/TCP;unicast;interleaved=0-1";

/// A rtsp session over one connection.
pub struct RtspClient<S> {
    config: RtspClientConfig,
    stream: BufStream<S>,
    cseq: u32,
    session: Option<String>,
    challenge: Option<RtspAuthChallenge>,
}

impl RtspClient<TcpStream> {
    pub async fn connect(
        addr: SocketAddr,
        config: &RtspClientConfig,
    ) -> Result<Self, RtspClientError> {
        match tokio::time::timeout(config.connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(RtspClient::new(stream, config.clone())),
            Ok(Err(e)) => Err(RtspClientError::ConnectFailed(e)),
            Err(_) => Err(RtspClientError::ConnectTimedOut),
        }
    }
}

impl<S> RtspClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, config: RtspClientConfig) -> Self {
        RtspClient {
            config,
            stream: BufStream::new(stream),
            cseq: 0,
            session: None,
            challenge: None,
        }
    }

    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }

    pub async fn options(&mut self, url: &RtspUrl) -> Result<RtspResponse, RtspClientError> {
        self.request(RtspMethod::OPTIONS, url, &[]).await
    }

    pub async fn describe(&mut self, url: &RtspUrl) -> Result<RtspResponse, RtspClientError> {
        self.request(RtspMethod::DESCRIBE, url, &[("Accept", "application/sdp")])
            .await
    }

    pub async fn setup(&mut self, url: &RtspUrl) -> Result<RtspResponse, RtspClientError> {
        let rsp = self
            .request(RtspMethod::SETUP, url, &[("Transport", SETUP_TRANSPORT)])
            .await?;
        if rsp.code == 200 {
            if let Some(v) = rsp.header("Session") {
                let id = v.split(';').next().unwrap_or_default().trim();
                if !id.is_empty() {
                    self.session = Some(id.to_string());
                }
            }
        }
        Ok(rsp)
    }

    pub async fn teardown(&mut self, url: &RtspUrl) -> Result<RtspResponse, RtspClientError> {
        let rsp = self.request(RtspMethod::TEARDOWN, url, &[]).await?;
        self.session = None;
        Ok(rsp)
    }

    /// Send the request, and resend it once with authorization if the
    /// server asks for a challenge we have not answered yet.
    async fn request(
        &mut self,
        method: RtspMethod,
        url: &RtspUrl,
        headers: &[(&str, &str)],
    ) -> Result<RtspResponse, RtspClientError> {
        let rsp = self.round_trip(method, url, headers).await?;
        if rsp.code != 401 || !url.has_credentials() {
            return Ok(rsp);
        }

        let Some(challenge) = RtspAuthChallenge::select(rsp.header_values("WWW-Authenticate"))
        else {
            return Ok(rsp);
        };
        if self.challenge.as_ref() == Some(&challenge) {
            return Ok(rsp);
        }
        self.challenge = Some(challenge);
        self.round_trip(method, url, headers).await
    }

    async fn round_trip(
        &mut self,
        method: RtspMethod,
        url: &RtspUrl,
        headers: &[(&str, &str)],
    ) -> Result<RtspResponse, RtspClientError> {
        let req = self.build_request(method, url, headers);
        trace!("RTSP > {method} {} CSeq {}", url.request_uri(), self.cseq);

        match tokio::time::timeout(self.config.write_timeout, self.send_all(req.as_bytes())).await
        {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(RtspClientError::SendFailed(method, e)),
            Err(_) => return Err(RtspClientError::SendTimedOut(method)),
        }

        let rsp = match tokio::time::timeout(
            self.config.read_timeout,
            RtspResponse::parse(
                &mut self.stream,
                self.config.max_header_size,
                self.config.max_body_size,
            ),
        )
        .await
        {
            Ok(Ok(rsp)) => rsp,
            Ok(Err(e)) => return Err(RtspClientError::RecvFailed(method, e)),
            Err(_) => return Err(RtspClientError::RecvTimedOut(method)),
        };
        trace!("RTSP < {} {}", rsp.code, rsp.reason);
        Ok(rsp)
    }

    fn build_request(
        &mut self,
        method: RtspMethod,
        url: &RtspUrl,
        headers: &[(&str, &str)],
    ) -> String {
        self.cseq += 1;
        let uri = url.request_uri();

        let mut req = String::with_capacity(256);
        req.push_str(method.as_str());
        req.push(' ');
        req.push_str(uri);
        req.push_str(" RTSP/1.0\r\nCSeq: ");
        let mut buffer = itoa::Buffer::new();
        req.push_str(buffer.format(self.cseq));
        req.push_str("\r\nUser-Agent: ");
        req.push_str(&self.config.user_agent);
        req.push_str("\r\n");
        for (name, value) in headers {
            push_header(&mut req, name, value);
        }
        if let Some(session) = &self.session {
            push_header(&mut req, "Session", session);
        }
        if let Some(challenge) = &self.challenge {
            let v = challenge.authorization(method, uri, url.username(), url.password());
            push_header(&mut req, "Authorization", &v);
        }
        req.push_str("\r\n");
        req
    }

    async fn send_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.stream.write_all(buf).await?;
        self.stream.flush().await
    }
}

fn push_header(req: &mut String, name: &str, value: &str) {
    req.push_str(name);
    req.push_str(": ");
    req.push_str(value);
    req.push_str("\r\n");
}
