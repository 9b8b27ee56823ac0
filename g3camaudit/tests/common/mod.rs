/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use base64::prelude::*;
use md5::{Digest, Md5};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use g3camaudit::stream::CameraStream;

pub const REALM: &str = "camera";
pub const NONCE: &str = "0a4f113b";
pub const SERVER: &str = "FakeCam/1.0";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FakeAuth {
    None,
    Basic,
    Digest,
}

#[derive(Clone)]
pub struct FakeCameraConfig {
    pub allow_all: bool,
    pub routes: Vec<String>,
    /// Also accept every route starting with this prefix.
    pub route_prefix: Option<String>,
    pub auth: FakeAuth,
    pub username: String,
    pub password: String,
    pub setup_status: u16,
}

impl Default for FakeCameraConfig {
    fn default() -> Self {
        FakeCameraConfig {
            allow_all: false,
            routes: vec!["live.sdp".to_string()],
            route_prefix: None,
            auth: FakeAuth::None,
            username: "admin".to_string(),
            password: "12345".to_string(),
            setup_status: 200,
        }
    }
}

pub struct FakeCamera {
    pub addr: SocketAddr,
    requests: Arc<AtomicUsize>,
    described: Arc<Mutex<Vec<String>>>,
}

impl FakeCamera {
    pub async fn start(config: FakeCameraConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(AtomicUsize::new(0));
        let described = Arc::new(Mutex::new(Vec::new()));

        let config = Arc::new(config);
        let counter = requests.clone();
        let paths = described.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let config = config.clone();
                let counter = counter.clone();
                let paths = paths.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, &config, &counter, &paths).await;
                });
            }
        });

        FakeCamera {
            addr,
            requests,
            described,
        }
    }

    pub fn stream(&self) -> CameraStream {
        CameraStream::new(self.addr.ip(), self.addr.port())
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    /// Paths of all DESCRIBE requests received, in arrival order.
    pub fn described_paths(&self) -> Vec<String> {
        self.described.lock().unwrap().clone()
    }
}

struct Request {
    method: String,
    uri: String,
    cseq: String,
    authorization: Option<String>,
}

async fn read_request(reader: &mut BufReader<TcpStream>) -> std::io::Result<Option<Request>> {
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    let mut parts = line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let uri = parts.next().unwrap_or_default().to_string();

    let mut cseq = String::new();
    let mut authorization = None;
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        let header = line.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            let value = value.trim().to_string();
            if name.eq_ignore_ascii_case("CSeq") {
                cseq = value;
            } else if name.eq_ignore_ascii_case("Authorization") {
                authorization = Some(value);
            }
        }
    }

    Ok(Some(Request {
        method,
        uri,
        cseq,
        authorization,
    }))
}

async fn serve(
    stream: TcpStream,
    config: &FakeCameraConfig,
    counter: &AtomicUsize,
    described: &Mutex<Vec<String>>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream);
    while let Some(req) = read_request(&mut reader).await? {
        counter.fetch_add(1, Ordering::Relaxed);
        if req.method == "DESCRIBE" {
            described
                .lock()
                .unwrap()
                .push(request_path(&req.uri).to_string());
        }
        let rsp = respond(&req, config);
        reader.get_mut().write_all(rsp.as_bytes()).await?;
        reader.get_mut().flush().await?;
    }
    Ok(())
}

fn respond(req: &Request, config: &FakeCameraConfig) -> String {
    if req.method == "OPTIONS" {
        return reply(
            200,
            "OK",
            &req.cseq,
            &[
                ("Server", SERVER),
                ("Public", "OPTIONS, DESCRIBE, SETUP, TEARDOWN, PLAY"),
            ],
            "",
        );
    }

    let path = request_path(&req.uri);
    if req.method == "DESCRIBE" && !route_known(config, path) {
        return reply(404, "Not Found", &req.cseq, &[], "");
    }

    if !authorized(req, config) {
        let challenge = match config.auth {
            FakeAuth::Basic => format!("Basic realm=\"{REALM}\""),
            _ => format!("Digest realm=\"{REALM}\", nonce=\"{NONCE}\""),
        };
        return reply(
            401,
            "Unauthorized",
            &req.cseq,
            &[("WWW-Authenticate", &challenge)],
            "",
        );
    }

    match req.method.as_str() {
        "DESCRIBE" => {
            let sdp = "v=0\r\n\
                o=- 0 0 IN IP4 127.0.0.1\r\n\
                s=Fake Camera\r\n\
                t=0 0\r\n\
                m=video 0 RTP/AVP 96\r\n\
                a=rtpmap:96 H264/90000\r\n\
                a=control:trackID=0\r\n";
            let base = format!("{}/", req.uri.trim_end_matches('/'));
            reply(
                200,
                "OK",
                &req.cseq,
                &[
                    ("Content-Base", &base),
                    ("Content-Type", "application/sdp"),
                ],
                sdp,
            )
        }
        "SETUP" if config.setup_status != 200 => reply(
            config.setup_status,
            "Unsupported Transport",
            &req.cseq,
            &[],
            "",
        ),
        "SETUP" => reply(
            200,
            "OK",
            &req.cseq,
            &[
                ("Session", "12345678;timeout=60"),
                ("Transport", "RTP/AVP/TCP;unicast;interleaved=0-1"),
            ],
            "",
        ),
        "TEARDOWN" => reply(200, "OK", &req.cseq, &[], ""),
        _ => reply(405, "Method Not Allowed", &req.cseq, &[], ""),
    }
}

fn request_path(uri: &str) -> &str {
    let rest = uri.strip_prefix("rtsp://").unwrap_or(uri);
    match rest.find('/') {
        Some(p) => &rest[p..],
        None => "/",
    }
}

fn route_known(config: &FakeCameraConfig, path: &str) -> bool {
    if config.allow_all {
        return true;
    }
    let route = path.trim_start_matches('/');
    if let Some(prefix) = &config.route_prefix
        && route.starts_with(prefix.as_str())
    {
        return true;
    }
    config.routes.iter().any(|r| r.trim_start_matches('/') == route)
}

fn authorized(req: &Request, config: &FakeCameraConfig) -> bool {
    let Some(value) = &req.authorization else {
        return config.auth == FakeAuth::None;
    };
    match config.auth {
        FakeAuth::None => true,
        FakeAuth::Basic => {
            let expected = BASE64_STANDARD.encode(format!("{}:{}", config.username, config.password));
            value.strip_prefix("Basic ") == Some(expected.as_str())
        }
        FakeAuth::Digest => {
            let Some(params) = value.strip_prefix("Digest ") else {
                return false;
            };
            let param = |name: &str| -> Option<String> {
                params.split(',').find_map(|p| {
                    let (k, v) = p.trim().split_once('=')?;
                    (k == name).then(|| v.trim_matches('"').to_string())
                })
            };
            let (Some(username), Some(uri), Some(response)) =
                (param("username"), param("uri"), param("response"))
            else {
                return false;
            };
            if username != config.username {
                return false;
            }
            let ha1 = md5_hex(&format!("{username}:{REALM}:{}", config.password));
            let ha2 = md5_hex(&format!("{}:{uri}", req.method));
            response == md5_hex(&format!("{ha1}:{NONCE}:{ha2}"))
        }
    }
}

fn md5_hex(s: &str) -> String {
    hex::encode(Md5::digest(s.as_bytes()))
}

fn reply(code: u16, reason: &str, cseq: &str, headers: &[(&str, &str)], body: &str) -> String {
    let mut s = format!("RTSP/1.0 {code} {reason}\r\nCSeq: {cseq}\r\n");
    for (name, value) in headers {
        s.push_str(&format!("{name}: {value}\r\n"));
    }
    if !body.is_empty() {
        s.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    s.push_str("\r\n");
    s.push_str(body);
    s
}
