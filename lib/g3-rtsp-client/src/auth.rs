/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use base64::prelude::*;
use md5::{Digest, Md5};

use crate::RtspMethod;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RtspAuthScheme {
    Basic,
    Digest,
}

/// A parsed `WWW-Authenticate` header value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RtspAuthChallenge {
    scheme: RtspAuthScheme,
    realm: String,
    nonce: Option<String>,
    opaque: Option<String>,
    algorithm: Option<String>,
}

impl RtspAuthChallenge {
    /// Parse a challenge.
    ///
    /// Basic needs a realm, and digest needs both realm and nonce.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let (scheme, params) = match value.find(|c: char| c.is_ascii_whitespace()) {
            Some(p) => (&value[..p], &value[p + 1..]),
            None => (value, ""),
        };
        let scheme = if scheme.eq_ignore_ascii_case("basic") {
            RtspAuthScheme::Basic
        } else if scheme.eq_ignore_ascii_case("digest") {
            RtspAuthScheme::Digest
        } else {
            return None;
        };

        let mut realm = None;
        let mut nonce = None;
        let mut opaque = None;
        let mut algorithm = None;
        for (k, v) in parse_params(params) {
            if k.eq_ignore_ascii_case("realm") {
                realm = Some(v);
            } else if k.eq_ignore_ascii_case("nonce") {
                nonce = Some(v);
            } else if k.eq_ignore_ascii_case("opaque") {
                opaque = Some(v);
            } else if k.eq_ignore_ascii_case("algorithm") {
                algorithm = Some(v);
            }
        }

        let realm = realm?;
        if scheme == RtspAuthScheme::Digest && nonce.is_none() {
            return None;
        }
        Some(RtspAuthChallenge {
            scheme,
            realm,
            nonce,
            opaque,
            algorithm,
        })
    }

    /// Select the strongest challenge, digest is preferred over basic.
    pub fn select<'a, I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut selected: Option<RtspAuthChallenge> = None;
        for challenge in values.into_iter().filter_map(RtspAuthChallenge::parse) {
            if challenge.scheme == RtspAuthScheme::Digest {
                return Some(challenge);
            }
            if selected.is_none() {
                selected = Some(challenge);
            }
        }
        selected
    }

    pub fn scheme(&self) -> RtspAuthScheme {
        self.scheme
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// The value of the `Authorization` header for the request.
    pub fn authorization(
        &self,
        method: RtspMethod,
        uri: &str,
        username: &str,
        password: &str,
    ) -> String {
        match self.scheme {
            RtspAuthScheme::Basic => {
                format!(
                    "Basic {}",
                    BASE64_STANDARD.encode(format!("{username}:{password}"))
                )
            }
            RtspAuthScheme::Digest => {
                let nonce = self.nonce.as_deref().unwrap_or_default();
                let ha1 = md5_hex(&format!("{username}:{}:{password}", self.realm));
                let ha2 = md5_hex(&format!("{method}:{uri}"));
                let response = md5_hex(&format!("{ha1}:{nonce}:{ha2}"));

                let mut s = format!(
                    "Digest username=\"{username}\", realm=\"{}\", nonce=\"{nonce}\", uri=\"{uri}\", response=\"{response}\"",
                    self.realm
                );
                if let Some(opaque) = &self.opaque {
                    s.push_str(&format!(", opaque=\"{opaque}\""));
                }
                if let Some(algorithm) = &self.algorithm {
                    s.push_str(&format!(", algorithm={algorithm}"));
                }
                s
            }
        }
    }
}

fn md5_hex(s: &str) -> String {
    let mut h = Md5::new();
    h.update(s.as_bytes());
    hex::encode(h.finalize())
}

fn parse_params(s: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut left = s;
    loop {
        left = left.trim_start_matches(|c: char| c == ',' || c.is_ascii_whitespace());
        let Some(p) = memchr::memchr(b'=', left.as_bytes()) else {
            break;
        };
        let key = left[..p].trim().to_string();
        left = left[p + 1..].trim_start();

        let value = if let Some(quoted) = left.strip_prefix('"') {
            let mut value = String::new();
            let mut escaped = false;
            let mut end = quoted.len();
            for (i, c) in quoted.char_indices() {
                if escaped {
                    value.push(c);
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    end = i + 1;
                    break;
                } else {
                    value.push(c);
                }
            }
            left = &quoted[end.min(quoted.len())..];
            value
        } else {
            let end = memchr::memchr(b',', left.as_bytes()).unwrap_or(left.len());
            let value = left[..end].trim().to_string();
            left = &left[end..];
            value
        };
        params.push((key, value));
    }
    params
}
