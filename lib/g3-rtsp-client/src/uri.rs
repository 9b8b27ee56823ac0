/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::net::SocketAddr;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::RtspUrlError;

/// An rtsp url with the credentials kept aside.
///
/// The credentials are never sent on the request line, only the display
/// form contains them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RtspUrl {
    url: Url,
    username: String,
    password: String,
}

impl RtspUrl {
    /// Build the url of a route on the given server.
    ///
    /// Duplicate '/' in the path are collapsed and exactly one leading '/'
    /// is used. A trailing '/' and the query string are kept as is.
    pub fn build(addr: SocketAddr, route: &str) -> Result<Self, RtspUrlError> {
        let url = Url::parse(&format!("rtsp://{addr}{}", normalize_route(route)))?;
        Ok(RtspUrl {
            url,
            username: String::new(),
            password: String::new(),
        })
    }

    pub fn parse(s: &str) -> Result<Self, RtspUrlError> {
        let mut url = Url::parse(s.trim())?;
        match url.scheme() {
            "rtsp" | "rtsps" => {}
            scheme => return Err(RtspUrlError::UnsupportedScheme(scheme.to_string())),
        }
        if url.host().is_none() {
            return Err(RtspUrlError::NoHost);
        }

        let username = percent_decode_str(url.username())
            .decode_utf8_lossy()
            .into_owned();
        let password = url
            .password()
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
            .unwrap_or_default();
        let _ = url.set_username("");
        let _ = url.set_password(None);

        Ok(RtspUrl {
            url,
            username,
            password,
        })
    }

    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.username = username.to_string();
        self.password = password.to_string();
        self
    }

    /// The url to use on the request line.
    pub fn request_uri(&self) -> &str {
        self.url.as_str()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() || !self.password.is_empty()
    }

    /// Resolve a media control attribute against this url.
    pub fn join(&self, control: &str) -> Result<RtspUrl, RtspUrlError> {
        let control = control.trim();
        if control.is_empty() || control == "*" {
            return Ok(self.clone());
        }

        if has_rtsp_scheme(control) {
            let mut url = RtspUrl::parse(control)?;
            if !url.has_credentials() {
                url.username.clone_from(&self.username);
                url.password.clone_from(&self.password);
            }
            return Ok(url);
        }

        let url = if control.starts_with('/') {
            let mut url = self.url.clone();
            url.set_query(None);
            url.set_path(control);
            url
        } else {
            let base = self.url.as_str();
            if base.ends_with('/') {
                Url::parse(&format!("{base}{control}"))?
            } else {
                Url::parse(&format!("{base}/{control}"))?
            }
        };
        Ok(RtspUrl {
            url,
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}

impl fmt::Display for RtspUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_credentials() {
            return f.write_str(self.url.as_str());
        }
        let mut url = self.url.clone();
        let _ = url.set_username(&self.username);
        let _ = url.set_password(Some(&self.password));
        f.write_str(url.as_str())
    }
}

fn has_rtsp_scheme(s: &str) -> bool {
    ["rtsp://", "rtsps://"].iter().any(|prefix| {
        s.get(..prefix.len())
            .is_some_and(|p| p.eq_ignore_ascii_case(prefix))
    })
}

fn normalize_route(route: &str) -> String {
    let route = route.trim();
    let (path, query) = match route.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (route, None),
    };

    let mut s = String::with_capacity(route.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        s.push('/');
        s.push_str(segment);
    }
    if s.is_empty() || path.ends_with('/') {
        s.push('/');
    }
    if let Some(query) = query {
        s.push('?');
        s.push_str(query);
    }
    s
}
