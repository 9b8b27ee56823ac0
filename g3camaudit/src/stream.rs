/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::net::{IpAddr, SocketAddr};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthType {
    None,
    Basic,
    Digest,
    #[default]
    Unknown,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::None => "none",
            AuthType::Basic => "basic",
            AuthType::Digest => "digest",
            AuthType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The attack state of a single rtsp endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CameraStream {
    pub device: Option<String>,
    pub username: String,
    pub password: String,
    /// Discovered routes, the first one is the active route.
    pub routes: Vec<String>,
    pub address: IpAddr,
    pub port: u16,

    pub credentials_found: bool,
    pub route_found: bool,
    pub available: bool,
    pub auth_type: AuthType,
}

impl CameraStream {
    pub fn new(address: IpAddr, port: u16) -> Self {
        CameraStream {
            device: None,
            username: String::new(),
            password: String::new(),
            routes: Vec::new(),
            address,
            port,
            credentials_found: false,
            route_found: false,
            available: false,
            auth_type: AuthType::default(),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }

    /// The active route, or an empty string if none is known yet.
    pub fn route(&self) -> &str {
        self.routes.first().map(|s| s.as_str()).unwrap_or_default()
    }

    pub fn has_route(&self, route: &str) -> bool {
        self.routes.iter().any(|r| r == route)
    }

    pub fn add_route(&mut self, route: &str) {
        if !self.has_route(route) {
            self.routes.push(route.to_string());
        }
    }

    pub(crate) fn fully_resolved(&self) -> bool {
        self.route_found && self.credentials_found && self.available
    }
}

impl fmt::Display for CameraStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.socket_addr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes() {
        let mut stream = CameraStream::new(IpAddr::from([10, 0, 0, 1]), 554);
        assert_eq!(stream.route(), "");

        stream.add_route("live/ch01");
        stream.add_route("live/ch02");
        stream.add_route("live/ch01");
        assert_eq!(stream.routes, ["live/ch01", "live/ch02"]);
        assert_eq!(stream.route(), "live/ch01");
        assert_eq!(stream.to_string(), "10.0.0.1:554");
    }

    #[test]
    fn display_ipv6() {
        let stream = CameraStream::new("fe80::1".parse().unwrap(), 8554);
        assert_eq!(stream.to_string(), "[fe80::1]:8554");
        assert_eq!(stream.auth_type.to_string(), "unknown");
    }
}
