/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use ahash::AHashSet;
use anyhow::{Context, anyhow};
use ip_network::IpNetwork;

use crate::stream::CameraStream;

pub const DEFAULT_PORTS: &str = "554,5554,8554";

const MAX_EXPANDED_ADDRESSES: u128 = 65536;

/// Parse port lists like `554,8554` or `8000-8010`.
pub fn parse_ports<S: AsRef<str>>(values: &[S]) -> anyhow::Result<Vec<u16>> {
    let mut ports = Vec::new();
    let mut seen = AHashSet::new();
    for value in values {
        for part in value.as_ref().split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if let Some((start, end)) = part.split_once('-') {
                let start = parse_port(start)?;
                let end = parse_port(end)?;
                if start > end {
                    return Err(anyhow!("invalid port range {part}"));
                }
                for port in start..=end {
                    if seen.insert(port) {
                        ports.push(port);
                    }
                }
            } else {
                let port = parse_port(part)?;
                if seen.insert(port) {
                    ports.push(port);
                }
            }
        }
    }
    if ports.is_empty() {
        return Err(anyhow!("no valid ports provided"));
    }
    Ok(ports)
}

fn parse_port(s: &str) -> anyhow::Result<u16> {
    let s = s.trim();
    let port = u16::from_str(s).map_err(|e| anyhow!("invalid port {s}: {e}"))?;
    if port == 0 {
        return Err(anyhow!("port 0 is not allowed"));
    }
    Ok(port)
}

/// Expand the target list to ip addresses.
///
/// A target may be an ip address, a network in CIDR notation, an ipv4
/// range like `192.168.1.10-192.168.1.20`, an ipv4 octet range like
/// `192.168.1-2.1-254`, or a host name.
pub async fn expand_targets<S: AsRef<str>>(values: &[S]) -> anyhow::Result<Vec<IpAddr>> {
    let mut addrs = Vec::new();
    let mut seen = AHashSet::new();
    let mut push = |ip: IpAddr| {
        if seen.insert(ip) {
            addrs.push(ip);
        }
    };

    for value in values {
        for target in value.as_ref().split(',') {
            let target = target.trim();
            if target.is_empty() {
                continue;
            }

            if let Ok(ip) = IpAddr::from_str(target) {
                push(ip);
            } else if target.contains('/') {
                for ip in expand_network(target)? {
                    push(ip);
                }
            } else if let Some(ips) = expand_ipv4_range(target)? {
                for ip in ips {
                    push(IpAddr::V4(ip));
                }
            } else {
                let resolved = tokio::net::lookup_host((target, 0))
                    .await
                    .context(format!("failed to resolve host {target}"))?;
                for addr in resolved {
                    push(addr.ip().to_canonical());
                }
            }
        }
    }

    if addrs.is_empty() {
        return Err(anyhow!("no valid target addresses resolved"));
    }
    Ok(addrs)
}

pub fn build_streams(addrs: &[IpAddr], ports: &[u16]) -> Vec<CameraStream> {
    let mut streams = Vec::with_capacity(addrs.len() * ports.len());
    for addr in addrs {
        for port in ports {
            streams.push(CameraStream::new(*addr, *port));
        }
    }
    streams
}

fn expand_network(s: &str) -> anyhow::Result<Vec<IpAddr>> {
    let net = IpNetwork::from_str_truncate(s).map_err(|e| anyhow!("invalid network {s}: {e}"))?;
    match net {
        IpNetwork::V4(net) => {
            let bits = 32 - u32::from(net.netmask());
            check_size(s, 1u128 << bits)?;
            let start = u32::from(net.network_address());
            Ok((0..(1u32 << bits))
                .map(|i| IpAddr::V4(Ipv4Addr::from(start + i)))
                .collect())
        }
        IpNetwork::V6(net) => {
            let bits = 128 - u32::from(net.netmask());
            if bits >= 64 {
                return Err(anyhow!("too many addresses in network {s}"));
            }
            let count = 1u128 << bits;
            check_size(s, count)?;
            let start = u128::from(net.network_address());
            Ok((0..count)
                .map(|i| IpAddr::V6(Ipv6Addr::from(start + i)))
                .collect())
        }
    }
}

fn expand_ipv4_range(s: &str) -> anyhow::Result<Option<Vec<Ipv4Addr>>> {
    if let Some((start, end)) = s.split_once('-')
        && let (Ok(start), Ok(end)) = (
            Ipv4Addr::from_str(start.trim()),
            Ipv4Addr::from_str(end.trim()),
        )
    {
        let (start, end) = (u32::from(start), u32::from(end));
        if start > end {
            return Err(anyhow!("invalid address range {s}"));
        }
        check_size(s, u128::from(end - start) + 1)?;
        return Ok(Some((start..=end).map(Ipv4Addr::from).collect()));
    }

    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() != 4 {
        return Ok(None);
    }
    let mut octets = Vec::with_capacity(4);
    for part in parts {
        let Some(range) = parse_octet_range(part) else {
            return Ok(None);
        };
        octets.push(range);
    }
    let count: u128 = octets
        .iter()
        .map(|(a, b)| u128::from(b - a) + 1)
        .product();
    check_size(s, count)?;

    let mut ips = Vec::with_capacity(count as usize);
    for a in octets[0].0..=octets[0].1 {
        for b in octets[1].0..=octets[1].1 {
            for c in octets[2].0..=octets[2].1 {
                for d in octets[3].0..=octets[3].1 {
                    ips.push(Ipv4Addr::new(a, b, c, d));
                }
            }
        }
    }
    Ok(Some(ips))
}

fn parse_octet_range(s: &str) -> Option<(u8, u8)> {
    match s.split_once('-') {
        Some((a, b)) => {
            let a = u8::from_str(a).ok()?;
            let b = u8::from_str(b).ok()?;
            (a <= b).then_some((a, b))
        }
        None => {
            let a = u8::from_str(s).ok()?;
            Some((a, a))
        }
    }
}

fn check_size(s: &str, count: u128) -> anyhow::Result<()> {
    if count > MAX_EXPANDED_ADDRESSES {
        Err(anyhow!(
            "too many addresses in {s}, at most {MAX_EXPANDED_ADDRESSES} is allowed"
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ports() {
        assert_eq!(parse_ports(&[DEFAULT_PORTS]).unwrap(), [554, 5554, 8554]);
        assert_eq!(
            parse_ports(&["8000-8002,554", " 8001 "]).unwrap(),
            [8000, 8001, 8002, 554]
        );
        assert!(parse_ports(&["rtsp"]).is_err());
        assert!(parse_ports(&["10-1"]).is_err());
        assert!(parse_ports(&["0"]).is_err());
        assert!(parse_ports(&[" , "]).is_err());
    }

    #[tokio::test]
    async fn plain_and_network() {
        let addrs = expand_targets(&["192.168.1.1, 10.0.0.0/30", "192.168.1.1"])
            .await
            .unwrap();
        let expected: Vec<IpAddr> = [
            "192.168.1.1",
            "10.0.0.0",
            "10.0.0.1",
            "10.0.0.2",
            "10.0.0.3",
        ]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
        assert_eq!(addrs, expected);
    }

    #[tokio::test]
    async fn truncated_network() {
        let addrs = expand_targets(&["10.0.0.7/31"]).await.unwrap();
        assert_eq!(addrs.len(), 2);
        assert_eq!(addrs[0], IpAddr::from([10, 0, 0, 6]));

        let addrs = expand_targets(&["fd00::1/127"]).await.unwrap();
        assert_eq!(
            addrs,
            [
                IpAddr::from_str("fd00::").unwrap(),
                IpAddr::from_str("fd00::1").unwrap()
            ]
        );
    }

    #[tokio::test]
    async fn ranges() {
        let addrs = expand_targets(&["192.168.0.254-192.168.1.1"]).await.unwrap();
        assert_eq!(addrs.len(), 4);
        assert_eq!(addrs[3], IpAddr::from([192, 168, 1, 1]));

        let addrs = expand_targets(&["172.16.1-2.10-11"]).await.unwrap();
        assert_eq!(
            addrs,
            [
                IpAddr::from([172, 16, 1, 10]),
                IpAddr::from([172, 16, 1, 11]),
                IpAddr::from([172, 16, 2, 10]),
                IpAddr::from([172, 16, 2, 11]),
            ]
        );
    }

    #[tokio::test]
    async fn too_large() {
        assert!(expand_targets(&["10.0.0.0/8"]).await.is_err());
        assert!(expand_targets(&["10.0-255.0-255.0-255"]).await.is_err());
    }

    #[tokio::test]
    async fn host_name() {
        let addrs = expand_targets(&["localhost"]).await.unwrap();
        assert!(addrs.iter().all(|ip| ip.is_loopback()));
    }

    #[test]
    fn streams() {
        let addrs = [IpAddr::from([10, 0, 0, 1]), IpAddr::from([10, 0, 0, 2])];
        let streams = build_streams(&addrs, &[554, 8554]);
        assert_eq!(streams.len(), 4);
        assert_eq!(streams[1].to_string(), "10.0.0.1:8554");
        assert_eq!(streams[2].to_string(), "10.0.0.2:554");
    }
}
