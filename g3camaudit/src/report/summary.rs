/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt::Write;

use crate::output::stream_url;
use crate::stream::CameraStream;

/// Render the final result as plain text.
pub fn format_summary(streams: &[CameraStream]) -> String {
    let mut sorted: Vec<&CameraStream> = streams.iter().collect();
    sorted.sort_by(|a, b| a.address.cmp(&b.address).then(a.port.cmp(&b.port)));
    let (accessible, others): (Vec<&CameraStream>, Vec<&CameraStream>) =
        sorted.into_iter().partition(|s| s.available);

    let mut s = String::with_capacity(1024);
    write_section(&mut s, "Accessible streams", &accessible);
    s.push('\n');
    write_section(&mut s, "Other discovered streams", &others);
    s
}

fn write_section(s: &mut String, title: &str, streams: &[&CameraStream]) {
    let _ = writeln!(s, "{title}: {}", streams.len());
    if streams.is_empty() {
        s.push_str("  • None\n");
        return;
    }
    for stream in streams {
        write_stream(s, stream);
    }
}

fn write_stream(s: &mut String, stream: &CameraStream) {
    match &stream.device {
        Some(device) if !device.is_empty() => {
            let _ = writeln!(s, "  • {stream} ({device})");
        }
        _ => {
            let _ = writeln!(s, "  • {stream}");
        }
    }
    let _ = writeln!(s, "    Authentication: {}", stream.auth_type);

    if stream.route_found {
        let _ = writeln!(s, "    Routes: {}", stream.routes.join(", "));
    } else {
        s.push_str("    Routes: not found\n");
    }

    if stream.credentials_found {
        let _ = writeln!(
            s,
            "    Credentials: {}:{}",
            stream.username, stream.password
        );
    } else {
        s.push_str("    Credentials: not found\n");
    }

    let availability = if stream.available { "yes" } else { "no" };
    let _ = writeln!(s, "    Available: {availability}");

    if stream.route_found && stream.credentials_found {
        let _ = writeln!(s, "    RTSP URL: {}", stream_url(stream));
    }
    let _ = writeln!(s, "    Admin panel: http://{}/", host(stream));
}

fn host(stream: &CameraStream) -> String {
    if stream.address.is_ipv6() {
        format!("[{}]", stream.address)
    } else {
        stream.address.to_string()
    }
}
