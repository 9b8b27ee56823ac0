/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::path::Path;

use anyhow::Context;

use crate::stream::CameraStream;

/// The playable url of the stream, with credentials if they were found.
pub fn stream_url(stream: &CameraStream) -> String {
    let route = stream.route().trim_start_matches('/');
    if stream.credentials_found && (!stream.username.is_empty() || !stream.password.is_empty()) {
        format!(
            "rtsp://{}:{}@{}/{route}",
            stream.username,
            stream.password,
            stream.socket_addr()
        )
    } else {
        format!("rtsp://{}/{route}", stream.socket_addr())
    }
}

pub fn build_m3u(streams: &[CameraStream]) -> String {
    let mut s = String::from("#EXTM3U\n");
    for stream in streams {
        s.push_str("#EXTINF:-1,");
        s.push_str(&stream.to_string());
        if let Some(device) = &stream.device
            && !device.is_empty()
        {
            s.push_str(" (");
            s.push_str(device);
            s.push(')');
        }
        s.push('\n');
        s.push_str(&stream_url(stream));
        s.push('\n');
    }
    s
}

pub async fn write_m3u(path: &Path, streams: &[CameraStream]) -> anyhow::Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(dir)
            .await
            .context(format!("failed to create directory {}", dir.display()))?;
    }
    tokio::fs::write(path, build_m3u(streams))
        .await
        .context(format!("failed to write playlist {}", path.display()))
}
