/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use g3_rtsp_client::{RtspClient, RtspClientConfig, RtspUrl};

use crate::report::{Reporter, Step};
use crate::stream::CameraStream;

/// Find the endpoints that speak rtsp, by sending an OPTIONS request.
pub struct Scanner {
    config: RtspClientConfig,
    concurrency: usize,
}

impl Scanner {
    pub fn new(timeout: Duration, concurrency: usize) -> Self {
        Scanner {
            config: RtspClientConfig::with_timeout(timeout),
            concurrency: concurrency.max(1),
        }
    }

    pub async fn scan(
        &self,
        candidates: Vec<CameraStream>,
        reporter: &dyn Reporter,
        shutdown: &CancellationToken,
    ) -> Vec<CameraStream> {
        let step = Step::Scan;
        reporter.start(
            step,
            &format!("Scanning {} endpoints for RTSP services", candidates.len()),
        );
        reporter.set_total(step, candidates.len());

        let found: Vec<CameraStream> = futures_util::stream::iter(candidates)
            .map(|stream| self.probe(stream, reporter, shutdown))
            .buffered(self.concurrency)
            .filter_map(|r| async move { r })
            .collect()
            .await;

        reporter.update_summary(&found);
        reporter.done(step, &format!("Found {} RTSP streams", found.len()));
        found
    }

    async fn probe(
        &self,
        mut stream: CameraStream,
        reporter: &dyn Reporter,
        shutdown: &CancellationToken,
    ) -> Option<CameraStream> {
        let step = Step::Scan;
        let addr = stream.socket_addr();
        let url = RtspUrl::build(addr, "/").ok()?;

        let r = tokio::select! {
            biased;
            _ = shutdown.cancelled() => None,
            r = async {
                let mut client = RtspClient::connect(addr, &self.config).await?;
                client.options(&url).await
            } => Some(r),
        };
        reporter.tick(step);

        match r? {
            Ok(rsp) => {
                let device = rsp.header("Server").map(|s| s.to_string());
                reporter.progress(
                    step,
                    &format!(
                        "RTSP service found at {stream} ({})",
                        device.as_deref().unwrap_or("unknown device")
                    ),
                );
                stream.device = device;
                Some(stream)
            }
            Err(e) => {
                reporter.debug(step, &format!("no RTSP service at {stream}: {e}"));
                None
            }
        }
    }
}
