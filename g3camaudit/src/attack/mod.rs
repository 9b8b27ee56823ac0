/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use g3_rtsp_client::RtspClientConfig;

use crate::dict::Dictionary;
use crate::report::{Reporter, Step};
use crate::stream::CameraStream;

mod auth;
pub use auth::classify_auth;

mod error;
pub use error::{AttackError, AttackFailure, ProbeError};

mod incremental;
pub use incremental::IncrementalRoute;

mod pool;
pub use pool::{run_parallel, run_parallel_with_workers};

mod probe;
use probe::{Prober, StreamStatus};

/// Probed first to find cameras that accept any route.
const SENTINEL_ROUTE: &str = "/0x8b6c42";
const ROOT_ROUTE: &str = "/";
const MAX_INCREMENTAL_ROUTE_ATTEMPTS: usize = 32;

#[derive(Clone, Debug)]
pub struct AttackConfig {
    /// Delay between two attempts on the same stream.
    pub attack_interval: Duration,
    /// Timeout of each rtsp request.
    pub timeout: Duration,
}

impl Default for AttackConfig {
    fn default() -> Self {
        AttackConfig {
            attack_interval: Duration::ZERO,
            timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AttackPhase {
    Start,
    RoutesAttacked,
    AuthDetected,
    CredentialsAttacked,
    Validated,
    RoutesReattacked,
    Revalidated,
    Done,
}

#[derive(Clone, Copy)]
struct RouteAttackMode {
    sentinel: bool,
    emit_progress: bool,
}

const ROUTE_ATTACK: RouteAttackMode = RouteAttackMode {
    sentinel: true,
    emit_progress: true,
};
const ROUTE_REATTACK: RouteAttackMode = RouteAttackMode {
    sentinel: false,
    emit_progress: false,
};

#[derive(Clone)]
pub struct Attacker {
    dictionary: Arc<dyn Dictionary>,
    reporter: Arc<dyn Reporter>,
    config: AttackConfig,
    prober: Prober,
}

impl Attacker {
    pub fn new(
        dictionary: Arc<dyn Dictionary>,
        reporter: Arc<dyn Reporter>,
        config: AttackConfig,
    ) -> Self {
        let prober = Prober::new(RtspClientConfig::with_timeout(config.timeout));
        Attacker {
            dictionary,
            reporter,
            config,
            prober,
        }
    }

    /// Find the routes and credentials of the streams, and check that
    /// they are playable.
    ///
    /// Streams that could not be resolved are still returned. On failure
    /// the streams as they were at the failing phase are returned along
    /// with the error.
    pub async fn attack(
        &self,
        targets: Vec<CameraStream>,
        shutdown: &CancellationToken,
    ) -> Result<Vec<CameraStream>, AttackFailure> {
        if targets.is_empty() {
            return Err(AttackFailure {
                streams: targets,
                error: AttackError::EmptyInput,
            });
        }

        let mut streams = targets;
        let mut phase = AttackPhase::Start;
        while phase != AttackPhase::Done {
            let (next, r) = match phase {
                AttackPhase::Start => {
                    let r = self.attack_routes(&mut streams, shutdown, ROUTE_ATTACK).await;
                    (AttackPhase::RoutesAttacked, r)
                }
                AttackPhase::RoutesAttacked => {
                    let r = self.detect_auth(&mut streams, shutdown).await;
                    (AttackPhase::AuthDetected, r)
                }
                AttackPhase::AuthDetected => {
                    let r = self.attack_credentials(&mut streams, shutdown).await;
                    (AttackPhase::CredentialsAttacked, r)
                }
                AttackPhase::CredentialsAttacked => {
                    let r = self.validate_streams(&mut streams, shutdown, true).await;
                    (AttackPhase::Validated, r)
                }
                AttackPhase::Validated => {
                    if streams.iter().all(|s| s.fully_resolved()) {
                        (AttackPhase::Done, Ok(()))
                    } else {
                        self.reporter.progress(
                            Step::AttackRoutes,
                            "Re-attacking routes for partial results",
                        );
                        let r = self
                            .attack_routes(&mut streams, shutdown, ROUTE_REATTACK)
                            .await;
                        (AttackPhase::RoutesReattacked, r)
                    }
                }
                AttackPhase::RoutesReattacked => {
                    let r = self.validate_streams(&mut streams, shutdown, false).await;
                    (AttackPhase::Revalidated, r)
                }
                AttackPhase::Revalidated | AttackPhase::Done => (AttackPhase::Done, Ok(())),
            };
            if let Err(error) = r {
                return Err(AttackFailure { streams, error });
            }
            phase = next;
        }

        Ok(streams)
    }

    async fn attack_routes(
        &self,
        streams: &mut Vec<CameraStream>,
        shutdown: &CancellationToken,
        mode: RouteAttackMode,
    ) -> Result<(), AttackError> {
        let step = Step::AttackRoutes;
        if mode.emit_progress {
            self.reporter.start(step, "Attacking RTSP routes");
            self.reporter
                .set_total(step, (self.dictionary.routes().len() + 1) * streams.len());
        }

        let attacker = self.clone();
        let r = self
            .run_phase(streams, shutdown, move |cancel, target| {
                let attacker = attacker.clone();
                async move {
                    attacker
                        .attack_stream_routes(&cancel, target, mode)
                        .await
                }
            })
            .await
            .map_err(AttackError::AttackRoutes);
        if let Err(e) = &r {
            self.reporter.error(step, e);
            return r;
        }

        self.reporter.update_summary(streams);
        if mode.emit_progress {
            self.reporter.done(step, "Route attack finished");
        }
        Ok(())
    }

    async fn detect_auth(
        &self,
        streams: &mut Vec<CameraStream>,
        shutdown: &CancellationToken,
    ) -> Result<(), AttackError> {
        let step = Step::DetectAuth;
        self.reporter
            .start(step, "Detecting authentication methods");
        self.reporter.set_total(step, streams.len());

        let attacker = self.clone();
        let r = self
            .run_phase(streams, shutdown, move |cancel, target| {
                let attacker = attacker.clone();
                async move { attacker.detect_stream_auth(&cancel, target).await }
            })
            .await
            .map_err(AttackError::DetectAuth);
        if let Err(e) = &r {
            self.reporter.error(step, e);
            return r;
        }

        for stream in streams.iter() {
            self.reporter.tick(step);
            self.reporter.progress(
                step,
                &format!(
                    "Detected {} authentication for {stream}",
                    stream.auth_type
                ),
            );
        }
        self.reporter.update_summary(streams);
        self.reporter
            .done(step, "Authentication detection finished");
        Ok(())
    }

    async fn attack_credentials(
        &self,
        streams: &mut Vec<CameraStream>,
        shutdown: &CancellationToken,
    ) -> Result<(), AttackError> {
        let step = Step::AttackCredentials;
        self.reporter.start(step, "Attacking credentials");
        self.reporter.set_total(
            step,
            streams.len() * self.dictionary.usernames().len() * self.dictionary.passwords().len(),
        );

        let attacker = self.clone();
        let r = self
            .run_phase(streams, shutdown, move |cancel, target| {
                let attacker = attacker.clone();
                async move { attacker.attack_stream_credentials(&cancel, target).await }
            })
            .await
            .map_err(AttackError::AttackCredentials);
        if let Err(e) = &r {
            self.reporter.error(step, e);
            return r;
        }

        self.reporter.update_summary(streams);
        self.reporter.done(step, "Credential attack finished");
        Ok(())
    }

    async fn validate_streams(
        &self,
        streams: &mut Vec<CameraStream>,
        shutdown: &CancellationToken,
        emit_progress: bool,
    ) -> Result<(), AttackError> {
        let step = Step::ValidateStreams;
        if emit_progress {
            self.reporter.start(step, "Validating streams");
            self.reporter.set_total(step, streams.len());
        }

        let attacker = self.clone();
        let r = self
            .run_phase(streams, shutdown, move |cancel, target| {
                let attacker = attacker.clone();
                async move {
                    attacker
                        .validate_stream(&cancel, target, emit_progress)
                        .await
                }
            })
            .await
            .map_err(AttackError::ValidateStreams);
        if let Err(e) = &r {
            self.reporter.error(step, e);
            return r;
        }

        self.reporter.update_summary(streams);
        if emit_progress {
            self.reporter.done(step, "Stream validation finished");
        }
        Ok(())
    }

    /// Run the per stream function over all streams, and write back the
    /// results in place.
    async fn run_phase<F, Fut>(
        &self,
        streams: &mut Vec<CameraStream>,
        shutdown: &CancellationToken,
        f: F,
    ) -> Result<(), ProbeError>
    where
        F: Fn(CancellationToken, CameraStream) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<CameraStream, ProbeError>> + Send + 'static,
    {
        let targets = std::mem::take(streams);
        let (results, r) = run_parallel(targets, shutdown, f).await;
        *streams = results;
        r?;
        if shutdown.is_cancelled() {
            return Err(ProbeError::Cancelled);
        }
        Ok(())
    }

    async fn attack_stream_routes(
        &self,
        cancel: &CancellationToken,
        mut target: CameraStream,
        mode: RouteAttackMode,
    ) -> Result<CameraStream, ProbeError> {
        let step = Step::AttackRoutes;
        if target.route_found {
            return Ok(target);
        }

        if mode.sentinel {
            self.tick(step, mode.emit_progress);
            match self.prober.route(cancel, &target, SENTINEL_ROUTE).await {
                Ok(probe) => {
                    self.reporter.debug(
                        step,
                        &format!("DESCRIBE {} RTSP/1.0 > {}", probe.url, probe.code),
                    );
                    if probe.accepted {
                        target.add_route(ROOT_ROUTE);
                        target.route_found = true;
                        self.reporter.progress(
                            step,
                            &format!("Default route accepted for {target}"),
                        );
                        return Ok(target);
                    }
                }
                Err(ProbeError::Cancelled) => return Err(ProbeError::Cancelled),
                Err(e) => {
                    self.reporter
                        .debug(step, &format!("route attempt failed for {target}: {e}"));
                    return Ok(target);
                }
            }
        }

        for route in self.dictionary.routes() {
            self.pace(cancel).await?;
            self.tick(step, mode.emit_progress);
            let probe = match self.prober.route(cancel, &target, route).await {
                Ok(probe) => probe,
                Err(ProbeError::Cancelled) => return Err(ProbeError::Cancelled),
                Err(e) => {
                    self.reporter
                        .debug(step, &format!("route attempt failed for {target}: {e}"));
                    return Ok(target);
                }
            };
            self.reporter.debug(
                step,
                &format!("DESCRIBE {} RTSP/1.0 > {}", probe.url, probe.code),
            );
            if !probe.accepted {
                continue;
            }

            target.add_route(route);
            target.route_found = true;
            self.reporter
                .progress(step, &format!("Route found for {target} -> {route}"));
            return self
                .attack_incremental_routes(cancel, target, route, step)
                .await;
        }

        Ok(target)
    }

    async fn detect_stream_auth(
        &self,
        cancel: &CancellationToken,
        mut target: CameraStream,
    ) -> Result<CameraStream, ProbeError> {
        let step = Step::DetectAuth;
        match self.prober.auth_type(cancel, &target).await {
            Ok((code, auth_type)) => {
                self.reporter.debug(
                    step,
                    &format!("DESCRIBE {target} route {:?} > {code}", target.route()),
                );
                target.auth_type = auth_type;
                Ok(target)
            }
            Err(e) => {
                self.reporter.debug(
                    step,
                    &format!("authentication detection failed for {target}: {e}"),
                );
                Err(e)
            }
        }
    }

    async fn attack_stream_credentials(
        &self,
        cancel: &CancellationToken,
        mut target: CameraStream,
    ) -> Result<CameraStream, ProbeError> {
        let step = Step::AttackCredentials;
        let mut first = true;
        for username in self.dictionary.usernames() {
            for password in self.dictionary.passwords() {
                if first {
                    first = false;
                } else {
                    self.pace(cancel).await?;
                }
                self.tick(step, true);

                let probe = match self
                    .prober
                    .credentials(cancel, &target, username, password)
                    .await
                {
                    Ok(probe) => probe,
                    Err(ProbeError::Cancelled) => return Err(ProbeError::Cancelled),
                    Err(e) => {
                        self.reporter.debug(
                            step,
                            &format!("credential attempt failed for {target}: {e}"),
                        );
                        target.credentials_found = false;
                        return Ok(target);
                    }
                };
                self.reporter.debug(
                    step,
                    &format!("DESCRIBE {} RTSP/1.0 > {}", probe.url, probe.code),
                );
                if !probe.accepted {
                    continue;
                }

                target.username.clone_from(username);
                target.password.clone_from(password);
                target.credentials_found = true;
                self.reporter.progress(
                    step,
                    &format!("Credentials found for {target}: {username}:{password}"),
                );
                let route = target.route().to_string();
                return self
                    .attack_incremental_routes(cancel, target, &route, step)
                    .await;
            }
        }

        target.credentials_found = false;
        Ok(target)
    }

    async fn validate_stream(
        &self,
        cancel: &CancellationToken,
        mut target: CameraStream,
        emit_progress: bool,
    ) -> Result<CameraStream, ProbeError> {
        let step = Step::ValidateStreams;
        let r = self.prober.stream_status(cancel, &target).await;
        self.tick(step, emit_progress);
        match r? {
            StreamStatus::Available => {
                target.available = true;
                self.reporter
                    .progress(step, &format!("Stream validated for {target}"));
            }
            StreamStatus::Unavailable { method, code } => {
                target.available = false;
                self.reporter
                    .debug(step, &format!("{method} {target} > {code}"));
                self.reporter
                    .progress(step, &format!("Stream unavailable for {target}"));
            }
        }
        Ok(target)
    }

    /// Probe the routes following the numeric token of `route`, using the
    /// stream credentials.
    async fn attack_incremental_routes(
        &self,
        cancel: &CancellationToken,
        mut target: CameraStream,
        route: &str,
        step: Step,
    ) -> Result<CameraStream, ProbeError> {
        let Some(pattern) = IncrementalRoute::detect(route) else {
            return Ok(target);
        };

        let mut number = pattern.number;
        let mut attempts = 0;
        while attempts < MAX_INCREMENTAL_ROUTE_ATTEMPTS {
            self.pace(cancel).await?;
            let Some(next) = number.checked_add(1) else {
                break;
            };
            number = next;

            let candidate = pattern.build(number);
            if target.has_route(&candidate) {
                if pattern.is_channel {
                    continue;
                }
                break;
            }

            let probe = match self
                .prober
                .route_with_credentials(cancel, &target, &candidate)
                .await
            {
                Ok(probe) => probe,
                Err(ProbeError::Cancelled) => return Err(ProbeError::Cancelled),
                Err(e) => {
                    self.reporter.debug(
                        step,
                        &format!("incremental route attempt failed for {target}: {e}"),
                    );
                    break;
                }
            };
            attempts += 1;
            self.reporter.debug(
                step,
                &format!("DESCRIBE {} RTSP/1.0 > {}", probe.url, probe.code),
            );
            if !probe.accepted {
                break;
            }

            target.add_route(&candidate);
            self.reporter.progress(
                step,
                &format!("Incremental route found for {target} -> {candidate}"),
            );
            if !pattern.is_channel {
                break;
            }
        }

        Ok(target)
    }

    async fn pace(&self, cancel: &CancellationToken) -> Result<(), ProbeError> {
        if self.config.attack_interval.is_zero() {
            return if cancel.is_cancelled() {
                Err(ProbeError::Cancelled)
            } else {
                Ok(())
            };
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ProbeError::Cancelled),
            _ = tokio::time::sleep(self.config.attack_interval) => Ok(()),
        }
    }

    fn tick(&self, step: Step, emit_progress: bool) {
        if emit_progress {
            self.reporter.tick(step);
        }
    }
}
