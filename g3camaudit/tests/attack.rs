/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use g3camaudit::attack::{AttackConfig, AttackError, AttackFailure, Attacker, ProbeError};
use g3camaudit::dict::WordDictionary;
use g3camaudit::report::NopReporter;
use g3camaudit::stream::{AuthType, CameraStream};

mod common;
use common::{FakeAuth, FakeCamera, FakeCameraConfig};

fn words(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn attacker(routes: &[&str], usernames: &[&str], passwords: &[&str]) -> Attacker {
    attacker_with_config(routes, usernames, passwords, AttackConfig::default())
}

fn attacker_with_config(
    routes: &[&str],
    usernames: &[&str],
    passwords: &[&str],
    config: AttackConfig,
) -> Attacker {
    let dictionary = WordDictionary::new(words(routes), words(usernames), words(passwords));
    Attacker::new(Arc::new(dictionary), Arc::new(NopReporter), config)
}

fn default_attacker() -> Attacker {
    attacker(
        &["stream", "live.sdp"],
        &["root", "admin"],
        &["pass", "12345"],
    )
}

async fn attack_one(
    attacker: &Attacker,
    camera: &FakeCamera,
) -> Result<CameraStream, AttackFailure> {
    let shutdown = CancellationToken::new();
    let mut streams = attacker.attack(vec![camera.stream()], &shutdown).await?;
    assert_eq!(streams.len(), 1);
    Ok(streams.remove(0))
}

#[tokio::test]
async fn basic_auth() {
    let camera = FakeCamera::start(FakeCameraConfig {
        auth: FakeAuth::Basic,
        ..Default::default()
    })
    .await;

    let stream = attack_one(&default_attacker(), &camera).await.unwrap();
    assert!(stream.route_found);
    assert_eq!(stream.routes, ["live.sdp"]);
    assert_eq!(stream.auth_type, AuthType::Basic);
    assert!(stream.credentials_found);
    assert_eq!(stream.username, "admin");
    assert_eq!(stream.password, "12345");
    assert!(stream.available);
}

#[tokio::test]
async fn basic_auth_missing_route() {
    let camera = FakeCamera::start(FakeCameraConfig {
        routes: words(&["stream"]),
        auth: FakeAuth::Basic,
        username: "user".to_string(),
        password: "pass".to_string(),
        ..Default::default()
    })
    .await;

    let attacker = attacker(&["stream"], &["user", "other"], &["pass", "bad"]);
    let stream = attack_one(&attacker, &camera).await.unwrap();
    assert!(stream.route_found);
    assert_eq!(stream.routes, ["stream"]);
    assert!(stream.credentials_found);
    assert_eq!(stream.username, "user");
    assert_eq!(stream.password, "pass");
    assert!(stream.available);

    let attacker = self::attacker(&["missing"], &["user", "other"], &["pass", "bad"]);
    let failure = attack_one(&attacker, &camera).await.unwrap_err();
    assert!(matches!(failure.error, AttackError::ValidateStreams(_)));
    assert!(!failure.streams[0].route_found);
}

#[tokio::test]
async fn digest_auth() {
    let camera = FakeCamera::start(FakeCameraConfig {
        auth: FakeAuth::Digest,
        ..Default::default()
    })
    .await;

    let stream = attack_one(&default_attacker(), &camera).await.unwrap();
    assert_eq!(stream.routes, ["live.sdp"]);
    assert_eq!(stream.auth_type, AuthType::Digest);
    assert!(stream.credentials_found);
    assert_eq!(stream.username, "admin");
    assert_eq!(stream.password, "12345");
    assert!(stream.available);
}

#[tokio::test]
async fn no_auth() {
    let camera = FakeCamera::start(FakeCameraConfig::default()).await;

    let stream = attack_one(&default_attacker(), &camera).await.unwrap();
    assert_eq!(stream.routes, ["live.sdp"]);
    assert_eq!(stream.auth_type, AuthType::None);
    assert!(stream.credentials_found);
    assert_eq!(stream.username, "root");
    assert_eq!(stream.password, "pass");
    assert!(stream.available);
}

#[tokio::test]
async fn any_route_accepted() {
    let camera = FakeCamera::start(FakeCameraConfig {
        allow_all: true,
        auth: FakeAuth::Basic,
        ..Default::default()
    })
    .await;

    let stream = attack_one(&default_attacker(), &camera).await.unwrap();
    assert!(stream.route_found);
    assert_eq!(stream.routes, ["/"]);
    assert!(stream.credentials_found);
    assert!(stream.available);

    // the route dictionary is never used
    let paths = camera.described_paths();
    assert_eq!(paths[0], "/0x8b6c42");
    assert!(paths[1..].iter().all(|p| p == "/"));
}

#[tokio::test]
async fn incremental_route() {
    let camera = FakeCamera::start(FakeCameraConfig {
        routes: words(&["stream1", "stream2"]),
        ..Default::default()
    })
    .await;

    let attacker = attacker(&["stream1"], &["admin"], &["12345"]);
    let stream = attack_one(&attacker, &camera).await.unwrap();
    assert_eq!(stream.routes, ["stream1", "stream2"]);
    assert!(stream.available);
}

#[tokio::test]
async fn incremental_channels() {
    let camera = FakeCamera::start(FakeCameraConfig {
        routes: words(&["live/channel1", "live/channel2", "live/channel3"]),
        ..Default::default()
    })
    .await;

    let attacker = attacker(&["live/channel1"], &["admin"], &["12345"]);
    let stream = attack_one(&attacker, &camera).await.unwrap();
    assert_eq!(
        stream.routes,
        ["live/channel1", "live/channel2", "live/channel3"]
    );
}

#[tokio::test]
async fn incremental_channels_capped() {
    let camera = FakeCamera::start(FakeCameraConfig {
        routes: Vec::new(),
        route_prefix: Some("live/channel".to_string()),
        ..Default::default()
    })
    .await;

    // no credentials, so the channels are only enumerated once
    let attacker = attacker(&["live/channel1"], &[], &[]);
    let stream = attack_one(&attacker, &camera).await.unwrap();
    assert!(!stream.credentials_found);
    assert_eq!(stream.routes.len(), 33);
    assert_eq!(stream.routes[0], "live/channel1");
    assert_eq!(stream.routes[32], "live/channel33");
    assert!(!camera.described_paths().iter().any(|p| p == "/live/channel34"));
}

#[tokio::test]
async fn incremental_channel_skip_known() {
    let camera = FakeCamera::start(FakeCameraConfig {
        routes: words(&["live/channel1", "live/channel3"]),
        ..Default::default()
    })
    .await;

    let mut target = camera.stream();
    target.routes = words(&["live/channel1", "live/channel2"]);

    let attacker = attacker(&["live/channel1"], &[], &[]);
    let shutdown = CancellationToken::new();
    let streams = attacker.attack(vec![target], &shutdown).await.unwrap();
    assert_eq!(
        streams[0].routes,
        ["live/channel1", "live/channel2", "live/channel3"]
    );
    assert!(!camera.described_paths().iter().any(|p| p == "/live/channel2"));
}

#[tokio::test]
async fn incremental_stop_on_known() {
    let camera = FakeCamera::start(FakeCameraConfig {
        routes: words(&["stream1", "stream3"]),
        ..Default::default()
    })
    .await;

    let mut target = camera.stream();
    target.routes = words(&["stream1", "stream2"]);

    let attacker = attacker(&["stream1"], &[], &[]);
    let shutdown = CancellationToken::new();
    let streams = attacker.attack(vec![target], &shutdown).await.unwrap();
    assert_eq!(streams[0].routes, ["stream1", "stream2"]);
    let paths = camera.described_paths();
    assert!(!paths.iter().any(|p| p == "/stream2" || p == "/stream3"));
}

#[tokio::test]
async fn cancel_while_pacing() {
    let camera = FakeCamera::start(FakeCameraConfig::default()).await;

    let attacker = attacker_with_config(
        &["stream", "live.sdp"],
        &["admin"],
        &["12345"],
        AttackConfig {
            attack_interval: Duration::from_secs(30),
            timeout: Duration::from_secs(2),
        },
    );
    let shutdown = CancellationToken::new();
    let cancel = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        cancel.cancel();
    });

    let time_start = Instant::now();
    let failure = tokio::time::timeout(
        Duration::from_secs(5),
        attacker.attack(vec![camera.stream()], &shutdown),
    )
    .await
    .unwrap()
    .unwrap_err();
    assert!(time_start.elapsed() < Duration::from_secs(5));
    assert!(matches!(
        failure.error,
        AttackError::AttackRoutes(ProbeError::Cancelled)
    ));
    assert_eq!(camera.described_paths(), ["/0x8b6c42"]);
}

#[tokio::test]
async fn route_not_found() {
    let camera = FakeCamera::start(FakeCameraConfig::default()).await;

    let attacker = attacker(&["missing"], &["admin"], &["12345"]);
    let failure = attack_one(&attacker, &camera).await.unwrap_err();
    assert!(matches!(failure.error, AttackError::ValidateStreams(_)));
    assert!(failure.to_string().starts_with("validating streams: "));

    let stream = &failure.streams[0];
    assert!(!stream.route_found);
    assert!(stream.routes.is_empty());
    assert!(stream.credentials_found);
    assert!(!stream.available);
}

#[tokio::test]
async fn wrong_password() {
    let camera = FakeCamera::start(FakeCameraConfig {
        auth: FakeAuth::Basic,
        ..Default::default()
    })
    .await;

    let attacker = attacker(&["live.sdp"], &["admin"], &["admin", "password"]);
    let failure = attack_one(&attacker, &camera).await.unwrap_err();
    assert!(matches!(failure.error, AttackError::ValidateStreams(_)));

    let stream = &failure.streams[0];
    assert!(stream.route_found);
    assert_eq!(stream.auth_type, AuthType::Basic);
    assert!(!stream.credentials_found);
    assert!(stream.username.is_empty());
}

#[tokio::test]
async fn setup_rejected() {
    let camera = FakeCamera::start(FakeCameraConfig {
        auth: FakeAuth::Digest,
        setup_status: 461,
        ..Default::default()
    })
    .await;

    let stream = attack_one(&default_attacker(), &camera).await.unwrap();
    assert!(stream.route_found);
    assert!(stream.credentials_found);
    assert!(!stream.available);
}

#[tokio::test]
async fn keep_stream_order() {
    let first = FakeCamera::start(FakeCameraConfig {
        auth: FakeAuth::Basic,
        ..Default::default()
    })
    .await;
    let second = FakeCamera::start(FakeCameraConfig {
        routes: words(&["stream"]),
        ..Default::default()
    })
    .await;

    let shutdown = CancellationToken::new();
    let streams = default_attacker()
        .attack(vec![first.stream(), second.stream()], &shutdown)
        .await
        .unwrap();
    assert_eq!(streams.len(), 2);
    assert_eq!(streams[0].port, first.addr.port());
    assert_eq!(streams[0].routes, ["live.sdp"]);
    assert_eq!(streams[0].auth_type, AuthType::Basic);
    assert_eq!(streams[1].port, second.addr.port());
    assert_eq!(streams[1].routes, ["stream"]);
    assert_eq!(streams[1].auth_type, AuthType::None);
    assert!(streams.iter().all(|s| s.available));
}

#[tokio::test]
async fn empty_input() {
    let shutdown = CancellationToken::new();
    let failure = default_attacker().attack(Vec::new(), &shutdown).await.unwrap_err();
    assert!(matches!(failure.error, AttackError::EmptyInput));
    assert!(failure.streams.is_empty());
}

#[tokio::test]
async fn cancelled_before_start() {
    let camera = FakeCamera::start(FakeCameraConfig::default()).await;

    let shutdown = CancellationToken::new();
    shutdown.cancel();
    let failure = default_attacker()
        .attack(vec![camera.stream()], &shutdown)
        .await
        .unwrap_err();
    assert!(matches!(failure.error, AttackError::AttackRoutes(_)));
    assert_eq!(failure.streams.len(), 1);
    assert_eq!(camera.request_count(), 0);
}
