// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI integration tests.
//!
//! These tests run the actual spat-relay binary and verify its behavior.

mod common;

use std::io::Write;
use std::net::UdpSocket;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::time::Duration;

use common::{fixture_path, REFERENCE_FRAME};
use spat_relay::wire;

/// Get the path to the built spat-relay binary
fn spat_relay_bin() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    // The test binary is in target/debug/deps/
    // The spat-relay binary is in target/debug/
    path.pop(); // deps
    path.pop(); // debug or release
    path.push("spat-relay");
    path
}

/// Run spat-relay with arguments
fn run(args: &[&str]) -> Output {
    let bin = spat_relay_bin();
    Command::new(&bin)
        .args(args)
        .output()
        .unwrap_or_else(|_| panic!("Failed to run {:?}", bin))
}

/// Run spat-relay and assert success
fn run_ok(args: &[&str]) -> String {
    let output = run(args);
    assert!(
        output.status.success(),
        "Command failed: {:?}\nstdout: {}\nstderr: {}",
        args,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run spat-relay and assert failure
fn run_err(args: &[&str]) -> String {
    let output = run(args);
    assert!(
        !output.status.success(),
        "Command should have failed but succeeded: {:?}",
        args
    );
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn sample_hex() -> String {
    fixture_path("spat_sample.hex").to_string_lossy().to_string()
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_cli_help() {
    let output = run_ok(&["--help"]);
    assert!(output.contains("SPAT decoder and signal-state relay"));
    assert!(output.contains("run"));
    assert!(output.contains("decode"));
    assert!(output.contains("listen"));
    assert!(output.contains("send"));
}

#[test]
fn test_cli_version() {
    let output = run_ok(&["--version"]);
    assert!(output.contains("spat-relay"));
}

#[test]
fn test_cli_no_args() {
    let output = run(&[]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_invalid_command() {
    run_err(&["nonexistent"]);
}

// ============================================================================
// Decode Tests
// ============================================================================

#[test]
fn test_decode_hex_fixture() {
    let output = run_ok(&["decode", &sample_hex(), "--hex"]);
    assert!(output.contains("MessageFrame: id 19 (SPAT)"));
    assert!(output.contains("Intersection 404 (region 404) rev 1"));
    assert!(output.contains("STRAIGHT"));
    assert!(output.contains("LEFT"));
    assert!(output.contains("(no tracked intersections)"));
}

#[test]
fn test_decode_binary_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&REFERENCE_FRAME).unwrap();
    let output = run_ok(&["decode", &file.path().to_string_lossy()]);
    assert!(output.contains("Intersection 404"));
}

#[test]
fn test_decode_prefixed_datagram() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0u8; 16]).unwrap();
    file.write_all(&REFERENCE_FRAME).unwrap();
    let output = run_ok(&["decode", &file.path().to_string_lossy(), "--prefixed"]);
    assert!(output.contains("Intersection 404"));
}

#[test]
fn test_decode_json() {
    let output = run_ok(&["decode", &sample_hex(), "--hex", "--json"]);
    let doc: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(doc["message_id"], 19);
    assert_eq!(doc["spat"]["intersections"][0]["id"]["id"], 404);
    assert_eq!(doc["spat"]["intersections"][0]["states"].as_array().unwrap().len(), 8);
    assert_eq!(doc["table"].as_array().unwrap().len(), 0);
}

#[test]
fn test_decode_with_config_tracks_intersection() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        config,
        "[[aggregate.track]]\nintersection_id = 404\nsignal_group = 2"
    )
    .unwrap();
    let output = run_ok(&[
        "decode",
        &sample_hex(),
        "--hex",
        "--config",
        &config.path().to_string_lossy(),
    ]);
    assert!(output.contains("[0] id=404 name=\"LEFT\" group=2 state=3 min_end=00:59.0"));
}

#[test]
fn test_decode_rejects_bad_hex() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "00 13 zz").unwrap();
    let stderr = run_err(&["decode", &file.path().to_string_lossy(), "--hex"]);
    assert!(stderr.contains("Error:"));
}

#[test]
fn test_decode_rejects_unprefixed_as_prefixed() {
    let stderr = run_err(&["decode", &sample_hex(), "--hex", "--prefixed"]);
    assert!(stderr.contains("tag mismatch"));
}

#[test]
fn test_decode_missing_file() {
    run_err(&["decode", "/nonexistent/capture.hex", "--hex"]);
}

// ============================================================================
// Send / Run Tests
// ============================================================================

#[test]
fn test_send_wraps_frame() {
    let target = UdpSocket::bind("127.0.0.1:0").unwrap();
    target
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let addr = target.local_addr().unwrap().to_string();

    let output = run_ok(&["send", &sample_hex(), "--hex", "--to", &addr]);
    assert!(output.contains("sent 146 bytes"));

    let mut buf = [0u8; 512];
    let (n, _) = target.recv_from(&mut buf).unwrap();
    assert_eq!(n, 146);
    assert_eq!(&buf[..16], &[0u8; 16]);
    assert_eq!(buf[17], 0x13);
    assert_eq!(&buf[16..n], &REFERENCE_FRAME[..]);
}

#[test]
fn test_run_relays_one_datagram() {
    let consumer = UdpSocket::bind("127.0.0.1:0").unwrap();
    consumer
        .set_read_timeout(Some(Duration::from_millis(100)))
        .unwrap();
    let listen = {
        let scratch = UdpSocket::bind("127.0.0.1:0").unwrap();
        scratch.local_addr().unwrap()
    };

    let mut child = Command::new(spat_relay_bin())
        .args([
            "run",
            "--listen",
            &listen.to_string(),
            "--forward-to",
            &consumer.local_addr().unwrap().to_string(),
            "--source",
            "127.0.0.1:0",
            "--count",
            "1",
        ])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
    let datagram = common::reference_datagram();
    let mut buf = [0u8; 2048];
    let mut received = None;
    for _ in 0..50 {
        sender.send_to(&datagram, listen).unwrap();
        if let Ok((n, _)) = consumer.recv_from(&mut buf) {
            received = Some(buf[..n].to_vec());
            break;
        }
    }
    let status = child.wait().unwrap();

    let summary = received.expect("no summary forwarded");
    assert!(status.success());
    let records = wire::decode_versioned(&summary).unwrap();
    assert_eq!(records.len(), 5);
}

#[test]
fn test_run_rejects_bad_config() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "[aggregate]\ntrack = []").unwrap();
    let stderr = run_err(&["run", "--config", &config.path().to_string_lossy()]);
    assert!(stderr.contains("aggregate.track"));
}
